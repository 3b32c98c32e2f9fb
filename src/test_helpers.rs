//! Shared fixtures for the sitepack test suite.

use crate::options::{RawOptions, RunConfig, resolve};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Lay down an export directory from `(relative path, content)` pairs.
pub fn export_with(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (rel, content) in files {
        let path = tmp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    tmp
}

/// Resolved config for an https run against `domain`, primary language `ru`.
pub fn config_with_domain(export_dir: &Path, domain: &str) -> RunConfig {
    resolve(RawOptions {
        export_dir: export_dir.to_string_lossy().to_string(),
        domain: domain.to_string(),
        https: true,
        www_mode: "keep".to_string(),
        force_host: false,
        primary_lang: "ru".to_string(),
        zip_name: Some("site-test.zip".to_string()),
    })
    .unwrap()
}

/// Resolved config with no domain: placeholder mode.
pub fn placeholder_config(export_dir: &Path) -> RunConfig {
    resolve(RawOptions {
        export_dir: export_dir.to_string_lossy().to_string(),
        domain: String::new(),
        https: true,
        www_mode: "keep".to_string(),
        force_host: false,
        primary_lang: "ru".to_string(),
        zip_name: Some("site-test.zip".to_string()),
    })
    .unwrap()
}
