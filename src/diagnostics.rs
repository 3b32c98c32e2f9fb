//! Human-readable run report.
//!
//! One plain-text file summarizing what was discovered and generated, with
//! an explicit warning when the domain is still the placeholder — robots and
//! sitemap correctness then depend on the deploy-time substitution.

use crate::options::{BASE_URL_TOKEN, RunConfig};
use crate::scan::Manifest;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::io;
use std::path::Path;

pub fn build(cfg: &RunConfig, manifest: &Manifest, generated_at: DateTime<Utc>) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Export diagnostics (generated {} UTC)",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, false)
    ));
    lines.push(format!(
        "Domain: {}",
        if cfg.placeholder_domain() {
            "(none)"
        } else {
            &cfg.domain
        }
    ));
    lines.push(format!("Primary language: {}", cfg.primary_lang));
    lines.push(format!(
        "Languages detected: {}",
        manifest.languages.join(", ")
    ));

    for (slug, by_lang) in &manifest.pages {
        let langs = by_lang.keys().cloned().collect::<Vec<_>>().join(", ");
        lines.push(format!(" - {slug}: {langs}"));
    }
    lines.push(format!("Total HTML files: {}", manifest.variant_count()));
    lines.push(String::new());

    if cfg.placeholder_domain() {
        lines.push(format!(
            "WARNING: no domain configured — every generated URL starts with {BASE_URL_TOKEN}; \
             substitute it before deploying"
        ));
        lines.push(format!("robots.txt: Sitemap line is not absolute yet ({BASE_URL_TOKEN})"));
    } else {
        lines.push("robots.txt: absolute Sitemap entry → OK".to_string());
    }
    lines.push("sitemap.xml: static XML with xhtml:link alternates → OK".to_string());
    lines.push(".htaccess/nginx.conf: generated → review and deploy manually".to_string());

    format!("{}\n", lines.join("\n"))
}

pub fn write(
    export_dir: &Path,
    cfg: &RunConfig,
    manifest: &Manifest,
    generated_at: DateTime<Utc>,
) -> io::Result<()> {
    fs::write(
        export_dir.join("diagnostics.txt"),
        build(cfg, manifest, generated_at),
    )
}
