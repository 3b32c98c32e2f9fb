//! Pipeline orchestration.
//!
//! Runs the stages in their required order — scan, head injection, sitemap,
//! robots, redirect configs, diagnostics, archive — each stage fully
//! materialized before the next starts. The archiver in particular walks the
//! directory tree, so it must come last.
//!
//! A fatal error aborts the run and leaves whatever was already written in
//! place; there is no rollback and no retry. Per-file soft errors inside the
//! head injector never abort.

use crate::archive::{self, PackageError};
use crate::head::HeadInjector;
use crate::options::{ConfigError, RunConfig};
use crate::scan::{self, Manifest, ScanError};
use crate::settings::{Settings, SettingsError};
use crate::sitemap::{self, SitemapError};
use crate::urls::UrlBuilder;
use crate::{diagnostics, redirects, robots};
use chrono::Utc;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinalizeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Sitemap(#[from] SitemapError),
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FinalizeError {
    /// Batch exit code: configuration errors and missing input are
    /// distinguishable from runtime failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            FinalizeError::Config(_) | FinalizeError::Settings(_) => 2,
            FinalizeError::Scan(ScanError::NoPages(_)) => 3,
            _ => 1,
        }
    }
}

/// What a successful run produced.
#[derive(Debug)]
pub struct Outcome {
    pub manifest: Manifest,
    /// Number of page files whose head section was rewritten.
    pub rewritten: usize,
    pub zip_path: PathBuf,
}

/// Run the full finalization pipeline over an already-resolved config.
pub fn finalize(cfg: &RunConfig, settings: &Settings) -> Result<Outcome, FinalizeError> {
    let manifest = scan::scan(&cfg.export_dir, &cfg.primary_lang)?;
    let urls = UrlBuilder::new(cfg);

    let injector = HeadInjector::new(cfg, &urls, &manifest, settings);
    let rewritten = injector.process_all();

    let generated_at = Utc::now();
    sitemap::write(&cfg.export_dir, &urls, &manifest, generated_at)?;
    robots::write(&cfg.export_dir, &urls)?;
    redirects::write_all(&cfg.export_dir, cfg)?;
    diagnostics::write(&cfg.export_dir, cfg, &manifest, generated_at)?;

    let zip_path = archive::pack(cfg)?;

    Ok(Outcome {
        manifest,
        rewritten,
        zip_path,
    })
}
