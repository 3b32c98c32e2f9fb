//! Run-parameter resolution.
//!
//! Turns the flat parameter set from the CLI (or any embedding front end)
//! into a validated [`RunConfig`] that every later stage shares read-only.
//!
//! ## Domain normalization
//!
//! The raw domain string goes through a fixed sequence: prepend a scheme when
//! none is present (chosen by the https flag), parse out the host (the `url`
//! crate applies IDNA to-ASCII conversion and lowercasing), apply the
//! www-mode, then force the scheme to match the https flag regardless of
//! what was typed. An empty raw domain is legal: the export is finalized in
//! placeholder mode and every absolute URL downstream starts with the
//! literal [`BASE_URL_TOKEN`], to be substituted at deploy time.

use chrono::Utc;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Literal marker used in place of `scheme://host` when the deployment
/// domain is not known yet. Meant for a deploy-time find-and-replace.
pub const BASE_URL_TOKEN: &str = "{{BASE_URL}}";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("export dir is required")]
    ExportDirRequired,
    #[error("export dir not found: {0}")]
    ExportDirNotFound(PathBuf),
    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),
}

/// How a leading `www.` label on the resolved host is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WwwMode {
    Keep,
    Www,
    NonWww,
}

impl WwwMode {
    /// Lenient parse: anything other than `www`/`non-www` means `keep`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "www" => WwwMode::Www,
            "non-www" => WwwMode::NonWww,
            _ => WwwMode::Keep,
        }
    }
}

/// Raw string parameters as supplied by the front end (CLI flags here).
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    pub export_dir: String,
    pub domain: String,
    pub https: bool,
    pub www_mode: String,
    pub force_host: bool,
    pub primary_lang: String,
    pub zip_name: Option<String>,
}

/// Canonical run configuration, produced once and shared by every stage.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub export_dir: PathBuf,
    /// `scheme://host`, or [`BASE_URL_TOKEN`] in placeholder mode.
    pub domain: String,
    /// Lowercase, IDNA-ASCII host. Empty in placeholder mode.
    pub host: String,
    pub https: bool,
    pub www_mode: WwwMode,
    pub force_host: bool,
    pub primary_lang: String,
    pub zip_name: String,
}

impl RunConfig {
    /// True when no real domain was supplied and generated URLs carry the
    /// placeholder token.
    pub fn placeholder_domain(&self) -> bool {
        self.domain == BASE_URL_TOKEN
    }
}

pub fn resolve(raw: RawOptions) -> Result<RunConfig, ConfigError> {
    let export_dir = raw.export_dir.trim_end_matches('/');
    if export_dir.is_empty() {
        return Err(ConfigError::ExportDirRequired);
    }
    let export_dir = PathBuf::from(export_dir);
    if !export_dir.is_dir() {
        return Err(ConfigError::ExportDirNotFound(export_dir));
    }

    let www_mode = WwwMode::parse(raw.www_mode.trim());
    let (domain, host) = normalize_domain(raw.domain.trim(), raw.https, www_mode)?;

    let primary_lang = raw.primary_lang.trim();
    let primary_lang = if primary_lang.is_empty() {
        "ru".to_string()
    } else {
        primary_lang.to_string()
    };

    let zip_name = match raw.zip_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => default_zip_name(),
    };

    Ok(RunConfig {
        export_dir,
        domain,
        host,
        https: raw.https,
        www_mode,
        force_host: raw.force_host,
        primary_lang,
        zip_name,
    })
}

fn default_zip_name() -> String {
    format!("site-{}.zip", Utc::now().format("%Y%m%d-%H%M%S"))
}

/// Normalize a raw domain string into `(domain, host)`.
///
/// An empty string selects placeholder mode. The scheme of the result always
/// follows the https flag, even when the input carried one.
fn normalize_domain(raw: &str, https: bool, www_mode: WwwMode) -> Result<(String, String), ConfigError> {
    if raw.is_empty() {
        return Ok((BASE_URL_TOKEN.to_string(), String::new()));
    }

    let lower = raw.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        raw.to_string()
    } else {
        format!("{}://{}", if https { "https" } else { "http" }, raw)
    };

    let parsed = Url::parse(&with_scheme).map_err(|_| ConfigError::InvalidDomain(raw.to_string()))?;
    // Url::parse already applies IDNA UTS-46 to-ASCII and lowercases hosts
    // of special schemes; the extra lowercase is for IP-literal edge cases.
    let mut host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();

    match www_mode {
        WwwMode::Www if !host.starts_with("www.") && !host.is_empty() => {
            host = format!("www.{host}");
        }
        WwwMode::NonWww if host.starts_with("www.") => {
            host = host["www.".len()..].to_string();
        }
        _ => {}
    }

    if host.is_empty() {
        return Err(ConfigError::InvalidDomain(raw.to_string()));
    }

    let scheme = if https { "https" } else { "http" };
    Ok((format!("{scheme}://{host}"), host))
}
