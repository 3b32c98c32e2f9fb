//! Shared SEO settings.
//!
//! The flat key/value mapping maintained by the (external) settings editor.
//! Loaded once at process start into an immutable [`Settings`] value and
//! injected into the stages that need it — never read as ambient state.
//!
//! Two sources: a TOML file (the CLI's `--settings` flag), or a flat
//! string-to-string map as the editor stores it, where boolean-like keys use
//! the `"1"`/`"0"` encoding.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Site-wide SEO settings. Unknown keys in a settings file are rejected to
/// catch typos early.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub site_name: String,
    pub site_description: String,
    /// Social preview image used when a page declares none. Site-relative
    /// or absolute.
    pub default_image: String,
    pub twitter_handle: String,
    pub organization_name: String,
    pub organization_logo: String,
    pub favicon: String,
    pub enable_json_ld: bool,
    pub enable_og: bool,
    pub enable_twitter: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_name: "My Website".to_string(),
            site_description: String::new(),
            default_image: String::new(),
            twitter_handle: String::new(),
            organization_name: String::new(),
            organization_logo: String::new(),
            favicon: "/favicon.ico".to_string(),
            enable_json_ld: true,
            enable_og: true,
            enable_twitter: true,
        }
    }
}

impl Settings {
    /// Load from a TOML file; `None` yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(p) => Ok(toml::from_str(&fs::read_to_string(p)?)?),
            None => Ok(Self::default()),
        }
    }

    /// Build from the editor's flat string map. Recognized keys override the
    /// defaults; boolean-like keys are `"1"`/`"0"` encoded (anything other
    /// than `"0"` counts as on, matching the storage convention).
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let mut s = Self::default();
        let get = |key: &str| map.get(key).cloned();
        let flag = |key: &str, current: bool| match map.get(key) {
            Some(v) => v != "0",
            None => current,
        };

        if let Some(v) = get("site_name") {
            s.site_name = v;
        }
        if let Some(v) = get("site_description") {
            s.site_description = v;
        }
        if let Some(v) = get("default_image") {
            s.default_image = v;
        }
        if let Some(v) = get("twitter_handle") {
            s.twitter_handle = v;
        }
        if let Some(v) = get("organization_name") {
            s.organization_name = v;
        }
        if let Some(v) = get("organization_logo") {
            s.organization_logo = v;
        }
        if let Some(v) = get("favicon") {
            s.favicon = v;
        }
        s.enable_json_ld = flag("enable_json_ld", s.enable_json_ld);
        s.enable_og = flag("enable_og", s.enable_og);
        s.enable_twitter = flag("enable_twitter", s.enable_twitter);
        s
    }
}
