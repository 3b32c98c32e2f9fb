//! URL construction.
//!
//! Pure functions over the run configuration: mapping `(slug, language,
//! home)` back to the site-relative path the export convention implies, and
//! prefixing paths with the resolved origin (or the placeholder token when
//! the domain is deferred to deploy time).
//!
//! [`path_for`](UrlBuilder::path_for) is the exact inverse of the scanner's
//! classification table; round-tripping a scanned variant through it
//! reproduces the relative path it was read from.

use crate::options::{BASE_URL_TOKEN, RunConfig};
use crate::scan::PageVariant;
use std::collections::BTreeMap;

pub struct UrlBuilder<'a> {
    cfg: &'a RunConfig,
}

impl<'a> UrlBuilder<'a> {
    pub fn new(cfg: &'a RunConfig) -> Self {
        Self { cfg }
    }

    /// `scheme://host` without a trailing slash, or the placeholder token.
    pub fn base(&self) -> &str {
        self.cfg.domain.trim_end_matches('/')
    }

    /// Site-relative path for a page variant.
    pub fn path_for(&self, slug: &str, lang: &str, is_home: bool) -> String {
        let primary = &self.cfg.primary_lang;
        if is_home {
            return if lang == primary {
                "/".to_string()
            } else {
                format!("/index-{lang}.html")
            };
        }
        if lang == primary {
            format!("/{slug}.html")
        } else {
            format!("/{slug}-{lang}.html")
        }
    }

    /// Absolute URL for a site-relative path.
    pub fn absolute(&self, path: &str) -> String {
        if self.cfg.placeholder_domain() {
            format!("{BASE_URL_TOKEN}{path}")
        } else {
            format!("{}{path}", self.base())
        }
    }
}

/// The alternate-link set for one rendered variant of a page: one entry per
/// language the page actually exists in, a guaranteed self-reference for the
/// current language, and a trailing `x-default` pointing at the primary
/// language variant when present (the current variant otherwise).
///
/// Both the head injector and the sitemap builder go through this function,
/// which is what keeps their alternate sets identical.
pub fn language_alternates(
    urls: &UrlBuilder<'_>,
    slug: &str,
    variants: &BTreeMap<String, PageVariant>,
    current_lang: &str,
    current_is_home: bool,
) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(variants.len() + 2);

    for (lang, v) in variants {
        out.push((lang.clone(), urls.absolute(&urls.path_for(slug, lang, v.is_home))));
    }

    // Self-reference even if the current language is somehow absent from the
    // variant map (cannot happen for scanner-produced maps).
    if !variants.contains_key(current_lang) {
        out.push((
            current_lang.to_string(),
            urls.absolute(&urls.path_for(slug, current_lang, current_is_home)),
        ));
    }

    let primary = &urls.cfg.primary_lang;
    let x_default = match variants.get(primary.as_str()) {
        Some(v) => urls.absolute(&urls.path_for(slug, primary, v.is_home)),
        None => urls.absolute(&urls.path_for(slug, current_lang, current_is_home)),
    };
    out.push(("x-default".to_string(), x_default));

    out
}
