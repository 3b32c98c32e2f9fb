//! Export directory scanning and page-map construction.
//!
//! Stage 2 of the finalization pipeline. Walks the export tree, classifies
//! every HTML file by `(slug, language)` using the filename convention, and
//! produces the page map plus the set of observed languages.
//!
//! ## Filename convention
//!
//! Classification works on the file's base name (extension stripped):
//!
//! | Base name | slug | language | home |
//! |---|---|---|---|
//! | `index` | `index` | primary | yes |
//! | `index-<lang>` | `index` | `<lang>` | yes |
//! | `<slug>-<lang>` | `<slug>` | `<lang>` | no |
//! | anything else | base name | primary | no |
//!
//! `<lang>` is whatever `[A-Za-z-]+` matches after the *last* hyphen, so a
//! page literally named `my-page` classifies as slug `my`, language `page`.
//! That ambiguity is inherent to the convention and preserved as-is. The
//! home-with-language pattern is checked before the generic one.
//!
//! Only files with an `html` extension (case-insensitive) participate;
//! everything else is ignored here and picked up later by the archiver.
//!
//! The page map is an ordered map keyed by slug, then language, so two scans
//! of the same tree produce identical output regardless of directory
//! traversal order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot walk export dir: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("no HTML pages were found in export dir: {0}")]
    NoPages(PathBuf),
}

/// One concrete file: a page in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageVariant {
    /// Site-relative path with a leading slash, `/`-separated on every OS.
    pub path: String,
    /// Whether this variant belongs to the designated home page.
    pub is_home: bool,
}

/// `slug → language → variant`. Built once, read-only afterwards.
pub type PageMap = BTreeMap<String, BTreeMap<String, PageVariant>>;

/// Scan output: the page map plus the sorted observed-language list.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub pages: PageMap,
    pub languages: Vec<String>,
}

impl Manifest {
    /// Total number of HTML files (page variants) discovered.
    pub fn variant_count(&self) -> usize {
        self.pages.values().map(|by_lang| by_lang.len()).sum()
    }
}

/// Result of classifying one base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub slug: String,
    pub lang: String,
    pub is_home: bool,
}

static INDEX_LANG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^index-([A-Za-z-]+)$").unwrap());
static SLUG_LANG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+)-([A-Za-z-]+)$").unwrap());

/// Classify a base name per the filename convention table above.
pub fn classify(base: &str, primary_lang: &str) -> Classified {
    if base == "index" {
        return Classified {
            slug: "index".to_string(),
            lang: primary_lang.to_string(),
            is_home: true,
        };
    }
    if let Some(caps) = INDEX_LANG.captures(base) {
        return Classified {
            slug: "index".to_string(),
            lang: caps[1].to_string(),
            is_home: true,
        };
    }
    if let Some(caps) = SLUG_LANG.captures(base) {
        return Classified {
            slug: caps[1].to_string(),
            lang: caps[2].to_string(),
            is_home: false,
        };
    }
    Classified {
        slug: base.to_string(),
        lang: primary_lang.to_string(),
        is_home: false,
    }
}

pub fn scan(export_dir: &Path, primary_lang: &str) -> Result<Manifest, ScanError> {
    let mut pages: PageMap = BTreeMap::new();
    let mut langs: BTreeSet<String> = BTreeSet::new();
    langs.insert(primary_lang.to_string());

    for entry in WalkDir::new(export_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_html = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("html"))
            .unwrap_or(false);
        if !is_html {
            continue;
        }

        let rel = site_relative(export_dir, path);
        let base = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let c = classify(&base, primary_lang);
        langs.insert(c.lang.clone());
        pages.entry(c.slug).or_default().insert(
            c.lang,
            PageVariant {
                path: rel,
                is_home: c.is_home,
            },
        );
    }

    if pages.is_empty() {
        return Err(ScanError::NoPages(export_dir.to_path_buf()));
    }

    Ok(Manifest {
        pages,
        languages: langs.into_iter().collect(),
    })
}

/// Path relative to the export root, leading slash, forward slashes only.
fn site_relative(root: &Path, abs: &Path) -> String {
    let rel = abs.strip_prefix(root).unwrap_or(abs);
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}
