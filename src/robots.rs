//! robots.txt generation.
//!
//! Fixed crawl policy — allow everything except the editor and data paths —
//! plus the absolute sitemap reference. No per-page logic.

use crate::urls::UrlBuilder;
use std::fs;
use std::io;
use std::path::Path;

pub fn build(urls: &UrlBuilder<'_>) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nDisallow: /editor/\nDisallow: /data/\n\nSitemap: {}\n",
        urls.absolute("/sitemap.xml")
    )
}

pub fn write(export_dir: &Path, urls: &UrlBuilder<'_>) -> io::Result<()> {
    fs::write(export_dir.join("robots.txt"), build(urls))
}
