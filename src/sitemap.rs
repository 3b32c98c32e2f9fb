//! Multilingual sitemap generation.
//!
//! One `<url>` entry per page variant, each carrying the same
//! alternate-language link set the head injector writes (both go through
//! [`urls::language_alternates`]). `lastmod` is a single UTC instant for the
//! whole document — the generation time, not per-file mtimes.

use crate::scan::Manifest;
use crate::urls::{self, UrlBuilder};
use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::path::Path;
use thiserror::Error;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Render the sitemap document.
pub fn build(
    urls: &UrlBuilder<'_>,
    manifest: &Manifest,
    generated_at: DateTime<Utc>,
) -> Result<String, SitemapError> {
    let lastmod = generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    urlset.push_attribute(("xmlns:xhtml", XHTML_NS));
    writer.write_event(Event::Start(urlset))?;

    for (slug, by_lang) in &manifest.pages {
        for (lang, variant) in by_lang {
            let loc = urls.absolute(&urls.path_for(slug, lang, variant.is_home));

            writer.write_event(Event::Start(BytesStart::new("url")))?;

            writer.write_event(Event::Start(BytesStart::new("loc")))?;
            writer.write_event(Event::Text(BytesText::new(&loc)))?;
            writer.write_event(Event::End(BytesEnd::new("loc")))?;

            writer.write_event(Event::Start(BytesStart::new("lastmod")))?;
            writer.write_event(Event::Text(BytesText::new(&lastmod)))?;
            writer.write_event(Event::End(BytesEnd::new("lastmod")))?;

            writer.write_event(Event::Start(BytesStart::new("priority")))?;
            writer.write_event(Event::Text(BytesText::new(if variant.is_home {
                "1.0"
            } else {
                "0.8"
            })))?;
            writer.write_event(Event::End(BytesEnd::new("priority")))?;

            for (hreflang, href) in
                urls::language_alternates(urls, slug, by_lang, lang, variant.is_home)
            {
                let mut link = BytesStart::new("xhtml:link");
                link.push_attribute(("rel", "alternate"));
                link.push_attribute(("hreflang", hreflang.as_str()));
                link.push_attribute(("href", href.as_str()));
                writer.write_event(Event::Empty(link))?;
            }

            writer.write_event(Event::End(BytesEnd::new("url")))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    let bytes = writer.into_inner();
    // The writer only ever receives UTF-8 input.
    Ok(String::from_utf8(bytes).expect("sitemap writer emitted valid UTF-8"))
}

/// Render and write `sitemap.xml` at the export root.
pub fn write(
    export_dir: &Path,
    urls: &UrlBuilder<'_>,
    manifest: &Manifest,
    generated_at: DateTime<Utc>,
) -> Result<(), SitemapError> {
    let xml = build(urls, manifest, generated_at)?;
    fs::write(export_dir.join("sitemap.xml"), xml)?;
    Ok(())
}
