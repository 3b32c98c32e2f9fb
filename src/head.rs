//! Per-page head rewriting.
//!
//! Stage 4 of the finalization pipeline. For every scanned page variant the
//! injector strips previously generated SEO tags, recomputes the
//! canonical/alternate/OG/Twitter set from the page map, and splices the new
//! block in just before `</head>` (appending at the end of the document when
//! no closing tag exists). Running it twice produces byte-identical output.
//!
//! ## Best-effort textual transform
//!
//! This is regex surgery on third-party HTML, not a parse. Supported tag
//! shapes are the ones this tool and the export editor emit: double-quoted
//! attributes with `property=`/`name=` preceding `content=` for meta tags.
//! Exotic attribute orders or quoting survive untouched (strips are
//! attribute-order tolerant, image rewriting is not). The transform is
//! confined to [`strip_generated`] and [`absolutize_social_images`] so a
//! real parser could replace it without touching pipeline logic.
//!
//! A page that vanished or became unreadable between scanning and injection
//! is skipped; the run carries on with the rest of the batch.

use crate::options::{BASE_URL_TOKEN, RunConfig};
use crate::scan::{Manifest, PageVariant};
use crate::settings::Settings;
use crate::tweaks;
use crate::urls::{self, UrlBuilder};
use maud::html;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::{Captures, Regex};
use std::fs;

const BLOCK_OPEN: &str = "<!-- SEO (export-generated) -->";
const BLOCK_CLOSE: &str = "<!-- /SEO -->";

/// One generated head tag. Constructed as data, rendered by [`HeadTag::render`];
/// keeping generation structured is what makes strip-then-rewrite easy to
/// hold idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadTag {
    Canonical { href: String },
    Alternate { hreflang: String, href: String },
    OgUrl { content: String },
    TwitterUrl { content: String },
    OgImage { content: String },
    TwitterImage { content: String },
}

impl HeadTag {
    pub fn render(&self) -> String {
        match self {
            HeadTag::Canonical { href } => html! { link rel="canonical" href=(href); },
            HeadTag::Alternate { hreflang, href } => {
                html! { link rel="alternate" hreflang=(hreflang) href=(href); }
            }
            HeadTag::OgUrl { content } => html! { meta property="og:url" content=(content); },
            HeadTag::TwitterUrl { content } => html! { meta name="twitter:url" content=(content); },
            HeadTag::OgImage { content } => html! { meta property="og:image" content=(content); },
            HeadTag::TwitterImage { content } => {
                html! { meta name="twitter:image" content=(content); }
            }
        }
        .into_string()
    }
}

static SEO_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\n?<!-- SEO \(export-generated\) -->.*?<!-- /SEO -->\n?").unwrap()
});
static CANONICAL_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<link[^>]+rel=["']canonical["'][^>]*>\s*"#).unwrap());
static ALTERNATE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<link[^>]+rel=["']alternate["'][^>]*hreflang=.+?>\s*"#).unwrap());
static OG_URL_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<meta[^>]+property=["']og:url["'][^>]*>\s*"#).unwrap());
static TWITTER_URL_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<meta[^>]+name=["']twitter:url["'][^>]*>\s*"#).unwrap());
static OG_IMAGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<meta\s+property="og:image"\s+content="([^"]+)""#).unwrap());
static TWITTER_IMAGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<meta\s+name="twitter:image"\s+content="([^"]+)""#).unwrap());
static HEAD_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</head>").unwrap());

/// Remove every previously generated SEO tag: the whole marker block from an
/// earlier run, plus any stray canonical/alternate/`og:url`/`twitter:url`
/// tags from other generators.
pub fn strip_generated(html: &str) -> String {
    let html = SEO_BLOCK.replace_all(html, "");
    let html = CANONICAL_TAG.replace_all(&html, "");
    let html = ALTERNATE_TAG.replace_all(&html, "");
    let html = OG_URL_TAG.replace_all(&html, "");
    TWITTER_URL_TAG.replace_all(&html, "").into_owned()
}

pub struct HeadInjector<'a> {
    cfg: &'a RunConfig,
    urls: &'a UrlBuilder<'a>,
    manifest: &'a Manifest,
    settings: &'a Settings,
}

impl<'a> HeadInjector<'a> {
    pub fn new(
        cfg: &'a RunConfig,
        urls: &'a UrlBuilder<'a>,
        manifest: &'a Manifest,
        settings: &'a Settings,
    ) -> Self {
        Self { cfg, urls, manifest, settings }
    }

    /// Rewrite every page variant. Each file's rewrite is self-contained, so
    /// the batch fans out over the worker pool. Returns the number of files
    /// actually rewritten (unreadable ones are skipped).
    pub fn process_all(&self) -> usize {
        let jobs: Vec<(&String, &String, &PageVariant)> = self
            .manifest
            .pages
            .iter()
            .flat_map(|(slug, by_lang)| {
                by_lang.iter().map(move |(lang, v)| (slug, lang, v))
            })
            .collect();

        jobs.par_iter()
            .filter(|&&(slug, lang, v)| self.process_file(slug, lang, v))
            .count()
    }

    fn process_file(&self, slug: &str, lang: &str, variant: &PageVariant) -> bool {
        let abs = self
            .cfg
            .export_dir
            .join(variant.path.trim_start_matches('/'));
        let Ok(html) = fs::read_to_string(&abs) else {
            return false;
        };

        let rewritten = self.rewrite(slug, lang, variant, &html);
        fs::write(&abs, rewritten).is_ok()
    }

    /// The pure text transform for one page, separated from IO for tests.
    pub fn rewrite(&self, slug: &str, lang: &str, variant: &PageVariant, html: &str) -> String {
        let stripped = strip_generated(html);
        let block = self.seo_block(slug, lang, variant, &stripped);

        let injected = match HEAD_CLOSE.find(&stripped) {
            Some(m) => format!("{}{}{}", &stripped[..m.start()], block, &stripped[m.start()..]),
            None => format!("{stripped}{block}"),
        };

        let absolutized = self.absolutize_social_images(&injected);
        let optimized = tweaks::optimize_images(&absolutized, &self.settings.site_name);
        tweaks::secure_links(&optimized)
    }

    fn seo_block(&self, slug: &str, lang: &str, variant: &PageVariant, stripped: &str) -> String {
        let canonical = self
            .urls
            .absolute(&self.urls.path_for(slug, lang, variant.is_home));

        let mut tags = vec![HeadTag::Canonical { href: canonical.clone() }];

        // Empty map only for a synthetic variant outside the page map; the
        // self-link guarantee in language_alternates covers that case too.
        static EMPTY: Lazy<std::collections::BTreeMap<String, PageVariant>> =
            Lazy::new(std::collections::BTreeMap::new);
        let variants = self.manifest.pages.get(slug).unwrap_or(&EMPTY);
        for (hreflang, href) in
            urls::language_alternates(self.urls, slug, variants, lang, variant.is_home)
        {
            tags.push(HeadTag::Alternate { hreflang, href });
        }

        tags.push(HeadTag::OgUrl { content: canonical.clone() });
        tags.push(HeadTag::TwitterUrl { content: canonical });

        self.push_default_social_image(&mut tags, stripped);

        let body = tags.iter().map(HeadTag::render).collect::<Vec<_>>().join("\n");
        format!("\n{BLOCK_OPEN}\n{body}\n{BLOCK_CLOSE}\n")
    }

    /// Pages that declare no social preview image get the site-wide default,
    /// when one is configured and the corresponding card type is enabled.
    fn push_default_social_image(&self, tags: &mut Vec<HeadTag>, stripped: &str) {
        if self.settings.default_image.is_empty() {
            return;
        }
        let content = if is_absolute_ref(&self.settings.default_image) {
            self.settings.default_image.clone()
        } else {
            self.urls.absolute(&format!(
                "/{}",
                self.settings.default_image.trim_start_matches('/')
            ))
        };
        if self.settings.enable_og && !OG_IMAGE_TAG.is_match(stripped) {
            tags.push(HeadTag::OgImage { content: content.clone() });
        }
        if self.settings.enable_twitter && !TWITTER_IMAGE_TAG.is_match(stripped) {
            tags.push(HeadTag::TwitterImage { content });
        }
    }

    /// Rewrite relative `og:image`/`twitter:image` references to absolute
    /// URLs under the resolved domain. A no-op while the domain is still the
    /// placeholder: there is no real origin to resolve against yet.
    fn absolutize_social_images(&self, html: &str) -> String {
        if self.cfg.placeholder_domain() {
            return html.to_string();
        }
        let base = self.urls.base().to_string();

        let pass = |re: &Regex, attr: &'static str, input: &str| -> String {
            re.replace_all(input, |caps: &Captures| {
                let src = &caps[1];
                if is_absolute_ref(src) {
                    caps[0].to_string()
                } else {
                    format!(
                        r#"<meta {attr} content="{}/{}""#,
                        base,
                        src.trim_start_matches('/')
                    )
                }
            })
            .into_owned()
        };

        let html = pass(&OG_IMAGE_TAG, r#"property="og:image""#, html);
        pass(&TWITTER_IMAGE_TAG, r#"name="twitter:image""#, &html)
    }
}

fn is_absolute_ref(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || src.starts_with(BASE_URL_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan;
    use crate::test_helpers::{config_with_domain, export_with, placeholder_config};

    const PAGE: &str = "<html><head><title>About</title></head><body><p>hi</p></body></html>";

    fn run_injector(tmp: &std::path::Path, cfg: &RunConfig, settings: &Settings) {
        let manifest = scan::scan(tmp, &cfg.primary_lang).unwrap();
        let urls = UrlBuilder::new(cfg);
        let injector = HeadInjector::new(cfg, &urls, &manifest, settings);
        injector.process_all();
    }

    #[test]
    fn injects_canonical_alternates_and_social_urls() {
        let tmp = export_with(&[("about.html", PAGE), ("about-en.html", PAGE)]);
        let cfg = config_with_domain(tmp.path(), "example.com");
        let settings = Settings::default();
        run_injector(tmp.path(), &cfg, &settings);

        let out = std::fs::read_to_string(tmp.path().join("about-en.html")).unwrap();
        assert!(out.contains(r#"<link rel="canonical" href="https://example.com/about-en.html">"#));
        assert!(out.contains(r#"<link rel="alternate" hreflang="ru" href="https://example.com/about.html">"#));
        assert!(out.contains(r#"<link rel="alternate" hreflang="en" href="https://example.com/about-en.html">"#));
        assert!(out.contains(r#"<link rel="alternate" hreflang="x-default" href="https://example.com/about.html">"#));
        assert!(out.contains(r#"<meta property="og:url" content="https://example.com/about-en.html">"#));
        assert!(out.contains(r#"<meta name="twitter:url" content="https://example.com/about-en.html">"#));
        // Block sits inside the head.
        let head_end = out.find("</head>").unwrap();
        assert!(out.find(BLOCK_OPEN).unwrap() < head_end);
    }

    #[test]
    fn second_run_is_byte_identical() {
        let tmp = export_with(&[
            ("index.html", PAGE),
            ("index-en.html", PAGE),
            ("about.html", PAGE),
        ]);
        let cfg = config_with_domain(tmp.path(), "example.com");
        let settings = Settings::default();

        run_injector(tmp.path(), &cfg, &settings);
        let first: Vec<String> = ["index.html", "index-en.html", "about.html"]
            .iter()
            .map(|n| std::fs::read_to_string(tmp.path().join(n)).unwrap())
            .collect();

        run_injector(tmp.path(), &cfg, &settings);
        let second: Vec<String> = ["index.html", "index-en.html", "about.html"]
            .iter()
            .map(|n| std::fs::read_to_string(tmp.path().join(n)).unwrap())
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn strips_foreign_seo_tags_before_injecting() {
        let page = concat!(
            "<html><head>",
            r#"<link rel="canonical" href="https://old.example/about">"#,
            r#"<link rel="alternate" hreflang="fr" href="https://old.example/fr">"#,
            r#"<meta property="og:url" content="https://old.example/about">"#,
            r#"<meta name="twitter:url" content="https://old.example/about">"#,
            "</head><body></body></html>",
        );
        let tmp = export_with(&[("about.html", page)]);
        let cfg = config_with_domain(tmp.path(), "example.com");
        run_injector(tmp.path(), &cfg, &Settings::default());

        let out = std::fs::read_to_string(tmp.path().join("about.html")).unwrap();
        assert!(!out.contains("old.example"));
        assert_eq!(out.matches("rel=\"canonical\"").count(), 1);
    }

    #[test]
    fn document_without_head_gets_block_appended() {
        let tmp = export_with(&[("about.html", "<p>bare fragment</p>")]);
        let cfg = config_with_domain(tmp.path(), "example.com");
        run_injector(tmp.path(), &cfg, &Settings::default());

        let out = std::fs::read_to_string(tmp.path().join("about.html")).unwrap();
        assert!(out.starts_with("<p>bare fragment</p>"));
        assert!(out.contains(BLOCK_OPEN));
        assert!(out.trim_end().ends_with(BLOCK_CLOSE));
    }

    #[test]
    fn relative_social_images_become_absolute() {
        let page = concat!(
            "<html><head>",
            r#"<meta property="og:image" content="/img/cover.png">"#,
            r#"<meta name="twitter:image" content="img/card.png">"#,
            r#"<meta property="og:image" content="https://cdn.example/x.png">"#,
            "</head><body></body></html>",
        );
        let tmp = export_with(&[("about.html", page)]);
        let cfg = config_with_domain(tmp.path(), "example.com");
        run_injector(tmp.path(), &cfg, &Settings::default());

        let out = std::fs::read_to_string(tmp.path().join("about.html")).unwrap();
        assert!(out.contains(r#"<meta property="og:image" content="https://example.com/img/cover.png">"#));
        assert!(out.contains(r#"<meta name="twitter:image" content="https://example.com/img/card.png">"#));
        assert!(out.contains(r#"<meta property="og:image" content="https://cdn.example/x.png">"#));
    }

    #[test]
    fn image_rewriting_skipped_in_placeholder_mode() {
        let page = concat!(
            "<html><head>",
            r#"<meta property="og:image" content="/img/cover.png">"#,
            "</head><body></body></html>",
        );
        let tmp = export_with(&[("about.html", page)]);
        let cfg = placeholder_config(tmp.path());
        run_injector(tmp.path(), &cfg, &Settings::default());

        let out = std::fs::read_to_string(tmp.path().join("about.html")).unwrap();
        assert!(out.contains(r#"<meta property="og:image" content="/img/cover.png">"#));
        assert!(out.contains(r#"<link rel="canonical" href="{{BASE_URL}}/about.html">"#));
    }

    #[test]
    fn default_social_image_injected_when_page_has_none() {
        let tmp = export_with(&[("about.html", PAGE)]);
        let cfg = config_with_domain(tmp.path(), "example.com");
        let settings = Settings {
            default_image: "/img/site.png".to_string(),
            ..Settings::default()
        };
        run_injector(tmp.path(), &cfg, &settings);

        let out = std::fs::read_to_string(tmp.path().join("about.html")).unwrap();
        assert!(out.contains(r#"<meta property="og:image" content="https://example.com/img/site.png">"#));
        assert!(out.contains(r#"<meta name="twitter:image" content="https://example.com/img/site.png">"#));
    }

    #[test]
    fn default_social_image_respects_enable_flags_and_presence() {
        let with_image = concat!(
            "<html><head>",
            r#"<meta property="og:image" content="https://cdn.example/own.png">"#,
            "</head><body></body></html>",
        );
        let tmp = export_with(&[("a.html", with_image), ("b.html", PAGE)]);
        let cfg = config_with_domain(tmp.path(), "example.com");
        let settings = Settings {
            default_image: "/img/site.png".to_string(),
            enable_twitter: false,
            ..Settings::default()
        };
        run_injector(tmp.path(), &cfg, &settings);

        let a = std::fs::read_to_string(tmp.path().join("a.html")).unwrap();
        // Page already declares og:image: no default injected.
        assert!(!a.contains("img/site.png"));

        let b = std::fs::read_to_string(tmp.path().join("b.html")).unwrap();
        assert!(b.contains(r#"<meta property="og:image" content="https://example.com/img/site.png">"#));
        assert!(!b.contains("twitter:image"));
    }

    #[test]
    fn vanished_file_is_skipped_without_aborting() {
        let tmp = export_with(&[("index.html", PAGE), ("ghost.html", PAGE)]);
        let cfg = config_with_domain(tmp.path(), "example.com");
        let manifest = scan::scan(tmp.path(), "ru").unwrap();
        std::fs::remove_file(tmp.path().join("ghost.html")).unwrap();

        let settings = Settings::default();
        let urls = UrlBuilder::new(&cfg);
        let injector = HeadInjector::new(&cfg, &urls, &manifest, &settings);
        assert_eq!(injector.process_all(), 1);
    }

    #[test]
    fn escapes_ampersands_in_generated_urls() {
        let tmp = export_with(&[("a&b.html", PAGE)]);
        let cfg = config_with_domain(tmp.path(), "example.com");
        run_injector(tmp.path(), &cfg, &Settings::default());

        let out = std::fs::read_to_string(tmp.path().join("a&b.html")).unwrap();
        assert!(out.contains("a&amp;b"));
    }
}
