//! # Sitepack
//!
//! Post-processor for statically exported, multi-language HTML sites.
//! An export produced for "some domain, later" becomes deployable under a
//! concrete origin: per-page SEO metadata is rewritten in place, crawler
//! artifacts and web-server redirect configs are generated next to the
//! pages, and the whole tree is packed into one zip.
//!
//! # Architecture: Staged Pipeline
//!
//! Stages run in strict sequence, each fully materializing its output before
//! the next starts:
//!
//! ```text
//! 1. Resolve    flags        →  RunConfig          (validated, immutable)
//! 2. Scan       export/      →  page map + langs   (filename convention)
//! 3. Inject     page map     →  rewritten heads    (canonical/hreflang/OG)
//! 4. Generate   page map     →  sitemap.xml, robots.txt, .htaccess,
//!                               nginx.conf, diagnostics.txt
//! 5. Pack       export/      →  <temp>/<name>.zip
//! ```
//!
//! The page map and `RunConfig` are built once and shared read-only; no
//! stage mutates another stage's output. Ordering is a correctness
//! requirement — the archiver walks the tree, so it must run last.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`options`] | Flag validation, domain/IDN normalization, www-mode, placeholder mode |
//! | [`scan`] | Walks the export, classifies files into the `(slug, language)` page map |
//! | [`urls`] | Path/URL construction; inverse of the scanner's filename convention |
//! | [`head`] | Idempotent strip-and-rewrite of each page's SEO head block |
//! | [`tweaks`] | Supplemental polish: image lazy-loading, external-link hardening |
//! | [`sitemap`] | Multilingual sitemap with `xhtml:link` alternates |
//! | [`robots`] | Crawl policy plus absolute sitemap reference |
//! | [`redirects`] | Apache/nginx redirect + HSTS configs from one truth table |
//! | [`diagnostics`] | Plain-text run report |
//! | [`archive`] | Zip packaging and delivery |
//! | [`settings`] | Shared SEO settings (flat key/value store contract) |
//! | [`pipeline`] | Stage orchestration and the aggregate error type |
//!
//! # Design Decisions
//!
//! ## Unknown Domain Is a Mode, Not an Error
//!
//! An export can be finalized before its domain exists. Every absolute URL
//! then starts with the literal `{{BASE_URL}}` token, and a deploy-time
//! find-and-replace finishes the job. The token must survive into every
//! artifact — head tags, sitemap, robots — which is why URL construction is
//! centralized in [`urls::UrlBuilder`].
//!
//! ## Regex Surgery, Not HTML Parsing
//!
//! Injected pages are arbitrary third-party HTML. The rewrite is a
//! best-effort textual transform with precisely documented supported tag
//! shapes, kept behind a narrow interface ([`head::strip_generated`] and
//! friends) so a real parser could replace it without touching pipeline
//! logic. Generated tags are built as data ([`head::HeadTag`]) and rendered
//! by one maud-backed renderer, which keeps the strip patterns and the
//! generator trivially in sync — the basis of the byte-level idempotence
//! guarantee.
//!
//! ## One Alternates Function
//!
//! Head tags and sitemap entries must advertise identical hreflang sets.
//! Both render the output of [`urls::language_alternates`]; there is no
//! second implementation to drift.
//!
//! ## Parallel Page Rewriting
//!
//! Each page's rewrite is self-contained (strips then regenerates its own
//! tags), so the injector fans the batch out over a rayon pool without
//! changing any observable output.

pub mod archive;
pub mod diagnostics;
pub mod head;
pub mod options;
pub mod pipeline;
pub mod redirects;
pub mod robots;
pub mod scan;
pub mod settings;
pub mod sitemap;
pub mod tweaks;
pub mod urls;

#[cfg(test)]
pub(crate) mod test_helpers;
