//! Supplemental HTML polish applied during the per-page rewrite.
//!
//! Same best-effort regex character as the head injector: these transforms
//! only add attributes that are missing, so re-running them never changes a
//! page twice.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static IMG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<img([^>]*)>").unwrap());
static BLANK_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<a([^>]*target=["']_blank["'][^>]*)>"#).unwrap());
static REL_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)rel=["']([^"']*)["']"#).unwrap());

/// Give every `<img>` lazy loading, async decoding, and an `alt` fallback.
/// Attributes already present are left alone.
pub fn optimize_images(html: &str, default_alt: &str) -> String {
    IMG_TAG
        .replace_all(html, |caps: &Captures| {
            let mut attrs = caps[1].to_string();
            let lower = attrs.to_ascii_lowercase();
            if !lower.contains("loading=") {
                attrs.push_str(r#" loading="lazy""#);
            }
            if !lower.contains("decoding=") {
                attrs.push_str(r#" decoding="async""#);
            }
            if !lower.contains("alt=") && !default_alt.is_empty() {
                attrs.push_str(&format!(r#" alt="{}""#, escape_attr(default_alt)));
            }
            format!("<img{attrs}>")
        })
        .into_owned()
}

/// Add `rel="noopener noreferrer"` to anchors that open a new tab. An
/// existing `rel` is extended unless it already carries `noopener`.
pub fn secure_links(html: &str) -> String {
    BLANK_ANCHOR
        .replace_all(html, |caps: &Captures| {
            let attrs = &caps[1];
            let lower = attrs.to_ascii_lowercase();
            let attrs = if !lower.contains("rel=") {
                format!(r#"{attrs} rel="noopener noreferrer""#)
            } else if lower.contains("noopener") {
                attrs.to_string()
            } else {
                REL_ATTR
                    .replace(attrs, |rel: &Captures| {
                        format!(r#"rel="{} noopener noreferrer""#, &rel[1])
                    })
                    .into_owned()
            };
            format!("<a{attrs}>")
        })
        .into_owned()
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn img_gains_loading_decoding_and_alt() {
        let out = optimize_images(r#"<img src="/a.png">"#, "My Site");
        assert_eq!(
            out,
            r#"<img src="/a.png" loading="lazy" decoding="async" alt="My Site">"#
        );
    }

    #[test]
    fn img_existing_attributes_are_kept() {
        let input = r#"<img src="/a.png" loading="eager" alt="dawn">"#;
        let out = optimize_images(input, "My Site");
        assert_eq!(out, r#"<img src="/a.png" loading="eager" alt="dawn" decoding="async">"#);
    }

    #[test]
    fn img_alt_skipped_without_default() {
        let out = optimize_images(r#"<img src="/a.png">"#, "");
        assert_eq!(out, r#"<img src="/a.png" loading="lazy" decoding="async">"#);
    }

    #[test]
    fn img_alt_value_is_escaped() {
        let out = optimize_images(r#"<img src="/a.png">"#, r#"Say "hi" & bye"#);
        assert!(out.contains(r#"alt="Say &quot;hi&quot; &amp; bye""#));
    }

    #[test]
    fn optimize_is_idempotent() {
        let once = optimize_images(r#"<img src="/a.png">"#, "My Site");
        let twice = optimize_images(&once, "My Site");
        assert_eq!(once, twice);
    }

    #[test]
    fn blank_anchor_gains_rel() {
        let out = secure_links(r#"<a href="https://x.example" target="_blank">x</a>"#);
        assert_eq!(
            out,
            r#"<a href="https://x.example" target="_blank" rel="noopener noreferrer">x</a>"#
        );
    }

    #[test]
    fn existing_rel_is_extended() {
        let out = secure_links(r#"<a href="/x" target="_blank" rel="external">x</a>"#);
        assert!(out.contains(r#"rel="external noopener noreferrer""#));
    }

    #[test]
    fn rel_with_noopener_is_left_alone() {
        let input = r#"<a href="/x" target="_blank" rel="noopener noreferrer">x</a>"#;
        assert_eq!(secure_links(input), input);
    }

    #[test]
    fn secure_links_is_idempotent() {
        let once = secure_links(r#"<a href="/x" target="_blank" rel="me">x</a>"#);
        let twice = secure_links(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn plain_anchors_are_untouched() {
        let input = r#"<a href="/about.html">about</a>"#;
        assert_eq!(secure_links(input), input);
    }
}
