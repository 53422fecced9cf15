//! Page Features - derived from the fetched HTML
//!
//! Tags are scanned with regexes rather than a full DOM; only tag names
//! and attribute values matter for these ratios.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

use super::layout::Indicator;
use super::lexical::is_external;
use crate::constants::{ANCHOR_BANDS, LINKS_IN_TAGS_BANDS, REQUEST_URL_BANDS};

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<([a-z][a-z0-9]*)\b([^>]*)>").expect("tag regex")
});

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)([a-z_:][a-z0-9_:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute regex")
});

static META_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)url\s*=\s*['\x22]?([^'\x22\s;]+)").expect("meta url regex")
});

const RESOURCE_TAGS: &[&str] = &["img", "script", "audio", "video", "embed", "iframe", "source"];

// ============================================================================
// TAG SCANNING
// ============================================================================

#[derive(Debug, Clone)]
struct Tag {
    name: String,
    attrs: Vec<(String, String)>,
}

impl Tag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn scan_tags(html: &str) -> Vec<Tag> {
    TAG_RE
        .captures_iter(html)
        .map(|cap| {
            let name = cap[1].to_ascii_lowercase();
            let attrs = ATTR_RE
                .captures_iter(&cap[2])
                .map(|a| {
                    let value = a
                        .get(2)
                        .or_else(|| a.get(3))
                        .or_else(|| a.get(4))
                        .map(|m| m.as_str().trim().to_string())
                        .unwrap_or_default();
                    (a[1].to_ascii_lowercase(), value)
                })
                .collect();
            Tag { name, attrs }
        })
        .collect()
}

// ============================================================================
// PAGE FEATURES
// ============================================================================

/// Features computed from one HTML document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFeatures {
    pub request_url: Indicator,
    pub url_of_anchor: Indicator,
    pub links_in_tags: Indicator,
    pub sfh: Indicator,
}

impl PageFeatures {
    /// Used when the page could not be fetched
    pub fn unknown() -> Self {
        Self {
            request_url: Indicator::Neutral,
            url_of_anchor: Indicator::Neutral,
            links_in_tags: Indicator::Neutral,
            sfh: Indicator::Neutral,
        }
    }

    pub fn analyze(page: &Url, html: &str) -> Self {
        let tags = scan_tags(html);

        let mut resources = Ratio::default();
        let mut anchors = Ratio::default();
        let mut links = Ratio::default();
        let mut sfh = Indicator::Legitimate;

        for tag in &tags {
            let name = tag.name.as_str();

            if RESOURCE_TAGS.contains(&name) {
                if let Some(src) = tag.attr("src") {
                    resources.push(points_elsewhere(page, src));
                }
            }

            match name {
                "a" => {
                    if let Some(href) = tag.attr("href") {
                        anchors.push(is_null_anchor(href) || points_elsewhere(page, href));
                    }
                }
                "link" => {
                    if let Some(href) = tag.attr("href") {
                        links.push(points_elsewhere(page, href));
                    }
                }
                "script" => {
                    if let Some(src) = tag.attr("src") {
                        links.push(points_elsewhere(page, src));
                    }
                }
                "meta" => {
                    if let Some(target) = tag.attr("content").and_then(meta_target) {
                        links.push(points_elsewhere(page, &target));
                    }
                }
                "form" => {
                    sfh = worse(sfh, form_handler(page, tag.attr("action")));
                }
                _ => {}
            }
        }

        Self {
            request_url: resources.band(REQUEST_URL_BANDS),
            url_of_anchor: anchors.band(ANCHOR_BANDS),
            links_in_tags: links.band(LINKS_IN_TAGS_BANDS),
            sfh,
        }
    }
}

#[derive(Debug, Default)]
struct Ratio {
    flagged: usize,
    total: usize,
}

impl Ratio {
    fn push(&mut self, flagged: bool) {
        self.total += 1;
        if flagged {
            self.flagged += 1;
        }
    }

    fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.flagged as f64 / self.total as f64 * 100.0
        }
    }

    fn band(&self, (low, high): (f64, f64)) -> Indicator {
        Indicator::banded(self.percent(), low, high)
    }
}

fn points_elsewhere(page: &Url, reference: &str) -> bool {
    match page.join(reference) {
        Ok(target) if matches!(target.scheme(), "http" | "https") => is_external(page, &target),
        _ => false,
    }
}

fn is_null_anchor(href: &str) -> bool {
    let href = href.trim();
    href.is_empty()
        || href.starts_with('#')
        || href.to_ascii_lowercase().starts_with("javascript:")
}

fn meta_target(content: &str) -> Option<String> {
    if let Some(cap) = META_URL_RE.captures(content) {
        return Some(cap[1].to_string());
    }
    let lower = content.trim().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(content.trim().to_string())
    } else {
        None
    }
}

fn form_handler(page: &Url, action: Option<&str>) -> Indicator {
    match action.map(str::trim) {
        // No action attribute submits back to the page itself
        None => Indicator::Legitimate,
        Some("") => Indicator::Suspicious,
        Some(a) if a.eq_ignore_ascii_case("about:blank") => Indicator::Suspicious,
        Some(a) if points_elsewhere(page, a) => Indicator::Neutral,
        Some(_) => Indicator::Legitimate,
    }
}

fn worse(a: Indicator, b: Indicator) -> Indicator {
    if a.value() >= b.value() {
        a
    } else {
        b
    }
}

// ============================================================================
// TESTS
// ============================================================================
