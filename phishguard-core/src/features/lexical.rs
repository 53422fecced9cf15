//! Lexical Features - derived from the URL string alone
//!
//! No network access happens here. Covers host shape (IP literal,
//! sub-domain depth), scheme, and the domain comparison used by the
//! page features.

use reqwest::Url;

use super::layout::Indicator;
use super::ExtractionError;

fn is_ip_literal(host: &str) -> bool {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<std::net::IpAddr>()
        .is_ok()
}

/// Parse user input into an absolute http(s) URL.
///
/// Input without a scheme is treated as `http://`.
pub fn normalize_url(raw: &str) -> Result<Url, ExtractionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::EmptyUrl);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| ExtractionError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ExtractionError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ExtractionError::MissingHost(trimmed.to_string()));
    }

    Ok(url)
}

/// Host of an already normalized URL, lowercased, without brackets or trailing dot
pub fn host_of(url: &Url) -> String {
    url.host_str()
        .unwrap_or_default()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

pub fn is_ip_host(url: &Url) -> bool {
    url.host_str().is_some_and(is_ip_literal)
}

/// having_IP_Address
///
/// The URL parser already canonicalizes dotted hex/octal IPv4 hosts, so
/// only labels that still look like `0x..` need a second look.
pub fn ip_address_feature(url: &Url) -> Indicator {
    if is_ip_host(url) {
        return Indicator::Suspicious;
    }

    let host = host_of(url);
    let hex_label = host.split('.').any(|label| {
        label.len() > 2
            && label.starts_with("0x")
            && label[2..].chars().all(|c| c.is_ascii_hexdigit())
    });

    if hex_label {
        Indicator::Suspicious
    } else {
        Indicator::Legitimate
    }
}

/// having_Sub_Domain
pub fn sub_domain_feature(url: &Url) -> Indicator {
    let host = host_of(url);
    let host = host.strip_prefix("www.").unwrap_or(&host);
    match host.matches('.').count() {
        0 | 1 => Indicator::Legitimate,
        2 => Indicator::Neutral,
        _ => Indicator::Suspicious,
    }
}

/// SSLfinal_State
///
/// `fetched` reports whether the page came back over a validated
/// connection; it is only consulted for https.
pub fn ssl_state_feature(url: &Url, fetched: bool) -> Indicator {
    match (url.scheme(), fetched) {
        ("https", true) => Indicator::Legitimate,
        ("https", false) => Indicator::Neutral,
        _ => Indicator::Suspicious,
    }
}

/// Registrable domain approximated by the last two host labels.
///
/// IP hosts are returned unchanged.
pub fn registered_domain(host: &str) -> String {
    let host = host
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_ascii_lowercase();
    if is_ip_literal(&host) {
        return host;
    }

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() <= 2 {
        labels.join(".")
    } else {
        labels[labels.len() - 2..].join(".")
    }
}

/// Whether `target` lives on a different registrable domain than `page`
pub fn is_external(page: &Url, target: &Url) -> bool {
    match target.host_str() {
        Some(host) => registered_domain(host) != registered_domain(&host_of(page)),
        None => false,
    }
}

// ============================================================================
// TESTS
// ============================================================================
