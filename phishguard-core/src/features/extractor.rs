//! URL Feature Extractor
//!
//! Turns a URL into the default discriminative vector. Lexical features
//! come from the URL itself; page, RDAP and DNS lookups run concurrently
//! and each one degrades to `Neutral` (or, for DNS, to the signal itself)
//! when the network does not answer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use thiserror::Error;

use super::layout::{Indicator, DEFAULT_FEATURE_COUNT};
use super::lexical::{
    host_of, ip_address_feature, is_ip_host, normalize_url, registered_domain,
    ssl_state_feature, sub_domain_feature,
};
use super::page::PageFeatures;
use super::rdap::{self, Registration};
use crate::constants::{DEFAULT_EXTRACTOR_TIMEOUT, DEFAULT_RDAP_BASE, MAX_PAGE_BYTES, USER_AGENT};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("empty URL")]
    EmptyUrl,

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

// ============================================================================
// FEATURE EXTRACTOR TRAIT
// ============================================================================

/// Maps a URL to a numeric vector in the extractor's own fixed layout
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<Vec<f64>, ExtractionError>;
}

// ============================================================================
// EXTRACTED FEATURES
// ============================================================================

/// One value per default feature, named
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlFeatures {
    pub having_ip_address: Indicator,
    pub having_sub_domain: Indicator,
    pub ssl_final_state: Indicator,
    pub domain_registration_length: Indicator,
    pub request_url: Indicator,
    pub url_of_anchor: Indicator,
    pub links_in_tags: Indicator,
    pub sfh: Indicator,
    pub age_of_domain: Indicator,
    pub dns_record: Indicator,
}

impl UrlFeatures {
    /// Values in `DEFAULT_FEATURES` order
    pub fn to_vector(&self) -> Vec<f64> {
        let ordered: [Indicator; DEFAULT_FEATURE_COUNT] = [
            self.having_ip_address,
            self.having_sub_domain,
            self.ssl_final_state,
            self.domain_registration_length,
            self.request_url,
            self.url_of_anchor,
            self.links_in_tags,
            self.sfh,
            self.age_of_domain,
            self.dns_record,
        ];
        ordered.iter().map(|i| i.value()).collect()
    }

    /// Combine the lexical features with whatever the lookups returned
    pub fn assemble(
        url: &Url,
        page: Option<PageFeatures>,
        registration: Option<Registration>,
        resolves: bool,
    ) -> Self {
        let now = Utc::now();
        let fetched = page.is_some();
        let page = page.unwrap_or_else(PageFeatures::unknown);
        let registration = registration.unwrap_or_default();

        Self {
            having_ip_address: ip_address_feature(url),
            having_sub_domain: sub_domain_feature(url),
            ssl_final_state: ssl_state_feature(url, fetched),
            domain_registration_length: registration.length_feature(now),
            request_url: page.request_url,
            url_of_anchor: page.url_of_anchor,
            links_in_tags: page.links_in_tags,
            sfh: page.sfh,
            age_of_domain: registration.age_feature(now),
            dns_record: if resolves {
                Indicator::Legitimate
            } else {
                Indicator::Suspicious
            },
        }
    }
}

// ============================================================================
// NETWORK-BACKED EXTRACTOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Timeout for each page fetch / RDAP request
    pub timeout: Duration,
    /// RDAP endpoint prefix; the domain is appended
    pub rdap_base: String,
    /// Page bodies above this size are not analyzed
    pub max_page_bytes: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_EXTRACTOR_TIMEOUT,
            rdap_base: DEFAULT_RDAP_BASE.to_string(),
            max_page_bytes: MAX_PAGE_BYTES,
        }
    }
}

pub struct UrlFeatureExtractor {
    client: reqwest::Client,
    config: ExtractorConfig,
}

impl UrlFeatureExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ExtractionError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn fetch_page(&self, url: &Url) -> Option<PageFeatures> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(resp) => resp,
            Err(e) => {
                log::debug!("Page fetch for {} failed: {}", url, e);
                return None;
            }
        };

        // Redirects may land on another host; ratios are judged against the final page
        let final_url = response.url().clone();
        match read_limited(response, self.config.max_page_bytes).await {
            Ok(Some(body)) => {
                let html = String::from_utf8_lossy(&body);
                Some(PageFeatures::analyze(&final_url, &html))
            }
            Ok(None) => {
                log::debug!(
                    "Page body for {} exceeds {} bytes, skipping HTML features",
                    url,
                    self.config.max_page_bytes
                );
                None
            }
            Err(e) => {
                log::debug!("Page body for {} unreadable: {}", url, e);
                None
            }
        }
    }

    async fn fetch_registration(&self, url: &Url) -> Option<Registration> {
        if is_ip_host(url) {
            return None;
        }
        let domain = registered_domain(&host_of(url));
        rdap::lookup(&self.client, &self.config.rdap_base, &domain).await
    }

    async fn resolves(&self, url: &Url) -> bool {
        let host = host_of(url);
        let port = url.port_or_known_default().unwrap_or(80);
        let resolved = match tokio::time::timeout(self.config.timeout, tokio::net::lookup_host((host.as_str(), port))).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(e)) => {
                log::debug!("DNS lookup for {} failed: {}", host, e);
                false
            }
            Err(_) => {
                log::debug!("DNS lookup for {} timed out", host);
                false
            }
        };
        resolved
    }
}

/// Body bytes, or `None` once the body is known to exceed `limit`
async fn read_limited(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Option<Vec<u8>>, reqwest::Error> {
    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Ok(None);
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Ok(None);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(Some(body))
}

#[async_trait]
impl FeatureExtractor for UrlFeatureExtractor {
    async fn extract(&self, raw: &str) -> Result<Vec<f64>, ExtractionError> {
        let url = normalize_url(raw)?;

        let (page, registration, resolves) = tokio::join!(
            self.fetch_page(&url),
            self.fetch_registration(&url),
            self.resolves(&url),
        );

        let features = UrlFeatures::assemble(&url, page, registration, resolves);
        log::debug!("Extracted features for {}: {:?}", url, features);
        Ok(features.to_vector())
    }
}

// ============================================================================
// TESTS
// ============================================================================
