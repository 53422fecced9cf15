//! Central Configuration Constants
//!
//! Single source of truth for detection defaults.

use std::time::Duration;

/// Label for class `1`
pub const LABEL_PHISHING: &str = "phishing";

/// Label for every other class
pub const LABEL_LEGITIMATE: &str = "legitimate";

/// Class index the scorer uses for phishing
pub const PHISHING_CLASS: i64 = 1;

/// Model type when the artifact does not declare one
pub const DEFAULT_MODEL_TYPE: &str = "Unknown";

/// Requester identity when the caller does not send one
pub const ANONYMOUS_USER: &str = "anonymous";

/// Decision threshold for in-process linear scorers
pub const DEFAULT_LINEAR_THRESHOLD: f64 = 0.5;

/// Trailing window used by the `recent` aggregation count
pub const DEFAULT_RECENT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

// ============================================
// Extractor defaults
// ============================================

/// Per-lookup timeout for page fetch and RDAP
pub const DEFAULT_EXTRACTOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest page body read for the HTML features; bigger pages count as unknown
pub const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

/// RDAP bootstrap service (domain appended)
pub const DEFAULT_RDAP_BASE: &str = "https://rdap.org/domain/";

/// User agent sent when fetching pages
pub const USER_AGENT: &str = concat!("PhishGuard/", env!("CARGO_PKG_VERSION"));

/// Expiration closer than this marks a short registration
pub const SHORT_REGISTRATION_DAYS: i64 = 365;

/// Registration younger than this marks a new domain
pub const YOUNG_DOMAIN_DAYS: i64 = 180;

/// Request_URL bands (percent of external resources)
pub const REQUEST_URL_BANDS: (f64, f64) = (22.0, 61.0);

/// URL_of_Anchor bands (percent of external or null anchors)
pub const ANCHOR_BANDS: (f64, f64) = (31.0, 67.0);

/// Links_in_tags bands (percent of external meta/script/link targets)
pub const LINKS_IN_TAGS_BANDS: (f64, f64) = (17.0, 81.0);
