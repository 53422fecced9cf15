//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use phishguard_core::constants::DEFAULT_EXTRACTOR_TIMEOUT;

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/phishing_model.json";
pub const DEFAULT_PORT: u16 = 7000;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Model artifact (`.json` manifest or bare `.onnx`)
    pub model_path: PathBuf,

    /// Database connection URL; persistence is off when unset
    pub database_url: Option<String>,

    /// CORS origins; `None` means any origin
    pub allowed_origins: Option<Vec<String>>,

    /// Server port
    pub port: u16,

    /// Page fetch / RDAP timeout for the extractor
    pub extractor_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            model_path: get("MODEL_PATH")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string())
                .into(),

            database_url: get("DATABASE_URL").filter(|u| !u.trim().is_empty()),

            allowed_origins: parse_origins(&get("ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string())),

            port: get("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),

            extractor_timeout: get("EXTRACTOR_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_EXTRACTOR_TIMEOUT),
        }
    }

    /// Database URL with credentials stripped, for logs
    pub fn database_host(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(|url| url.rsplit('@').next().unwrap_or("***"))
    }
}

/// Comma-separated origins; `*` anywhere in the list allows every origin
fn parse_origins(raw: &str) -> Option<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        None
    } else {
        Some(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.database_url, None);
        assert_eq!(config.allowed_origins, None);
        assert_eq!(config.port, 7000);
        assert_eq!(config.extractor_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = config(&[("PORT", "http"), ("EXTRACTOR_TIMEOUT_SECS", "0")]);
        assert_eq!(config.port, 7000);
        assert_eq!(config.extractor_timeout, DEFAULT_EXTRACTOR_TIMEOUT);
    }

    #[test]
    fn test_explicit_values() {
        let config = config(&[
            ("MODEL_PATH", "/srv/model.onnx"),
            ("DATABASE_URL", "postgres://u:p@db:5432/checks"),
            ("ALLOWED_ORIGINS", "https://a.test, https://b.test"),
            ("PORT", "8088"),
            ("EXTRACTOR_TIMEOUT_SECS", "3"),
        ]);
        assert_eq!(config.model_path, PathBuf::from("/srv/model.onnx"));
        assert_eq!(config.database_host(), Some("db:5432/checks"));
        assert_eq!(
            config.allowed_origins,
            Some(vec!["https://a.test".to_string(), "https://b.test".to_string()])
        );
        assert_eq!(config.port, 8088);
        assert_eq!(config.extractor_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_wildcard_origin_wins() {
        assert_eq!(parse_origins("https://a.test,*"), None);
        assert_eq!(parse_origins(" "), None);
    }
}
