//! Registration Features - domain lifetime from RDAP
//!
//! RDAP replaces port-43 WHOIS with JSON over HTTPS. Only the
//! `registration` and `expiration` events are read.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::layout::Indicator;
use crate::constants::{SHORT_REGISTRATION_DAYS, YOUNG_DOMAIN_DAYS};

#[derive(Debug, Deserialize)]
struct RdapDomain {
    #[serde(default)]
    events: Vec<RdapEvent>,
}

#[derive(Debug, Deserialize)]
struct RdapEvent {
    #[serde(rename = "eventAction")]
    action: String,
    #[serde(rename = "eventDate")]
    date: String,
}

/// Registration lifetime of a domain, as far as RDAP knows it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registration {
    pub registered: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
}

impl Registration {
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let domain: RdapDomain = serde_json::from_slice(body)?;
        let mut out = Registration::default();
        for event in domain.events {
            let Ok(date) = DateTime::parse_from_rfc3339(&event.date) else {
                continue;
            };
            let date = date.with_timezone(&Utc);
            match event.action.as_str() {
                "registration" => out.registered = Some(date),
                "expiration" => out.expires = Some(date),
                _ => {}
            }
        }
        Ok(out)
    }

    /// Domain_registeration_length
    pub fn length_feature(&self, now: DateTime<Utc>) -> Indicator {
        match self.expires {
            Some(expires) if (expires - now).num_days() <= SHORT_REGISTRATION_DAYS => {
                Indicator::Suspicious
            }
            Some(_) => Indicator::Legitimate,
            None => Indicator::Neutral,
        }
    }

    /// age_of_domain
    pub fn age_feature(&self, now: DateTime<Utc>) -> Indicator {
        match self.registered {
            Some(registered) if (now - registered).num_days() < YOUNG_DOMAIN_DAYS => {
                Indicator::Suspicious
            }
            Some(_) => Indicator::Legitimate,
            None => Indicator::Neutral,
        }
    }
}

/// Fetch registration data; `None` when the lookup fails in any way
pub async fn lookup(client: &reqwest::Client, base: &str, domain: &str) -> Option<Registration> {
    let url = format!("{}{}", base, domain);
    let response = match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => resp,
        Ok(resp) => {
            log::debug!("RDAP {} returned {}", domain, resp.status());
            return None;
        }
        Err(e) => {
            log::debug!("RDAP lookup for {} failed: {}", domain, e);
            return None;
        }
    };

    let body = response.bytes().await.ok()?;
    match Registration::from_json(&body) {
        Ok(registration) => Some(registration),
        Err(e) => {
            log::debug!("RDAP response for {} unreadable: {}", domain, e);
            None
        }
    }
}
