//! Feature Layout - Schema definition for URL feature vectors
//!
//! **The schema decides what every vector position means to the scorer.**
//!
//! ## Rules:
//! 1. Names are unique and order-significant
//! 2. A schema is fixed when the model is loaded and never mutated
//! 3. A vector is scored only after it has been aligned to the schema
//!    with an exact length match (no padding, no truncation)

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

// ============================================================================
// DEFAULT LAYOUT (used when an artifact carries no schema)
// ============================================================================

/// Discriminative features in the order the default extractor emits them
pub const DEFAULT_FEATURES: &[&str] = &[
    "having_IP_Address",           // 0: Host is a raw IP address
    "having_Sub_Domain",           // 1: Number of sub-domain levels
    "SSLfinal_State",              // 2: Scheme and certificate outcome
    "Domain_registeration_length", // 3: Time until registration expires
    "Request_URL",                 // 4: Share of external embedded resources
    "URL_of_Anchor",               // 5: Share of external/null anchors
    "Links_in_tags",               // 6: Share of external meta/script/link targets
    "SFH",                         // 7: Server form handler
    "age_of_domain",               // 8: Time since registration
    "DNSRecord",                   // 9: Host resolves in DNS
];

/// Number of default features
/// IMPORTANT: Must match DEFAULT_FEATURES.len()!
pub const DEFAULT_FEATURE_COUNT: usize = 10;

// ============================================================================
// CODED VALUES
// ============================================================================

/// Ternary coding used by every extracted feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Legitimate,
    Neutral,
    Suspicious,
}

impl Indicator {
    pub fn value(self) -> f64 {
        match self {
            Indicator::Legitimate => -1.0,
            Indicator::Neutral => 0.0,
            Indicator::Suspicious => 1.0,
        }
    }

    /// Map a percentage onto the three bands `[0, low)`, `[low, high]`, `(high, 100]`
    pub fn banded(percent: f64, low: f64, high: f64) -> Self {
        if percent < low {
            Indicator::Legitimate
        } else if percent <= high {
            Indicator::Neutral
        } else {
            Indicator::Suspicious
        }
    }
}

/// Value that marks a feature as a signal
pub const SIGNAL_VALUE: f64 = 1.0;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("feature schema is empty")]
    Empty,

    #[error("duplicate feature name in schema: {0}")]
    DuplicateName(String),
}

/// Vector length does not match the active schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Feature length mismatch: expected {expected}, got {got}")]
pub struct LengthMismatch {
    pub expected: usize,
    pub got: usize,
}

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// Ordered, named feature layout expected by a scorer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
    hash: u32,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateName(name.clone()));
            }
        }

        let hash = compute_layout_hash(&names);
        Ok(Self { names, hash })
    }

    /// The hardcoded discriminative layout
    pub fn default_layout() -> Self {
        let names: Vec<String> = DEFAULT_FEATURES.iter().map(|s| s.to_string()).collect();
        let hash = compute_layout_hash(&names);
        Self { names, hash }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// CRC32 of the ordered names
    pub fn layout_hash(&self) -> u32 {
        self.hash
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Pair a vector with this schema. Length must match exactly.
    pub fn align<'a>(&'a self, values: &'a [f64]) -> Result<FeatureRow<'a>, LengthMismatch> {
        if values.len() != self.names.len() {
            return Err(LengthMismatch {
                expected: self.names.len(),
                got: values.len(),
            });
        }
        Ok(FeatureRow { schema: self, values })
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::default_layout()
    }
}

fn compute_layout_hash(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}

// ============================================================================
// FEATURE ROW
// ============================================================================

/// A vector positionally bound to its schema.
///
/// Only [`FeatureSchema::align`] creates one, so `values.len() == schema.len()`
/// always holds.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow<'a> {
    schema: &'a FeatureSchema,
    values: &'a [f64],
}

impl<'a> FeatureRow<'a> {
    pub fn schema(&self) -> &'a FeatureSchema {
        self.schema
    }

    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.index_of(name).map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        let (schema, values) = (self.schema, self.values);
        schema
            .names
            .iter()
            .map(String::as_str)
            .zip(values.iter().copied())
    }

    /// Names of the features coded as suspicious
    pub fn signals(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, value)| *value == SIGNAL_VALUE)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Named copy for persistence
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(name, value)| (name.to_string(), value)).collect()
    }
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout description for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub features: Vec<String>,
    pub count: usize,
    pub layout_hash: u32,
}

impl From<&FeatureSchema> for LayoutInfo {
    fn from(schema: &FeatureSchema) -> Self {
        Self {
            features: schema.names.clone(),
            count: schema.len(),
            layout_hash: schema.layout_hash(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
