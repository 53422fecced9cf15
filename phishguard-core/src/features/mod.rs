//! Features Module - URL feature extraction
//!
//! Lexical, page, registration and DNS features are computed in separate
//! modules and assembled in `DEFAULT_FEATURES` order by the extractor.

pub mod layout;
pub mod lexical;
pub mod page;
pub mod rdap;
pub mod extractor;


// Re-export common types
pub use layout::{
    FeatureRow, FeatureSchema, Indicator, LayoutInfo, LengthMismatch, SchemaError,
    DEFAULT_FEATURES, DEFAULT_FEATURE_COUNT,
};
pub use extractor::{
    ExtractionError, ExtractorConfig, FeatureExtractor, UrlFeatureExtractor, UrlFeatures,
};
