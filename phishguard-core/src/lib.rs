//! PhishGuard Core
//!
//! URL phishing detection: feature extraction, model artifact loading and
//! the prediction pipeline that ties them together.
//!
//! ```text
//!   URL ──▶ FeatureExtractor ──▶ FeatureSchema::align ──▶ Scorer
//!                                        │                  │
//!                                        ▼                  ▼
//!                                     signals        label / probabilities
//!                                        └───────┬──────────┘
//!                                                ▼
//!                                        PredictionResult ──▶ CheckRecorder (best effort)
//! ```

pub mod constants;
pub mod features;
pub mod model;
pub mod engine;
pub mod recorder;

pub use engine::{PredictError, PredictionEngine, PredictionResult};
pub use features::{FeatureExtractor, FeatureSchema, UrlFeatureExtractor};
pub use model::{ModelArtifact, ModelError, Scorer};
pub use recorder::{CheckRecord, CheckRecorder, CheckStats, MemoryRecorder, RecorderError};
