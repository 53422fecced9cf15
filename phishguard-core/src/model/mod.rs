//! Model Module - classifier artifacts and scorers
//!
//! Every backend sits behind the [`Scorer`] trait so the engine never
//! cares whether a row is scored by ONNX Runtime or in process.

pub mod scorer;
pub mod artifact;
pub mod onnx;
pub mod linear;

// Re-export common types
pub use scorer::{ModelError, Score, Scorer};
pub use artifact::{ArtifactSource, ModelArtifact, ModelManifest, ModelMetadata, ScorerSpec};
pub use onnx::OnnxScorer;
pub use linear::LinearScorer;
