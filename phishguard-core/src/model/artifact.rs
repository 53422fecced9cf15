//! Model Artifact - loading and normalizing classifier artifacts
//!
//! An artifact is either a bare ONNX classifier or a JSON manifest that
//! names the schema, metadata and scorer backend. Both shapes resolve once,
//! at load time, into a [`ModelArtifact`].
//!
//! ```json
//! {
//!   "model_type": "RandomForestClassifier",
//!   "accuracy": 0.962,
//!   "features": ["having_IP_Address", "..."],
//!   "scorer": { "kind": "onnx", "path": "phishing.onnx", "sha256": "..." }
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::linear::LinearScorer;
use super::onnx::OnnxScorer;
use super::scorer::{ModelError, Scorer};
use crate::constants::{DEFAULT_LINEAR_THRESHOLD, DEFAULT_MODEL_TYPE};
use crate::features::FeatureSchema;

// ============================================================================
// MANIFEST
// ============================================================================

/// Structured artifact description
#[derive(Debug, Clone, Deserialize)]
pub struct ModelManifest {
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    pub scorer: ScorerSpec,
}

/// Scorer backend, tagged by `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScorerSpec {
    Onnx {
        path: PathBuf,
        #[serde(default)]
        sha256: Option<String>,
    },
    Linear {
        weights: Vec<f64>,
        #[serde(default)]
        bias: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
}

fn default_threshold() -> f64 {
    DEFAULT_LINEAR_THRESHOLD
}

impl ModelManifest {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

// ============================================================================
// ARTIFACT SOURCE
// ============================================================================

/// The two artifact shapes accepted at load time
#[derive(Debug, Clone)]
pub enum ArtifactSource {
    /// A classifier file with no metadata
    Bare(PathBuf),
    /// A manifest; relative scorer paths resolve against `base_dir`
    Structured {
        manifest: ModelManifest,
        base_dir: PathBuf,
    },
}

impl ArtifactSource {
    /// `.json` files are manifests, anything else is a bare ONNX model
    pub fn detect(path: &Path) -> Result<Self, ModelError> {
        let is_manifest = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if !is_manifest {
            return Ok(ArtifactSource::Bare(path.to_path_buf()));
        }

        let bytes = read_file(path)?;
        let manifest = ModelManifest::from_json(&bytes)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(ArtifactSource::Structured { manifest, base_dir })
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, ModelError> {
    std::fs::read(path).map_err(|e| ModelError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn verify_sha256(path: &Path, bytes: &[u8], expected: &str) -> Result<(), ModelError> {
    let actual = hex::encode(Sha256::digest(bytes));
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ModelError::Checksum {
            path: path.display().to_string(),
            expected: expected.trim().to_ascii_lowercase(),
            actual,
        });
    }
    Ok(())
}

// ============================================================================
// MODEL ARTIFACT
// ============================================================================

/// Metadata reported alongside predictions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_type: String,
    pub accuracy: Option<f64>,
    pub backend: String,
    pub source: String,
    pub loaded_at: DateTime<Utc>,
}

/// A loaded scorer bound to the schema it expects
pub struct ModelArtifact {
    scorer: Box<dyn Scorer>,
    schema: FeatureSchema,
    metadata: ModelMetadata,
}

impl fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("schema", &self.schema)
            .field("metadata", &self.metadata)
            .field("supports_probabilities", &self.scorer.supports_probabilities())
            .finish()
    }
}

impl ModelArtifact {
    /// Load whichever artifact shape lives at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        log::info!("Loading model artifact from: {}", path.display());

        let artifact = match ArtifactSource::detect(path)? {
            ArtifactSource::Bare(model_path) => {
                let scorer = OnnxScorer::from_file(&model_path)?;
                Self::from_parts(Box::new(scorer), None, None, None)?
            }
            ArtifactSource::Structured { manifest, base_dir } => {
                Self::from_manifest(manifest, &base_dir)?
            }
        };

        let artifact = artifact.with_source(path.display().to_string());
        log::info!(
            "Loaded model: {} ({} features, backend {})",
            artifact.metadata.model_type,
            artifact.schema.len(),
            artifact.metadata.backend
        );
        Ok(artifact)
    }

    pub fn from_manifest(manifest: ModelManifest, base_dir: &Path) -> Result<Self, ModelError> {
        let schema = match manifest.features {
            Some(names) => FeatureSchema::new(names)?,
            None => FeatureSchema::default_layout(),
        };

        let scorer: Box<dyn Scorer> = match manifest.scorer {
            ScorerSpec::Onnx { path, sha256 } => {
                let model_path = base_dir.join(path);
                let bytes = read_file(&model_path)?;
                if let Some(expected) = sha256.as_deref() {
                    verify_sha256(&model_path, &bytes, expected)?;
                }
                Box::new(OnnxScorer::from_bytes(&bytes)?)
            }
            ScorerSpec::Linear { weights, bias, threshold } => {
                if weights.len() != schema.len() {
                    return Err(ModelError::WeightCount {
                        expected: schema.len(),
                        got: weights.len(),
                    });
                }
                Box::new(LinearScorer::new(weights, bias, threshold)?)
            }
        };

        Self::from_parts(scorer, Some(schema), manifest.model_type, manifest.accuracy)
    }

    /// Assemble an artifact from an already built scorer.
    ///
    /// Missing schema/model type fall back to the defaults.
    pub fn from_parts(
        scorer: Box<dyn Scorer>,
        schema: Option<FeatureSchema>,
        model_type: Option<String>,
        accuracy: Option<f64>,
    ) -> Result<Self, ModelError> {
        if let Some(acc) = accuracy {
            if !(0.0..=1.0).contains(&acc) {
                return Err(ModelError::InvalidAccuracy(acc));
            }
        }

        let metadata = ModelMetadata {
            model_type: model_type.unwrap_or_else(|| DEFAULT_MODEL_TYPE.to_string()),
            accuracy,
            backend: scorer.backend().to_string(),
            source: "<memory>".to_string(),
            loaded_at: Utc::now(),
        };

        Ok(Self {
            scorer,
            schema: schema.unwrap_or_default(),
            metadata,
        })
    }

    fn with_source(mut self, source: String) -> Self {
        self.metadata.source = source;
        self
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn model_type(&self) -> &str {
        &self.metadata.model_type
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.metadata.accuracy
    }

    pub fn supports_probabilities(&self) -> bool {
        self.scorer.supports_probabilities()
    }
}

// ============================================================================
// TESTS
// ============================================================================
