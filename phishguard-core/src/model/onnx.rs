//! ONNX Scorer - ONNX Runtime integration
//!
//! Expects a classifier exported with a `[batch, n_features]` float input,
//! an int64 label as the first output and, optionally, a `[batch, n_classes]`
//! float probability tensor as the second output. A second output of any
//! other type (sklearn's default ZipMap sequence) is ignored and the model
//! is treated as label-only.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::tensor::TensorElementType;
use ort::value::{Tensor, ValueType};
use parking_lot::Mutex;

use super::scorer::{ModelError, Score, Scorer};
use crate::features::FeatureRow;

pub struct OnnxScorer {
    session: Mutex<Session>,
    label_output: String,
    proba_output: Option<String>,
}

impl OnnxScorer {
    /// Read and load a model file
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path).map_err(|e| ModelError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, ModelError> {
        log::info!("Loading ONNX model from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| ModelError::Onnx(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Onnx(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ModelError::Onnx(format!("Load from memory error: {}", e)))?;

        let label_output = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelError::Onnx("No output defined".to_string()))?;

        let proba_output = match session.outputs.get(1) {
            Some(output) if is_float_tensor(&output.output_type) => Some(output.name.clone()),
            Some(output) => {
                log::warn!(
                    "ONNX output '{}' is {:?}, not a float tensor; probabilities disabled",
                    output.name,
                    output.output_type
                );
                None
            }
            None => None,
        };

        log::info!(
            "ONNX model loaded (label output '{}', probabilities: {})",
            label_output,
            proba_output.as_deref().unwrap_or("none")
        );

        Ok(Self {
            session: Mutex::new(session),
            label_output,
            proba_output,
        })
    }

    fn input_tensor(row: &FeatureRow<'_>) -> Result<Tensor<f32>, ModelError> {
        let data: Vec<f32> = row.values().iter().map(|v| *v as f32).collect();
        let array = Array2::<f32>::from_shape_vec((1, data.len()), data)
            .map_err(|e| ModelError::Input(format!("Array error: {}", e)))?;
        Tensor::from_array(array)
            .map_err(|e| ModelError::Onnx(format!("Tensor error: {}", e)))
    }

    /// One inference; probabilities are read only when `with_proba` is set
    fn run(&self, row: &FeatureRow<'_>, with_proba: bool) -> Result<Score, ModelError> {
        let input = Self::input_tensor(row)?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ModelError::Onnx(format!("Inference failed: {}", e)))?;

        let labels = outputs
            .get(&self.label_output)
            .ok_or_else(|| ModelError::Onnx("No label output".to_string()))?
            .try_extract_tensor::<i64>()
            .map_err(|e| ModelError::Onnx(format!("Extract error: {}", e)))?;
        let label = labels
            .1
            .first()
            .copied()
            .ok_or_else(|| ModelError::Onnx("Empty label output".to_string()))?;

        let probabilities = match (&self.proba_output, with_proba) {
            (Some(name), true) => {
                let proba = outputs
                    .get(name)
                    .ok_or_else(|| ModelError::Onnx("No probability output".to_string()))?
                    .try_extract_tensor::<f32>()
                    .map_err(|e| ModelError::Onnx(format!("Extract error: {}", e)))?;
                // Batch of one: the whole buffer is the single row
                Some(proba.1.iter().map(|p| *p as f64).collect())
            }
            _ => None,
        };

        Ok(Score { label, probabilities })
    }
}

fn is_float_tensor(value_type: &ValueType) -> bool {
    matches!(
        value_type,
        ValueType::Tensor { ty: TensorElementType::Float32, .. }
    )
}

impl Scorer for OnnxScorer {
    fn predict(&self, row: &FeatureRow<'_>) -> Result<i64, ModelError> {
        Ok(self.run(row, false)?.label)
    }

    fn predict_proba(&self, row: &FeatureRow<'_>) -> Result<Vec<f64>, ModelError> {
        if self.proba_output.is_none() {
            return Err(ModelError::ProbabilitiesUnsupported);
        }
        self.run(row, true)?
            .probabilities
            .ok_or(ModelError::ProbabilitiesUnsupported)
    }

    fn supports_probabilities(&self) -> bool {
        self.proba_output.is_some()
    }

    fn backend(&self) -> &'static str {
        "onnx"
    }

    fn score(&self, row: &FeatureRow<'_>) -> Result<Score, ModelError> {
        self.run(row, true)
    }
}
