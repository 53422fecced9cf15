//! Linear Scorer - logistic regression evaluated in process
//!
//! Lets a manifest ship plain coefficients instead of an ONNX graph.

use super::scorer::{ModelError, Scorer};
use crate::constants::PHISHING_CLASS;
use crate::features::FeatureRow;

#[derive(Debug, Clone)]
pub struct LinearScorer {
    weights: Vec<f64>,
    bias: f64,
    threshold: f64,
}

impl LinearScorer {
    pub fn new(weights: Vec<f64>, bias: f64, threshold: f64) -> Result<Self, ModelError> {
        if weights.is_empty() {
            return Err(ModelError::Input("linear scorer has no weights".to_string()));
        }
        if weights.iter().any(|w| !w.is_finite()) || !bias.is_finite() {
            return Err(ModelError::Input("linear scorer coefficients must be finite".to_string()));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ModelError::Input(format!(
                "decision threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        Ok(Self { weights, bias, threshold })
    }

    /// P(phishing) for one row
    fn probability(&self, row: &FeatureRow<'_>) -> Result<f64, ModelError> {
        if row.len() != self.weights.len() {
            return Err(ModelError::Input(format!(
                "expected {} values, got {}",
                self.weights.len(),
                row.len()
            )));
        }

        let z = row
            .values()
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.bias;

        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

impl Scorer for LinearScorer {
    fn predict(&self, row: &FeatureRow<'_>) -> Result<i64, ModelError> {
        let p = self.probability(row)?;
        Ok(if p >= self.threshold { PHISHING_CLASS } else { 0 })
    }

    fn predict_proba(&self, row: &FeatureRow<'_>) -> Result<Vec<f64>, ModelError> {
        let p = self.probability(row)?;
        Ok(vec![1.0 - p, p])
    }

    fn supports_probabilities(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "linear"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSchema;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(["a", "b"]).unwrap()
    }

    #[test]
    fn test_zero_logit_is_even() {
        let scorer = LinearScorer::new(vec![1.0, 1.0], 0.0, 0.5).unwrap();
        let schema = schema();
        let values = [0.0, 0.0];
        let proba = scorer.predict_proba(&schema.align(&values).unwrap()).unwrap();
        assert!((proba[0] - 0.5).abs() < 1e-12);
        assert!((proba[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let scorer = LinearScorer::new(vec![2.5, -0.7], 0.3, 0.5).unwrap();
        let schema = schema();
        for values in [[1.0, 1.0], [-1.0, 1.0], [1.0, -1.0], [0.0, -1.0]] {
            let proba = scorer.predict_proba(&schema.align(&values).unwrap()).unwrap();
            assert_eq!(proba.len(), 2);
            assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_label_follows_threshold() {
        let scorer = LinearScorer::new(vec![3.0, 3.0], 0.0, 0.5).unwrap();
        let schema = schema();
        assert_eq!(scorer.predict(&schema.align(&[1.0, 1.0]).unwrap()).unwrap(), 1);
        assert_eq!(scorer.predict(&schema.align(&[-1.0, -1.0]).unwrap()).unwrap(), 0);

        let strict = LinearScorer::new(vec![3.0, 3.0], 0.0, 0.9999).unwrap();
        assert_eq!(strict.predict(&schema.align(&[1.0, 0.0]).unwrap()).unwrap(), 0);
    }

    #[test]
    fn test_rejects_wrong_row_length() {
        let scorer = LinearScorer::new(vec![1.0, 1.0, 1.0], 0.0, 0.5).unwrap();
        let schema = schema();
        let err = scorer.predict(&schema.align(&[1.0, 1.0]).unwrap()).unwrap_err();
        assert!(matches!(err, ModelError::Input(_)));
    }

    #[test]
    fn test_rejects_bad_coefficients() {
        assert!(LinearScorer::new(vec![], 0.0, 0.5).is_err());
        assert!(LinearScorer::new(vec![f64::NAN], 0.0, 0.5).is_err());
        assert!(LinearScorer::new(vec![1.0], 0.0, 1.5).is_err());
    }
}
