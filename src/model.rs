use crate::error::{artifact_error, AppError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

/// Raised by a classifier call; the engine logs it and surfaces a generic
/// prediction failure instead.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ClassifierError(pub String);

/// Black-box boundary around the trained model. The engine only ever sees
/// `predict` / `predict_proba` plus the class list the probabilities are
/// ordered by.
pub trait Classifier: Send + Sync {
    fn predict(&self, row: &[f64]) -> Result<i64, ClassifierError>;

    /// Class probabilities, ordered like `classes()`.
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ClassifierError>;

    fn classes(&self) -> &[i64];

    fn version(&self) -> &str;
}

/// Serialized form of the trained CKD classifier: a logistic model exported
/// by the training pipeline, one weight per feature column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub version: String,
    pub intercept: f64,
    pub weights: Vec<f64>,
    pub classes: Vec<i64>,
}

impl LogisticClassifier {
    fn positive_probability(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        if row.len() != self.weights.len() {
            return Err(ClassifierError(format!(
                "feature count mismatch: model expects {}, got {}",
                self.weights.len(),
                row.len()
            )));
        }
        let z = self.intercept
            + self
                .weights
                .iter()
                .zip(row.iter())
                .map(|(w, x)| w * x)
                .sum::<f64>();
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

impl Classifier for LogisticClassifier {
    fn predict(&self, row: &[f64]) -> Result<i64, ClassifierError> {
        let proba = self.predict_proba(row)?;
        let (idx, _) = proba
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .ok_or_else(|| ClassifierError("model has an empty class list".to_string()))?;
        Ok(self.classes[idx])
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        if self.classes.len() != 2 {
            return Err(ClassifierError(format!(
                "expected a binary class list, got {:?}",
                self.classes
            )));
        }
        let p = self.positive_probability(row)?;
        Ok(self
            .classes
            .iter()
            .map(|c| if *c == 1 { p } else { 1.0 - p })
            .collect())
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn version(&self) -> &str {
        &self.version
    }
}

/// Ordered feature-name list the model was trained on. Column order is
/// owned by the training pipeline, never by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureColumns(pub Vec<String>);

impl FeatureColumns {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

/// Training-time label encoders: per categorical column, the ordered class
/// list. A category's code is its index in that list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoders(pub HashMap<String, Vec<String>>);

impl LabelEncoders {
    pub fn classes(&self, column: &str) -> Option<&[String]> {
        self.0.get(column).map(Vec::as_slice)
    }
}

/// Reads and parses one JSON artifact; any failure is fatal at startup.
pub async fn load_artifact<T: DeserializeOwned>(path: &str) -> Result<T, AppError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| artifact_error(path, e))?;
    let artifact = serde_json::from_str(&content).map_err(|e| artifact_error(path, e))?;
    info!("Loaded model artifact from {}", path);
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> LogisticClassifier {
        LogisticClassifier {
            version: "test".to_string(),
            intercept: 0.0,
            weights: vec![1.0, -1.0],
            classes: vec![0, 1],
        }
    }

    #[test]
    fn test_proba_sums_to_one() {
        let model = classifier();
        let proba = model.predict_proba(&[0.3, 0.8]).unwrap();
        assert_eq!(proba.len(), 2);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_is_argmax_of_proba() {
        let model = classifier();
        // Positive net score -> class 1.
        assert_eq!(model.predict(&[3.0, 0.0]).unwrap(), 1);
        // Negative net score -> class 0.
        assert_eq!(model.predict(&[0.0, 3.0]).unwrap(), 0);
    }

    #[test]
    fn test_feature_count_mismatch_is_an_error() {
        let model = classifier();
        let err = model.predict_proba(&[1.0]).unwrap_err();
        assert!(err.0.contains("feature count mismatch"));
    }

    #[test]
    fn test_proba_follows_class_order() {
        let mut model = classifier();
        model.classes = vec![1, 0];
        let proba = model.predict_proba(&[3.0, 0.0]).unwrap();
        // First slot now belongs to class 1.
        assert!(proba[0] > proba[1]);
        assert_eq!(model.predict(&[3.0, 0.0]).unwrap(), 1);
    }
}
