use crate::{
    config::Config,
    encoder,
    error::AppError,
    model::{load_artifact, Classifier, FeatureColumns, LabelEncoders, LogisticClassifier},
    schema::FeatureSchema,
    types::{RiskLabel, ScreenRequest, ScreenResponse, MEDICAL_DISCLAIMER},
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Class the model emits for a CKD-positive patient.
pub const POSITIVE_CLASS: i64 = 1;

/// Owns the artifacts loaded at startup and runs the single linear pass per
/// submission: validate -> encode -> predict -> present. Immutable after
/// construction, shared read-only across handlers.
pub struct ScreeningEngine {
    schema: FeatureSchema,
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for ScreeningEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreeningEngine")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl ScreeningEngine {
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        info!("Loading model artifacts...");

        let classifier: LogisticClassifier = load_artifact(&config.artifacts.classifier).await?;
        let columns: FeatureColumns = load_artifact(&config.artifacts.feature_columns).await?;
        let encoders: LabelEncoders = load_artifact(&config.artifacts.label_encoders).await?;

        if columns.is_empty() {
            return Err(AppError::Artifact(
                "feature column list is empty".to_string(),
            ));
        }
        if classifier.weights.len() != columns.len() {
            return Err(AppError::Artifact(format!(
                "classifier has {} weights but the schema lists {} columns",
                classifier.weights.len(),
                columns.len()
            )));
        }

        let schema = FeatureSchema::build(&columns, &encoders)?;
        info!(
            version = %classifier.version,
            features = schema.len(),
            "Screening engine initialized"
        );

        Ok(Self::from_parts(schema, Arc::new(classifier)))
    }

    pub fn from_parts(schema: FeatureSchema, classifier: Arc<dyn Classifier>) -> Self {
        Self { schema, classifier }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn screen(&self, request: ScreenRequest) -> Result<ScreenResponse, AppError> {
        let missing = encoder::validate(&request.inputs, &self.schema);
        if !missing.is_empty() {
            return Err(AppError::IncompleteInput(missing));
        }

        let row = encoder::encode(&request.inputs, &self.schema)?;
        let (label, probability) = self.classify(&row)?;

        Ok(ScreenResponse {
            screening_id: Uuid::new_v4(),
            label,
            headline: label.headline().to_string(),
            probability,
            probability_display: format_probability(probability),
            recommendations: label
                .recommendations()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            disclaimer: MEDICAL_DISCLAIMER.to_string(),
        })
    }

    /// Adapter over the black-box classifier: high risk iff the predicted
    /// class is the positive one, probability read from the positive class
    /// slot of `predict_proba`. Any model failure surfaces as the one
    /// generic prediction error.
    fn classify(&self, row: &[f64]) -> Result<(RiskLabel, f64), AppError> {
        let predicted = self.classifier.predict(row).map_err(|e| {
            error!("Classifier {} predict failed: {}", self.classifier.version(), e);
            AppError::Prediction
        })?;
        let proba = self.classifier.predict_proba(row).map_err(|e| {
            error!(
                "Classifier {} predict_proba failed: {}",
                self.classifier.version(),
                e
            );
            AppError::Prediction
        })?;

        let positive_index = self
            .classifier
            .classes()
            .iter()
            .position(|c| *c == POSITIVE_CLASS)
            .ok_or_else(|| {
                error!(
                    "Classifier class list {:?} has no positive class",
                    self.classifier.classes()
                );
                AppError::Prediction
            })?;
        let probability = proba.get(positive_index).copied().ok_or_else(|| {
            error!(
                "predict_proba returned {} entries, positive class at {}",
                proba.len(),
                positive_index
            );
            AppError::Prediction
        })?;

        let label = if predicted == POSITIVE_CLASS {
            RiskLabel::HighRisk
        } else {
            RiskLabel::LowRisk
        };
        Ok((label, probability))
    }
}

pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
