use crate::error::AppError;
use config::{Config as Loader, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub artifacts: ArtifactPaths,
}

/// Locations of the three startup artifacts produced by the training
/// pipeline. All three must load or the process refuses to start.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactPaths {
    pub classifier: String,
    pub feature_columns: String,
    pub label_encoders: String,
}

impl Config {
    /// Defaults, overridden by an optional `ckd.toml` next to the binary,
    /// overridden by `CKD_*` environment variables
    /// (e.g. `CKD_ARTIFACTS__CLASSIFIER=/opt/models/ckd_model_v3.json`).
    pub fn load() -> Result<Self, AppError> {
        let config = Loader::builder()
            .set_default("bind_addr", "0.0.0.0:8000")?
            .set_default("artifacts.classifier", "model/ckd_model_v3.json")?
            .set_default("artifacts.feature_columns", "model/ckd_features_v3.json")?
            .set_default("artifacts.label_encoders", "model/ckd_label_encoders_v3.json")?
            .add_source(File::with_name("ckd").required(false))
            .add_source(Environment::with_prefix("CKD").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
