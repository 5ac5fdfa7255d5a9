use crate::error::AppError;
use crate::model::{FeatureColumns, LabelEncoders};
use serde::Serialize;
use std::collections::HashMap;

/// Per-feature input configuration for the form surface. Keys mirror the
/// training columns; anything the artifact names but this table does not
/// falls back to a plain numeric control.
#[derive(Debug, Clone, Copy)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

const FALLBACK_RANGE: NumericRange = NumericRange {
    min: 0.0,
    max: 100.0,
    default: 50.0,
    step: 1.0,
};

#[rustfmt::skip]
const NUMERIC_INPUTS: &[(&str, NumericRange)] = &[
    ("age",           NumericRange { min: 0.0,    max: 100.0,   default: 35.0,   step: 1.0 }),
    ("bp_(diastolic)", NumericRange { min: 50.0,   max: 180.0,   default: 80.0,   step: 1.0 }),
    ("sg",            NumericRange { min: 1.000,  max: 1.025,   default: 1.015,  step: 0.001 }),
    ("al",            NumericRange { min: 0.0,    max: 5.0,     default: 0.0,    step: 1.0 }),
    ("su",            NumericRange { min: 0.0,    max: 5.0,     default: 0.0,    step: 1.0 }),
    ("bgr",           NumericRange { min: 70.0,   max: 500.0,   default: 100.0,  step: 1.0 }),
    ("bu",            NumericRange { min: 1.0,    max: 200.0,   default: 30.0,   step: 1.0 }),
    ("sc",            NumericRange { min: 0.1,    max: 15.0,    default: 0.9,    step: 0.1 }),
    ("sod",           NumericRange { min: 100.0,  max: 160.0,   default: 140.0,  step: 1.0 }),
    ("pot",           NumericRange { min: 2.5,    max: 7.0,     default: 4.0,    step: 0.1 }),
    ("hemo",          NumericRange { min: 3.0,    max: 18.0,    default: 14.0,   step: 0.1 }),
    ("pcv",           NumericRange { min: 10.0,   max: 55.0,    default: 42.0,   step: 1.0 }),
    ("wbcc",          NumericRange { min: 2000.0, max: 20000.0, default: 7000.0, step: 100.0 }),
    ("rbcc",          NumericRange { min: 2.0,    max: 7.0,     default: 5.0,    step: 0.1 }),
    ("grf",           NumericRange { min: 15.0,   max: 200.0,   default: 90.0,   step: 1.0 }),
];

/// Display options in training-code order: the first option encodes to 0,
/// the second to 1, and so on. Checked against the label-encoder artifact
/// at startup.
const CATEGORICAL_INPUTS: &[(&str, &[&str])] = &[
    ("bp_limit", &["Low", "Normal", "High"]),
    ("rbc", &["Normal", "Abnormal"]),
    ("pc", &["Absent", "Present"]),
    ("pcc", &["Absent", "Present"]),
    ("ba", &["Absent", "Present"]),
    ("htn", &["No", "Yes"]),
    ("dm", &["No", "Yes"]),
    ("cad", &["No", "Yes"]),
    ("appet", &["Good", "Poor"]),
    ("pe", &["No", "Yes"]),
    ("ane", &["No", "Yes"]),
    ("stage", &["Stage 1", "Stage 2", "Stage 3", "Stage 4", "Stage 5"]),
];

const DISPLAY_LABELS: &[(&str, &str)] = &[
    ("age", "Age (years)*"),
    ("bp_(diastolic)", "Diastolic BP (mmHg)*"),
    ("bp_limit", "BP Category*"),
    ("sg", "Specific Gravity*"),
    ("al", "Albumin Level (0-5)*"),
    ("rbc", "Red Blood Cells*"),
    ("su", "Sugar Level*"),
    ("pc", "Pus Cells*"),
    ("pcc", "Pus Cell Clumps*"),
    ("ba", "Bacteria*"),
    ("bgr", "Blood Glucose (mg/dL)*"),
    ("bu", "Blood Urea (mg/dL)*"),
    ("sod", "Sodium (mEq/L)*"),
    ("sc", "Serum Creatinine (mg/dL)*"),
    ("pot", "Potassium (mEq/L)*"),
    ("hemo", "Hemoglobin (g/dL)*"),
    ("pcv", "Packed Cell Volume (%)*"),
    ("rbcc", "RBC Count (millions/mm3)*"),
    ("wbcc", "WBC Count (cells/mm3)*"),
    ("htn", "Hypertension*"),
    ("dm", "Diabetes*"),
    ("cad", "Coronary Artery Disease*"),
    ("appet", "Appetite*"),
    ("pe", "Pedal Edema*"),
    ("ane", "Anemia*"),
    ("grf", "GFR (mL/min/1.73m\u{b2})*"),
    ("stage", "Kidney Disease Stage*"),
];

fn display_label(key: &str) -> Option<&'static str> {
    DISPLAY_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

fn numeric_range(key: &str) -> Option<NumericRange> {
    NUMERIC_INPUTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, range)| *range)
}

fn declared_options(key: &str) -> Option<&'static [&'static str]> {
    CATEGORICAL_INPUTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, options)| *options)
}

// "bp_limit" -> "Bp Limit", used when a column has no configured label.
fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, word) in key.split('_').enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    Numeric {
        min: f64,
        max: f64,
        default: f64,
        step: f64,
    },
    Categorical {
        /// Display options, first select entry after the placeholder.
        options: Vec<String>,
        /// Option -> training-time integer code.
        #[serde(skip)]
        codes: HashMap<String, i64>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureDef {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FeatureKind,
}

/// The full ordered feature schema. Order is exactly the artifact's column
/// order and never changes after startup.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    features: Vec<FeatureDef>,
}

impl FeatureSchema {
    /// Joins the artifact column order with the static input configuration
    /// and the label-encoder artifact. Category codes come from the encoder
    /// classes (code = index), so the form options cannot drift from the
    /// training encoding; any disagreement with the static option tables is
    /// fatal here.
    pub fn build(columns: &FeatureColumns, encoders: &LabelEncoders) -> Result<Self, AppError> {
        let mut features = Vec::with_capacity(columns.len());
        for key in columns.iter() {
            let label = display_label(key)
                .map(str::to_string)
                .unwrap_or_else(|| title_case(key));

            let kind = match encoders.classes(key) {
                Some(classes) => {
                    if let Some(declared) = declared_options(key) {
                        let matches = declared.len() == classes.len()
                            && declared.iter().zip(classes).all(|(a, b)| *a == b.as_str());
                        if !matches {
                            return Err(AppError::Artifact(format!(
                                "label encoder for '{key}' disagrees with configured options: \
                                 {classes:?} vs {declared:?}"
                            )));
                        }
                    }
                    let codes = classes
                        .iter()
                        .enumerate()
                        .map(|(code, option)| (option.clone(), code as i64))
                        .collect();
                    FeatureKind::Categorical {
                        options: classes.to_vec(),
                        codes,
                    }
                }
                None => {
                    if declared_options(key).is_some() {
                        return Err(AppError::Artifact(format!(
                            "categorical field '{key}' has no label encoder"
                        )));
                    }
                    let range = numeric_range(key).unwrap_or(FALLBACK_RANGE);
                    FeatureKind::Numeric {
                        min: range.min,
                        max: range.max,
                        default: range.default,
                        step: range.step,
                    }
                }
            };

            features.push(FeatureDef {
                key: key.clone(),
                label,
                kind,
            });
        }
        Ok(Self { features })
    }

    pub fn features(&self) -> &[FeatureDef] {
        &self.features
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureDef> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn columns(names: &[&str]) -> FeatureColumns {
        FeatureColumns(names.iter().map(|s| s.to_string()).collect())
    }

    fn encoders(entries: &[(&str, &[&str])]) -> LabelEncoders {
        let mut map = HashMap::new();
        for (key, classes) in entries {
            map.insert(
                key.to_string(),
                classes.iter().map(|s| s.to_string()).collect(),
            );
        }
        LabelEncoders(map)
    }

    #[test]
    fn test_schema_preserves_column_order() {
        let schema = FeatureSchema::build(
            &columns(&["grf", "age", "htn"]),
            &encoders(&[("htn", &["No", "Yes"])]),
        )
        .unwrap();
        let keys: Vec<_> = schema.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["grf", "age", "htn"]);
    }

    #[test]
    fn test_codes_follow_encoder_class_order() {
        let schema = FeatureSchema::build(
            &columns(&["bp_limit"]),
            &encoders(&[("bp_limit", &["Low", "Normal", "High"])]),
        )
        .unwrap();
        match &schema.features()[0].kind {
            FeatureKind::Categorical { codes, options } => {
                assert_eq!(options, &["Low", "Normal", "High"]);
                assert_eq!(codes["Low"], 0);
                assert_eq!(codes["Normal"], 1);
                assert_eq!(codes["High"], 2);
            }
            other => panic!("expected categorical, got {other:?}"),
        }
    }

    #[test]
    fn test_encoder_disagreement_is_fatal() {
        // Alphabetical encoder order would silently flip the rbc codes; the
        // build must refuse instead.
        let err = FeatureSchema::build(
            &columns(&["rbc"]),
            &encoders(&[("rbc", &["Abnormal", "Normal"])]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("rbc"));
    }

    #[test]
    fn test_missing_encoder_for_categorical_is_fatal() {
        let err = FeatureSchema::build(&columns(&["stage"]), &encoders(&[])).unwrap_err();
        assert!(err.to_string().contains("stage"));
    }

    #[test]
    fn test_unknown_column_falls_back_to_numeric() {
        let schema = FeatureSchema::build(&columns(&["urine_ph"]), &encoders(&[])).unwrap();
        let feature = &schema.features()[0];
        assert_eq!(feature.label, "Urine Ph");
        assert!(matches!(feature.kind, FeatureKind::Numeric { .. }));
    }

    #[test]
    fn test_configured_labels_win_over_title_case() {
        let schema = FeatureSchema::build(
            &columns(&["rbc"]),
            &encoders(&[("rbc", &["Normal", "Abnormal"])]),
        )
        .unwrap();
        assert_eq!(schema.features()[0].label, "Red Blood Cells*");
    }
}
