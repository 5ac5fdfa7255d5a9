use crate::error::AppError;
use crate::schema::{FeatureKind, FeatureSchema};
use crate::types::{RawValue, SELECT_PROMPT};
use std::collections::HashMap;

/// Completeness check: returns the display labels, in schema order, of every
/// categorical field still holding the select prompt (or absent entirely).
/// Numeric fields always count as present since they carry defaults.
pub fn validate(inputs: &HashMap<String, RawValue>, schema: &FeatureSchema) -> Vec<String> {
    let mut missing = Vec::new();
    for feature in schema.iter() {
        if !matches!(feature.kind, FeatureKind::Categorical { .. }) {
            continue;
        }
        match inputs.get(&feature.key) {
            Some(RawValue::Choice(choice)) if choice == SELECT_PROMPT => {
                missing.push(feature.label.clone());
            }
            None => missing.push(feature.label.clone()),
            Some(_) => {}
        }
    }
    missing
}

/// Builds the single-row feature vector the model expects: one value per
/// schema column, in schema order, categorical selections replaced by their
/// training-time codes. Callers must run `validate` first; an unselected or
/// unknown option here is still rejected rather than encoded.
pub fn encode(
    inputs: &HashMap<String, RawValue>,
    schema: &FeatureSchema,
) -> Result<Vec<f64>, AppError> {
    let mut row = Vec::with_capacity(schema.len());
    for feature in schema.iter() {
        let value = match &feature.kind {
            FeatureKind::Numeric { default, .. } => match inputs.get(&feature.key) {
                Some(RawValue::Number(n)) => *n,
                None => *default,
                Some(RawValue::Choice(other)) => {
                    return Err(AppError::Encoding {
                        field: feature.key.clone(),
                        reason: format!("expected a number, got {other:?}"),
                    });
                }
            },
            FeatureKind::Categorical { codes, .. } => match inputs.get(&feature.key) {
                Some(RawValue::Choice(choice)) => match codes.get(choice.as_str()) {
                    Some(code) => *code as f64,
                    None => {
                        return Err(AppError::Encoding {
                            field: feature.key.clone(),
                            reason: format!("{choice:?} is not a known option"),
                        });
                    }
                },
                Some(RawValue::Number(n)) => {
                    return Err(AppError::Encoding {
                        field: feature.key.clone(),
                        reason: format!("expected an option, got number {n}"),
                    });
                }
                None => {
                    return Err(AppError::Encoding {
                        field: feature.key.clone(),
                        reason: "no selection".to_string(),
                    });
                }
            },
        };
        row.push(value);
    }
    Ok(row)
}
