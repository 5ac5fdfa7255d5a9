use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Placeholder shown as the first option of every select control. A
/// categorical field still holding this value counts as unselected.
pub const SELECT_PROMPT: &str = "Select...";

pub const MEDICAL_DISCLAIMER: &str =
    "Medical Disclaimer: This tool provides preliminary risk assessment only. \
     It is not a substitute for professional medical advice. Always consult with \
     a qualified healthcare provider for diagnosis and treatment.";

/// Raw form value as submitted: a number for numeric controls, a display
/// option (or the select prompt) for categorical controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Choice(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenRequest {
    pub inputs: HashMap<String, RawValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    HighRisk,
    LowRisk,
}

impl RiskLabel {
    pub fn headline(&self) -> &'static str {
        match self {
            RiskLabel::HighRisk => "High Risk of Chronic Kidney Disease",
            RiskLabel::LowRisk => "Low Risk of Chronic Kidney Disease",
        }
    }

    /// Fixed recommendation block, one template per label.
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            RiskLabel::HighRisk => &[
                "Consult a nephrologist immediately",
                "Get comprehensive blood and urine tests",
                "Monitor blood pressure daily",
                "Reduce salt and protein intake",
            ],
            RiskLabel::LowRisk => &[
                "Maintain annual kidney function tests",
                "Stay hydrated (8 glasses of water/day)",
                "Control blood sugar and blood pressure",
                "Avoid NSAIDs and nephrotoxic medications",
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenResponse {
    pub screening_id: Uuid,
    pub label: RiskLabel,
    pub headline: String,
    /// Model confidence for the positive class, in [0, 1].
    pub probability: f64,
    /// One-decimal percentage, e.g. "73.4%".
    pub probability_display: String,
    pub recommendations: Vec<String>,
    pub disclaimer: String,
}
