//! Recommendation Result

use crate::crops::ParameterMatchDetail;
use serde::Serialize;
use std::collections::BTreeMap;

/// A ranked crop with its suitability (0-100)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropSuitability {
    pub crop: String,
    pub suitability_pct: f64,
}

/// Output of one recommendation query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    /// Top crops, highest suitability first
    pub recommendations: Vec<CropSuitability>,

    /// Parameter match detail for the leading crops, keyed by crop name
    pub matches: BTreeMap<String, ParameterMatchDetail>,

    /// False when the ranking comes from the matcher alone
    pub model_used: bool,

    /// True when labels or reference rows were synthesized for training
    pub synthetic_augmented: bool,

    /// Hold-out accuracy of the model, when one was used
    pub accuracy_pct: Option<f64>,

    /// Human-readable notes on how the result was produced
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    /// Band-based crop advice, given on the no-model path
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub general_advice: Vec<String>,
}

impl RecommendationResult {
    /// Name of the best-ranked crop
    pub fn top_crop(&self) -> Option<&str> {
        self.recommendations.first().map(|r| r.crop.as_str())
    }

    /// Ranked crop names
    pub fn crops(&self) -> Vec<&str> {
        self.recommendations.iter().map(|r| r.crop.as_str()).collect()
    }

    /// Rank (0-based) of a crop in the recommendations
    pub fn position(&self, crop: &str) -> Option<usize> {
        self.recommendations.iter().position(|r| r.crop == crop)
    }
}
