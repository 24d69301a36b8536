//! Ideal-Range Matcher
//!
//! Deterministic closeness score between an observation and a crop's ideal
//! ranges, independent of the classifier. A value inside `[min, max]` scores
//! 100; outside, the score falls linearly and reaches 0 at half the range
//! width beyond the nearest bound.
//!
//! The algorithm only reads `(min, max)` pairs from the registry, so ranges
//! can be added or corrected without touching it.

use super::profiles::{lookup, CropProfile};
use crate::features::{Observation, Parameter};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Parameters scoring below this get an improvement suggestion
pub const SUGGESTION_THRESHOLD: f64 = 70.0;

/// Match percentage of one value against an inclusive range
///
/// A zero-width range scores 100 on its value and 0 anywhere else.
pub fn parameter_match(value: f64, min: f64, max: f64) -> f64 {
    if min <= value && value <= max {
        return 100.0;
    }
    let half_width = (max - min) / 2.0;
    if half_width <= 0.0 {
        return 0.0;
    }
    let distance = if value < min { min - value } else { value - max };
    (100.0 - distance / half_width * 100.0).max(0.0)
}

/// Per-parameter match: a percentage, or unknown when no range is defined
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchValue {
    Percent(f64),
    Unknown,
}

impl MatchValue {
    pub fn percent(&self) -> Option<f64> {
        match self {
            MatchValue::Percent(p) => Some(*p),
            MatchValue::Unknown => None,
        }
    }
}

impl Serialize for MatchValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MatchValue::Percent(p) => serializer.serialize_f64(*p),
            MatchValue::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// Explanatory match of one crop against an observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterMatchDetail {
    pub crop: String,
    pub overall_pct: f64,
    pub per_parameter: BTreeMap<Parameter, MatchValue>,
    pub ideal_ranges: BTreeMap<Parameter, (f64, f64)>,
    pub suggestions: Vec<String>,
}

impl ParameterMatchDetail {
    /// Whether the overall score came from ideal ranges rather than a probability
    pub fn has_ranges(&self) -> bool {
        !self.ideal_ranges.is_empty()
    }
}

/// Match a crop by name
///
/// Unknown crops and crops without ideal ranges never fail: every parameter
/// is reported unknown and the overall score is `model_probability` (0-100),
/// or 0 when there is none.
pub fn match_crop(crop: &str, observation: &Observation, model_probability: Option<f64>) -> ParameterMatchDetail {
    match lookup(crop) {
        Some(profile) => match_profile(profile, observation, model_probability),
        None => unranged(crop.to_string(), model_probability),
    }
}

/// Match against a registry profile
pub fn match_profile(
    profile: &CropProfile,
    observation: &Observation,
    model_probability: Option<f64>,
) -> ParameterMatchDetail {
    if !profile.has_ideal_ranges() {
        return unranged(profile.name.to_string(), model_probability);
    }

    let mut per_parameter = BTreeMap::new();
    let mut ideal_ranges = BTreeMap::new();
    let mut suggestions = Vec::new();
    let mut total = 0.0;
    let mut counted = 0usize;

    for param in Parameter::ALL {
        let Some((min, max)) = profile.ideal_range(param) else {
            per_parameter.insert(param, MatchValue::Unknown);
            continue;
        };
        let value = observation.get(param);
        let pct = parameter_match(value, min, max);

        per_parameter.insert(param, MatchValue::Percent(pct));
        ideal_ranges.insert(param, (min, max));
        total += pct;
        counted += 1;

        if pct < SUGGESTION_THRESHOLD {
            if let Some(s) = suggestion(param, value, min, max) {
                suggestions.push(s);
            }
        }
    }

    ParameterMatchDetail {
        crop: profile.name.to_string(),
        overall_pct: total / counted as f64,
        per_parameter,
        ideal_ranges,
        suggestions,
    }
}

fn unranged(crop: String, model_probability: Option<f64>) -> ParameterMatchDetail {
    ParameterMatchDetail {
        crop,
        overall_pct: model_probability.unwrap_or(0.0),
        per_parameter: Parameter::ALL.iter().map(|p| (*p, MatchValue::Unknown)).collect(),
        ideal_ranges: BTreeMap::new(),
        suggestions: Vec::new(),
    }
}

fn suggestion(param: Parameter, value: f64, min: f64, max: f64) -> Option<String> {
    if value < min {
        Some(format!("Increase {} from {} to at least {}", param.display_name(), value, min))
    } else if value > max {
        Some(format!("Decrease {} from {} to below {}", param.display_name(), value, max))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parameter_match_inside_and_boundaries() {
        assert_eq!(parameter_match(90.0, 80.0, 120.0), 100.0);
        assert_eq!(parameter_match(80.0, 80.0, 120.0), 100.0);
        assert_eq!(parameter_match(120.0, 80.0, 120.0), 100.0);
    }

    #[test]
    fn test_parameter_match_falls_off_linearly() {
        // half width = 20
        assert_relative_eq!(parameter_match(70.0, 80.0, 120.0), 50.0);
        assert_relative_eq!(parameter_match(130.0, 80.0, 120.0), 50.0);
        assert_eq!(parameter_match(60.0, 80.0, 120.0), 0.0);
        assert_eq!(parameter_match(500.0, 80.0, 120.0), 0.0);
    }

    #[test]
    fn test_zero_width_range() {
        assert_eq!(parameter_match(6.0, 6.0, 6.0), 100.0);
        assert_eq!(parameter_match(6.1, 6.0, 6.0), 0.0);
    }

    #[test]
    fn test_rice_perfect_match() {
        let obs = Observation::new(90.0, 42.0, 43.0, 24.0, 82.0, 6.0);
        let detail = match_crop("rice", &obs, None);
        assert_relative_eq!(detail.overall_pct, 100.0);
        assert!(detail.suggestions.is_empty());
        assert_eq!(detail.ideal_ranges[&Parameter::Ph], (5.5, 6.5));
    }

    #[test]
    fn test_overall_is_mean_of_parameters() {
        // nitrogen at 70 scores 50, the rest 100
        let obs = Observation::new(70.0, 50.0, 50.0, 25.0, 80.0, 6.0);
        let detail = match_crop("rice", &obs, Some(12.0));
        assert_relative_eq!(detail.overall_pct, 550.0 / 6.0);
        assert_eq!(detail.per_parameter[&Parameter::Nitrogen], MatchValue::Percent(50.0));
        assert_eq!(detail.suggestions, vec!["Increase Nitrogen from 70 to at least 80".to_string()]);
    }

    #[test]
    fn test_decrease_suggestion() {
        let obs = Observation::new(100.0, 50.0, 50.0, 40.0, 80.0, 6.0);
        let detail = match_crop("rice", &obs, None);
        assert_eq!(detail.suggestions, vec!["Decrease Temperature from 40 to below 32".to_string()]);
    }

    #[test]
    fn test_crop_without_ranges_uses_probability() {
        let obs = Observation::new(90.0, 42.0, 43.0, 24.0, 82.0, 6.0);
        let detail = match_crop("mango", &obs, Some(37.5));
        assert_eq!(detail.overall_pct, 37.5);
        assert!(detail.per_parameter.values().all(|m| *m == MatchValue::Unknown));
        assert!(!detail.has_ranges());

        assert_eq!(match_crop("barley", &obs, None).overall_pct, 0.0);
    }

    #[test]
    fn test_unknown_serializes_as_string() {
        let obs = Observation::new(90.0, 42.0, 43.0, 24.0, 82.0, 6.0);
        let json = serde_json::to_value(match_crop("mango", &obs, Some(10.0))).unwrap();
        assert_eq!(json["per_parameter"]["ph"], "unknown");

        let json = serde_json::to_value(match_crop("rice", &obs, None)).unwrap();
        assert_eq!(json["per_parameter"]["ph"], 100.0);
        assert_eq!(json["ideal_ranges"]["ph"], serde_json::json!([5.5, 6.5]));
    }
}
