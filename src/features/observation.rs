//! Canonical farm parameters and query observations
//!
//! The six canonical features, in the fixed order used by every feature
//! vector in the crate: nitrogen, phosphorus, potassium, temperature,
//! humidity, ph.

use crate::error::ObservationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Number of canonical features
pub const FEATURE_COUNT: usize = 6;

/// A feature vector in canonical parameter order
pub type FeatureVector = [f64; FEATURE_COUNT];

/// One of the six canonical soil/climate parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Nitrogen,
    Phosphorus,
    Potassium,
    Temperature,
    Humidity,
    Ph,
}

impl Parameter {
    /// All parameters in canonical feature order
    pub const ALL: [Parameter; FEATURE_COUNT] = [
        Parameter::Nitrogen,
        Parameter::Phosphorus,
        Parameter::Potassium,
        Parameter::Temperature,
        Parameter::Humidity,
        Parameter::Ph,
    ];

    /// Canonical column name
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Nitrogen => "nitrogen",
            Parameter::Phosphorus => "phosphorus",
            Parameter::Potassium => "potassium",
            Parameter::Temperature => "temperature",
            Parameter::Humidity => "humidity",
            Parameter::Ph => "ph",
        }
    }

    /// Title-cased label for advice text
    pub fn display_name(&self) -> &'static str {
        match self {
            Parameter::Nitrogen => "Nitrogen",
            Parameter::Phosphorus => "Phosphorus",
            Parameter::Potassium => "Potassium",
            Parameter::Temperature => "Temperature",
            Parameter::Humidity => "Humidity",
            Parameter::Ph => "Ph",
        }
    }

    /// Position in a `FeatureVector`
    pub fn index(&self) -> usize {
        match self {
            Parameter::Nitrogen => 0,
            Parameter::Phosphorus => 1,
            Parameter::Potassium => 2,
            Parameter::Temperature => 3,
            Parameter::Humidity => 4,
            Parameter::Ph => 5,
        }
    }

    /// Inclusive domain bounds for a query value
    ///
    /// Nutrients are concentrations (mg/kg), so only the lower bound matters.
    pub fn domain(&self) -> (f64, f64) {
        match self {
            Parameter::Nitrogen | Parameter::Phosphorus | Parameter::Potassium => (0.0, f64::MAX),
            Parameter::Temperature => (-60.0, 60.0),
            Parameter::Humidity => (0.0, 100.0),
            Parameter::Ph => (0.0, 14.0),
        }
    }

    /// Parse a canonical column name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One set of farm readings submitted for a recommendation query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
}

impl Observation {
    pub fn new(
        nitrogen: f64,
        phosphorus: f64,
        potassium: f64,
        temperature: f64,
        humidity: f64,
        ph: f64,
    ) -> Self {
        Self { nitrogen, phosphorus, potassium, temperature, humidity, ph }
    }

    /// Build from a canonical feature vector
    pub fn from_vector(values: &FeatureVector) -> Self {
        Self::new(values[0], values[1], values[2], values[3], values[4], values[5])
    }

    /// Build from a map keyed by parameter name
    ///
    /// Keys are resolved through the column alias table, so `n` or `temp`
    /// are accepted as well as the canonical names. Every parameter must be
    /// present; the values are validated against their domains.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self, ObservationError> {
        let mut values: [Option<f64>; FEATURE_COUNT] = [None; FEATURE_COUNT];
        for (key, value) in map {
            if let Some(param) = super::adapter::resolve_column(key) {
                let slot = &mut values[param.index()];
                // Canonical names take precedence over aliases
                if slot.is_none() || Parameter::from_name(key).is_some() {
                    *slot = Some(*value);
                }
            }
        }

        let mut vector = [0.0; FEATURE_COUNT];
        for param in Parameter::ALL {
            vector[param.index()] = values[param.index()].ok_or(ObservationError::Missing(param))?;
        }

        let observation = Self::from_vector(&vector);
        observation.validate()?;
        Ok(observation)
    }

    /// Value of one parameter
    pub fn get(&self, param: Parameter) -> f64 {
        match param {
            Parameter::Nitrogen => self.nitrogen,
            Parameter::Phosphorus => self.phosphorus,
            Parameter::Potassium => self.potassium,
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::Ph => self.ph,
        }
    }

    /// Values in canonical feature order
    pub fn to_vector(&self) -> FeatureVector {
        [self.nitrogen, self.phosphorus, self.potassium, self.temperature, self.humidity, self.ph]
    }

    /// Check every value is finite and inside its domain
    pub fn validate(&self) -> Result<(), ObservationError> {
        for param in Parameter::ALL {
            let value = self.get(param);
            if !value.is_finite() {
                return Err(ObservationError::NotFinite(param));
            }
            let (min, max) = param.domain();
            if value < min || value > max {
                return Err(ObservationError::OutOfDomain { parameter: param, value, min, max });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_parameter_order_matches_index() {
        for (i, param) in Parameter::ALL.iter().enumerate() {
            assert_eq!(param.index(), i);
            assert_eq!(Parameter::from_name(param.name()), Some(*param));
        }
    }

    #[test]
    fn test_from_map_accepts_aliases() {
        let obs = Observation::from_map(&map(&[
            ("n", 90.0),
            ("p", 42.0),
            ("k", 43.0),
            ("temp", 24.0),
            ("hum", 82.0),
            ("ph", 6.0),
        ]))
        .unwrap();
        assert_eq!(obs, Observation::new(90.0, 42.0, 43.0, 24.0, 82.0, 6.0));
    }

    #[test]
    fn test_from_map_reports_missing_parameter() {
        let err = Observation::from_map(&map(&[
            ("nitrogen", 90.0),
            ("phosphorus", 42.0),
            ("potassium", 43.0),
            ("temperature", 24.0),
            ("humidity", 82.0),
        ]))
        .unwrap_err();
        assert_eq!(err, ObservationError::Missing(Parameter::Ph));
    }

    #[test]
    fn test_ph_out_of_domain() {
        let obs = Observation::new(50.0, 30.0, 30.0, 25.0, 60.0, 15.0);
        match obs.validate() {
            Err(ObservationError::OutOfDomain { parameter, value, .. }) => {
                assert_eq!(parameter, Parameter::Ph);
                assert_eq!(value, 15.0);
            }
            other => panic!("expected out-of-domain error, got {:?}", other),
        }
    }

    #[test]
    fn test_domain_bounds_are_inclusive() {
        assert!(Observation::new(0.0, 0.0, 0.0, -60.0, 0.0, 0.0).validate().is_ok());
        assert!(Observation::new(200.0, 200.0, 200.0, 60.0, 100.0, 14.0).validate().is_ok());
    }

    #[test]
    fn test_negative_nutrient_and_nan_rejected() {
        let negative = Observation::new(-1.0, 30.0, 30.0, 25.0, 60.0, 6.5);
        assert!(matches!(
            negative.validate(),
            Err(ObservationError::OutOfDomain { parameter: Parameter::Nitrogen, .. })
        ));

        let nan = Observation::new(50.0, 30.0, 30.0, f64::NAN, 60.0, 6.5);
        assert_eq!(nan.validate(), Err(ObservationError::NotFinite(Parameter::Temperature)));
    }
}
