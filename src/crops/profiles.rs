//! Crop Profile registry
//!
//! Immutable reference data for the 24 known crops. Only rice, wheat, maize,
//! chickpea and cotton carry numeric ideal ranges; every other crop is scored
//! from the classifier probability alone.

use crate::features::Parameter;
use crate::features::Parameter::{Humidity, Nitrogen, Ph, Phosphorus, Potassium, Temperature};
use serde::Serialize;

/// Static reference entry for one crop
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub ideal_conditions: &'static str,
    pub growing_period: &'static str,
    /// `(parameter, min, max)` inclusive ranges
    #[serde(serialize_with = "serialize_ranges")]
    pub ideal_ranges: &'static [(Parameter, f64, f64)],
}

impl CropProfile {
    /// Ideal `(min, max)` for one parameter, if defined
    pub fn ideal_range(&self, param: Parameter) -> Option<(f64, f64)> {
        self.ideal_ranges
            .iter()
            .find(|(p, _, _)| *p == param)
            .map(|(_, min, max)| (*min, *max))
    }

    pub fn has_ideal_ranges(&self) -> bool {
        !self.ideal_ranges.is_empty()
    }
}

fn serialize_ranges<S: serde::Serializer>(
    ranges: &&'static [(Parameter, f64, f64)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(ranges.len()))?;
    for (param, min, max) in ranges.iter() {
        map.serialize_entry(param, &[*min, *max])?;
    }
    map.end()
}

static RICE_RANGES: &[(Parameter, f64, f64)] = &[
    (Nitrogen, 80.0, 120.0),
    (Phosphorus, 40.0, 60.0),
    (Potassium, 40.0, 60.0),
    (Temperature, 22.0, 32.0),
    (Humidity, 70.0, 90.0),
    (Ph, 5.5, 6.5),
];

static WHEAT_RANGES: &[(Parameter, f64, f64)] = &[
    (Nitrogen, 100.0, 140.0),
    (Phosphorus, 50.0, 80.0),
    (Potassium, 40.0, 70.0),
    (Temperature, 15.0, 25.0),
    (Humidity, 50.0, 70.0),
    (Ph, 6.0, 7.0),
];

static MAIZE_RANGES: &[(Parameter, f64, f64)] = &[
    (Nitrogen, 80.0, 120.0),
    (Phosphorus, 40.0, 80.0),
    (Potassium, 30.0, 60.0),
    (Temperature, 20.0, 30.0),
    (Humidity, 50.0, 80.0),
    (Ph, 5.8, 6.8),
];

static CHICKPEA_RANGES: &[(Parameter, f64, f64)] = &[
    (Nitrogen, 40.0, 60.0),
    (Phosphorus, 60.0, 90.0),
    (Potassium, 20.0, 40.0),
    (Temperature, 15.0, 30.0),
    (Humidity, 40.0, 60.0),
    (Ph, 5.5, 7.0),
];

static COTTON_RANGES: &[(Parameter, f64, f64)] = &[
    (Nitrogen, 80.0, 120.0),
    (Phosphorus, 40.0, 60.0),
    (Potassium, 40.0, 80.0),
    (Temperature, 20.0, 35.0),
    (Humidity, 60.0, 70.0),
    (Ph, 5.8, 7.0),
];

const fn profile(
    name: &'static str,
    description: &'static str,
    ideal_conditions: &'static str,
    growing_period: &'static str,
    ideal_ranges: &'static [(Parameter, f64, f64)],
) -> CropProfile {
    CropProfile { name, description, ideal_conditions, growing_period, ideal_ranges }
}

/// The full catalogue, alphabetical
static CROP_PROFILES: &[CropProfile] = &[
    profile(
        "apple",
        "A deciduous fruit tree that requires cool winters for proper dormancy.",
        "Temperature: 15-25°C, Humidity: 50-70%, pH: 6.0-7.0",
        "Perennial (3-5 years for first harvest)",
        &[],
    ),
    profile(
        "banana",
        "A tropical fruit crop that requires plenty of water and nutrients.",
        "Temperature: 20-35°C, Humidity: 70-90%, pH: 5.5-7.0",
        "9-12 months",
        &[],
    ),
    profile(
        "blackgram",
        "A legume crop that grows well in warm and humid conditions.",
        "Temperature: 25-35°C, Humidity: 50-80%, pH: 6.0-7.5",
        "2-3 months",
        &[],
    ),
    profile(
        "chickpea",
        "A drought-resistant legume crop with nitrogen-fixing properties.",
        "Temperature: 15-30°C, Humidity: 40-60%, pH: 5.5-7.0",
        "3-4 months",
        CHICKPEA_RANGES,
    ),
    profile(
        "coconut",
        "A tropical palm tree that grows well in coastal areas with high humidity.",
        "Temperature: 25-35°C, Humidity: 70-90%, pH: 5.5-7.0",
        "Perennial (6-10 years for first harvest)",
        &[],
    ),
    profile(
        "coffee",
        "A tropical perennial crop that grows best in moderate temperatures.",
        "Temperature: 15-25°C, Humidity: 60-80%, pH: 5.5-6.5",
        "Perennial (3-4 years for first harvest)",
        &[],
    ),
    profile(
        "cotton",
        "A fiber crop that grows best in warm climates with moderate rainfall.",
        "Temperature: 20-35°C, Humidity: 60-70%, pH: 5.8-7.0",
        "5-6 months",
        COTTON_RANGES,
    ),
    profile(
        "grapes",
        "A perennial vine that produces fruit clusters and prefers temperate climates.",
        "Temperature: 15-30°C, Humidity: 40-70%, pH: 6.0-7.0",
        "Perennial (2-3 years for first harvest)",
        &[],
    ),
    profile(
        "jute",
        "A fiber crop that grows best in warm and humid conditions.",
        "Temperature: 25-35°C, Humidity: 70-90%, pH: 6.0-7.5",
        "3-4 months",
        &[],
    ),
    profile(
        "kidneybeans",
        "A legume crop that requires moderate temperatures and rainfall.",
        "Temperature: 20-30°C, Humidity: 50-70%, pH: 6.0-7.5",
        "3-4 months",
        &[],
    ),
    profile(
        "lentil",
        "A cool-season legume crop that is highly nutritious.",
        "Temperature: 15-25°C, Humidity: 40-70%, pH: 6.0-8.0",
        "3-4 months",
        &[],
    ),
    profile(
        "maize",
        "Also known as corn, maize is a warm-season crop that requires plenty of sunlight.",
        "Temperature: 20-30°C, Humidity: 50-80%, pH: 5.8-6.8",
        "3-5 months",
        MAIZE_RANGES,
    ),
    profile(
        "mango",
        "A tropical fruit tree that grows well in warm climates with a distinct dry season.",
        "Temperature: 24-30°C, Humidity: 50-80%, pH: 5.5-7.5",
        "Perennial (4-5 years for first harvest)",
        &[],
    ),
    profile(
        "mothbeans",
        "A drought-resistant legume crop suitable for semi-arid regions.",
        "Temperature: 25-35°C, Humidity: 30-60%, pH: 6.0-7.5",
        "3-4 months",
        &[],
    ),
    profile(
        "mungbean",
        "A legume crop that fixes nitrogen in the soil and grows well in warm conditions.",
        "Temperature: 20-35°C, Humidity: 50-80%, pH: 6.2-7.2",
        "2-3 months",
        &[],
    ),
    profile(
        "muskmelon",
        "A warm-season fruit crop similar to watermelon but with different water requirements.",
        "Temperature: 20-30°C, Humidity: 50-70%, pH: 6.0-7.0",
        "3-4 months",
        &[],
    ),
    profile(
        "orange",
        "A citrus fruit tree that grows well in subtropical climates.",
        "Temperature: 20-35°C, Humidity: 40-70%, pH: 5.5-6.5",
        "Perennial (3-5 years for first harvest)",
        &[],
    ),
    profile(
        "papaya",
        "A fast-growing tropical fruit tree with year-round harvesting.",
        "Temperature: 20-35°C, Humidity: 60-80%, pH: 6.0-7.0",
        "8-10 months for first harvest",
        &[],
    ),
    profile(
        "pigeonpeas",
        "A drought-resistant legume crop that improves soil fertility.",
        "Temperature: 20-35°C, Humidity: 40-70%, pH: 5.0-7.0",
        "4-6 months",
        &[],
    ),
    profile(
        "pomegranate",
        "A drought-resistant fruit tree that grows well in semi-arid conditions.",
        "Temperature: 20-35°C, Humidity: 40-60%, pH: 5.5-7.2",
        "Perennial (3-5 years for first harvest)",
        &[],
    ),
    profile(
        "rice",
        "A staple food crop, rice grows well in warm, humid environments with plenty of water.",
        "Temperature: 20-35°C, Humidity: 80-85%, pH: 5.5-6.5",
        "3-6 months",
        RICE_RANGES,
    ),
    profile(
        "sugarcane",
        "A tropical grass that produces sugar and requires plenty of water and sunlight.",
        "Temperature: 24-34°C, Humidity: 60-80%, pH: 6.0-7.5",
        "9-24 months",
        &[],
    ),
    profile(
        "watermelon",
        "A warm-season fruit crop that requires plenty of sunlight and water.",
        "Temperature: 20-35°C, Humidity: 50-70%, pH: 6.0-7.0",
        "3-4 months",
        &[],
    ),
    profile(
        "wheat",
        "A versatile grain crop that can adapt to many environments but prefers moderate temperatures.",
        "Temperature: 15-25°C, Humidity: 50-70%, pH: 6.0-7.0",
        "4-8 months",
        WHEAT_RANGES,
    ),
];

/// Every known crop profile, alphabetical
pub fn catalogue() -> &'static [CropProfile] {
    CROP_PROFILES
}

/// Case-insensitive lookup by crop name
pub fn lookup(name: &str) -> Option<&'static CropProfile> {
    let name = name.trim();
    CROP_PROFILES.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Ideal range of one parameter for a named crop
pub fn ideal_range(crop: &str, param: Parameter) -> Option<(f64, f64)> {
    lookup(crop)?.ideal_range(param)
}
