//! General crop advice from pH and temperature bands
//!
//! Used when no classifier could be trained, so the caller still gets
//! something actionable beyond the ideal-range ranking.

use crate::features::Observation;

pub fn ph_advice(ph: f64) -> &'static str {
    if ph < 5.5 {
        "Crops suitable for acidic soil (pH < 5.5): Blueberries, Potatoes, Sweet Potatoes"
    } else if ph <= 6.5 {
        "Crops suitable for slightly acidic soil (pH 5.5-6.5): Strawberries, Corn, Beans, Rice"
    } else if ph <= 7.5 {
        "Crops suitable for neutral soil (pH 6.5-7.5): Wheat, Barley, Sunflowers, Cucumber"
    } else {
        "Crops suitable for alkaline soil (pH > 7.5): Asparagus, Beets, Cabbage"
    }
}

pub fn temperature_advice(temperature: f64) -> &'static str {
    if temperature < 15.0 {
        "Crops suitable for cool temperatures (< 15°C): Spinach, Lettuce, Kale, Peas"
    } else if temperature <= 25.0 {
        "Crops suitable for moderate temperatures (15-25°C): Wheat, Barley, Carrots, Potatoes"
    } else {
        "Crops suitable for warm temperatures (> 25°C): Corn, Tomatoes, Peppers, Rice"
    }
}

/// pH advice followed by temperature advice
pub fn general_advice(observation: &Observation) -> Vec<String> {
    vec![
        ph_advice(observation.ph).to_string(),
        temperature_advice(observation.temperature).to_string(),
    ]
}
