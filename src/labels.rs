//! Label Synthesizer
//!
//! Guarantees the classifier a multi-class target. Unlabelled tables get a
//! rule-derived crop per row; a table that still has fewer than two distinct
//! labels is topped up with a seeded batch of reference rows spread over the
//! documented empirical feature ranges.
//!
//! The thresholds and ranges are fixed fallback policy, not agronomic truth.

use crate::data::{Cell, RawTable};
use crate::features::{FeatureTable, FeatureVector, Parameter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

/// Crop names the reference generator draws from
pub const SYNTHETIC_CROPS: [&str; 23] = [
    "rice", "wheat", "maize", "chickpea", "kidneybeans",
    "pigeonpeas", "mothbeans", "mungbean", "blackgram", "lentil",
    "pomegranate", "banana", "mango", "grapes", "watermelon",
    "muskmelon", "apple", "orange", "papaya", "coconut",
    "cotton", "jute", "coffee",
];

/// Rule-derived label for an unlabelled row
pub fn synthesize_label(values: &FeatureVector) -> &'static str {
    let nitrogen = values[Parameter::Nitrogen.index()];
    let potassium = values[Parameter::Potassium.index()];
    let temperature = values[Parameter::Temperature.index()];
    let humidity = values[Parameter::Humidity.index()];
    let ph = values[Parameter::Ph.index()];

    if ph < 6.0 && humidity > 70.0 {
        "rice"
    } else if temperature > 30.0 && humidity < 50.0 {
        "cotton"
    } else if nitrogen > 50.0 && potassium > 50.0 {
        "maize"
    } else if ph > 7.0 && temperature < 20.0 {
        "wheat"
    } else if humidity > 80.0 && temperature > 25.0 {
        "banana"
    } else {
        "chickpea"
    }
}

/// A labelled training row
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub values: FeatureVector,
    pub label: String,
}

/// Ordered feature rows with a crop label each
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingTable {
    rows: Vec<TrainingRow>,
}

impl TrainingTable {
    pub fn new(rows: Vec<TrainingRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TrainingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct labels in sorted order
    pub fn distinct_labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.label.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Render as a raw table with canonical columns plus `crop`
    pub fn to_raw(&self) -> RawTable {
        let mut columns: Vec<&str> = Parameter::ALL.iter().map(|p| p.name()).collect();
        columns.push("crop");

        let mut raw = RawTable::new(columns);
        for row in &self.rows {
            let mut cells: Vec<Cell> = row.values.iter().map(|v| Cell::Number(*v)).collect();
            cells.push(Cell::Text(row.label.clone()));
            raw.push_row(cells);
        }
        raw
    }
}

/// Outcome of label synthesis
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub table: TrainingTable,
    /// Labels were derived from the threshold rules
    pub labels_synthesized: bool,
    /// Number of reference rows appended
    pub reference_rows_added: usize,
}

impl Synthesis {
    /// Whether any synthetic data went into the training table
    pub fn is_augmented(&self) -> bool {
        self.labels_synthesized || self.reference_rows_added > 0
    }
}

/// Produce a training table with at least two distinct labels (when possible)
pub fn build_training_table(features: FeatureTable, reference_rows: usize, seed: u64) -> Synthesis {
    let labels_synthesized = !features.is_labelled();

    let mut rows: Vec<TrainingRow> = features
        .into_rows()
        .into_iter()
        .map(|row| {
            let label = match row.label {
                Some(label) if !labels_synthesized => label,
                _ => synthesize_label(&row.values).to_string(),
            };
            TrainingRow { values: row.values, label }
        })
        .collect();

    if labels_synthesized {
        tracing::info!("No crop label column; synthesized labels for {} rows", rows.len());
    }

    let distinct = rows.iter().map(|r| r.label.as_str()).collect::<BTreeSet<_>>().len();
    let mut reference_rows_added = 0;

    if distinct < 2 {
        tracing::warn!(
            "Only {} distinct crop label(s); adding {} synthetic reference rows",
            distinct, reference_rows
        );
        let mut rng = StdRng::seed_from_u64(seed);
        rows.extend(generate_reference_rows(reference_rows, &mut rng));
        reference_rows_added = reference_rows;
    }

    Synthesis {
        table: TrainingTable::new(rows),
        labels_synthesized,
        reference_rows_added,
    }
}

/// Random rows within the published empirical ranges, crop chosen uniformly
///
/// Nutrients are integers (N 0-139, P 5-144, K 5-204); temperature,
/// humidity and pH are uniform over 8.83-43.68 °C, 14.25-99.98 % and 3.5-9.94.
pub fn generate_reference_rows<R: Rng>(n: usize, rng: &mut R) -> Vec<TrainingRow> {
    (0..n)
        .map(|_| {
            let values = [
                rng.gen_range(0..140) as f64,
                rng.gen_range(5..145) as f64,
                rng.gen_range(5..205) as f64,
                rng.gen_range(8.83..43.68),
                rng.gen_range(14.25..99.98),
                rng.gen_range(3.5..9.94),
            ];
            let label = SYNTHETIC_CROPS[rng.gen_range(0..SYNTHETIC_CROPS.len())].to_string();
            TrainingRow { values, label }
        })
        .collect()
}

/// Seeded reference table of `n` rows
pub fn reference_table(n: usize, seed: u64) -> TrainingTable {
    let mut rng = StdRng::seed_from_u64(seed);
    TrainingTable::new(generate_reference_rows(n, &mut rng))
}
