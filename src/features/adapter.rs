//! Feature Table Adapter
//!
//! Resolves arbitrary column names onto the six canonical features through an
//! explicit alias table and extracts numeric feature rows. Rows with a missing
//! or unparseable feature are dropped. Missing canonical columns are reported,
//! never invented.

use super::observation::{FeatureVector, Parameter, FEATURE_COUNT};
use crate::data::{Cell, RawTable};
use crate::error::TableError;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Short column names mapped onto canonical parameters (case-sensitive)
pub const COLUMN_ALIASES: &[(&str, Parameter)] = &[
    ("n", Parameter::Nitrogen),
    ("p", Parameter::Phosphorus),
    ("k", Parameter::Potassium),
    ("temp", Parameter::Temperature),
    ("hum", Parameter::Humidity),
];

/// Label columns, in order of preference
pub const LABEL_COLUMNS: &[&str] = &["crop", "label"];

/// Resolve a column name to a canonical parameter, if it names one
pub fn resolve_column(name: &str) -> Option<Parameter> {
    Parameter::from_name(name).or_else(|| {
        COLUMN_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, param)| *param)
    })
}

/// One usable row: all six features, plus the label if the table has one
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub values: FeatureVector,
    pub label: Option<String>,
}

/// Result of adapting a raw table
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedTable {
    /// Usable rows (empty when features are missing)
    pub rows: Vec<FeatureRow>,
    /// Canonical features with no resolvable column
    pub missing: Vec<Parameter>,
    /// Name of the label column, if any
    pub label_column: Option<String>,
    /// Rows discarded for missing/unparseable values or an empty label
    pub dropped_rows: usize,
}

impl AdaptedTable {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn has_labels(&self) -> bool {
        self.label_column.is_some()
    }

    /// Complete feature table, or `IncompleteFeatures`
    pub fn into_complete(self) -> Result<FeatureTable, TableError> {
        if !self.is_complete() {
            return Err(TableError::IncompleteFeatures { missing: self.missing });
        }
        Ok(FeatureTable {
            rows: self.rows,
            labelled: self.label_column.is_some(),
        })
    }
}

/// Table with all six canonical features resolved
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
    labelled: bool,
}

impl FeatureTable {
    pub fn new(rows: Vec<FeatureRow>, labelled: bool) -> Self {
        Self { rows, labelled }
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<FeatureRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the source table carried a label column
    pub fn is_labelled(&self) -> bool {
        self.labelled
    }

    /// Per-feature arithmetic mean (None for an empty table)
    pub fn means(&self) -> Option<FeatureVector> {
        if self.rows.is_empty() {
            return None;
        }
        let mut sums = [0.0; FEATURE_COUNT];
        for row in &self.rows {
            for (sum, value) in sums.iter_mut().zip(row.values.iter()) {
                *sum += value;
            }
        }
        let n = self.rows.len() as f64;
        Some(sums.map(|s| s / n))
    }

    /// Content fingerprint used as the model cache key
    ///
    /// Stable within a process: FxHasher has no random state.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.labelled.hash(&mut hasher);
        self.rows.len().hash(&mut hasher);
        for row in &self.rows {
            for value in row.values {
                value.to_bits().hash(&mut hasher);
            }
            row.label.hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Adapt a raw table to the canonical schema
///
/// The caller's table is not modified.
pub fn adapt(raw: &RawTable) -> AdaptedTable {
    let mut positions: [Option<usize>; FEATURE_COUNT] = [None; FEATURE_COUNT];
    for (idx, name) in raw.columns().iter().enumerate() {
        let Some(param) = resolve_column(name) else { continue };
        let slot = &mut positions[param.index()];
        // A canonical column always beats an alias
        if slot.is_none() || Parameter::from_name(name).is_some() {
            *slot = Some(idx);
        }
    }

    let missing: Vec<Parameter> = Parameter::ALL
        .iter()
        .copied()
        .filter(|p| positions[p.index()].is_none())
        .collect();

    let label_column = LABEL_COLUMNS
        .iter()
        .find(|name| raw.column_index(name).is_some())
        .map(|name| name.to_string());

    if !missing.is_empty() {
        tracing::debug!("Feature adaptation incomplete, missing: {:?}", missing);
        return AdaptedTable {
            rows: Vec::new(),
            missing,
            label_column,
            dropped_rows: raw.height(),
        };
    }

    let label_idx = label_column.as_deref().and_then(|name| raw.column_index(name));
    let mut rows = Vec::with_capacity(raw.height());
    let mut dropped_rows = 0;

    for cells in raw.rows() {
        match extract_row(cells, &positions, label_idx) {
            Some(row) => rows.push(row),
            None => dropped_rows += 1,
        }
    }

    if dropped_rows > 0 {
        tracing::debug!("Dropped {} rows with missing or unparseable values", dropped_rows);
    }

    AdaptedTable {
        rows,
        missing,
        label_column,
        dropped_rows,
    }
}

fn extract_row(
    cells: &[Cell],
    positions: &[Option<usize>; FEATURE_COUNT],
    label_idx: Option<usize>,
) -> Option<FeatureRow> {
    let mut values = [0.0; FEATURE_COUNT];
    for (value, position) in values.iter_mut().zip(positions.iter()) {
        *value = cells.get((*position)?)?.as_f64()?;
    }

    let label = match label_idx {
        Some(idx) => Some(cells.get(idx)?.as_text()?),
        None => None,
    };

    Some(FeatureRow { values, label })
}
