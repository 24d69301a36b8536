//! Canonical features: parameters, query observations and the table adapter

pub mod adapter;
pub mod observation;

pub use adapter::{adapt, resolve_column, AdaptedTable, FeatureRow, FeatureTable, COLUMN_ALIASES, LABEL_COLUMNS};
pub use observation::{FeatureVector, Observation, Parameter, FEATURE_COUNT};
