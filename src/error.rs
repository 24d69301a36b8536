//! Error taxonomy
//!
//! Only `RecommendError::InvalidObservation` ever reaches a caller of
//! `Recommender::recommend`. The table and training errors are absorbed by the
//! orchestrator and turned into a degraded (no-model or augmented) result.

use crate::features::Parameter;
use thiserror::Error;

/// Problems with a single query observation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObservationError {
    #[error("missing required parameter: {0}")]
    Missing(Parameter),

    #[error("parameter {0} is not a finite number")]
    NotFinite(Parameter),

    #[error("parameter {parameter} = {value} is outside its domain [{min}, {max}]")]
    OutOfDomain {
        parameter: Parameter,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Problems with the shape of a training table
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("incomplete features, missing: {}", format_parameters(.missing))]
    IncompleteFeatures { missing: Vec<Parameter> },
}

/// Classifier fit failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    #[error("training table has no usable rows")]
    EmptyTable,

    #[error("need at least two distinct crop labels, found {distinct}")]
    DegenerateLabels { distinct: usize },

    #[error("{rows} rows is too few to hold out a test split")]
    TooFewRows { rows: usize },

    #[error("training table contains non-finite feature values")]
    NonFinite,

    #[error("training failed: {0}")]
    Failed(String),
}

/// The caller-visible error of the recommendation pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
    #[error("invalid observation: {0}")]
    InvalidObservation(#[from] ObservationError),
}

fn format_parameters(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ")
}
