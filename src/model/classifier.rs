//! Suitability Classifier
//!
//! Trains the standardized random forest on a labelled training table and
//! turns a single observation into a probability for every known crop.
//!
//! Training steps:
//! 1. Class list = sorted distinct labels of the whole table
//! 2. Scaler fitted on every row
//! 3. Seeded shuffle, `ceil(test_fraction * n)` rows held out
//! 4. Forest fitted on the remainder, accuracy measured on the hold-out
//!
//! The accuracy is informational only; it never decides whether training
//! succeeded.

use super::forest::{ForestParams, RandomForest};
use super::scaler::StandardScaler;
use crate::config::RecommenderConfig;
use crate::error::TrainingError;
use crate::features::{FeatureVector, Observation, Parameter, FEATURE_COUNT};
use crate::labels::TrainingTable;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Instant;

/// One crop with its predicted probability (0-100)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropProbability {
    pub crop: String,
    pub probability_pct: f64,
}

/// A trained classifier plus everything needed to score new observations
#[derive(Debug, Clone, PartialEq)]
pub struct SuitabilityModel {
    forest: RandomForest,
    scaler: StandardScaler,
    features: [Parameter; FEATURE_COUNT],
    classes: Vec<String>,
    accuracy_pct: f64,
    train_rows: usize,
    test_rows: usize,
}

impl SuitabilityModel {
    /// Train on a labelled table
    pub fn train(table: &TrainingTable, config: &RecommenderConfig) -> Result<Self, TrainingError> {
        let start = Instant::now();

        if table.is_empty() {
            return Err(TrainingError::EmptyTable);
        }

        let classes = table.distinct_labels();
        if classes.len() < 2 {
            return Err(TrainingError::DegenerateLabels { distinct: classes.len() });
        }

        let samples: Vec<FeatureVector> = table.rows().iter().map(|r| r.values).collect();
        if samples.iter().any(|row| row.iter().any(|v| !v.is_finite())) {
            return Err(TrainingError::NonFinite);
        }

        let targets: Vec<usize> = table
            .rows()
            .iter()
            .map(|r| class_index(&classes, &r.label))
            .collect::<Result<Vec<_>, _>>()?;

        let scaler = StandardScaler::fit(&samples).ok_or(TrainingError::EmptyTable)?;
        let scaled: Vec<FeatureVector> = samples.iter().map(|row| scaler.transform(row)).collect();

        let n = scaled.len();
        let test_rows = hold_out_size(n, config.test_fraction);
        if test_rows >= n {
            return Err(TrainingError::TooFewRows { rows: n });
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut StdRng::seed_from_u64(config.seed));
        let (test_idx, train_idx) = order.split_at(test_rows);

        let train_x: Vec<FeatureVector> = train_idx.iter().map(|&i| scaled[i]).collect();
        let train_y: Vec<usize> = train_idx.iter().map(|&i| targets[i]).collect();

        let forest = RandomForest::fit(
            &train_x,
            &train_y,
            classes.len(),
            ForestParams {
                n_trees: config.n_trees,
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                seed: config.seed,
            },
        )?;

        let correct = test_idx
            .iter()
            .filter(|&&i| forest.predict(&scaled[i]) == targets[i])
            .count();
        let accuracy_pct = correct as f64 / test_rows as f64 * 100.0;

        tracing::info!(
            "Trained {} trees on {} rows ({} classes) in {:?}, hold-out accuracy {:.1}%",
            forest.n_trees(),
            train_idx.len(),
            classes.len(),
            start.elapsed(),
            accuracy_pct
        );

        Ok(Self {
            forest,
            scaler,
            features: Parameter::ALL,
            classes,
            accuracy_pct,
            train_rows: train_idx.len(),
            test_rows,
        })
    }

    /// Probability for every known crop, highest first
    ///
    /// The sort is stable, so exact ties keep the alphabetical class order.
    pub fn predict(&self, observation: &Observation) -> Vec<CropProbability> {
        let mut ranked: Vec<CropProbability> = self
            .probabilities(observation)
            .into_iter()
            .zip(&self.classes)
            .map(|(p, crop)| CropProbability {
                crop: crop.clone(),
                probability_pct: p * 100.0,
            })
            .collect();
        ranked.sort_by(|a, b| b.probability_pct.total_cmp(&a.probability_pct));
        ranked
    }

    /// Raw class probabilities (0-1), indexed like `classes()`
    pub fn probabilities(&self, observation: &Observation) -> Vec<f64> {
        let mut x = [0.0; FEATURE_COUNT];
        for (slot, param) in x.iter_mut().zip(self.features.iter()) {
            *slot = observation.get(*param);
        }
        self.forest.predict_proba(&self.scaler.transform(&x))
    }

    /// Probability (0-100) of a single crop, if it is a known class
    pub fn probability_of(&self, observation: &Observation, crop: &str) -> Option<f64> {
        let idx = self.classes.binary_search_by(|c| c.as_str().cmp(crop)).ok()?;
        Some(self.probabilities(observation)[idx] * 100.0)
    }

    /// Known crop labels in sorted order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn features(&self) -> &[Parameter] {
        &self.features
    }

    /// Hold-out accuracy in percent
    pub fn accuracy_pct(&self) -> f64 {
        self.accuracy_pct
    }

    pub fn train_rows(&self) -> usize {
        self.train_rows
    }

    pub fn test_rows(&self) -> usize {
        self.test_rows
    }
}

fn class_index(classes: &[String], label: &str) -> Result<usize, TrainingError> {
    classes
        .binary_search_by(|c| c.as_str().cmp(label))
        .map_err(|_| TrainingError::Failed(format!("label '{}' missing from class list", label)))
}

/// `ceil(fraction * n)`, tolerant of float noise in the product
///
/// At least one row is always held out so the accuracy stays defined.
fn hold_out_size(n: usize, fraction: f64) -> usize {
    let size = ((n as f64 * fraction) - 1e-9).ceil();
    if size.is_finite() && size > 1.0 {
        size as usize
    } else {
        1
    }
}
