//! Trained model memoization
//!
//! Models are keyed by the content fingerprint of the adapted feature table
//! combined with the training knobs of the config, so a changed table (or a
//! changed seed) simply misses. `try_get_with` keeps at most one training in
//! flight per key; concurrent callers wait for it. Failed trainings are not
//! stored.

use crate::config::RecommenderConfig;
use crate::error::TrainingError;
use crate::model::SuitabilityModel;
use moka::sync::Cache;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A trained model plus how its training table was produced
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedModel {
    pub model: SuitabilityModel,
    pub labels_synthesized: bool,
    pub reference_rows_added: usize,
}

impl PreparedModel {
    pub fn is_augmented(&self) -> bool {
        self.labels_synthesized || self.reference_rows_added > 0
    }
}

#[derive(Clone)]
pub struct ModelCache {
    models: Cache<u64, Arc<PreparedModel>>,
}

impl ModelCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            models: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Cached model for `key`, training it with `train` on a miss
    pub fn get_or_train<F>(&self, key: u64, train: F) -> Result<Arc<PreparedModel>, TrainingError>
    where
        F: FnOnce() -> Result<PreparedModel, TrainingError>,
    {
        if let Some(hit) = self.models.get(&key) {
            tracing::debug!("Model cache hit for {:016x}", key);
            return Ok(hit);
        }

        tracing::debug!("Model cache miss for {:016x}", key);
        self.models
            .try_get_with(key, || train().map(Arc::new))
            .map_err(|e| (*e).clone())
    }

    pub fn contains(&self, key: u64) -> bool {
        self.models.contains_key(&key)
    }

    pub fn invalidate_all(&self) {
        self.models.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.models.run_pending_tasks();
        self.models.entry_count()
    }
}

/// Cache key: table fingerprint plus every config field that changes training
pub fn cache_key(table_fingerprint: u64, config: &RecommenderConfig) -> u64 {
    let mut hasher = FxHasher::default();
    table_fingerprint.hash(&mut hasher);
    config.seed.hash(&mut hasher);
    config.n_trees.hash(&mut hasher);
    config.max_depth.hash(&mut hasher);
    config.min_samples_split.hash(&mut hasher);
    config.test_fraction.to_bits().hash(&mut hasher);
    config.reference_rows.hash(&mut hasher);
    hasher.finish()
}
