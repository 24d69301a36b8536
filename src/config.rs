//! Recommender Configuration
//!
//! All knobs of the pipeline, with defaults matching the reference behaviour
//! (100 trees, 20% hold-out, seed 42, top 5 with detail for the top 3).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Seed for the split, bootstraps, feature sampling and synthetic rows
    pub seed: u64,

    /// Number of trees in the ensemble
    pub n_trees: usize,

    /// Optional depth cap (None grows trees until leaves are pure)
    pub max_depth: Option<usize>,

    /// Nodes smaller than this become leaves
    pub min_samples_split: usize,

    /// Share of rows held out for the accuracy report
    pub test_fraction: f64,

    /// Number of ranked recommendations returned
    pub top_n: usize,

    /// Number of top crops given a parameter match detail
    pub detail_n: usize,

    /// Size of the synthetic reference batch for degenerate labels
    pub reference_rows: usize,

    /// Number of trained models kept in the cache
    pub cache_capacity: u64,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            test_fraction: 0.2,
            top_n: 5,
            detail_n: 3,
            reference_rows: 50,
            cache_capacity: 16,
        }
    }
}

impl RecommenderConfig {
    /// Load from a JSON file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: RecommenderConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse config JSON")?;

        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `CROP_*` environment variables
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        fn var<T: std::str::FromStr>(name: &str) -> Option<T> {
            std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
        }

        if let Some(seed) = var("CROP_SEED") {
            config.seed = seed;
        }
        if let Some(n_trees) = var("CROP_TREES") {
            config.n_trees = n_trees;
        }
        if let Some(depth) = var("CROP_MAX_DEPTH") {
            config.max_depth = Some(depth);
        }
        if let Some(fraction) = var("CROP_TEST_FRACTION") {
            config.test_fraction = fraction;
        }
        if let Some(top_n) = var("CROP_TOP_N") {
            config.top_n = top_n;
        }
        if let Some(capacity) = var("CROP_CACHE_CAPACITY") {
            config.cache_capacity = capacity;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            anyhow::bail!("n_trees must be at least 1");
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            anyhow::bail!("test_fraction must be in (0, 1), got {}", self.test_fraction);
        }
        if self.top_n == 0 {
            anyhow::bail!("top_n must be at least 1");
        }
        Ok(())
    }
}
