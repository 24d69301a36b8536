//! Recommendation Orchestrator
//!
//! Linear pipeline per query:
//! 1. Validate the observation (the only error a caller ever sees)
//! 2. Adapt the table; missing features switch to the no-model path
//! 3. Synthesize labels / reference rows when fewer than two crops are known
//! 4. Train (or fetch from the cache) the classifier; failure switches to the
//!    no-model path, once, without retry
//! 5. Rank the top crops and attach ideal-range detail for the leading ones

use super::advice::general_advice;
use super::result::{CropSuitability, RecommendationResult};
use crate::cache::{cache_key, ModelCache, PreparedModel};
use crate::config::RecommenderConfig;
use crate::crops::{catalogue, match_crop, match_profile, ParameterMatchDetail};
use crate::data::RawTable;
use crate::error::{RecommendError, TrainingError};
use crate::features::{adapt, FeatureTable, Observation};
use crate::labels::build_training_table;
use crate::model::SuitabilityModel;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

pub struct Recommender {
    config: RecommenderConfig,
    cache: Option<ModelCache>,
}

impl Recommender {
    /// Recommender with a model cache sized from the config
    pub fn new(config: RecommenderConfig) -> Self {
        let cache = ModelCache::new(config.cache_capacity);
        Self { config, cache: Some(cache) }
    }

    /// Recommender that retrains on every call
    pub fn without_cache(config: RecommenderConfig) -> Self {
        Self { config, cache: None }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&ModelCache> {
        self.cache.as_ref()
    }

    /// Rank crops for one observation against a training table snapshot
    ///
    /// The table is never modified. Table and training problems degrade the
    /// result instead of failing it.
    pub fn recommend(
        &self,
        table: &RawTable,
        observation: &Observation,
    ) -> Result<RecommendationResult, RecommendError> {
        let start = Instant::now();
        observation.validate()?;

        let adapted = adapt(table);
        let mut notes = Vec::new();
        if adapted.dropped_rows > 0 && adapted.is_complete() {
            notes.push(format!(
                "Ignored {} rows with missing or unparseable values",
                adapted.dropped_rows
            ));
        }

        let features = match adapted.into_complete() {
            Ok(features) => features,
            Err(e) => {
                tracing::warn!("Skipping classifier: {}", e);
                notes.push(format!("Classifier skipped, {}", e));
                return Ok(self.no_model(observation, notes));
            }
        };

        let result = match self.prepare(features) {
            Ok(prepared) => self.with_model(&prepared, observation, notes),
            Err(e) => {
                tracing::warn!("Training failed, falling back to ideal-range ranking: {}", e);
                notes.push(format!("Classifier unavailable, {}", e));
                self.no_model(observation, notes)
            }
        };

        tracing::info!(
            "Recommendation ready in {:?} (model_used={}, top={:?})",
            start.elapsed(),
            result.model_used,
            result.top_crop()
        );
        Ok(result)
    }

    /// Synthesize labels if needed and train, through the cache when present
    fn prepare(&self, features: FeatureTable) -> Result<Arc<PreparedModel>, TrainingError> {
        let key = cache_key(features.fingerprint(), &self.config);
        let config = &self.config;

        let train = move || {
            let synthesis = build_training_table(features, config.reference_rows, config.seed);
            let model = SuitabilityModel::train(&synthesis.table, config)?;
            Ok(PreparedModel {
                model,
                labels_synthesized: synthesis.labels_synthesized,
                reference_rows_added: synthesis.reference_rows_added,
            })
        };

        match &self.cache {
            Some(cache) => cache.get_or_train(key, train),
            None => train().map(Arc::new),
        }
    }

    fn with_model(
        &self,
        prepared: &PreparedModel,
        observation: &Observation,
        mut notes: Vec<String>,
    ) -> RecommendationResult {
        if prepared.labels_synthesized {
            notes.push("No crop label column found; labels were derived from soil and climate rules".into());
        }
        if prepared.reference_rows_added > 0 {
            notes.push(format!(
                "Fewer than two distinct crops; added {} synthetic reference rows",
                prepared.reference_rows_added
            ));
        }

        let recommendations: Vec<CropSuitability> = prepared
            .model
            .predict(observation)
            .into_iter()
            .take(self.config.top_n.max(1))
            .map(|p| CropSuitability {
                crop: p.crop,
                suitability_pct: p.probability_pct,
            })
            .collect();

        let matches = recommendations
            .iter()
            .take(self.config.detail_n)
            .map(|r| {
                // Profile lookup ignores case; keep the label as ranked
                let mut detail = match_crop(&r.crop, observation, Some(r.suitability_pct));
                detail.crop = r.crop.clone();
                (r.crop.clone(), detail)
            })
            .collect();

        RecommendationResult {
            recommendations,
            matches,
            model_used: true,
            synthetic_augmented: prepared.is_augmented(),
            accuracy_pct: Some(prepared.model.accuracy_pct()),
            notes,
            general_advice: Vec::new(),
        }
    }

    /// Rank the whole catalogue by ideal-range match
    fn no_model(&self, observation: &Observation, notes: Vec<String>) -> RecommendationResult {
        let mut details: Vec<ParameterMatchDetail> = catalogue()
            .iter()
            .map(|profile| match_profile(profile, observation, None))
            .collect();
        details.sort_by(|a, b| b.overall_pct.total_cmp(&a.overall_pct));
        details.truncate(self.config.top_n.max(1));

        let recommendations = details
            .iter()
            .map(|d| CropSuitability {
                crop: d.crop.clone(),
                suitability_pct: d.overall_pct,
            })
            .collect();

        let matches: BTreeMap<String, ParameterMatchDetail> = details
            .into_iter()
            .take(self.config.detail_n)
            .map(|d| (d.crop.clone(), d))
            .collect();

        RecommendationResult {
            recommendations,
            matches,
            model_used: false,
            synthetic_augmented: false,
            accuracy_pct: None,
            notes,
            general_advice: general_advice(observation),
        }
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(RecommenderConfig::default())
    }
}
