//! Bagged ensemble of decision trees
//!
//! Each tree is fitted on a bootstrap sample with its own RNG seeded from
//! `(seed, tree index)`, so the trees can be grown in parallel with Rayon and
//! the ensemble is still identical run to run.

use super::tree::{DecisionTree, TreeParams};
use crate::error::TrainingError;
use crate::features::{FeatureVector, FEATURE_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    /// Fit `n_trees` trees on bootstrap samples of the rows
    pub fn fit(
        samples: &[FeatureVector],
        targets: &[usize],
        n_classes: usize,
        params: ForestParams,
    ) -> Result<Self, TrainingError> {
        if samples.is_empty() {
            return Err(TrainingError::EmptyTable);
        }
        if samples.len() != targets.len() {
            return Err(TrainingError::Failed(format!(
                "{} samples but {} targets",
                samples.len(),
                targets.len()
            )));
        }
        if targets.iter().any(|&t| t >= n_classes) {
            return Err(TrainingError::Failed("target index out of class range".into()));
        }
        if params.n_trees == 0 {
            return Err(TrainingError::Failed("ensemble needs at least one tree".into()));
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            max_features: ((FEATURE_COUNT as f64).sqrt() as usize).max(1),
        };
        let n = samples.len();

        let trees: Vec<DecisionTree> = (0..params.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(tree_seed(params.seed, tree_idx));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(samples, targets, &bootstrap, n_classes, tree_params, &mut rng)
            })
            .collect();

        Ok(Self { trees, n_classes })
    }

    /// Mean leaf distribution across trees, indexed by class
    pub fn predict_proba(&self, x: &FeatureVector) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (p, d) in proba.iter_mut().zip(tree.predict_distribution(x)) {
                *p += d;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    /// Most probable class (lowest index wins ties)
    pub fn predict(&self, x: &FeatureVector) -> usize {
        let proba = self.predict_proba(x);
        let mut best = 0;
        for (idx, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = idx;
            }
        }
        best
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

/// SplitMix64 step over the base seed and tree index
fn tree_seed(seed: u64, tree_idx: usize) -> u64 {
    let mut z = seed.wrapping_add((tree_idx as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(seed: u64) -> ForestParams {
        ForestParams { n_trees: 25, max_depth: None, min_samples_split: 2, seed }
    }

    /// Two well-separated clusters
    fn clusters() -> (Vec<FeatureVector>, Vec<usize>) {
        let mut samples = Vec::new();
        let mut targets = Vec::new();
        for i in 0..20 {
            let jitter = i as f64 * 0.01;
            samples.push([-2.0 + jitter, -2.0, -2.0 + jitter, -2.0, -2.0, -2.0 + jitter]);
            targets.push(0);
            samples.push([2.0 - jitter, 2.0, 2.0 - jitter, 2.0, 2.0, 2.0 - jitter]);
            targets.push(1);
        }
        (samples, targets)
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (samples, targets) = clusters();
        let forest = RandomForest::fit(&samples, &targets, 2, params(42)).unwrap();
        let proba = forest.predict_proba(&[0.1, 0.0, -0.3, 0.2, 0.0, 0.5]);
        assert_eq!(proba.len(), 2);
        assert_relative_eq!(proba.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_separable_clusters_classified() {
        let (samples, targets) = clusters();
        let forest = RandomForest::fit(&samples, &targets, 2, params(42)).unwrap();
        assert_eq!(forest.predict(&[-2.0; FEATURE_COUNT]), 0);
        assert_eq!(forest.predict(&[2.0; FEATURE_COUNT]), 1);
        assert_relative_eq!(forest.predict_proba(&[2.0; FEATURE_COUNT])[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (samples, targets) = clusters();
        let a = RandomForest::fit(&samples, &targets, 2, params(9)).unwrap();
        let b = RandomForest::fit(&samples, &targets, 2, params(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unseen_class_gets_zero_probability() {
        let (samples, targets) = clusters();
        let forest = RandomForest::fit(&samples, &targets, 3, params(1)).unwrap();
        assert_eq!(forest.predict_proba(&[0.0; FEATURE_COUNT])[2], 0.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            RandomForest::fit(&[], &[], 2, params(1)),
            Err(TrainingError::EmptyTable)
        );
        assert!(RandomForest::fit(&[[0.0; FEATURE_COUNT]], &[5], 2, params(1)).is_err());
    }

    #[test]
    fn test_tree_seeds_differ() {
        assert_ne!(tree_seed(42, 0), tree_seed(42, 1));
        assert_ne!(tree_seed(42, 0), tree_seed(43, 0));
    }
}
