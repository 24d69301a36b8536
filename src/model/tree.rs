//! CART decision tree (Gini impurity)
//!
//! Array-based node storage: node 0 is the root, split nodes hold child
//! indices, leaves hold the class distribution of the training samples that
//! reached them. Samples with `x[feature] <= threshold` go left.

use crate::features::{FeatureVector, FEATURE_COUNT};
use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::{smallvec, SmallVec};

/// Per-class sample counts; most crop tables fit on the stack
type ClassCounts = SmallVec<[usize; 32]>;

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Candidate features examined per split before settling on the best
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    n_classes: usize,
}

impl DecisionTree {
    /// Fit on the samples selected by `indices` (duplicates allowed, as in a bootstrap)
    ///
    /// `targets[i]` must be `< n_classes` for every index used.
    pub fn fit<R: Rng>(
        samples: &[FeatureVector],
        targets: &[usize],
        indices: &[usize],
        n_classes: usize,
        params: TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut builder = Builder {
            samples,
            targets,
            n_classes,
            params,
            rng,
            nodes: Vec::new(),
        };
        let mut working = indices.to_vec();
        builder.build(&mut working, 0);

        Self {
            nodes: builder.nodes,
            n_classes,
        }
    }

    /// Class distribution of the leaf this sample falls into
    pub fn predict_distribution(&self, x: &FeatureVector) -> &[f64] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { distribution } => return distribution,
                TreeNode::Split { feature, threshold, left, right } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    /// Longest root-to-leaf path
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        self.node_depth(0)
    }

    fn node_depth(&self, idx: usize) -> usize {
        match &self.nodes[idx] {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => {
                1 + self.node_depth(*left).max(self.node_depth(*right))
            }
        }
    }
}

struct Builder<'a, R> {
    samples: &'a [FeatureVector],
    targets: &'a [usize],
    n_classes: usize,
    params: TreeParams,
    rng: &'a mut R,
    nodes: Vec<TreeNode>,
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl<'a, R: Rng> Builder<'a, R> {
    fn build(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let counts = self.class_counts(indices);
        let node_id = self.nodes.len();

        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let too_small = indices.len() < self.params.min_samples_split.max(2);
        let too_deep = self.params.max_depth.is_some_and(|max| depth >= max);

        let split = if is_pure || too_small || too_deep {
            None
        } else {
            self.best_split(indices, &counts)
        };

        let Some(split) = split else {
            self.nodes.push(leaf(&counts, indices.len()));
            return node_id;
        };

        // Reserve the slot, children are appended after it
        self.nodes.push(TreeNode::Leaf { distribution: Vec::new() });

        let mut mid = 0;
        for i in 0..indices.len() {
            if self.samples[indices[i]][split.feature] <= split.threshold {
                indices.swap(i, mid);
                mid += 1;
            }
        }

        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let left = self.build(left_indices, depth + 1);
        let right = self.build(right_indices, depth + 1);

        self.nodes[node_id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    fn class_counts(&self, indices: &[usize]) -> ClassCounts {
        let mut counts: ClassCounts = smallvec![0; self.n_classes];
        for &i in indices {
            counts[self.targets[i]] += 1;
        }
        counts
    }

    /// Best threshold over a random feature order
    ///
    /// At least `max_features` features are examined; if none of them admits
    /// a split (all values equal) the search continues with the rest.
    fn best_split(&mut self, indices: &[usize], parent_counts: &ClassCounts) -> Option<Split> {
        let mut features: SmallVec<[usize; FEATURE_COUNT]> = (0..FEATURE_COUNT).collect();
        features.as_mut_slice().shuffle(&mut *self.rng);

        let n = indices.len();
        let mut sorted: Vec<usize> = indices.to_vec();
        let mut best: Option<Split> = None;

        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.params.max_features && best.is_some() {
                break;
            }

            let samples = self.samples;
            sorted.sort_by(|&a, &b| samples[a][feature].total_cmp(&samples[b][feature]));

            let mut left: ClassCounts = smallvec![0; self.n_classes];
            let mut right = parent_counts.clone();

            for pos in 0..n - 1 {
                let class = self.targets[sorted[pos]];
                left[class] += 1;
                right[class] -= 1;

                let a = samples[sorted[pos]][feature];
                let b = samples[sorted[pos + 1]][feature];
                if b <= a {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = n - n_left;
                let impurity = (n_left as f64 * gini(&left, n_left)
                    + n_right as f64 * gini(&right, n_right))
                    / n as f64;

                if best.as_ref().map_or(true, |s| impurity < s.impurity) {
                    let mut threshold = a + (b - a) / 2.0;
                    if threshold >= b || !threshold.is_finite() {
                        threshold = a;
                    }
                    best = Some(Split { feature, threshold, impurity });
                }
            }
        }

        best
    }
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

fn leaf(counts: &[usize], n: usize) -> TreeNode {
    let total = n.max(1) as f64;
    TreeNode::Leaf {
        distribution: counts.iter().map(|&c| c as f64 / total).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams { max_depth: None, min_samples_split: 2, max_features: FEATURE_COUNT }
    }

    fn row(first: f64) -> FeatureVector {
        [first, 0.0, 0.0, 0.0, 0.0, 0.0]
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_threshold_separates_classes() {
        let samples = vec![row(0.1), row(0.2), row(0.3), row(0.7), row(0.8), row(0.9)];
        let targets = vec![0, 0, 0, 1, 1, 1];
        let indices: Vec<usize> = (0..samples.len()).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let tree = DecisionTree::fit(&samples, &targets, &indices, 2, params(), &mut rng);

        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_distribution(&row(0.0)), &[1.0, 0.0]);
        assert_eq!(tree.predict_distribution(&row(1.0)), &[0.0, 1.0]);
        // Midpoint threshold 0.5 sends the boundary left
        assert_eq!(tree.predict_distribution(&row(0.5)), &[1.0, 0.0]);
    }

    #[test]
    fn test_identical_samples_make_mixed_leaf() {
        let samples = vec![row(1.0), row(1.0), row(1.0), row(1.0)];
        let targets = vec![0, 1, 1, 1];
        let indices: Vec<usize> = (0..4).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let tree = DecisionTree::fit(&samples, &targets, &indices, 2, params(), &mut rng);

        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_distribution(&row(1.0)), &[0.25, 0.75]);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let samples: Vec<FeatureVector> = (0..16).map(|i| row(i as f64)).collect();
        let targets: Vec<usize> = (0..16).map(|i| i % 2).collect();
        let indices: Vec<usize> = (0..16).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let limited = TreeParams { max_depth: Some(2), ..params() };

        let tree = DecisionTree::fit(&samples, &targets, &indices, 2, limited, &mut rng);

        assert!(tree.depth() <= 2);
        let dist = tree.predict_distribution(&row(3.0));
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bootstrap_duplicates_counted() {
        let samples = vec![row(0.0), row(1.0)];
        let targets = vec![0, 1];
        let indices = vec![0, 0, 0, 1];
        let mut rng = StdRng::seed_from_u64(1);

        let tree = DecisionTree::fit(&samples, &targets, &indices, 2, params(), &mut rng);
        assert_eq!(tree.predict_distribution(&row(0.0)), &[1.0, 0.0]);
        assert_eq!(tree.predict_distribution(&row(1.0)), &[0.0, 1.0]);
    }
}
