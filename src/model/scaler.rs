//! Per-feature standardization (zero mean, unit variance)
//!
//! Fitted once on the training table and stored with the model, so every
//! query is transformed with the same parameters.

use crate::features::{FeatureVector, FEATURE_COUNT};

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: FeatureVector,
    scales: FeatureVector,
}

impl StandardScaler {
    /// Fit on a non-empty set of rows
    ///
    /// Uses the population standard deviation. A constant feature gets a
    /// scale of 1 so it is centred but not blown up.
    pub fn fit(rows: &[FeatureVector]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let n = rows.len() as f64;

        let mut means = [0.0; FEATURE_COUNT];
        for row in rows {
            for (mean, value) in means.iter_mut().zip(row.iter()) {
                *mean += value;
            }
        }
        means = means.map(|s| s / n);

        let mut variances = [0.0; FEATURE_COUNT];
        for row in rows {
            for i in 0..FEATURE_COUNT {
                let d = row[i] - means[i];
                variances[i] += d * d;
            }
        }

        let scales = variances.map(|v| {
            let std = (v / n).sqrt();
            if std > f64::EPSILON { std } else { 1.0 }
        });

        Some(Self { means, scales })
    }

    pub fn transform(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            out[i] = (row[i] - self.means[i]) / self.scales[i];
        }
        out
    }

    pub fn means(&self) -> &FeatureVector {
        &self.means
    }

    pub fn scales(&self) -> &FeatureVector {
        &self.scales
    }
}
