//! Suitability Classifier: standardization, CART trees and the bagged forest

pub mod classifier;
pub mod forest;
pub mod scaler;
pub mod tree;

pub use classifier::{CropProbability, SuitabilityModel};
pub use forest::{ForestParams, RandomForest};
pub use scaler::StandardScaler;
pub use tree::{DecisionTree, TreeParams};
