//! Recommendation Orchestrator and result types

pub mod advice;
pub mod orchestrator;
pub mod result;

pub use advice::general_advice;
pub use orchestrator::Recommender;
pub use result::{CropSuitability, RecommendationResult};
