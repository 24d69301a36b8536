//! Crop Suitability Engine
//!
//! Ranks crops for one set of farm readings against a user-supplied
//! historical table.
//!
//! Pipeline:
//! - `features/`: column alias resolution, canonical feature rows, observations
//! - `labels`: label synthesis and the seeded reference batch
//! - `model/`: standardizer + bagged CART forest (the suitability classifier)
//! - `crops/`: crop profile registry and the ideal-range matcher
//! - `recommend/`: orchestrator merging classifier and matcher output
//!
//! Supporting modules: `data` (table ingestion with Polars), `cache` (trained
//! model memoization), `history` (sensor history cleaning), `config`, `error`.

pub mod cache;
pub mod config;
pub mod crops;
pub mod data;
pub mod error;
pub mod features;
pub mod history;
pub mod labels;
pub mod model;
pub mod recommend;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use cache::{ModelCache, PreparedModel};
pub use config::RecommenderConfig;
pub use crops::{catalogue, lookup, match_crop, CropProfile, MatchValue, ParameterMatchDetail};
pub use data::{load_csv, Cell, RawTable};
pub use error::{ObservationError, RecommendError, TableError, TrainingError};
pub use features::{adapt, FeatureTable, Observation, Parameter};
pub use history::{clean_history, latest_observation};
pub use labels::{build_training_table, TrainingRow, TrainingTable};
pub use model::{CropProbability, SuitabilityModel};
pub use recommend::{CropSuitability, RecommendationResult, Recommender};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
