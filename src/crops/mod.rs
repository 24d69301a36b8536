//! Crop reference data and the ideal-range matcher

pub mod matcher;
pub mod profiles;

pub use matcher::{match_crop, match_profile, parameter_match, MatchValue, ParameterMatchDetail};
pub use profiles::{catalogue, ideal_range, lookup, CropProfile};
