//! JSON HTTP surface
//!
//! Axum router exposing the crop catalogue and the recommendation pipeline.
//! Training runs on the blocking pool so a cold model never stalls the
//! async workers; the recommender's model cache is shared by all requests.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::crops::{catalogue, lookup};
use crate::data::{Cell, RawTable};
use crate::error::RecommendError;
use crate::features::Observation;
use crate::history::latest_observation;
use crate::recommend::Recommender;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    /// Cleaned history used when a request brings no rows of its own
    pub table: Arc<RawTable>,
}

impl AppState {
    pub fn new(recommender: Recommender, table: RawTable) -> Self {
        Self {
            recommender: Arc::new(recommender),
            table: Arc::new(table),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/crops", get(list_crops))
        .route("/api/crops/:name", get(get_crop))
        .route("/api/observation/default", get(default_observation))
        .route("/api/recommend", post(recommend))
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "rows": state.table.height(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn list_crops() -> impl IntoResponse {
    Json(serde_json::json!({
        "count": catalogue().len(),
        "crops": catalogue(),
    }))
}

async fn get_crop(Path(name): Path<String>) -> Result<impl IntoResponse, AppError> {
    let profile = lookup(&name).ok_or_else(|| AppError::NotFound(format!("Unknown crop: {}", name)))?;
    Ok(Json(*profile))
}

/// Form defaults from the newest row of the loaded table
async fn default_observation(State(state): State<AppState>) -> Result<Json<Observation>, AppError> {
    latest_observation(&state.table)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No complete observation in the loaded table".into()))
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Parameter values keyed by canonical name or alias
    pub observation: HashMap<String, f64>,
    /// Optional training rows replacing the server's table for this request
    #[serde(default)]
    pub rows: Option<Vec<BTreeMap<String, Cell>>>,
}

async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<impl IntoResponse, AppError> {
    let observation = Observation::from_map(&request.observation)
        .map_err(|e| AppError::from(RecommendError::from(e)))?;

    let table = match request.rows {
        Some(records) => Arc::new(RawTable::from_records(&records)),
        None => Arc::clone(&state.table),
    };

    let recommender = Arc::clone(&state.recommender);
    let result = tokio::task::spawn_blocking(move || recommender.recommend(&table, &observation))
        .await
        .map_err(|e| AppError::Internal(format!("Recommendation task failed: {}", e)))??;

    Ok(Json(result))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    InvalidObservation(String),
    NotFound(String),
    Internal(String),
}

impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::InvalidObservation(_) => AppError::InvalidObservation(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::InvalidObservation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
