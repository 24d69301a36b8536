// API Server Binary Entry Point
//
// Usage: cargo run --features api --bin api_server
// Environment: DATA_PATH (training CSV), PORT, CROP_CONFIG (JSON config file),
// CROP_* overrides (see RecommenderConfig::from_env)

use crop_suitability::{clean_history, create_router, load_csv, AppState, RawTable, Recommender, RecommenderConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crop_suitability=info,tower_http=debug,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let data_path = PathBuf::from(
        std::env::var("DATA_PATH").unwrap_or_else(|_| "data/crop_history.csv".to_string()),
    );

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let config = match std::env::var("CROP_CONFIG") {
        Ok(path) => RecommenderConfig::load(path.as_ref())?,
        Err(_) => RecommenderConfig::from_env(),
    };
    config.validate()?;

    tracing::info!("Configuration:");
    tracing::info!("  DATA_PATH: {:?}", data_path);
    tracing::info!("  PORT: {}", port);
    tracing::info!("  {:?}", config);

    let table = match load_csv(&data_path) {
        Ok(raw) => {
            let cleaned = clean_history(&raw);
            tracing::info!("Loaded {} rows ({} after cleaning)", raw.height(), cleaned.height());
            cleaned
        }
        Err(e) => {
            // Requests can still bring their own rows, or fall back to ideal ranges
            tracing::warn!("Could not load training table: {:#}", e);
            RawTable::default()
        }
    };

    let state = AppState::new(Recommender::new(config), table);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
