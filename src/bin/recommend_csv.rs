// Command-line recommendation over a CSV training table
//
// Usage: cargo run --features cli --bin recommend_csv -- <table.csv> [observation.json]
//
// Without an observation file the newest row of the cleaned table is used.
// Prints the RecommendationResult as JSON.

use anyhow::{Context, Result};
use crop_suitability::{clean_history, latest_observation, load_csv, Observation, Recommender, RecommenderConfig};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crop_suitability=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let table_path = PathBuf::from(
        args.next()
            .context("usage: recommend_csv <table.csv> [observation.json]")?,
    );
    let observation_path = args.next().map(PathBuf::from);

    let raw = load_csv(&table_path)?;
    let table = clean_history(&raw);
    tracing::info!("Loaded {} rows from {:?}", table.height(), table_path);

    let observation = match observation_path {
        Some(path) => {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read observation file: {:?}", path))?;
            let values: HashMap<String, f64> = serde_json::from_str(&contents)
                .with_context(|| "Failed to parse observation JSON")?;
            Observation::from_map(&values)?
        }
        None => latest_observation(&raw)
            .context("No observation file given and the table has no complete row to use")?,
    };

    let config = RecommenderConfig::from_env();
    config.validate()?;
    let recommender = Recommender::without_cache(config);
    let result = recommender.recommend(&table, &observation)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
