//! Offline training pipeline: fits the pricing forest from a structured
//! listing dataset (the normalizer's output) and writes the artifact bundle
//! the `valuer` binary serves from.
//!
//! Env:
//!   DATASET_PATH  input listing records, JSON array (default data/listings.json)
//!   SCHEMA        derived_flags | label_encoded (default derived_flags)
//!   DATA_DIR      output bundle directory (default data)

use serde::Deserialize;
use smartcore::ensemble::random_forest_regressor::RandomForestRegressorParameters;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use watch_valuer::artifact::write_bundle;
use watch_valuer::config::Config;
use watch_valuer::encoder::{FeatureEncoder, LabelTable};
use watch_valuer::error::{AppError, Result};
use watch_valuer::oracle::{ForestOracle, PriceOracle};
use watch_valuer::state::DatasetStats;
use watch_valuer::types::{SchemaKind, WatchQuery};

/// One normalized marketplace listing.
#[derive(Debug, Deserialize)]
struct ListingRecord {
    model: String,
    year: Option<i32>,
    condition: Option<String>,
    material: Option<String>,
    #[serde(default)]
    has_box: bool,
    #[serde(default)]
    has_papers: bool,
    price: Option<f64>,
}

/// Every 5th record is held out for the fit-quality report.
const HOLDOUT_MODULO: usize = 5;

fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg) {
        error!("Training failed: {e}");
        std::process::exit(1);
    }
}

fn run(cfg: Config) -> Result<()> {
    let dataset_path =
        std::env::var("DATASET_PATH").unwrap_or_else(|_| "data/listings.json".to_string());
    let schema = schema_from_env()?;

    let raw = std::fs::read_to_string(&dataset_path)?;
    let records: Vec<ListingRecord> = serde_json::from_str(&raw)?;
    info!("Loaded {} records from {dataset_path}", records.len());

    // Keep only records with a usable listing price.
    let priced: Vec<&ListingRecord> = records
        .iter()
        .filter(|r| r.price.map(|p| p > 0.0).unwrap_or(false))
        .collect();
    info!(
        "{} records after dropping {} without a positive price",
        priced.len(),
        records.len() - priced.len(),
    );
    if priced.is_empty() {
        return Err(AppError::ArtifactLoad(format!(
            "{dataset_path}: no records with a positive price"
        )));
    }

    // Missing years get the dataset median; missing categories get the
    // "Unknown" label the condition table already carries.
    let year_fill = median_year(&priced);
    let queries: Vec<WatchQuery> = priced
        .iter()
        .map(|r| WatchQuery {
            model: r.model.clone(),
            year: r.year.unwrap_or(year_fill),
            condition: r.condition.clone().unwrap_or_else(|| "Unknown".to_string()),
            material: r.material.clone().unwrap_or_else(|| "Unknown".to_string()),
            has_box: r.has_box,
            has_papers: r.has_papers,
        })
        .collect();
    let prices: Vec<f64> = priced.iter().map(|r| r.price.unwrap_or(0.0)).collect();

    let encoder = build_encoder(schema, &queries);

    let mut x = Vec::with_capacity(queries.len());
    for q in &queries {
        x.push(encoder.encode(q)?.values().to_vec());
    }

    // Deterministic holdout split: no shuffle, so reruns are comparable.
    let (x_train, y_train, x_test, y_test) = holdout_split(&x, &prices);
    info!("Split: {} train / {} holdout", x_train.len(), x_test.len());

    let params = RandomForestRegressorParameters::default()
        .with_n_trees(300)
        .with_max_depth(20)
        .with_min_samples_split(5)
        .with_seed(42);
    let oracle = ForestOracle::fit(schema, "submariner-pricing", &x_train, &y_train, params)?;
    info!("Forest fit on {} rows ({schema} schema)", x_train.len());

    report_holdout_mae(&oracle, schema, &x_test, &y_test)?;

    let stats = DatasetStats {
        total_watches: prices.len() as u64,
        avg_price: prices.iter().sum::<f64>() / prices.len() as f64,
        median_price: median(&prices),
    };

    write_bundle(&cfg, &oracle, &encoder, &stats)?;
    info!(
        "Bundle written to {}: {} watches, avg price {:.0}",
        cfg.data_dir, stats.total_watches, stats.avg_price,
    );
    Ok(())
}

fn schema_from_env() -> Result<SchemaKind> {
    match std::env::var("SCHEMA").as_deref() {
        Err(_) | Ok("derived_flags") => Ok(SchemaKind::DerivedFlags),
        Ok("label_encoded") => Ok(SchemaKind::LabelEncoded),
        Ok(other) => Err(AppError::Config(format!(
            "SCHEMA must be derived_flags or label_encoded, got {other:?}"
        ))),
    }
}

fn build_encoder(schema: SchemaKind, queries: &[WatchQuery]) -> FeatureEncoder {
    match schema {
        SchemaKind::DerivedFlags => {
            let mut models: Vec<String> = queries.iter().map(|q| q.model.clone()).collect();
            models.sort();
            models.dedup();
            FeatureEncoder::DerivedFlags { models }
        }
        SchemaKind::LabelEncoded => FeatureEncoder::LabelEncoded {
            model: LabelTable::fit(queries.iter().map(|q| q.model.as_str())),
            condition: LabelTable::fit(queries.iter().map(|q| q.condition.as_str())),
            material: LabelTable::fit(queries.iter().map(|q| q.material.as_str())),
        },
    }
}

fn holdout_split(
    x: &[Vec<f64>],
    y: &[f64],
) -> (Vec<Vec<f64>>, Vec<f64>, Vec<Vec<f64>>, Vec<f64>) {
    let mut x_train = Vec::new();
    let mut y_train = Vec::new();
    let mut x_test = Vec::new();
    let mut y_test = Vec::new();
    for (i, (row, price)) in x.iter().zip(y).enumerate() {
        if i % HOLDOUT_MODULO == 0 {
            x_test.push(row.clone());
            y_test.push(*price);
        } else {
            x_train.push(row.clone());
            y_train.push(*price);
        }
    }
    (x_train, y_train, x_test, y_test)
}

fn report_holdout_mae(
    oracle: &ForestOracle,
    schema: SchemaKind,
    x_test: &[Vec<f64>],
    y_test: &[f64],
) -> Result<()> {
    if x_test.is_empty() {
        return Ok(());
    }
    let mut abs_err_sum = 0.0;
    for (row, actual) in x_test.iter().zip(y_test) {
        let predicted = oracle.predict(&watch_valuer::types::FeatureVector::new(
            schema,
            row.clone(),
        ))?;
        abs_err_sum += (predicted - actual).abs();
    }
    info!(
        "Holdout MAE over {} rows: {:.0}",
        x_test.len(),
        abs_err_sum / x_test.len() as f64,
    );
    Ok(())
}

fn median_year(records: &[&ListingRecord]) -> i32 {
    let years: Vec<f64> = records.iter().filter_map(|r| r.year).map(f64::from).collect();
    if years.is_empty() {
        // Nothing to take a median of; the original pipeline's fallback.
        return 2000;
    }
    median(&years).round() as i32
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
