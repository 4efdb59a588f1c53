use crate::error::{AppError, Result};

/// Exclusive lower bound for year-sweep points. The bound filters only the
/// comparison sweep — the primary prediction always uses the queried year.
pub const YEAR_MIN_EXCL: i32 = 1950;

/// Exclusive upper bound for year-sweep points.
pub const YEAR_MAX_EXCL: i32 = 2027;

/// Offsets applied to the queried year for the year-sensitivity series.
pub const YEAR_SWEEP_OFFSETS: &[i32] = &[-5, 0, 5];

/// Canonical condition labels for the condition-sensitivity series, best to
/// worst. Under the label-encoded schema a label missing from the trained
/// table is skipped rather than predicted.
pub const CONDITION_SWEEP: &[&str] = &["Unworn", "Very good", "Good", "Fair"];

/// Market-range band applied around the estimate (fixed-band policy).
pub mod band {
    pub const MIN_FACTOR: f64 = 0.82;
    pub const MAX_FACTOR: f64 = 1.18;
}

/// Artifact file names inside the data directory.
pub const MODEL_FILE: &str = "model.json";
pub const ENCODER_FILE: &str = "encoder.json";
pub const STATS_FILE: &str = "stats.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// Directory holding the trained artifact bundle (DATA_DIR).
    pub data_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        })
    }

    pub fn model_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(MODEL_FILE)
    }

    pub fn encoder_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(ENCODER_FILE)
    }

    pub fn stats_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(STATS_FILE)
    }
}
