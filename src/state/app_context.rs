use serde::{Deserialize, Serialize};

use crate::encoder::FeatureEncoder;
use crate::oracle::PriceOracle;
use crate::scenario::Valuer;

/// Dataset-level summary statistics persisted at training time (global-stats
/// policy: totals over the whole dataset, not per model).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_watches: u64,
    pub avg_price: f64,
    pub median_price: f64,
}

/// Everything a request handler needs, loaded once at startup and immutable
/// afterwards. Shared across concurrent requests behind an `Arc`; nothing
/// here is written after construction, so no locking is involved.
pub struct AppContext {
    pub encoder: FeatureEncoder,
    pub oracle: Box<dyn PriceOracle>,
    pub stats: DatasetStats,
}

impl AppContext {
    pub fn new(
        encoder: FeatureEncoder,
        oracle: Box<dyn PriceOracle>,
        stats: DatasetStats,
    ) -> Self {
        Self { encoder, oracle, stats }
    }

    /// Scenario generator borrowing this context's encoder and oracle.
    pub fn valuer(&self) -> Valuer<'_> {
        Valuer::new(&self.encoder, self.oracle.as_ref(), &self.stats)
    }
}
