use crate::config::{band, CONDITION_SWEEP, YEAR_MAX_EXCL, YEAR_MIN_EXCL, YEAR_SWEEP_OFFSETS};
use crate::encoder::FeatureEncoder;
use crate::error::Result;
use crate::oracle::PriceOracle;
use crate::state::DatasetStats;
use crate::types::WatchQuery;

// ---------------------------------------------------------------------------
// Valuation output
// ---------------------------------------------------------------------------

/// One point on the year-sensitivity series.
#[derive(Debug, Clone, PartialEq)]
pub struct YearPoint {
    pub year: i32,
    pub price: i64,
}

/// One point on the condition-sensitivity series.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionPoint {
    pub condition: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

/// Marginal accessory contributions. Zero whenever the corresponding query
/// flag is false, regardless of what the underlying delta would be.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessoryImpact {
    pub box_delta: i64,
    pub papers_delta: i64,
}

/// Aggregated answer to one valuation request. All prices are rounded to
/// whole currency units at this edge; intermediate math stays unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub price_estimated: i64,
    pub price_base: i64,
    pub range: PriceRange,
    pub impact: AccessoryImpact,
    pub by_year: Vec<YearPoint>,
    pub by_condition: Vec<ConditionPoint>,
    pub dataset_count: u64,
    pub dataset_avg_price: i64,
}

// ---------------------------------------------------------------------------
// Valuer
// ---------------------------------------------------------------------------

/// Scenario generator: answers a valuation request by deriving related
/// queries (accessory toggles, year offsets, condition ladder) and
/// aggregating their oracle outputs.
pub struct Valuer<'a> {
    encoder: &'a FeatureEncoder,
    oracle: &'a dyn PriceOracle,
    stats: &'a DatasetStats,
}

impl<'a> Valuer<'a> {
    pub fn new(
        encoder: &'a FeatureEncoder,
        oracle: &'a dyn PriceOracle,
        stats: &'a DatasetStats,
    ) -> Self {
        Self { encoder, oracle, stats }
    }

    /// Encode + predict, no further transformation.
    fn predict(&self, query: &WatchQuery) -> Result<f64> {
        self.oracle.predict(&self.encoder.encode(query)?)
    }

    pub fn value(&self, query: &WatchQuery) -> Result<Valuation> {
        // Base scenario: the query as given.
        let estimate = self.predict(query)?;

        // Reference scenario: both accessories cleared.
        let base = self.predict(&query.with_box(false).with_papers(false))?;

        // Each accessory's marginal contribution, holding the *other* flag
        // at its queried value. Reported as 0 when the flag is off.
        let box_delta = if query.has_box {
            estimate - self.predict(&query.with_box(false))?
        } else {
            0.0
        };
        let papers_delta = if query.has_papers {
            estimate - self.predict(&query.with_papers(false))?
        } else {
            0.0
        };

        let by_year = self.year_series(query)?;
        let by_condition = self.condition_series(query)?;

        Ok(Valuation {
            price_estimated: round(estimate),
            price_base: round(base),
            range: PriceRange {
                min: round(estimate * band::MIN_FACTOR),
                max: round(estimate * band::MAX_FACTOR),
            },
            impact: AccessoryImpact {
                box_delta: round(box_delta),
                papers_delta: round(papers_delta),
            },
            by_year,
            by_condition,
            dataset_count: self.stats.total_watches,
            dataset_avg_price: round(self.stats.avg_price),
        })
    }

    /// Predictions at year offsets {-5, 0, +5}, ascending. Offsets landing
    /// outside the exclusive (1950, 2027) bound are dropped; the bound never
    /// applies to the primary prediction.
    fn year_series(&self, query: &WatchQuery) -> Result<Vec<YearPoint>> {
        let mut points = Vec::with_capacity(YEAR_SWEEP_OFFSETS.len());
        for offset in YEAR_SWEEP_OFFSETS {
            let year = query.year + offset;
            if year <= YEAR_MIN_EXCL || year >= YEAR_MAX_EXCL {
                continue;
            }
            let price = self.predict(&query.with_year(year))?;
            points.push(YearPoint { year, price: round(price) });
        }
        Ok(points)
    }

    /// Predictions across the canonical condition ladder, best to worst.
    /// A label the encoder cannot represent (label-encoded schema only) is
    /// skipped rather than predicted.
    fn condition_series(&self, query: &WatchQuery) -> Result<Vec<ConditionPoint>> {
        let mut points = Vec::with_capacity(CONDITION_SWEEP.len());
        for &label in CONDITION_SWEEP {
            if !self.encoder.knows_condition(label) {
                continue;
            }
            let price = self.predict(&query.with_condition(label))?;
            points.push(ConditionPoint { condition: label.to_string(), price: round(price) });
        }
        Ok(points)
    }
}

/// Round to the nearest whole currency unit. All reported prices pass
/// through here exactly once.
fn round(value: f64) -> i64 {
    value.round() as i64
}
