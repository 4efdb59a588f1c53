mod forest;

pub use forest::ForestOracle;

use crate::error::Result;
use crate::types::{FeatureVector, SchemaKind};

/// Opaque scoring function over feature vectors. Pure from the caller's
/// perspective; `predict` is read-only over the trained structure and safe
/// to call from concurrent requests.
pub trait PriceOracle: Send + Sync {
    /// Score one feature vector. Fails with `SchemaMismatch` if the
    /// vector's schema or width disagrees with the trained layout — never
    /// returns a garbage prediction.
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Width of the feature vector the model was trained on.
    fn input_width(&self) -> usize;

    /// Schema the model was trained on.
    fn schema(&self) -> SchemaKind;

    /// Model name for logs and the /health endpoint.
    fn name(&self) -> &str;
}
