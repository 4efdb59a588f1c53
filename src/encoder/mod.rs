pub mod tables;

mod feature_encoder;

pub use feature_encoder::{FeatureEncoder, LabelTable};
