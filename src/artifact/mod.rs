mod bundle;

pub use bundle::{load_context, write_bundle, EncoderArtifact};
