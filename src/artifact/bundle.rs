//! Artifact bundle: three JSON files produced by the `train` binary and
//! consumed by the server at startup. Loading is the only blocking file I/O
//! in the process; any failure here aborts startup so the service never
//! runs against a partial or mismatched bundle.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::encoder::{FeatureEncoder, LabelTable};
use crate::error::{AppError, Result};
use crate::oracle::{ForestOracle, PriceOracle};
use crate::state::{AppContext, DatasetStats};
use crate::types::{SchemaKind, WatchQuery};

// ---------------------------------------------------------------------------
// Encoder artifact
// ---------------------------------------------------------------------------

/// Persisted form of the feature encoder, tagged with its schema so the
/// loader can check it against the model artifact's tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum EncoderArtifact {
    DerivedFlags {
        /// Known model names for the /models listing.
        models: Vec<String>,
    },
    LabelEncoded {
        /// Labels in index order, one list per categorical field.
        model: Vec<String>,
        condition: Vec<String>,
        material: Vec<String>,
    },
}

impl EncoderArtifact {
    pub fn schema(&self) -> SchemaKind {
        match self {
            EncoderArtifact::DerivedFlags { .. } => SchemaKind::DerivedFlags,
            EncoderArtifact::LabelEncoded { .. } => SchemaKind::LabelEncoded,
        }
    }

    pub fn into_encoder(self) -> FeatureEncoder {
        match self {
            EncoderArtifact::DerivedFlags { models } => FeatureEncoder::DerivedFlags { models },
            EncoderArtifact::LabelEncoded { model, condition, material } => {
                FeatureEncoder::LabelEncoded {
                    model: LabelTable::from_labels(model),
                    condition: LabelTable::from_labels(condition),
                    material: LabelTable::from_labels(material),
                }
            }
        }
    }

    pub fn from_encoder(encoder: &FeatureEncoder) -> Self {
        match encoder {
            FeatureEncoder::DerivedFlags { models } => {
                EncoderArtifact::DerivedFlags { models: models.clone() }
            }
            FeatureEncoder::LabelEncoded { model, condition, material } => {
                EncoderArtifact::LabelEncoded {
                    model: model.labels().to_vec(),
                    condition: condition.labels().to_vec(),
                    material: material.labels().to_vec(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and validate the full bundle. Checks, in order: files readable and
/// parseable, model and encoder schema tags agree, and one probe prediction
/// succeeds — so a mis-sized forest fails here instead of on the first
/// request.
pub fn load_context(cfg: &Config) -> Result<AppContext> {
    let oracle: ForestOracle = read_json(&cfg.model_path())?;
    let encoder_artifact: EncoderArtifact = read_json(&cfg.encoder_path())?;
    let stats: DatasetStats = read_json(&cfg.stats_path())?;

    if oracle.schema() != encoder_artifact.schema() {
        return Err(AppError::SchemaMismatch(format!(
            "model artifact is {} but encoder artifact is {}",
            oracle.schema(),
            encoder_artifact.schema(),
        )));
    }

    let encoder = encoder_artifact.into_encoder();
    let ctx = AppContext::new(encoder, Box::new(oracle), stats);

    let probe = probe_query(&ctx.encoder)?;
    let price = ctx.oracle.predict(&ctx.encoder.encode(&probe)?)?;
    if !price.is_finite() {
        return Err(AppError::ArtifactLoad(format!(
            "probe prediction returned a non-finite price ({price})"
        )));
    }
    info!(
        model = ctx.oracle.name(),
        schema = %ctx.oracle.schema(),
        width = ctx.oracle.input_width(),
        probe_price = price,
        "Artifact bundle loaded"
    );
    Ok(ctx)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::ArtifactLoad(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::ArtifactLoad(format!("{}: {e}", path.display())))
}

/// A query the loaded encoder is guaranteed to accept. The label-encoded
/// variant pulls the first label of each trained table; empty tables are a
/// load error.
fn probe_query(encoder: &FeatureEncoder) -> Result<WatchQuery> {
    let (model, condition, material) = match encoder {
        FeatureEncoder::DerivedFlags { .. } => {
            ("Submariner".to_string(), "Good".to_string(), "Steel".to_string())
        }
        FeatureEncoder::LabelEncoded { model, condition, material } => {
            let first = |table: &LabelTable, name: &str| -> Result<String> {
                table
                    .labels()
                    .first()
                    .cloned()
                    .ok_or_else(|| AppError::ArtifactLoad(format!("encoder {name} table is empty")))
            };
            (first(model, "model")?, first(condition, "condition")?, first(material, "material")?)
        }
    };
    Ok(WatchQuery {
        model,
        year: 2015,
        condition,
        material,
        has_box: false,
        has_papers: false,
    })
}

// ---------------------------------------------------------------------------
// Writing (train binary)
// ---------------------------------------------------------------------------

/// Persist a trained bundle. Creates the data directory if missing.
pub fn write_bundle(
    cfg: &Config,
    oracle: &ForestOracle,
    encoder: &FeatureEncoder,
    stats: &DatasetStats,
) -> Result<()> {
    std::fs::create_dir_all(&cfg.data_dir)?;
    write_json(&cfg.model_path(), oracle)?;
    write_json(&cfg.encoder_path(), &EncoderArtifact::from_encoder(encoder))?;
    write_json(&cfg.stats_path(), stats)?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    std::fs::write(path, raw)?;
    Ok(())
}
