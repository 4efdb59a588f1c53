use std::collections::HashMap;

use crate::encoder::tables;
use crate::error::{AppError, Result};
use crate::types::{FeatureVector, SchemaKind, WatchQuery};

// ---------------------------------------------------------------------------
// LabelTable
// ---------------------------------------------------------------------------

/// Categorical label table for the label-encoded schema. Labels are stored
/// in index order; lookup is exact-match, matching how the table was fit at
/// training time. An unknown label is a hard error — index 0 is a real
/// category, so there is no safe default.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelTable {
    /// Build from labels already in index order (as persisted in the
    /// encoder artifact).
    pub fn from_labels(labels: Vec<String>) -> Self {
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        Self { labels, index }
    }

    /// Fit a table from raw values: unique labels, sorted ascending, so
    /// index assignment matches the training encoder's behavior.
    pub fn fit<'a, I: IntoIterator<Item = &'a str>>(values: I) -> Self {
        let mut labels: Vec<String> = values.into_iter().map(|s| s.to_string()).collect();
        labels.sort();
        labels.dedup();
        Self::from_labels(labels)
    }

    pub fn encode(&self, field: &'static str, label: &str) -> Result<usize> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| AppError::UnknownCategory { field, value: label.to_string() })
    }

    pub fn decode(&self, idx: usize) -> Option<&str> {
        self.labels.get(idx).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FeatureEncoder
// ---------------------------------------------------------------------------

/// Maps a `WatchQuery` to the fixed-order vector the deployed model was
/// trained on. Exactly one variant is active per deployment; the artifact
/// loader guarantees the oracle carries the same schema tag.
#[derive(Debug, Clone)]
pub enum FeatureEncoder {
    /// 9-feature schema: categorical fields collapse to ranks and derived
    /// flags, so encoding never fails.
    DerivedFlags {
        /// Known model names, kept for the /models listing.
        models: Vec<String>,
    },
    /// 6-feature schema: categorical fields index into persisted tables.
    LabelEncoded {
        model: LabelTable,
        condition: LabelTable,
        material: LabelTable,
    },
}

impl FeatureEncoder {
    pub fn schema(&self) -> SchemaKind {
        match self {
            FeatureEncoder::DerivedFlags { .. } => SchemaKind::DerivedFlags,
            FeatureEncoder::LabelEncoded { .. } => SchemaKind::LabelEncoded,
        }
    }

    /// Encode a query into the active schema's vector.
    ///
    /// Field order is fixed by the trained model and must not change:
    /// - derived_flags: [year, box, papers, scratches, polished,
    ///   condition_rank, material_rank, is_hulk, is_kermit]
    /// - label_encoded: [model_idx, year, condition_idx, material_idx,
    ///   box, papers]
    pub fn encode(&self, query: &WatchQuery) -> Result<FeatureVector> {
        match self {
            FeatureEncoder::DerivedFlags { .. } => {
                let values = vec![
                    query.year as f64,
                    bool_flag(query.has_box),
                    bool_flag(query.has_papers),
                    0.0, // scratches: not collected by the request surface
                    0.0, // polished: not collected by the request surface
                    tables::condition_rank(&query.condition),
                    tables::material_class(&query.material).rank(),
                    bool_flag(tables::is_hulk(&query.model)),
                    bool_flag(tables::is_kermit(&query.model)),
                ];
                Ok(FeatureVector::new(SchemaKind::DerivedFlags, values))
            }
            FeatureEncoder::LabelEncoded { model, condition, material } => {
                let values = vec![
                    model.encode("model", &query.model)? as f64,
                    query.year as f64,
                    condition.encode("condition", &query.condition)? as f64,
                    material.encode("material", &query.material)? as f64,
                    bool_flag(query.has_box),
                    bool_flag(query.has_papers),
                ];
                Ok(FeatureVector::new(SchemaKind::LabelEncoded, values))
            }
        }
    }

    /// Sorted model names for the /models listing.
    pub fn known_models(&self) -> Vec<String> {
        let mut models = match self {
            FeatureEncoder::DerivedFlags { models } => models.clone(),
            FeatureEncoder::LabelEncoded { model, .. } => model.labels().to_vec(),
        };
        models.sort();
        models
    }

    /// Whether the condition label can be encoded. Always true under the
    /// derived-flags schema (unknown labels fall back to rank 1); the
    /// label-encoded schema is bounded by its trained table.
    pub fn knows_condition(&self, label: &str) -> bool {
        match self {
            FeatureEncoder::DerivedFlags { .. } => true,
            FeatureEncoder::LabelEncoded { condition, .. } => condition.contains(label),
        }
    }
}

fn bool_flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
