use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// WatchQuery
// ---------------------------------------------------------------------------

/// A single valuation request. Immutable once constructed — every derived
/// scenario is a copy with exactly one field overridden, never a mutation
/// of the original.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchQuery {
    /// Free-text model / reference identifier (e.g. "Submariner 116610LV").
    pub model: String,
    /// Production year. Used unclamped for scoring; only the comparison
    /// sweep applies the (1950, 2027) exclusive bound.
    pub year: i32,
    /// Condition label (e.g. "Very good").
    pub condition: String,
    /// Free-text case material (e.g. "Yellow gold").
    pub material: String,
    pub has_box: bool,
    pub has_papers: bool,
}

impl WatchQuery {
    pub fn with_year(&self, year: i32) -> Self {
        Self { year, ..self.clone() }
    }

    pub fn with_condition(&self, condition: &str) -> Self {
        Self { condition: condition.to_string(), ..self.clone() }
    }

    pub fn with_box(&self, has_box: bool) -> Self {
        Self { has_box, ..self.clone() }
    }

    pub fn with_papers(&self, has_papers: bool) -> Self {
        Self { has_papers, ..self.clone() }
    }
}

// ---------------------------------------------------------------------------
// Feature schema
// ---------------------------------------------------------------------------

/// Which feature layout the deployed model was trained on. The encoder and
/// the oracle must carry the same tag; the artifact loader rejects a bundle
/// whose model and encoder tags disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// 9 values: [year, box, papers, scratches, polished, condition_rank,
    /// material_rank, is_hulk, is_kermit]. Scratches and polished are fixed
    /// at 0 — the request surface does not collect them.
    DerivedFlags,
    /// 6 values: [model_idx, year, condition_idx, material_idx, box, papers]
    /// with indices from the persisted categorical tables.
    LabelEncoded,
}

impl SchemaKind {
    /// Feature vector width this schema produces.
    pub fn width(self) -> usize {
        match self {
            SchemaKind::DerivedFlags => 9,
            SchemaKind::LabelEncoded => 6,
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SchemaKind::DerivedFlags => "derived_flags",
            SchemaKind::LabelEncoded => "label_encoded",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Material classification
// ---------------------------------------------------------------------------

/// Case material collapsed to the three classes the model was trained on.
/// Every input maps to exactly one class; anything outside the known gold
/// and bicolor sets is steel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialClass {
    Steel,
    Gold,
    Bicolor,
}

impl MaterialClass {
    /// Numeric rank used in feature vectors: 0=steel, 1=gold, 2=bicolor.
    pub fn rank(self) -> f64 {
        match self {
            MaterialClass::Steel => 0.0,
            MaterialClass::Gold => 1.0,
            MaterialClass::Bicolor => 2.0,
        }
    }
}

impl std::fmt::Display for MaterialClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MaterialClass::Steel => "steel",
            MaterialClass::Gold => "gold",
            MaterialClass::Bicolor => "bicolor",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// FeatureVector
// ---------------------------------------------------------------------------

/// Ordered numeric encoding of a watch, tagged with the schema that produced
/// it. The oracle refuses a vector whose tag or width disagrees with its own.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: SchemaKind,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(schema: SchemaKind, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), schema.width());
        Self { schema, values }
    }

    pub fn schema(&self) -> SchemaKind {
        self.schema
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> WatchQuery {
        WatchQuery {
            model: "Submariner 116610LV".to_string(),
            year: 2018,
            condition: "Very good".to_string(),
            material: "Steel".to_string(),
            has_box: true,
            has_papers: false,
        }
    }

    #[test]
    fn with_helpers_override_one_field_only() {
        let q = query();

        let y = q.with_year(2013);
        assert_eq!(y.year, 2013);
        assert_eq!(y.with_year(2018), q);

        let c = q.with_condition("Fair");
        assert_eq!(c.condition, "Fair");
        assert_eq!(c.model, q.model);

        let b = q.with_box(false);
        assert!(!b.has_box);
        assert!(!b.has_papers, "papers flag must stay at its queried value");

        let p = q.with_papers(true);
        assert!(p.has_papers);
        assert!(p.has_box, "box flag must stay at its queried value");
    }

    #[test]
    fn schema_widths() {
        assert_eq!(SchemaKind::DerivedFlags.width(), 9);
        assert_eq!(SchemaKind::LabelEncoded.width(), 6);
    }

    #[test]
    fn schema_kind_serde_tags() {
        let json = serde_json::to_string(&SchemaKind::DerivedFlags).unwrap();
        assert_eq!(json, "\"derived_flags\"");
        let back: SchemaKind = serde_json::from_str("\"label_encoded\"").unwrap();
        assert_eq!(back, SchemaKind::LabelEncoded);
    }
}
