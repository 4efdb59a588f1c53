use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{AppError, Result};
use crate::oracle::PriceOracle;
use crate::types::{FeatureVector, SchemaKind};

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Random-forest price oracle. Deserialized from the model artifact at
/// startup; the forest itself is immutable after fit, so sharing one
/// instance across request tasks needs no locking.
#[derive(Debug, Serialize, Deserialize)]
pub struct ForestOracle {
    schema: SchemaKind,
    name: String,
    forest: Forest,
}

impl ForestOracle {
    /// Fit a forest on pre-encoded rows. `x` rows must all have the
    /// schema's width.
    pub fn fit(
        schema: SchemaKind,
        name: &str,
        x: &[Vec<f64>],
        y: &[f64],
        params: RandomForestRegressorParameters,
    ) -> Result<Self> {
        if let Some(row) = x.iter().find(|r| r.len() != schema.width()) {
            return Err(AppError::SchemaMismatch(format!(
                "training row has width {}, schema {schema} expects {}",
                row.len(),
                schema.width(),
            )));
        }
        let matrix = DenseMatrix::from_2d_vec(&x.to_vec());
        let forest = Forest::fit(&matrix, &y.to_vec(), params)
            .map_err(|e| AppError::Model(e.to_string()))?;
        Ok(Self { schema, name: name.to_string(), forest })
    }
}

impl PriceOracle for ForestOracle {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if features.schema() != self.schema {
            return Err(AppError::SchemaMismatch(format!(
                "vector schema {} does not match model schema {}",
                features.schema(),
                self.schema,
            )));
        }
        if features.width() != self.schema.width() {
            return Err(AppError::SchemaMismatch(format!(
                "vector width {} does not match model input width {}",
                features.width(),
                self.schema.width(),
            )));
        }
        let matrix = DenseMatrix::from_2d_vec(&vec![features.values().to_vec()]);
        let out = self
            .forest
            .predict(&matrix)
            .map_err(|e| AppError::Model(e.to_string()))?;
        out.first()
            .copied()
            .ok_or_else(|| AppError::Model("regressor returned no prediction".to_string()))
    }

    fn input_width(&self) -> usize {
        self.schema.width()
    }

    fn schema(&self) -> SchemaKind {
        self.schema
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small derived-flags forest where price tracks year and box flag.
    fn tiny_oracle() -> ForestOracle {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for year in (1990..2026).step_by(2) {
            for has_box in [0.0, 1.0] {
                x.push(vec![year as f64, has_box, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0]);
                y.push((year as f64 - 1990.0) * 100.0 + has_box * 500.0 + 5000.0);
            }
        }
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(10)
            .with_seed(42);
        ForestOracle::fit(SchemaKind::DerivedFlags, "tiny", &x, &y, params).unwrap()
    }

    #[test]
    fn predicts_a_finite_price() {
        let oracle = tiny_oracle();
        let v = FeatureVector::new(
            SchemaKind::DerivedFlags,
            vec![2018.0, 1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0],
        );
        let price = oracle.predict(&v).unwrap();
        assert!(price.is_finite());
        assert!(price > 0.0, "price={price}");
    }

    #[test]
    fn rejects_wrong_schema() {
        let oracle = tiny_oracle();
        let v = FeatureVector::new(
            SchemaKind::LabelEncoded,
            vec![0.0, 2018.0, 1.0, 0.0, 1.0, 0.0],
        );
        match oracle.predict(&v) {
            Err(AppError::SchemaMismatch(msg)) => {
                assert!(msg.contains("label_encoded"), "msg={msg}");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn fit_rejects_misshapen_rows() {
        let x = vec![vec![2018.0, 1.0]];
        let y = vec![10_000.0];
        let result = ForestOracle::fit(
            SchemaKind::DerivedFlags,
            "bad",
            &x,
            &y,
            RandomForestRegressorParameters::default(),
        );
        assert!(matches!(result, Err(AppError::SchemaMismatch(_))));
    }

    #[test]
    fn serializes_and_round_trips() {
        let oracle = tiny_oracle();
        let v = FeatureVector::new(
            SchemaKind::DerivedFlags,
            vec![2010.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0],
        );
        let before = oracle.predict(&v).unwrap();

        let json = serde_json::to_string(&oracle).unwrap();
        let restored: ForestOracle = serde_json::from_str(&json).unwrap();
        let after = restored.predict(&v).unwrap();
        assert!((before - after).abs() < 1e-9, "before={before} after={after}");
    }
}
