use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::scenario::Valuation;
use crate::state::AppContext;
use crate::types::WatchQuery;

#[derive(Clone)]
pub struct ApiState {
    pub ctx: Arc<AppContext>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/models", get(get_models))
        .route("/predict", post(post_predict))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
    schema: String,
}

#[derive(Serialize)]
struct ModelsResponse {
    models: Vec<String>,
}

#[derive(Serialize)]
struct RangeDto {
    min: i64,
    max: i64,
}

#[derive(Serialize)]
struct ImpactDto {
    #[serde(rename = "box")]
    box_delta: i64,
    papers: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct YearPointDto {
    year: i32,
    price: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConditionPointDto {
    condition: String,
    price: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeriesDto {
    by_year: Vec<YearPointDto>,
    by_condition: Vec<ConditionPointDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsDto {
    count: u64,
    average_price: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictResponse {
    success: bool,
    price_estimated: i64,
    price_base: i64,
    range: RangeDto,
    impact: ImpactDto,
    series: SeriesDto,
    stats: StatsDto,
}

impl From<Valuation> for PredictResponse {
    fn from(v: Valuation) -> Self {
        PredictResponse {
            success: true,
            price_estimated: v.price_estimated,
            price_base: v.price_base,
            range: RangeDto { min: v.range.min, max: v.range.max },
            impact: ImpactDto {
                box_delta: v.impact.box_delta,
                papers: v.impact.papers_delta,
            },
            series: SeriesDto {
                by_year: v
                    .by_year
                    .into_iter()
                    .map(|p| YearPointDto { year: p.year, price: p.price })
                    .collect(),
                by_condition: v
                    .by_condition
                    .into_iter()
                    .map(|p| ConditionPointDto { condition: p.condition, price: p.price })
                    .collect(),
            },
            stats: StatsDto { count: v.dataset_count, average_price: v.dataset_avg_price },
        }
    }
}

// ---------------------------------------------------------------------------
// Request validation
// ---------------------------------------------------------------------------

/// Validate a raw JSON body into a `WatchQuery`. Done by hand rather than
/// through a typed extractor so every failure surfaces as the tagged
/// failure payload with a message naming the offending field.
fn parse_query(body: &Value) -> Result<WatchQuery> {
    let obj = body
        .as_object()
        .ok_or_else(|| AppError::Validation("request body must be a JSON object".to_string()))?;

    let model = require_str(obj, "model")?;
    let condition = require_str(obj, "condition")?;
    let material = require_str(obj, "material")?;

    let year_value = obj
        .get("year")
        .ok_or_else(|| AppError::Validation("missing required field: year".to_string()))?;
    let year = parse_year(year_value)?;

    Ok(WatchQuery {
        model,
        year,
        condition,
        material,
        has_box: optional_flag(obj, "hasBox")?,
        has_papers: optional_flag(obj, "hasPapers")?,
    })
}

fn require_str(obj: &serde_json::Map<String, Value>, field: &str) -> Result<String> {
    let value = obj
        .get(field)
        .ok_or_else(|| AppError::Validation(format!("missing required field: {field}")))?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation(format!("field {field} must be a string")))
}

/// Accepts a JSON integer or a string holding one (the original frontend
/// sends either).
fn parse_year(value: &Value) -> Result<i32> {
    let err = || AppError::Validation("field year must be an integer".to_string());
    match value {
        Value::Number(n) => {
            let y = n.as_i64().ok_or_else(err)?;
            i32::try_from(y).map_err(|_| err())
        }
        Value::String(s) => s.trim().parse::<i32>().map_err(|_| err()),
        _ => Err(err()),
    }
}

fn optional_flag(obj: &serde_json::Map<String, Value>, field: &str) -> Result<bool> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(AppError::Validation(format!("field {field} must be a boolean"))),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.ctx.oracle.name().to_string(),
        schema: state.ctx.oracle.schema().to_string(),
    })
}

async fn get_models(State(state): State<ApiState>) -> Json<ModelsResponse> {
    Json(ModelsResponse { models: state.ctx.encoder.known_models() })
}

async fn post_predict(
    State(state): State<ApiState>,
    Json(body): Json<Value>,
) -> Result<Json<PredictResponse>> {
    let query = parse_query(&body)?;
    let valuation = state.ctx.valuer().value(&query)?;
    Ok(Json(valuation.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{AccessoryImpact, ConditionPoint, PriceRange, YearPoint};
    use serde_json::json;

    #[test]
    fn parses_a_full_payload() {
        let body = json!({
            "model": "116610LV",
            "year": 2018,
            "condition": "Very good",
            "material": "Steel",
            "hasBox": true,
            "hasPapers": false
        });
        let q = parse_query(&body).unwrap();
        assert_eq!(q.model, "116610LV");
        assert_eq!(q.year, 2018);
        assert_eq!(q.condition, "Very good");
        assert_eq!(q.material, "Steel");
        assert!(q.has_box);
        assert!(!q.has_papers);
    }

    #[test]
    fn accessory_flags_default_to_false() {
        let body = json!({
            "model": "16610",
            "year": 1995,
            "condition": "Good",
            "material": "Steel"
        });
        let q = parse_query(&body).unwrap();
        assert!(!q.has_box);
        assert!(!q.has_papers);
    }

    #[test]
    fn year_accepts_a_numeric_string() {
        let body = json!({
            "model": "16610",
            "year": "1995",
            "condition": "Good",
            "material": "Steel"
        });
        assert_eq!(parse_query(&body).unwrap().year, 1995);
    }

    #[test]
    fn missing_fields_are_named_in_the_error() {
        for field in ["model", "year", "condition", "material"] {
            let mut body = json!({
                "model": "16610",
                "year": 1995,
                "condition": "Good",
                "material": "Steel"
            });
            body.as_object_mut().unwrap().remove(field);
            match parse_query(&body) {
                Err(AppError::Validation(msg)) => {
                    assert!(msg.contains(field), "field={field} msg={msg}");
                }
                other => panic!("expected Validation for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_integer_year_rejected() {
        for year in [json!("next year"), json!(2018.5), json!(true), json!(null)] {
            let body = json!({
                "model": "16610",
                "year": year,
                "condition": "Good",
                "material": "Steel"
            });
            assert!(
                matches!(parse_query(&body), Err(AppError::Validation(_))),
                "year={year}"
            );
        }
    }

    #[test]
    fn non_boolean_flag_rejected() {
        let body = json!({
            "model": "16610",
            "year": 1995,
            "condition": "Good",
            "material": "Steel",
            "hasBox": "yes"
        });
        match parse_query(&body) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("hasBox"), "msg={msg}"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn non_object_body_rejected() {
        assert!(matches!(
            parse_query(&json!([1, 2, 3])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn response_wire_shape() {
        let valuation = Valuation {
            price_estimated: 17_500,
            price_base: 16_800,
            range: PriceRange { min: 14_350, max: 20_650 },
            impact: AccessoryImpact { box_delta: 700, papers_delta: 0 },
            by_year: vec![YearPoint { year: 2013, price: 17_000 }],
            by_condition: vec![ConditionPoint { condition: "Unworn".to_string(), price: 18_500 }],
            dataset_count: 81_725,
            dataset_avg_price: 13_481,
        };
        let resp: PredictResponse = valuation.into();
        let v = serde_json::to_value(&resp).unwrap();

        assert_eq!(v["success"], json!(true));
        assert_eq!(v["priceEstimated"], json!(17_500));
        assert_eq!(v["priceBase"], json!(16_800));
        assert_eq!(v["range"]["min"], json!(14_350));
        assert_eq!(v["impact"]["box"], json!(700));
        assert_eq!(v["impact"]["papers"], json!(0));
        assert_eq!(v["series"]["byYear"][0]["year"], json!(2013));
        assert_eq!(v["series"]["byCondition"][0]["condition"], json!("Unworn"));
        assert_eq!(v["stats"]["count"], json!(81_725));
        assert_eq!(v["stats"]["averagePrice"], json!(13_481));
    }
}
