//! `billetscan-protocol` — the classification service's response contract.
//!
//! The service answers `POST /predict-file` with:
//!
//! ```json
//! {
//!   "predictions": [ { "diagonal": 171.8, ..., "label": "Vrai" }, ... ],
//!   "stats": { "total": 4, "n_true": 3, "n_false": 1 }
//! }
//! ```
//!
//! Deserialization goes through an explicit parse-and-validate step
//! ([`PredictionResponse::from_json`]) rather than ad-hoc field access:
//! a success body that doesn't match the contract is a [`ShapeError`],
//! never a silently defaulted value.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification verdict for one banknote sample.
///
/// Wire spellings are frozen: `"Vrai"` (authentic) / `"Faux"`
/// (counterfeit). Anything else in a response is a shape error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Vrai,
    Faux,
}

impl Label {
    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "Vrai" => Some(Label::Vrai),
            "Faux" => Some(Label::Faux),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Vrai => "Vrai",
            Label::Faux => "Faux",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified row: the echoed feature values plus the verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    /// Feature name → value, in the order the service emitted them.
    pub features: Vec<(String, f64)>,
    pub label: Label,
}

impl PredictionRecord {
    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// Service-computed counts. Carried for display but never trusted for
/// ratios — aggregation recounts from the labels (`billetscan-report`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStats {
    pub total: u64,
    pub n_true: u64,
    pub n_false: u64,
}

/// A validated service response.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResponse {
    /// Per-row verdicts. `predictions[i]` corresponds to row `i` of the
    /// uploaded table — the contract carries no per-row identifier, so
    /// index alignment is the only correspondence and a reordered
    /// response is undetectable beyond a length check.
    pub predictions: Vec<PredictionRecord>,
    pub stats: ServiceStats,
}

/// A 2xx body that doesn't match the response contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// A top-level key is absent.
    MissingField(&'static str),
    /// A top-level key holds the wrong JSON type.
    WrongType { field: &'static str, expected: &'static str },
    /// One prediction record is malformed.
    Record { index: usize, message: String },
    /// A stats key is absent or not a non-negative integer.
    Stats { field: &'static str },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "response is missing '{field}'"),
            Self::WrongType { field, expected } => {
                write!(f, "response field '{field}' is not {expected}")
            }
            Self::Record { index, message } => {
                write!(f, "prediction {index}: {message}")
            }
            Self::Stats { field } => {
                write!(f, "response stats field '{field}' is missing or not an integer")
            }
        }
    }
}

impl std::error::Error for ShapeError {}

impl PredictionResponse {
    /// Validate a parsed JSON body against the response contract.
    pub fn from_json(value: &Value) -> Result<Self, ShapeError> {
        let root = value.as_object().ok_or(ShapeError::WrongType {
            field: "response",
            expected: "a JSON object",
        })?;

        let predictions_val = root
            .get("predictions")
            .ok_or(ShapeError::MissingField("predictions"))?;
        let predictions_arr = predictions_val.as_array().ok_or(ShapeError::WrongType {
            field: "predictions",
            expected: "an array",
        })?;

        let mut predictions = Vec::with_capacity(predictions_arr.len());
        for (index, record) in predictions_arr.iter().enumerate() {
            predictions.push(parse_record(record, index)?);
        }

        let stats_val = root.get("stats").ok_or(ShapeError::MissingField("stats"))?;
        let stats_obj = stats_val.as_object().ok_or(ShapeError::WrongType {
            field: "stats",
            expected: "an object",
        })?;
        let stats = ServiceStats {
            total: stat_field(stats_obj, "total")?,
            n_true: stat_field(stats_obj, "n_true")?,
            n_false: stat_field(stats_obj, "n_false")?,
        };

        Ok(PredictionResponse { predictions, stats })
    }
}

fn parse_record(value: &Value, index: usize) -> Result<PredictionRecord, ShapeError> {
    let obj = value.as_object().ok_or_else(|| ShapeError::Record {
        index,
        message: "not a JSON object".into(),
    })?;

    let label_val = obj.get("label").ok_or_else(|| ShapeError::Record {
        index,
        message: "missing 'label'".into(),
    })?;
    let label_str = label_val.as_str().ok_or_else(|| ShapeError::Record {
        index,
        message: "'label' is not a string".into(),
    })?;
    let label = Label::from_wire(label_str).ok_or_else(|| ShapeError::Record {
        index,
        message: format!("unknown label '{label_str}' (expected 'Vrai' or 'Faux')"),
    })?;

    let mut features = Vec::with_capacity(obj.len().saturating_sub(1));
    for (key, val) in obj {
        if key == "label" {
            continue;
        }
        let num = val.as_f64().ok_or_else(|| ShapeError::Record {
            index,
            message: format!("feature '{key}' is not a number"),
        })?;
        features.push((key.clone(), num));
    }

    Ok(PredictionRecord { features, label })
}

fn stat_field(obj: &serde_json::Map<String, Value>, field: &'static str) -> Result<u64, ShapeError> {
    obj.get(field)
        .and_then(Value::as_u64)
        .ok_or(ShapeError::Stats { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn well_formed() -> Value {
        json!({
            "predictions": [
                { "diagonal": 171.81, "length": 112.83, "label": "Vrai" },
                { "diagonal": 171.46, "length": 111.42, "label": "Faux" }
            ],
            "stats": { "total": 2, "n_true": 1, "n_false": 1 }
        })
    }

    #[test]
    fn parses_well_formed_response() {
        let resp = PredictionResponse::from_json(&well_formed()).unwrap();
        assert_eq!(resp.predictions.len(), 2);
        assert_eq!(resp.predictions[0].label, Label::Vrai);
        assert_eq!(resp.predictions[0].feature("diagonal"), Some(171.81));
        assert_eq!(resp.predictions[1].label, Label::Faux);
        assert_eq!(resp.stats, ServiceStats { total: 2, n_true: 1, n_false: 1 });
    }

    #[test]
    fn feature_order_preserved() {
        let resp = PredictionResponse::from_json(&well_formed()).unwrap();
        let names: Vec<&str> = resp.predictions[0]
            .features
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(names, vec!["diagonal", "length"]);
    }

    #[test]
    fn missing_predictions_is_shape_error() {
        let body = json!({ "stats": { "total": 0, "n_true": 0, "n_false": 0 } });
        let err = PredictionResponse::from_json(&body).unwrap_err();
        assert_eq!(err, ShapeError::MissingField("predictions"));
    }

    #[test]
    fn missing_stats_is_shape_error() {
        let body = json!({ "predictions": [] });
        let err = PredictionResponse::from_json(&body).unwrap_err();
        assert_eq!(err, ShapeError::MissingField("stats"));
    }

    #[test]
    fn predictions_must_be_array() {
        let body = json!({ "predictions": 3, "stats": { "total": 0, "n_true": 0, "n_false": 0 } });
        let err = PredictionResponse::from_json(&body).unwrap_err();
        assert_eq!(err, ShapeError::WrongType { field: "predictions", expected: "an array" });
    }

    #[test]
    fn unknown_label_rejected() {
        let body = json!({
            "predictions": [ { "diagonal": 1.0, "label": "Peut-être" } ],
            "stats": { "total": 1, "n_true": 0, "n_false": 0 }
        });
        let err = PredictionResponse::from_json(&body).unwrap_err();
        assert!(matches!(err, ShapeError::Record { index: 0, .. }));
        assert!(err.to_string().contains("Peut-être"));
    }

    #[test]
    fn non_numeric_feature_rejected() {
        let body = json!({
            "predictions": [ { "diagonal": "wide", "label": "Vrai" } ],
            "stats": { "total": 1, "n_true": 1, "n_false": 0 }
        });
        let err = PredictionResponse::from_json(&body).unwrap_err();
        assert!(err.to_string().contains("'diagonal' is not a number"));
    }

    #[test]
    fn ill_typed_stats_rejected() {
        let body = json!({
            "predictions": [],
            "stats": { "total": "zero", "n_true": 0, "n_false": 0 }
        });
        let err = PredictionResponse::from_json(&body).unwrap_err();
        assert_eq!(err, ShapeError::Stats { field: "total" });
    }
}
