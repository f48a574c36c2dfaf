//! Per-example inference records.
//!
//! Each dataset example is paired by position with its prediction, target,
//! and score, then rendered as one JSON object:
//!
//! ```json
//! {"input": {...}, "prediction": ..., "target": ..., "score": 0.2}
//! ```
//!
//! Anything that fails to convert is left out of the object instead of
//! failing the record.

use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use crate::sink::ResultLimit;
use crate::value::coerce::float_to_json;
use crate::value::{Example, Value, ValueCoercer};

/// Model outputs for one logging call, aligned with the dataset by position.
#[derive(Debug, Clone, Default)]
pub struct Inferences {
    pub predictions: Option<Vec<Value>>,
    pub scores: Option<Vec<f64>>,
}

impl Inferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predictions<I, T>(mut self, predictions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.predictions = Some(predictions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_scores(mut self, scores: impl Into<Vec<f64>>) -> Self {
        self.scores = Some(scores.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_none() && self.scores.is_none()
    }
}

/// One example with whatever outputs exist for its position.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRecord<'a> {
    pub input: &'a Example,
    pub prediction: Option<&'a Value>,
    pub target: Option<&'a Value>,
    pub score: Option<f64>,
}

impl<'a> EvaluationRecord<'a> {
    pub fn new(input: &'a Example) -> Self {
        Self {
            input,
            prediction: None,
            target: None,
            score: None,
        }
    }
}

/// Pair examples with predictions, targets, and scores by position.
///
/// The dataset drives the record count (capped by `limit`). A position past
/// the end of a shorter list leaves that field unset.
pub fn zip_records<'a>(
    examples: &'a [Example],
    inferences: &'a Inferences,
    targets: &'a [Value],
    limit: ResultLimit,
) -> Vec<EvaluationRecord<'a>> {
    let predictions = inferences.predictions.as_deref().unwrap_or_default();
    let scores = inferences.scores.as_deref().unwrap_or_default();

    if inferences.predictions.is_some() && predictions.len() != examples.len() {
        debug!(
            examples = examples.len(),
            predictions = predictions.len(),
            "prediction count differs from dataset size"
        );
    }
    if !targets.is_empty() && targets.len() != examples.len() {
        debug!(
            examples = examples.len(),
            targets = targets.len(),
            "target count differs from dataset size"
        );
    }
    if inferences.scores.is_some() && scores.len() != examples.len() {
        debug!(
            examples = examples.len(),
            scores = scores.len(),
            "score count differs from dataset size"
        );
    }

    examples
        .iter()
        .take(limit.take(examples.len()))
        .enumerate()
        .map(|(i, input)| EvaluationRecord {
            input,
            prediction: predictions.get(i),
            target: targets.get(i),
            score: scores.get(i).copied(),
        })
        .collect()
}

/// Renders records as JSON objects.
#[derive(Default)]
pub struct RecordSerializer {
    coercer: ValueCoercer,
}

impl RecordSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coercer(coercer: ValueCoercer) -> Self {
        Self { coercer }
    }

    /// Keys appear as `input`, `prediction`, `target`, `score`.
    pub fn serialize(&self, record: &EvaluationRecord<'_>) -> Map<String, Json> {
        let mut out = Map::new();

        let mut input = Map::new();
        for (name, value) in record.input.iter() {
            match self.coercer.coerce(value) {
                Ok(json) => {
                    input.insert(name.to_string(), json);
                }
                Err(err) => warn!(field = name, "dropping input field: {}", err),
            }
        }
        out.insert("input".to_string(), Json::Object(input));

        if let Some(prediction) = record.prediction {
            match self.coercer.coerce(prediction) {
                Ok(json) => {
                    out.insert("prediction".to_string(), json);
                }
                Err(err) => warn!("dropping prediction: {}", err),
            }
        }

        if let Some(target) = record.target {
            match self.coercer.coerce(target) {
                Ok(json) => {
                    out.insert("target".to_string(), json);
                }
                Err(err) => warn!("dropping target: {}", err),
            }
        }

        if let Some(score) = record.score {
            match float_to_json(score) {
                Ok(json) => {
                    out.insert("score".to_string(), json);
                }
                Err(err) => warn!("dropping score: {}", err),
            }
        }

        out
    }

    pub fn serialize_all(&self, records: &[EvaluationRecord<'_>]) -> Vec<Map<String, Json>> {
        records.iter().map(|r| self.serialize(r)).collect()
    }
}
