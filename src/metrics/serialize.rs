//! Flattening metrics into a JSON object.

use serde_json::{Map, Value as Json};
use tracing::warn;

use super::{Metric, MetricMap};
use crate::value::coerce::float_to_json;

/// Convert metrics into `name -> value`, keeping only scalars and text.
///
/// Unsupported kinds and non-finite scalars are dropped with a warning.
pub fn serialize_metrics(metrics: &MetricMap) -> Map<String, Json> {
    let mut out = Map::new();
    for (name, metric) in metrics {
        let value = match metric {
            Metric::Scalar(v) => match float_to_json(*v) {
                Ok(json) => json,
                Err(err) => {
                    warn!(metric = %name, "dropping scalar metric: {}", err);
                    continue;
                }
            },
            Metric::Text(s) => Json::String(s.clone()),
            other => {
                warn!(
                    metric = %name,
                    kind = other.kind(),
                    "metric kind is not supported by the JSON sink; skipping"
                );
                continue;
            }
        };
        out.insert(name.clone(), value);
    }
    out
}

/// Finite scalar metrics in name order.
pub fn scalar_metrics(metrics: &MetricMap) -> impl Iterator<Item = (&str, f64)> {
    metrics.iter().filter_map(|(name, metric)| match metric {
        Metric::Scalar(v) if v.is_finite() => Some((name.as_str(), *v)),
        _ => None,
    })
}
