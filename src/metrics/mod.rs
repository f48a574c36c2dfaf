//! Typed metric values produced by evaluation.
//!
//! Only [`Metric::Scalar`] and [`Metric::Text`] have a JSON rendering; the
//! richer kinds are meant for sinks that can draw them and are skipped by the
//! JSON sink.

pub mod serialize;

use std::collections::BTreeMap;

use crate::value::NdArray;

pub use self::serialize::{scalar_metrics, serialize_metrics};

/// Named metrics for one logging call.
pub type MetricMap = BTreeMap<String, Metric>;

#[derive(Debug, Clone)]
pub enum Metric {
    Scalar(f64),
    Text(String),
    Image(Image),
    Audio(Audio),
    Histogram(Histogram),
    Generic(Generic),
}

/// Image batch, `[batch, height, width, channels]` or `[height, width, channels]`.
#[derive(Debug, Clone)]
pub struct Image {
    pub image: NdArray,
    pub max_outputs: usize,
}

/// Audio batch with values in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct Audio {
    pub audio: NdArray,
    pub sample_rate: u32,
    pub max_outputs: usize,
}

#[derive(Debug, Clone)]
pub struct Histogram {
    pub values: Vec<f64>,
    pub bins: Option<usize>,
}

/// Arbitrary tensor with sink-specific metadata.
#[derive(Debug, Clone)]
pub struct Generic {
    pub tensor: NdArray,
    pub metadata: Option<String>,
}

impl Metric {
    pub fn scalar(value: impl Into<f64>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn image(image: NdArray) -> Self {
        Self::Image(Image {
            image,
            max_outputs: 3,
        })
    }

    pub fn audio(audio: NdArray, sample_rate: u32) -> Self {
        Self::Audio(Audio {
            audio,
            sample_rate,
            max_outputs: 3,
        })
    }

    pub fn histogram(values: Vec<f64>) -> Self {
        Self::Histogram(Histogram { values, bins: None })
    }

    /// Kind name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Audio(_) => "audio",
            Self::Histogram(_) => "histogram",
            Self::Generic(_) => "generic",
        }
    }
}
