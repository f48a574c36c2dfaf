//! Ordered coercion strategies from [`Value`] to JSON.
//!
//! A [`ValueCoercer`] holds a fixed list of [`Coercion`] strategies. Each is
//! asked in turn whether it handles a value; the first that does decides the
//! outcome. The standard order is numeric scalar, numeric array, byte
//! sequence, string, and finally a fallback that rejects everything.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Number, Value as Json};
use thiserror::Error;

use super::array::{Element, NdArray};
use super::Value;

/// A value with no JSON representation. Callers omit the field.
#[derive(Error, Debug, Clone)]
pub enum Unsupported {
    #[error("non-finite number {0} has no JSON representation")]
    NonFinite(f64),

    #[error("no conversion rule for object of type {type_name}")]
    Opaque { type_name: &'static str },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<Unsupported>,
    },
}

/// One conversion rule.
pub trait Coercion: Send + Sync {
    /// Strategy name for diagnostics.
    fn name(&self) -> &'static str;

    /// `None` when this strategy does not handle the value's kind; the next
    /// strategy is asked instead. `coercer` resolves nested values.
    fn try_coerce(&self, value: &Value, coercer: &ValueCoercer) -> Option<Result<Json, Unsupported>>;
}

/// Numbers, booleans, and zero-dimensional arrays.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericScalar;

impl Coercion for NumericScalar {
    fn name(&self) -> &'static str {
        "numeric-scalar"
    }

    fn try_coerce(&self, value: &Value, _: &ValueCoercer) -> Option<Result<Json, Unsupported>> {
        match value {
            Value::Bool(b) => Some(Ok(Json::Bool(*b))),
            Value::Int(i) => Some(Ok(Json::from(*i))),
            Value::Float(f) => Some(float_to_json(*f)),
            Value::Array(array) if array.ndim() == 0 => {
                Some(element_to_json(array.data().element(0)))
            }
            _ => None,
        }
    }
}

/// Dense arrays and ragged sequences, emitted as nested JSON arrays.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericArray;

impl Coercion for NumericArray {
    fn name(&self) -> &'static str {
        "numeric-array"
    }

    fn try_coerce(&self, value: &Value, coercer: &ValueCoercer) -> Option<Result<Json, Unsupported>> {
        match value {
            Value::Array(array) => Some(nest(array, 0, 0)),
            Value::Seq(items) => Some(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        coercer.coerce(item).map_err(|source| Unsupported::Element {
                            index,
                            source: Box::new(source),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Json::Array),
            ),
            _ => None,
        }
    }
}

/// Raw bytes as standard base64.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteSequence;

impl Coercion for ByteSequence {
    fn name(&self) -> &'static str {
        "byte-sequence"
    }

    fn try_coerce(&self, value: &Value, _: &ValueCoercer) -> Option<Result<Json, Unsupported>> {
        match value {
            Value::Bytes(bytes) => Some(Ok(Json::String(STANDARD.encode(bytes)))),
            _ => None,
        }
    }
}

/// Strings pass through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Text;

impl Coercion for Text {
    fn name(&self) -> &'static str {
        "text"
    }

    fn try_coerce(&self, value: &Value, _: &ValueCoercer) -> Option<Result<Json, Unsupported>> {
        match value {
            Value::Str(s) => Some(Ok(Json::String(s.clone()))),
            _ => None,
        }
    }
}

/// Rejects whatever reaches it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fallback;

impl Coercion for Fallback {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn try_coerce(&self, value: &Value, _: &ValueCoercer) -> Option<Result<Json, Unsupported>> {
        let type_name = match value {
            Value::Opaque(object) => object.type_name(),
            other => other.kind(),
        };
        Some(Err(Unsupported::Opaque { type_name }))
    }
}

/// Converts values by asking each strategy in order.
pub struct ValueCoercer {
    strategies: Vec<Box<dyn Coercion>>,
}

impl ValueCoercer {
    /// The standard strategy order.
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(NumericScalar),
                Box::new(NumericArray),
                Box::new(ByteSequence),
                Box::new(Text),
                Box::new(Fallback),
            ],
        }
    }

    /// Add a strategy ahead of the fallback, e.g. one that downcasts a known
    /// [`Value::Opaque`] type.
    pub fn with_strategy(mut self, strategy: Box<dyn Coercion>) -> Self {
        let at = self.strategies.len().saturating_sub(1);
        self.strategies.insert(at, strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn coerce(&self, value: &Value) -> Result<Json, Unsupported> {
        for strategy in &self.strategies {
            if let Some(outcome) = strategy.try_coerce(value, self) {
                return outcome;
            }
        }
        Fallback
            .try_coerce(value, self)
            .unwrap_or(Err(Unsupported::Opaque {
                type_name: value.kind(),
            }))
    }
}

impl Default for ValueCoercer {
    fn default() -> Self {
        Self::new()
    }
}

/// Coerce with the standard strategy order.
pub fn coerce(value: &Value) -> Result<Json, Unsupported> {
    static STANDARD_COERCER: OnceLock<ValueCoercer> = OnceLock::new();
    STANDARD_COERCER.get_or_init(ValueCoercer::new).coerce(value)
}

pub(crate) fn float_to_json(f: f64) -> Result<Json, Unsupported> {
    Number::from_f64(f)
        .map(Json::Number)
        .ok_or(Unsupported::NonFinite(f))
}

fn element_to_json(element: Element) -> Result<Json, Unsupported> {
    match element {
        Element::Float(f) => float_to_json(f),
        Element::Int(i) => Ok(Json::from(i)),
        Element::Bool(b) => Ok(Json::Bool(b)),
    }
}

/// Walk `array` from dimension `dim`, starting at flat `offset`.
fn nest(array: &NdArray, dim: usize, offset: usize) -> Result<Json, Unsupported> {
    if dim == array.ndim() {
        return element_to_json(array.data().element(offset));
    }
    let stride = array.stride(dim);
    (0..array.shape()[dim])
        .map(|i| nest(array, dim + 1, offset + i * stride))
        .collect::<Result<Vec<_>, _>>()
        .map(Json::Array)
}
