//! Untyped evaluation values and their conversion to JSON.
//!
//! Evaluation loops hand over whatever the model and dataset produced:
//! numbers, strings, raw bytes, dense arrays, ragged nested sequences, or
//! arbitrary objects. [`Value`] captures each of these explicitly, and
//! [`ValueCoercer`] turns them into `serde_json::Value` or reports that no
//! conversion exists.
//!
//! # Example
//!
//! ```
//! use evallog::value::{coerce, NdArray, Value};
//!
//! let prediction = Value::from(NdArray::zeros(vec![2, 2]));
//! assert_eq!(
//!     coerce(&prediction).unwrap(),
//!     serde_json::json!([[0.0, 0.0], [0.0, 0.0]])
//! );
//!
//! assert_eq!(coerce(&Value::bytes([0x99])).unwrap(), "mQ==");
//! assert!(coerce(&Value::opaque(std::time::Instant::now())).is_err());
//! ```

pub mod array;
pub mod coerce;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

pub use self::array::{ArrayData, Element, NdArray, ShapeError};
pub use self::coerce::{
    coerce, ByteSequence, Coercion, Fallback, NumericArray, NumericScalar, Text, Unsupported,
    ValueCoercer,
};

/// A single field, prediction, or target value.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Rectangular array with an explicit shape.
    Array(NdArray),
    /// Sequence of values whose rows may differ in length.
    Seq(Vec<Value>),
    /// Object with no conversion rule; carried only so it can be reported.
    Opaque(Opaque),
}

impl Value {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Build a sequence from anything convertible into values.
    pub fn seq<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }

    pub fn opaque<T: Any + Send + Sync>(object: T) -> Self {
        Self::Opaque(Opaque::new(object))
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::Seq(_) => "sequence",
            Self::Opaque(_) => "opaque",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<NdArray> for Value {
    fn from(v: NdArray) -> Self {
        Self::Array(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Seq(v)
    }
}

/// Type-erased object handed over by the evaluation loop.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(object: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(object),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name)
    }
}

/// One dataset example: field names mapped to values, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Example {
    fields: IndexMap<String, Value>,
}

impl Example {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a field, replacing an existing one of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Example
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_keeps_insertion_order() {
        let example = Example::new()
            .with("targets_pretokenized", "t0")
            .with("inputs_pretokenized", "i0");
        let names: Vec<&str> = example.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["targets_pretokenized", "inputs_pretokenized"]);
    }

    #[test]
    fn test_example_insert_replaces_in_place() {
        let mut example: Example = [("a", 1), ("b", 2)].into_iter().collect();
        example.insert("a", 3);
        assert_eq!(example.len(), 2);
        assert!(matches!(example.get("a"), Some(Value::Int(3))));
        assert_eq!(example.iter().next().map(|(n, _)| n), Some("a"));
    }

    #[test]
    fn test_wide_example_collects_in_order() {
        let example: Example = (0..10_000).map(|i| (format!("f{i}"), i)).collect();
        assert_eq!(example.len(), 10_000);
        assert!(matches!(example.get("f9999"), Some(Value::Int(9999))));
        assert_eq!(example.iter().nth(42).map(|(n, _)| n), Some("f42"));

        let repeated: Example = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
        let names: Vec<&str> = repeated.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(matches!(repeated.get("a"), Some(Value::Int(3))));
    }

    #[test]
    fn test_opaque_reports_type_name() {
        struct Tokenizer;
        let value = Value::opaque(Tokenizer);
        match value {
            Value::Opaque(ref o) => {
                assert!(o.type_name().ends_with("Tokenizer"));
                assert!(o.downcast_ref::<Tokenizer>().is_some());
                assert!(format!("{:?}", o).starts_with("Opaque("));
            }
            _ => panic!("expected opaque value"),
        }
        assert_eq!(value.kind(), "opaque");
    }

    #[test]
    fn test_seq_builder() {
        let value = Value::seq(vec!["i0_0", "i0_1"]);
        match value {
            Value::Seq(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
