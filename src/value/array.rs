//! Rectangular numeric arrays with an explicit shape.

use thiserror::Error;

/// Raised when a flat buffer cannot back the requested shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("shape {shape:?} expects {expected} elements, got {actual}")]
    Mismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("shape {shape:?} overflows the addressable element count")]
    Overflow { shape: Vec<usize> },
}

/// Element count of `shape`, or `None` when the product of its non-zero
/// dimensions overflows `usize`. Bounding that product keeps every stride
/// computable as well.
fn element_count(shape: &[usize]) -> Option<usize> {
    let nonzero = shape
        .iter()
        .filter(|&&d| d != 0)
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))?;
    if shape.contains(&0) {
        Some(0)
    } else {
        Some(nonzero)
    }
}

/// Flat, row-major element buffer of a single dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    Bool(Vec<bool>),
}

/// A single array element widened to its JSON-facing kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Element {
    Float(f64),
    Int(i64),
    Bool(bool),
}

impl ArrayData {
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the element type, used in diagnostics.
    pub fn dtype(&self) -> &'static str {
        match self {
            Self::F32(_) => "float32",
            Self::F64(_) => "float64",
            Self::I32(_) => "int32",
            Self::I64(_) => "int64",
            Self::U8(_) => "uint8",
            Self::Bool(_) => "bool",
        }
    }

    /// Element at a flat offset. Callers index within `len()`.
    pub fn element(&self, index: usize) -> Element {
        match self {
            Self::F32(v) => Element::Float(f64::from(v[index])),
            Self::F64(v) => Element::Float(v[index]),
            Self::I32(v) => Element::Int(i64::from(v[index])),
            Self::I64(v) => Element::Int(v[index]),
            Self::U8(v) => Element::Int(i64::from(v[index])),
            Self::Bool(v) => Element::Bool(v[index]),
        }
    }
}

/// N-dimensional array: a shape plus a row-major buffer whose length is the
/// product of the shape. A zero-dimensional array holds exactly one element.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl NdArray {
    /// Create an array, checking that `data` fills `shape` exactly.
    pub fn new(shape: Vec<usize>, data: ArrayData) -> Result<Self, ShapeError> {
        let Some(expected) = element_count(&shape) else {
            return Err(ShapeError::Overflow { shape });
        };
        if expected != data.len() {
            return Err(ShapeError::Mismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// One-dimensional array over the whole buffer.
    pub fn vector(data: ArrayData) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Zero-dimensional array holding a single float.
    pub fn scalar(value: f64) -> Self {
        Self {
            shape: Vec::new(),
            data: ArrayData::F64(vec![value]),
        }
    }

    /// Float array of zeros.
    ///
    /// # Panics
    ///
    /// Panics with a capacity overflow if the shape's element count does not
    /// fit in memory, like `vec![0.0; n]`.
    pub fn zeros(shape: Vec<usize>) -> Self {
        Self::filled(shape, 0.0)
    }

    /// Float array of ones. Panics like [`NdArray::zeros`].
    pub fn ones(shape: Vec<usize>) -> Self {
        Self::filled(shape, 1.0)
    }

    fn filled(shape: Vec<usize>, value: f64) -> Self {
        let len = element_count(&shape).unwrap_or(usize::MAX);
        Self {
            shape,
            data: ArrayData::F64(vec![value; len]),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of elements spanned by one step along `dim`.
    pub(crate) fn stride(&self, dim: usize) -> usize {
        self.shape[dim + 1..].iter().product()
    }
}
