//! Dense `f32` tensor exchanged with the inference engine.

use thiserror::Error;

/// Shape/data disagreement when building a tensor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("tensor shape {dims:?} needs {expected} values, got {actual}")]
pub struct ShapeError {
    pub dims: Vec<usize>,
    pub expected: usize,
    pub actual: usize,
}

/// Flat row-major values with an explicit shape.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    dims: Vec<usize>,
}

impl Tensor {
    /// Creates a tensor, checking that `data` fills `dims` exactly.
    pub fn new(data: Vec<f32>, dims: Vec<usize>) -> Result<Self, ShapeError> {
        let expected = dims.iter().product::<usize>();
        if expected != data.len() {
            return Err(ShapeError {
                dims,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, dims })
    }

    /// Builds a `[1, records, record_len]` output tensor from candidate rows.
    ///
    /// All rows must share the first row's length.
    pub fn from_records(records: &[Vec<f32>]) -> Result<Self, ShapeError> {
        let record_len = records.first().map_or(0, Vec::len);
        let data: Vec<f32> = records.iter().flatten().copied().collect();
        Self::new(data, vec![1, records.len(), record_len])
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("dims", &self.dims)
            .field("values", &self.data.len())
            .finish()
    }
}
