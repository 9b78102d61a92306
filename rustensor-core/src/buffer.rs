use std::sync::Arc;

use crate::error::RustensorError;
use crate::types::DType;

/// Typed CPU storage shared between tensors.
///
/// The buffer is wrapped in an `Arc` by [`TensorData`](crate::tensor_data::TensorData)
/// so that views (reshape, transpose) can share it without copying.
#[derive(Debug, Clone)]
pub enum Buffer {
    /// Buffer holding i64 data.
    I64(Arc<Vec<i64>>),
    /// Buffer holding f32 data.
    F32(Arc<Vec<f32>>),
}

impl Buffer {
    /// Returns the dtype of the elements stored in this buffer.
    pub fn dtype(&self) -> DType {
        match self {
            Buffer::I64(_) => DType::I64,
            Buffer::F32(_) => DType::F32,
        }
    }

    /// Returns the number of elements physically stored in the buffer.
    pub fn len(&self) -> usize {
        match self {
            Buffer::I64(data) => data.len(),
            Buffer::F32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<i64>>`.
    pub fn try_get_i64(&self) -> Result<&Arc<Vec<i64>>, RustensorError> {
        match self {
            Buffer::I64(data_arc) => Ok(data_arc),
            other => Err(RustensorError::DataTypeMismatch {
                expected: DType::I64,
                actual: other.dtype(),
                operation: "try_get_i64".to_string(),
            }),
        }
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<f32>>`.
    pub fn try_get_f32(&self) -> Result<&Arc<Vec<f32>>, RustensorError> {
        match self {
            Buffer::F32(data_arc) => Ok(data_arc),
            other => Err(RustensorError::DataTypeMismatch {
                expected: DType::F32,
                actual: other.dtype(),
                operation: "try_get_f32".to_string(),
            }),
        }
    }
}
