use crate::error::RustensorError;
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::sync::{Arc, RwLock};

mod autograd_methods;
mod debug;
mod traits;
mod view_methods;

pub mod create;
pub mod utils;

// Re-export creation functions so they are reachable as `tensor::zeros` etc.
pub use create::{
    from_vec_f32, from_vec_i64, full, ones, ones_like, rand, randn, zeros, zeros_like,
};

/// A multi-dimensional array with a fixed element type and shape.
///
/// `Tensor` wraps its storage in `Arc<RwLock<TensorData>>`:
/// 1. **Shared ownership** — cloning a `Tensor` is cheap and shares the
///    underlying data, which is what view operations and the autograd graph
///    rely on.
/// 2. **Interior mutability** — autograd metadata (`requires_grad`, `grad`,
///    `grad_fn`) can be updated through a shared reference.
///
/// Operations never mutate a tensor in place; each one yields a new tensor
/// value (views share the buffer, copies allocate a fresh one).
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new F32 tensor with the given data and shape.
    ///
    /// This is the primary constructor for float tensors; contiguous strides
    /// are calculated automatically.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, RustensorError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Creates a new I64 tensor with the given data and shape.
    pub fn new_i64(data_vec: Vec<i64>, shape: Vec<usize>) -> Result<Self, RustensorError> {
        let tensor_data = TensorData::new_i64(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Returns the data type of the tensor elements.
    pub fn dtype(&self) -> DType {
        self.read_data().dtype
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns a clone of the tensor's strides.
    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Checks if the tensor is contiguous in memory.
    pub fn is_contiguous(&self) -> bool {
        self.read_data().is_contiguous()
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    ///
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Returns the tensor elements as a `Vec<f32>` in logical row-major
    /// order, following strides for non-contiguous views.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, RustensorError> {
        let guard = self.read_data();
        let buffer = guard.buffer().try_get_f32()?;
        Ok(utils::gather_logical(
            buffer.as_slice(),
            &guard.shape,
            &guard.strides,
            guard.offset,
        ))
    }

    /// Returns the tensor elements as a `Vec<i64>` in logical row-major
    /// order, following strides for non-contiguous views.
    pub fn get_i64_data(&self) -> Result<Vec<i64>, RustensorError> {
        let guard = self.read_data();
        let buffer = guard.buffer().try_get_i64()?;
        Ok(utils::gather_logical(
            buffer.as_slice(),
            &guard.shape,
            &guard.strides,
            guard.offset,
        ))
    }

    /// Extracts the value of a single-element F32 tensor.
    pub fn item_f32(&self) -> Result<f32, RustensorError> {
        if self.numel() != 1 {
            return Err(RustensorError::ShapeMismatch {
                expected: "single-element tensor".to_string(),
                actual: format!("{:?}", self.shape()),
                operation: "item_f32".to_string(),
            });
        }
        Ok(self.get_f32_data()?[0])
    }

    /// Extracts the value of a single-element I64 tensor.
    pub fn item_i64(&self) -> Result<i64, RustensorError> {
        if self.numel() != 1 {
            return Err(RustensorError::ShapeMismatch {
                expected: "single-element tensor".to_string(),
                actual: format!("{:?}", self.shape()),
                operation: "item_i64".to_string(),
            });
        }
        Ok(self.get_i64_data()?[0])
    }

    /// Clears the gradient tensor associated with this tensor.
    pub fn clear_grad(&self) {
        let mut guard = self.write_data();
        guard.grad = None;
    }
}
