use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::buffer::Buffer;
use crate::error::RustensorError;
use crate::tensor::utils::calculate_strides;
use crate::tensor::Tensor;
use crate::types::DType;

/// Internal storage and metadata for a Tensor.
///
/// Holds the shared data buffer, shape, strides, dtype, and autograd-related
/// information. It is wrapped in `Arc<RwLock<TensorData>>` by the `Tensor`
/// struct to allow shared ownership and interior mutability.
#[derive(Debug)]
pub struct TensorData {
    /// The underlying typed data buffer, shared between views.
    pub(crate) buffer: Arc<Buffer>,
    /// The data type of the elements in the buffer.
    pub(crate) dtype: DType,

    /// The shape (dimensions) of the tensor.
    pub(crate) shape: Vec<usize>,
    /// The strides for each dimension: the jump in the buffer required to
    /// move one step along that dimension.
    pub(crate) strides: Vec<usize>,
    /// The offset into the buffer for the first element (used by views).
    pub(crate) offset: usize,

    /// Flag indicating whether operations on this tensor are recorded in the
    /// computation graph.
    pub(crate) requires_grad: bool,
    /// Gradient tensor, populated by the backward pass. Same shape and dtype
    /// as this tensor.
    pub(crate) grad: Option<Tensor>,
    /// Backward node of the operation that produced this tensor, linking it
    /// into the computation graph. Leaf tensors have `grad_fn = None`.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp + Send + Sync>>,
}

impl TensorData {
    /// Creates a new `TensorData` with the given f32 data and shape.
    ///
    /// Takes ownership of the data vector and calculates contiguous strides.
    ///
    /// # Errors
    /// Returns `RustensorError::TensorCreationError` if the length of
    /// `data_vec` does not match the number of elements implied by `shape`.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, RustensorError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(RustensorError::TensorCreationError { data_len, shape });
        }

        let strides = calculate_strides(&shape);
        let buffer = Arc::new(Buffer::F32(Arc::new(data_vec)));

        Ok(TensorData {
            buffer,
            dtype: DType::F32,
            offset: 0,
            shape,
            strides,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Creates a new `TensorData` with the given i64 data and shape.
    pub fn new_i64(data_vec: Vec<i64>, shape: Vec<usize>) -> Result<Self, RustensorError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(RustensorError::TensorCreationError { data_len, shape });
        }

        let strides = calculate_strides(&shape);
        let buffer = Arc::new(Buffer::I64(Arc::new(data_vec)));

        Ok(TensorData {
            buffer,
            dtype: DType::I64,
            offset: 0,
            shape,
            strides,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Creates a new `TensorData` representing a view of an existing buffer.
    ///
    /// Does **not** allocate new memory: the provided `buffer_arc` is shared
    /// and only the metadata (offset, shape, strides) is new. Views do not
    /// require gradients by default and have no `grad_fn`; the view operation
    /// that calls this is responsible for autograd wiring.
    pub(crate) fn new_view(
        buffer_arc: Arc<Buffer>,
        offset: usize,
        shape: Vec<usize>,
        strides: Vec<usize>,
    ) -> Self {
        let dtype = buffer_arc.dtype();
        TensorData {
            buffer: buffer_arc,
            dtype,
            offset,
            shape,
            strides,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        }
    }

    /// Provides immutable access to the underlying shared data buffer.
    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    /// Returns the number of logical elements in the tensor.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Calculates the linear offset into the shared buffer for the given
    /// multi-dimensional indices.
    ///
    /// Panics if the number of indices does not match the tensor rank or if
    /// any index is out of bounds.
    pub fn get_offset(&self, indices: &[usize]) -> usize {
        assert_eq!(
            indices.len(),
            self.shape.len(),
            "Number of indices ({}) does not match tensor rank ({}) for shape {:?}",
            indices.len(),
            self.shape.len(),
            self.shape
        );

        let mut relative_offset = 0;
        for i in 0..self.shape.len() {
            assert!(
                indices[i] < self.shape[i],
                "Index {} is out of bounds for dimension {} with size {} (shape: {:?})",
                indices[i],
                i,
                self.shape[i],
                self.shape
            );
            relative_offset += indices[i] * self.strides[i];
        }
        self.offset + relative_offset
    }

    /// Checks whether the tensor is contiguous in memory, i.e. its elements
    /// are laid out in standard row-major order without gaps.
    pub fn is_contiguous(&self) -> bool {
        if self.shape.is_empty() {
            return true;
        }
        let mut current_stride = 1;
        for i in (0..self.shape.len()).rev() {
            let shape_i = self.shape[i];
            if shape_i == 0 {
                return true;
            }
            if shape_i != 1 {
                if self.strides[i] != current_stride {
                    return false;
                }
                current_stride *= shape_i;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_offset_row_major() {
        let td = TensorData::new_i64(vec![1, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
        assert_eq!(td.get_offset(&[0, 0]), 0);
        assert_eq!(td.get_offset(&[1, 2]), 5);
    }

    #[test]
    fn test_get_offset_respects_view_offset_and_strides() {
        let base = TensorData::new_i64(vec![1, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
        // Transposed view over the same buffer, starting one element in.
        let view = TensorData::new_view(base.buffer().clone(), 1, vec![3, 2], vec![1, 3]);
        assert_eq!(view.get_offset(&[0, 1]), 4);
        assert!(!view.is_contiguous());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_offset_bounds_checked() {
        let td = TensorData::new_i64(vec![1, 2], vec![2]).unwrap();
        td.get_offset(&[2]);
    }
}
