use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

/// Backward node for transpose: transposing the gradient over the same pair
/// of dimensions maps it back onto the input layout.
#[derive(Debug)]
struct TransposeBackward {
    a_node: Arc<RwLock<TensorData>>,
    dim0: usize,
    dim1: usize,
}

impl BackwardOp for TransposeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        Ok(vec![transpose_op(grad_output, self.dim0, self.dim1)?])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node)]
    }
}

/// Swaps two dimensions without copying, by exchanging the corresponding
/// shape and stride entries over the shared buffer.
pub fn transpose_op(a: &Tensor, dim0: usize, dim1: usize) -> Result<Tensor, RustensorError> {
    let rank = a.rank();
    for dim in [dim0, dim1] {
        if dim >= rank {
            return Err(RustensorError::DimensionMismatch { rank, dim });
        }
    }

    let (buffer, offset, mut shape, mut strides) = {
        let guard = a.read_data();
        (
            guard.buffer().clone(),
            guard.offset,
            guard.shape.clone(),
            guard.strides.clone(),
        )
    };
    shape.swap(dim0, dim1);
    strides.swap(dim0, dim1);

    let td = TensorData::new_view(buffer, offset, shape, strides);
    let output = Tensor {
        data: Arc::new(RwLock::new(td)),
    };

    if a.requires_grad() || a.grad_fn().is_some() {
        let grad_fn = Arc::new(TransposeBackward {
            a_node: Arc::clone(&a.data),
            dim0,
            dim1,
        });
        let mut guard = output.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }

    Ok(output)
}
