use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::sync::{Arc, RwLock};

/// Backward node for materializing a contiguous copy. The copy is
/// element-wise identity, so the gradient passes through unchanged.
#[derive(Debug)]
struct ContiguousBackward {
    a_node: Arc<RwLock<TensorData>>,
}

impl BackwardOp for ContiguousBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        Ok(vec![grad_output.clone()])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node)]
    }
}

/// Returns `self` if already contiguous, otherwise a freshly allocated
/// tensor holding the same elements in row-major order.
pub fn contiguous_op(a: &Tensor) -> Result<Tensor, RustensorError> {
    if a.is_contiguous() {
        return Ok(a.clone());
    }

    let shape = a.shape();
    let output = match a.dtype() {
        DType::F32 => Tensor::new(a.get_f32_data()?, shape)?,
        DType::I64 => Tensor::new_i64(a.get_i64_data()?, shape)?,
    };

    if a.requires_grad() || a.grad_fn().is_some() {
        let grad_fn = Arc::new(ContiguousBackward {
            a_node: Arc::clone(&a.data),
        });
        let mut guard = output.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }

    Ok(output)
}

impl Tensor {
    pub fn contiguous(&self) -> Result<Tensor, RustensorError> {
        contiguous_op(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::view::transpose_op;

    #[test]
    fn test_contiguous_noop_shares_data() {
        let t = Tensor::new_i64(vec![1, 2, 3, 4], vec![2, 2]).unwrap();
        let c = contiguous_op(&t).unwrap();
        assert!(Arc::ptr_eq(&t.data, &c.data));
    }

    #[test]
    fn test_contiguous_materializes_transpose() {
        let t = Tensor::new_i64(vec![1, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
        let tt = transpose_op(&t, 0, 1).unwrap();
        assert!(!tt.is_contiguous());
        let c = contiguous_op(&tt).unwrap();
        assert!(c.is_contiguous());
        assert_eq!(c.shape(), vec![3, 2]);
        assert_eq!(c.get_i64_data().unwrap(), vec![1, 4, 2, 5, 3, 6]);
    }
}
