use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::ops::arithmetic::apply_binary_op;
use crate::tensor::utils::reduce_grad;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

/// Backward node for element-wise addition.
#[derive(Debug)]
struct AddBackward {
    a_node: Arc<RwLock<TensorData>>,
    b_node: Arc<RwLock<TensorData>>,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for AddBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        // d(a + b)/da = 1, d(a + b)/db = 1; broadcast operands sum back.
        let grad_a = reduce_grad(grad_output, &self.a_shape)?;
        let grad_b = reduce_grad(grad_output, &self.b_shape)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node), Arc::as_ptr(&self.b_node)]
    }
}

/// Element-wise addition with single-element broadcasting.
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, RustensorError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    apply_binary_op(
        a,
        b,
        |va, vb| va + vb,
        |a_node, b_node| {
            Arc::new(AddBackward {
                a_node,
                b_node,
                a_shape,
                b_shape,
            })
        },
        "add",
    )
}

impl Tensor {
    pub fn add(&self, other: &Tensor) -> Result<Tensor, RustensorError> {
        add_op(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RustensorError;
    use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

    #[test]
    fn test_add_forward() {
        let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let b = create_test_tensor(vec![10.0, 20.0, 30.0, 40.0], vec![2, 2]);
        let c = add_op(&a, &b).unwrap();
        check_tensor_near(&c, &[2, 2], &[11.0, 22.0, 33.0, 44.0], 1e-6);
    }

    #[test]
    fn test_add_scalar_broadcast() {
        let a = create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]);
        let s = create_test_tensor(vec![10.0], vec![]);
        let c = add_op(&a, &s).unwrap();
        check_tensor_near(&c, &[3], &[11.0, 12.0, 13.0], 1e-6);
    }

    #[test]
    fn test_add_shape_mismatch() {
        let a = create_test_tensor(vec![1.0, 2.0], vec![2]);
        let b = create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]);
        assert!(matches!(
            add_op(&a, &b),
            Err(RustensorError::IncompatibleShapes { .. })
        ));
    }

    #[test]
    fn test_add_backward() {
        let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
        let b = create_test_tensor_with_grad(vec![3.0, 4.0], vec![2]);
        let c = add_op(&a, &b).unwrap();
        let seed = create_test_tensor(vec![0.5, 2.0], vec![2]);
        c.backward(Some(seed)).unwrap();
        check_tensor_near(&a.grad().unwrap(), &[2], &[0.5, 2.0], 1e-6);
        check_tensor_near(&b.grad().unwrap(), &[2], &[0.5, 2.0], 1e-6);
    }

    #[test]
    fn test_add_backward_broadcast_sums_to_scalar() {
        let a = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0], vec![3]);
        let s = create_test_tensor_with_grad(vec![10.0], vec![]);
        let c = add_op(&a, &s).unwrap();
        let seed = create_test_tensor(vec![1.0, 1.0, 1.0], vec![3]);
        c.backward(Some(seed)).unwrap();
        check_tensor_near(&a.grad().unwrap(), &[3], &[1.0, 1.0, 1.0], 1e-6);
        check_tensor_near(&s.grad().unwrap(), &[], &[3.0], 1e-6);
    }
}
