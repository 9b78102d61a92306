use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::ops::arithmetic::{apply_binary_op, mul_op};
use crate::tensor::utils::reduce_grad;
use crate::tensor::{self, Tensor};
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

/// Backward node for element-wise subtraction.
#[derive(Debug)]
struct SubBackward {
    a_node: Arc<RwLock<TensorData>>,
    b_node: Arc<RwLock<TensorData>>,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for SubBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        // d(a - b)/da = 1, d(a - b)/db = -1.
        let grad_a = reduce_grad(grad_output, &self.a_shape)?;
        let neg_one = tensor::full(&[], -1.0)?;
        let neg_grad = mul_op(grad_output, &neg_one)?;
        let grad_b = reduce_grad(&neg_grad, &self.b_shape)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node), Arc::as_ptr(&self.b_node)]
    }
}

/// Element-wise subtraction with single-element broadcasting.
pub fn sub_op(a: &Tensor, b: &Tensor) -> Result<Tensor, RustensorError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    apply_binary_op(
        a,
        b,
        |va, vb| va - vb,
        |a_node, b_node| {
            Arc::new(SubBackward {
                a_node,
                b_node,
                a_shape,
                b_shape,
            })
        },
        "sub",
    )
}

impl Tensor {
    pub fn sub(&self, other: &Tensor) -> Result<Tensor, RustensorError> {
        sub_op(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

    #[test]
    fn test_sub_forward() {
        let a = create_test_tensor(vec![5.0, 7.0], vec![2]);
        let b = create_test_tensor(vec![1.0, 2.0], vec![2]);
        let c = sub_op(&a, &b).unwrap();
        check_tensor_near(&c, &[2], &[4.0, 5.0], 1e-6);
    }

    #[test]
    fn test_sub_from_scalar() {
        let one = create_test_tensor(vec![1.0], vec![]);
        let a = create_test_tensor(vec![0.25, 0.5, 0.75], vec![3]);
        let c = sub_op(&one, &a).unwrap();
        check_tensor_near(&c, &[3], &[0.75, 0.5, 0.25], 1e-6);
    }

    #[test]
    fn test_sub_backward() {
        let a = create_test_tensor_with_grad(vec![5.0, 7.0], vec![2]);
        let b = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
        let c = sub_op(&a, &b).unwrap();
        let seed = create_test_tensor(vec![1.0, 2.0], vec![2]);
        c.backward(Some(seed)).unwrap();
        check_tensor_near(&a.grad().unwrap(), &[2], &[1.0, 2.0], 1e-6);
        check_tensor_near(&b.grad().unwrap(), &[2], &[-1.0, -2.0], 1e-6);
    }

    #[test]
    fn test_sub_backward_scalar_side() {
        // c = 1 - a; dc/d1 = sum(g), dc/da = -g
        let one = create_test_tensor_with_grad(vec![1.0], vec![]);
        let a = create_test_tensor_with_grad(vec![0.2, 0.3], vec![2]);
        let c = sub_op(&one, &a).unwrap();
        let seed = create_test_tensor(vec![1.0, 1.0], vec![2]);
        c.backward(Some(seed)).unwrap();
        check_tensor_near(&one.grad().unwrap(), &[], &[2.0], 1e-6);
        check_tensor_near(&a.grad().unwrap(), &[2], &[-1.0, -1.0], 1e-6);
    }
}
