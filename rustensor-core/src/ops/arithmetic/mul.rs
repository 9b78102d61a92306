use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::ops::arithmetic::{apply_binary_op, raw_elementwise};
use crate::tensor::utils::reduce_grad;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

/// Backward node for element-wise multiplication. Holds both inputs since
/// each gradient needs the other operand's values.
#[derive(Debug)]
struct MulBackward {
    a_node: Arc<RwLock<TensorData>>,
    b_node: Arc<RwLock<TensorData>>,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for MulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        let a = Tensor {
            data: Arc::clone(&self.a_node),
        };
        let b = Tensor {
            data: Arc::clone(&self.b_node),
        };
        // d(a * b)/da = b, d(a * b)/db = a. Computed without autograd wiring
        // so the gradients stay out of the graph.
        let grad_a_full = raw_elementwise(grad_output, &b, |g, y| g * y, "mul (backward)")?;
        let grad_b_full = raw_elementwise(grad_output, &a, |g, x| g * x, "mul (backward)")?;
        Ok(vec![
            reduce_grad(&grad_a_full, &self.a_shape)?,
            reduce_grad(&grad_b_full, &self.b_shape)?,
        ])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node), Arc::as_ptr(&self.b_node)]
    }
}

/// Element-wise multiplication with single-element broadcasting.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, RustensorError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    apply_binary_op(
        a,
        b,
        |va, vb| va * vb,
        |a_node, b_node| {
            Arc::new(MulBackward {
                a_node,
                b_node,
                a_shape,
                b_shape,
            })
        },
        "mul",
    )
}

impl Tensor {
    pub fn mul(&self, other: &Tensor) -> Result<Tensor, RustensorError> {
        mul_op(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

    #[test]
    fn test_mul_forward() {
        let a = create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]);
        let b = create_test_tensor(vec![4.0, 5.0, 6.0], vec![3]);
        let c = mul_op(&a, &b).unwrap();
        check_tensor_near(&c, &[3], &[4.0, 10.0, 18.0], 1e-6);
    }

    #[test]
    fn test_mul_backward() {
        let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
        let b = create_test_tensor_with_grad(vec![3.0, 4.0], vec![2]);
        let c = mul_op(&a, &b).unwrap();
        let seed = create_test_tensor(vec![1.0, 1.0], vec![2]);
        c.backward(Some(seed)).unwrap();
        check_tensor_near(&a.grad().unwrap(), &[2], &[3.0, 4.0], 1e-6);
        check_tensor_near(&b.grad().unwrap(), &[2], &[1.0, 2.0], 1e-6);
    }

    #[test]
    fn test_mul_backward_same_operand() {
        // y = a * a accumulates 2a into a single leaf.
        let a = create_test_tensor_with_grad(vec![3.0], vec![]);
        let y = mul_op(&a, &a).unwrap();
        y.backward(None).unwrap();
        check_tensor_near(&a.grad().unwrap(), &[], &[6.0], 1e-6);
    }

    #[test]
    fn test_mul_scalar_backward() {
        let a = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0], vec![3]);
        let s = create_test_tensor_with_grad(vec![2.0], vec![]);
        let c = mul_op(&a, &s).unwrap();
        let seed = create_test_tensor(vec![1.0, 1.0, 1.0], vec![3]);
        c.backward(Some(seed)).unwrap();
        check_tensor_near(&a.grad().unwrap(), &[3], &[2.0, 2.0, 2.0], 1e-6);
        // ds = sum(g * a) = 1 + 2 + 3
        check_tensor_near(&s.grad().unwrap(), &[], &[6.0], 1e-6);
    }
}
