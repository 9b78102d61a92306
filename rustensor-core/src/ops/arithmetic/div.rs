use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::ops::arithmetic::{apply_binary_op, raw_elementwise};
use crate::tensor::utils::reduce_grad;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

/// Backward node for element-wise division.
#[derive(Debug)]
struct DivBackward {
    a_node: Arc<RwLock<TensorData>>,
    b_node: Arc<RwLock<TensorData>>,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for DivBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        let a = Tensor {
            data: Arc::clone(&self.a_node),
        };
        let b = Tensor {
            data: Arc::clone(&self.b_node),
        };
        // d(a / b)/da = 1 / b
        let grad_a_full = raw_elementwise(grad_output, &b, |g, y| g / y, "div (backward)")?;
        // d(a / b)/db = -a / b^2
        let g_times_a = raw_elementwise(grad_output, &a, |g, x| g * x, "div (backward)")?;
        let grad_b_full =
            raw_elementwise(&g_times_a, &b, |ga, y| -ga / (y * y), "div (backward)")?;
        Ok(vec![
            reduce_grad(&grad_a_full, &self.a_shape)?,
            reduce_grad(&grad_b_full, &self.b_shape)?,
        ])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node), Arc::as_ptr(&self.b_node)]
    }
}

/// Element-wise division with single-element broadcasting. Division by zero
/// follows IEEE 754 (inf or NaN), as with the scalar operator.
pub fn div_op(a: &Tensor, b: &Tensor) -> Result<Tensor, RustensorError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    apply_binary_op(
        a,
        b,
        |va, vb| va / vb,
        |a_node, b_node| {
            Arc::new(DivBackward {
                a_node,
                b_node,
                a_shape,
                b_shape,
            })
        },
        "div",
    )
}

impl Tensor {
    pub fn div(&self, other: &Tensor) -> Result<Tensor, RustensorError> {
        div_op(self, other)
    }
}
