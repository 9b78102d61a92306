use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::ops::apply_unary_op;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

/// Backward node for the natural logarithm: d ln(x)/dx = 1 / x.
#[derive(Debug)]
struct LnBackward {
    a_node: Arc<RwLock<TensorData>>,
}

impl BackwardOp for LnBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        let a = Tensor {
            data: Arc::clone(&self.a_node),
        };
        let input = a.get_f32_data()?;
        let g = grad_output.get_f32_data()?;
        let grad: Vec<f32> = input.iter().zip(g.iter()).map(|(&x, &gi)| gi / x).collect();
        Ok(vec![Tensor::new(grad, a.shape())?])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node)]
    }
}

/// Element-wise natural logarithm. Follows `f32::ln` outside the domain:
/// ln(0) is -inf and ln of a negative number is NaN.
pub fn ln_op(a: &Tensor) -> Result<Tensor, RustensorError> {
    apply_unary_op(a, f32::ln, |a_node| Arc::new(LnBackward { a_node }), "ln")
}

impl Tensor {
    pub fn ln(&self) -> Result<Tensor, RustensorError> {
        ln_op(self)
    }
}
