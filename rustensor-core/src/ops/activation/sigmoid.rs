use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::ops::apply_unary_op;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

/// Numerically stable logistic function. Split on the sign of `x` so the
/// exponent is always non-positive and cannot overflow.
fn stable_sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Backward node for sigmoid. Recomputes s = sigmoid(x) from the stored
/// input rather than retaining the forward output.
#[derive(Debug)]
struct SigmoidBackward {
    a_node: Arc<RwLock<TensorData>>,
}

impl BackwardOp for SigmoidBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        let a = Tensor {
            data: Arc::clone(&self.a_node),
        };
        let input = a.get_f32_data()?;
        let g = grad_output.get_f32_data()?;
        // d sigmoid(x)/dx = s * (1 - s)
        let grad: Vec<f32> = input
            .iter()
            .zip(g.iter())
            .map(|(&x, &gi)| {
                let s = stable_sigmoid(x);
                s * (1.0 - s) * gi
            })
            .collect();
        Ok(vec![Tensor::new(grad, a.shape())?])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node)]
    }
}

/// Element-wise logistic sigmoid, 1 / (1 + e^-x).
pub fn sigmoid_op(a: &Tensor) -> Result<Tensor, RustensorError> {
    apply_unary_op(
        a,
        stable_sigmoid,
        |a_node| Arc::new(SigmoidBackward { a_node }),
        "sigmoid",
    )
}

impl Tensor {
    pub fn sigmoid(&self) -> Result<Tensor, RustensorError> {
        sigmoid_op(self)
    }
}
