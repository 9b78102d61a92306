use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::sync::{Arc, RwLock};

/// Backward node for a full sum: every input element contributed with
/// weight 1, so the scalar output gradient is broadcast over the input.
#[derive(Debug)]
struct SumBackward {
    a_node: Arc<RwLock<TensorData>>,
    a_shape: Vec<usize>,
}

impl BackwardOp for SumBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        let g = grad_output.item_f32()?;
        let numel: usize = self.a_shape.iter().product();
        Ok(vec![Tensor::new(vec![g; numel], self.a_shape.clone())?])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node)]
    }
}

/// Sums all elements into a rank-0 tensor of the same dtype.
pub fn sum_op(a: &Tensor) -> Result<Tensor, RustensorError> {
    let output = match a.dtype() {
        DType::F32 => {
            let total: f32 = a.get_f32_data()?.iter().sum();
            Tensor::new(vec![total], vec![])?
        }
        DType::I64 => {
            let total: i64 = a.get_i64_data()?.iter().sum();
            Tensor::new_i64(vec![total], vec![])?
        }
    };

    if a.requires_grad() || a.grad_fn().is_some() {
        let grad_fn = Arc::new(SumBackward {
            a_node: Arc::clone(&a.data),
            a_shape: a.shape(),
        });
        let mut guard = output.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }

    Ok(output)
}

impl Tensor {
    pub fn sum(&self) -> Result<Tensor, RustensorError> {
        sum_op(self)
    }
}
