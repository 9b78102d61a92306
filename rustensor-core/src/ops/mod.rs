pub mod activation;
pub mod arithmetic;
pub mod dtype;
pub mod linalg;
pub mod math_elem;
pub mod reduction;
pub mod view;

use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::sync::{Arc, RwLock};

/// Shared scaffolding for element-wise unary float operations.
///
/// Applies `op_f32` to every element in logical order and, when the input
/// tracks gradients, wires the node produced by `backward_builder` (which
/// receives the input's shared data, keeping it alive for the backward pass)
/// into the output.
pub(crate) fn apply_unary_op<F, B>(
    a: &Tensor,
    op_f32: F,
    backward_builder: B,
    op_name: &str,
) -> Result<Tensor, RustensorError>
where
    F: Fn(f32) -> f32,
    B: FnOnce(Arc<RwLock<TensorData>>) -> Arc<dyn BackwardOp + Send + Sync>,
{
    if a.dtype() != DType::F32 {
        return Err(RustensorError::DataTypeMismatch {
            expected: DType::F32,
            actual: a.dtype(),
            operation: op_name.to_string(),
        });
    }

    let input_data = a.get_f32_data()?;
    let output_data: Vec<f32> = input_data.iter().map(|&v| op_f32(v)).collect();
    let output = Tensor::new(output_data, a.shape())?;

    if a.requires_grad() || a.grad_fn().is_some() {
        let grad_fn = backward_builder(Arc::clone(&a.data));
        let mut guard = output.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }

    Ok(output)
}
