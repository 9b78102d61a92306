pub mod add;
pub mod div;
pub mod mul;
pub mod sub;

pub use add::add_op;
pub use div::div_op;
pub use mul::mul_op;
pub use sub::sub_op;

use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::sync::{Arc, RwLock};

/// Element-wise combine that never consults `requires_grad`, for use inside
/// backward passes where the operands may still be graph nodes. Same
/// single-element broadcasting rules as [`apply_binary_op`].
pub(crate) fn raw_elementwise<F>(
    a: &Tensor,
    b: &Tensor,
    op_f32: F,
    op_name: &str,
) -> Result<Tensor, RustensorError>
where
    F: Fn(f32, f32) -> f32,
{
    let a_data = a.get_f32_data()?;
    let b_data = b.get_f32_data()?;
    let (data, shape): (Vec<f32>, Vec<usize>) = if a.shape() == b.shape() {
        (
            a_data
                .iter()
                .zip(b_data.iter())
                .map(|(&x, &y)| op_f32(x, y))
                .collect(),
            a.shape(),
        )
    } else if a.numel() == 1 {
        (
            b_data.iter().map(|&y| op_f32(a_data[0], y)).collect(),
            b.shape(),
        )
    } else if b.numel() == 1 {
        (
            a_data.iter().map(|&x| op_f32(x, b_data[0])).collect(),
            a.shape(),
        )
    } else {
        return Err(RustensorError::IncompatibleShapes {
            shape1: a.shape(),
            shape2: b.shape(),
            operation: op_name.to_string(),
        });
    };
    Tensor::new(data, shape)
}

/// Shared scaffolding for element-wise binary float operations.
///
/// Inputs must either share a shape or one of them must hold a single
/// element, which is broadcast against every element of the other. The
/// output takes the shape of the larger operand. When either input tracks
/// gradients, the node produced by `backward_builder` (which receives both
/// inputs' shared data) is wired into the output.
pub(crate) fn apply_binary_op<F, B>(
    a: &Tensor,
    b: &Tensor,
    op_f32: F,
    backward_builder: B,
    op_name: &str,
) -> Result<Tensor, RustensorError>
where
    F: Fn(f32, f32) -> f32,
    B: FnOnce(
        Arc<RwLock<TensorData>>,
        Arc<RwLock<TensorData>>,
    ) -> Arc<dyn BackwardOp + Send + Sync>,
{
    for t in [a, b] {
        if t.dtype() != DType::F32 {
            return Err(RustensorError::DataTypeMismatch {
                expected: DType::F32,
                actual: t.dtype(),
                operation: op_name.to_string(),
            });
        }
    }

    let a_shape = a.shape();
    let b_shape = b.shape();
    if a_shape != b_shape && a.numel() != 1 && b.numel() != 1 {
        return Err(RustensorError::IncompatibleShapes {
            shape1: a_shape,
            shape2: b_shape,
            operation: op_name.to_string(),
        });
    }

    let a_data = a.get_f32_data()?;
    let b_data = b.get_f32_data()?;
    let (output_data, output_shape): (Vec<f32>, Vec<usize>) = if a_shape == b_shape {
        (
            a_data
                .iter()
                .zip(b_data.iter())
                .map(|(&va, &vb)| op_f32(va, vb))
                .collect(),
            a_shape,
        )
    } else if a.numel() == 1 {
        let va = a_data[0];
        (b_data.iter().map(|&vb| op_f32(va, vb)).collect(), b_shape)
    } else {
        let vb = b_data[0];
        (a_data.iter().map(|&va| op_f32(va, vb)).collect(), a_shape)
    };

    let output = Tensor::new(output_data, output_shape)?;

    let track_a = a.requires_grad() || a.grad_fn().is_some();
    let track_b = b.requires_grad() || b.grad_fn().is_some();
    if track_a || track_b {
        let grad_fn = backward_builder(Arc::clone(&a.data), Arc::clone(&b.data));
        let mut guard = output.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }

    Ok(output)
}
