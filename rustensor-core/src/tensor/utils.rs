use crate::error::RustensorError;
use crate::tensor::Tensor;

/// Calculates the strides for a contiguous, row-major tensor of the given shape.
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    if shape.is_empty() {
        return strides;
    }
    strides[shape.len() - 1] = 1;
    for i in (0..shape.len() - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Collects the elements of a (possibly non-contiguous) tensor in logical
/// row-major order by walking the multi-dimensional index space.
pub(crate) fn gather_logical<T: Copy>(
    buf: &[T],
    shape: &[usize],
    strides: &[usize],
    offset: usize,
) -> Vec<T> {
    let numel: usize = shape.iter().product();
    let mut out = Vec::with_capacity(numel);
    if numel == 0 {
        return out;
    }
    let rank = shape.len();
    let mut idx = vec![0usize; rank];
    loop {
        let mut pos = offset;
        for d in 0..rank {
            pos += idx[d] * strides[d];
        }
        out.push(buf[pos]);

        // Odometer-style index increment; falling off the front means done.
        let mut d = rank;
        loop {
            if d == 0 {
                return out;
            }
            d -= 1;
            idx[d] += 1;
            if idx[d] < shape[d] {
                break;
            }
            idx[d] = 0;
        }
    }
}

/// Reduces a gradient produced under the single-element broadcast rule back
/// to the shape of the operand it belongs to.
///
/// If the shapes already match the gradient is returned as-is; if the target
/// is a single-element shape the gradient is summed and reshaped. Any other
/// combination indicates a bug in the calling operation.
pub(crate) fn reduce_grad(grad: &Tensor, target_shape: &[usize]) -> Result<Tensor, RustensorError> {
    if grad.shape() == target_shape {
        return Ok(grad.clone());
    }
    let target_numel: usize = target_shape.iter().product();
    if target_numel == 1 {
        let summed = crate::ops::reduction::sum_op(grad)?;
        return crate::ops::view::reshape_op(&summed, target_shape.to_vec());
    }
    Err(RustensorError::InternalError(format!(
        "Cannot reduce gradient of shape {:?} to shape {:?}",
        grad.shape(),
        target_shape
    )))
}
