use crate::error::RustensorError;
use crate::tensor::Tensor;
use crate::types::DType;

/// Converts element values to `target_dtype`, materializing a contiguous
/// copy. Casting to the current dtype returns the tensor unchanged.
///
/// The f32 to i64 direction truncates toward zero, as `as` does. The result
/// never joins the autograd graph: a cast that leaves f32 has no gradient to
/// carry, and a cast back in would differentiate through truncation.
pub fn cast_op(a: &Tensor, target_dtype: DType) -> Result<Tensor, RustensorError> {
    if a.dtype() == target_dtype {
        return Ok(a.clone());
    }
    match target_dtype {
        DType::F32 => {
            let data: Vec<f32> = a.get_i64_data()?.iter().map(|&v| v as f32).collect();
            Tensor::new(data, a.shape())
        }
        DType::I64 => {
            let data: Vec<i64> = a.get_f32_data()?.iter().map(|&v| v as i64).collect();
            Tensor::new_i64(data, a.shape())
        }
    }
}

impl Tensor {
    pub fn to_dtype(&self, target_dtype: DType) -> Result<Tensor, RustensorError> {
        cast_op(self, target_dtype)
    }
}
