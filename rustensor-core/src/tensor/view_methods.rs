use crate::error::RustensorError;
use crate::ops::view::{reshape_op, transpose_op, view_op};
use crate::tensor::Tensor;

impl Tensor {
    /// Zero-copy shape change; fails on non-contiguous tensors.
    pub fn view(&self, new_shape: Vec<usize>) -> Result<Tensor, RustensorError> {
        view_op(self, new_shape)
    }

    /// Shape change that copies when a zero-copy view is not possible.
    pub fn reshape(&self, new_shape: Vec<usize>) -> Result<Tensor, RustensorError> {
        reshape_op(self, new_shape)
    }

    /// Swaps dimensions `dim0` and `dim1` without copying.
    pub fn transpose(&self, dim0: usize, dim1: usize) -> Result<Tensor, RustensorError> {
        transpose_op(self, dim0, dim1)
    }

    /// Matrix transpose. Rank 0 and 1 tensors are returned as-is, rank 2
    /// tensors are transposed; higher ranks are rejected.
    pub fn t(&self) -> Result<Tensor, RustensorError> {
        match self.rank() {
            0 | 1 => Ok(self.clone()),
            2 => transpose_op(self, 0, 1),
            rank => Err(RustensorError::UnsupportedOperation(format!(
                "t() expects a tensor of rank 2 or lower, got rank {}",
                rank
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_rank2() {
        let m = Tensor::new_i64(vec![1, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
        let mt = m.t().unwrap();
        assert_eq!(mt.shape(), vec![3, 2]);
        assert_eq!(mt.get_i64_data().unwrap(), vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_t_rank1_identity() {
        let v = Tensor::new_i64(vec![1, 2, 3], vec![3]).unwrap();
        let vt = v.t().unwrap();
        assert_eq!(vt.shape(), vec![3]);
    }

    #[test]
    fn test_t_rank3_rejected() {
        let t = Tensor::new_i64(vec![0; 8], vec![2, 2, 2]).unwrap();
        assert!(matches!(
            t.t(),
            Err(RustensorError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_reshape_roundtrip() {
        let t = Tensor::new_i64(vec![1, 2, 3, 4, 5, 6], vec![6]).unwrap();
        let m = t.reshape(vec![2, 3]).unwrap();
        let back = m.reshape(vec![6]).unwrap();
        assert_eq!(back, t);
    }
}
