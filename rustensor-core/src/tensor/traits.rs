use crate::tensor::Tensor;
use std::sync::Arc;

impl Clone for Tensor {
    /// Shallow clone: increases the reference count of the shared tensor
    /// data. Autograd metadata set through one clone is visible through all.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl PartialEq for Tensor {
    /// Logical equality: same dtype, same shape, same element values in
    /// row-major order. Views over the same buffer compare equal to their
    /// contiguous copies.
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.data, &other.data) {
            return true;
        }
        if self.dtype() != other.dtype() || self.shape() != other.shape() {
            return false;
        }
        match self.dtype() {
            crate::types::DType::F32 => {
                match (self.get_f32_data(), other.get_f32_data()) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                }
            }
            crate::types::DType::I64 => {
                match (self.get_i64_data(), other.get_i64_data()) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tensor::Tensor;

    #[test]
    fn test_clone_shares_data() {
        let t = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        let c = t.clone();
        assert!(std::sync::Arc::ptr_eq(&t.data, &c.data));
    }

    #[test]
    fn test_eq_logical() {
        let a = Tensor::new_i64(vec![1, 2, 3, 4], vec![2, 2]).unwrap();
        let b = Tensor::new_i64(vec![1, 2, 3, 4], vec![2, 2]).unwrap();
        let c = Tensor::new_i64(vec![1, 2, 3, 4], vec![4]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c); // same data, different shape
    }
}
