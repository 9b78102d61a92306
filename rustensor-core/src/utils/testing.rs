//! Assertion and construction helpers shared across unit and integration
//! tests.

use crate::tensor::Tensor;

/// Asserts that `actual` has the given shape and element values, comparing
/// floats with an absolute tolerance.
pub fn check_tensor_near(actual: &Tensor, expected_shape: &[usize], expected_data: &[f32], tolerance: f32) {
    assert_eq!(
        actual.shape(),
        expected_shape,
        "shape mismatch: got {:?}, expected {:?}",
        actual.shape(),
        expected_shape
    );
    let data = actual.get_f32_data().expect("tensor data should be readable as f32");
    assert_eq!(
        data.len(),
        expected_data.len(),
        "element count mismatch: got {}, expected {}",
        data.len(),
        expected_data.len()
    );
    for (i, (a, e)) in data.iter().zip(expected_data.iter()).enumerate() {
        assert!(
            approx::abs_diff_eq!(*a, *e, epsilon = tolerance),
            "element {} differs: got {}, expected {} (tolerance {})",
            i,
            a,
            e,
            tolerance
        );
    }
}

/// Builds an f32 tensor, panicking on invalid arguments.
pub fn create_test_tensor(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("test tensor construction failed")
}

/// Builds an f32 tensor with gradient tracking enabled.
pub fn create_test_tensor_with_grad(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    let t = create_test_tensor(data, shape);
    t.set_requires_grad(true)
        .expect("test tensor should accept requires_grad");
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_tensor_with_grad() {
        let t = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
        assert!(t.requires_grad());
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn test_check_tensor_near_rejects_wrong_shape() {
        let t = create_test_tensor(vec![1.0, 2.0], vec![2]);
        check_tensor_near(&t, &[1, 2], &[1.0, 2.0], 1e-6);
    }
}
