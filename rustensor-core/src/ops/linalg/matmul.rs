use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;
use num_traits::Zero;
use std::ops::{AddAssign, Mul};
use std::sync::{Arc, RwLock};

/// Naive row-major matrix product of an `m x k` and a `k x n` operand.
fn matmul_kernel<T>(a: &[T], b: &[T], m: usize, k: usize, n: usize) -> Vec<T>
where
    T: Copy + Zero + AddAssign + Mul<Output = T>,
{
    let mut out = vec![T::zero(); m * n];
    for i in 0..m {
        for l in 0..k {
            let a_il = a[i * k + l];
            for j in 0..n {
                out[i * n + j] += a_il * b[l * n + j];
            }
        }
    }
    out
}

fn transpose2<T: Copy>(data: &[T], rows: usize, cols: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(data.len());
    for j in 0..cols {
        for i in 0..rows {
            out.push(data[i * cols + j]);
        }
    }
    out
}

/// Backward node for matrix multiplication:
/// dL/dA = dL/dC . B^T and dL/dB = A^T . dL/dC.
#[derive(Debug)]
struct MatmulBackward {
    a_node: Arc<RwLock<TensorData>>,
    b_node: Arc<RwLock<TensorData>>,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        let a = Tensor {
            data: Arc::clone(&self.a_node),
        };
        let b = Tensor {
            data: Arc::clone(&self.b_node),
        };
        let (m, k) = (a.shape()[0], a.shape()[1]);
        let n = b.shape()[1];

        let a_data = a.get_f32_data()?;
        let b_data = b.get_f32_data()?;
        let g_data = grad_output.get_f32_data()?;

        // Raw kernels keep the gradients out of the graph.
        let b_t = transpose2(&b_data, k, n);
        let grad_a = matmul_kernel(&g_data, &b_t, m, n, k);
        let a_t = transpose2(&a_data, m, k);
        let grad_b = matmul_kernel(&a_t, &g_data, k, m, n);

        Ok(vec![
            Tensor::new(grad_a, vec![m, k])?,
            Tensor::new(grad_b, vec![k, n])?,
        ])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node), Arc::as_ptr(&self.b_node)]
    }
}

/// Matrix multiplication of two rank-2 tensors of the same dtype.
pub fn matmul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, RustensorError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    if a_shape.len() != 2 || b_shape.len() != 2 || a_shape[1] != b_shape[0] {
        return Err(RustensorError::IncompatibleShapes {
            shape1: a_shape,
            shape2: b_shape,
            operation: "matmul".to_string(),
        });
    }
    if a.dtype() != b.dtype() {
        return Err(RustensorError::DataTypeMismatch {
            expected: a.dtype(),
            actual: b.dtype(),
            operation: "matmul".to_string(),
        });
    }

    let (m, k, n) = (a_shape[0], a_shape[1], b_shape[1]);
    let output = match a.dtype() {
        DType::F32 => {
            let data = matmul_kernel(&a.get_f32_data()?, &b.get_f32_data()?, m, k, n);
            Tensor::new(data, vec![m, n])?
        }
        DType::I64 => {
            let data = matmul_kernel(&a.get_i64_data()?, &b.get_i64_data()?, m, k, n);
            Tensor::new_i64(data, vec![m, n])?
        }
    };

    let track_a = a.requires_grad() || a.grad_fn().is_some();
    let track_b = b.requires_grad() || b.grad_fn().is_some();
    if track_a || track_b {
        let grad_fn = Arc::new(MatmulBackward {
            a_node: Arc::clone(&a.data),
            b_node: Arc::clone(&b.data),
        });
        let mut guard = output.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }

    Ok(output)
}

impl Tensor {
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor, RustensorError> {
        matmul_op(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{check_tensor_near, create_test_tensor_with_grad};

    #[test]
    fn test_matmul_i64() {
        let a = Tensor::new_i64(vec![1, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
        let b = a.t().unwrap();
        let c = matmul_op(&a, &b).unwrap();
        assert_eq!(c.shape(), vec![2, 2]);
        assert_eq!(c.get_i64_data().unwrap(), vec![14, 32, 32, 77]);
    }

    #[test]
    fn test_matmul_f32() {
        let a = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let b = Tensor::new(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]).unwrap();
        let c = matmul_op(&a, &b).unwrap();
        check_tensor_near(&c, &[2, 2], &[19.0, 22.0, 43.0, 50.0], 1e-5);
    }

    #[test]
    fn test_matmul_inner_dim_mismatch() {
        let a = Tensor::new_i64(vec![1, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
        let b = Tensor::new_i64(vec![1, 2, 3, 4], vec![2, 2]).unwrap();
        assert!(matches!(
            matmul_op(&a, &b),
            Err(RustensorError::IncompatibleShapes { .. })
        ));
    }

    #[test]
    fn test_matmul_rank1_rejected() {
        let a = Tensor::new_i64(vec![1, 2, 3], vec![3]).unwrap();
        let b = Tensor::new_i64(vec![1, 2, 3], vec![3]).unwrap();
        assert!(matches!(
            matmul_op(&a, &b),
            Err(RustensorError::IncompatibleShapes { .. })
        ));
    }

    #[test]
    fn test_matmul_dtype_mismatch() {
        let a = Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap();
        let b = Tensor::new_i64(vec![1, 2], vec![2, 1]).unwrap();
        assert!(matches!(
            matmul_op(&a, &b),
            Err(RustensorError::DataTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_matmul_non_contiguous_operand() {
        // B supplied as a transpose view, gathered in logical order.
        let a = Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap();
        let b_src = Tensor::new(vec![3.0, 4.0], vec![1, 2]).unwrap();
        let b = b_src.t().unwrap(); // [2, 1]
        let c = matmul_op(&a, &b).unwrap();
        check_tensor_near(&c, &[1, 1], &[11.0], 1e-6);
    }

    #[test]
    fn test_matmul_backward() {
        let a = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let b = create_test_tensor_with_grad(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]);
        let c = matmul_op(&a, &b).unwrap();
        let loss = c.sum().unwrap();
        loss.backward(None).unwrap();
        // dA = ones . B^T, dB = A^T . ones
        check_tensor_near(&a.grad().unwrap(), &[2, 2], &[11.0, 15.0, 11.0, 15.0], 1e-5);
        check_tensor_near(&b.grad().unwrap(), &[2, 2], &[4.0, 4.0, 6.0, 6.0], 1e-5);
    }
}
