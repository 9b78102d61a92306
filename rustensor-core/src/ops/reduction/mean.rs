use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::sync::{Arc, RwLock};

/// Backward node for a full mean: each element contributed with weight 1/N.
#[derive(Debug)]
struct MeanBackward {
    a_node: Arc<RwLock<TensorData>>,
    a_shape: Vec<usize>,
}

impl BackwardOp for MeanBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        let numel: usize = self.a_shape.iter().product();
        let g = grad_output.item_f32()? / numel as f32;
        Ok(vec![Tensor::new(vec![g; numel], self.a_shape.clone())?])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node)]
    }
}

/// Averages all elements into a rank-0 tensor. Float tensors only.
pub fn mean_op(a: &Tensor) -> Result<Tensor, RustensorError> {
    if a.dtype() != DType::F32 {
        return Err(RustensorError::DataTypeMismatch {
            expected: DType::F32,
            actual: a.dtype(),
            operation: "mean".to_string(),
        });
    }
    let data = a.get_f32_data()?;
    if data.is_empty() {
        return Err(RustensorError::UnsupportedOperation(
            "mean of an empty tensor".to_string(),
        ));
    }
    let avg = data.iter().sum::<f32>() / data.len() as f32;
    let output = Tensor::new(vec![avg], vec![])?;

    if a.requires_grad() || a.grad_fn().is_some() {
        let grad_fn = Arc::new(MeanBackward {
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
    pub fn mean(&self) -> Result<Tensor, RustensorError> {
        mean_op(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{check_tensor_near, create_test_tensor_with_grad};

    #[test]
    fn test_mean_f32() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let m = mean_op(&t).unwrap();
        assert_eq!(m.item_f32().unwrap(), 2.5);
    }

    #[test]
    fn test_mean_rejects_i64() {
        let t = Tensor::new_i64(vec![1, 2], vec![2]).unwrap();
        assert!(matches!(
            mean_op(&t),
            Err(RustensorError::DataTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_mean_backward() {
        let t = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0], vec![4]);
        let m = mean_op(&t).unwrap();
        m.backward(None).unwrap();
        check_tensor_near(&t.grad().unwrap(), &[4], &[0.25, 0.25, 0.25, 0.25], 1e-6);
    }
}
