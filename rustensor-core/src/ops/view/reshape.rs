use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::ops::view::contiguous_op;
use crate::tensor::utils::calculate_strides;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

/// Backward node for view/reshape: the gradient is the output gradient laid
/// out back in the input's shape.
#[derive(Debug)]
struct ViewBackward {
    a_node: Arc<RwLock<TensorData>>,
    input_shape: Vec<usize>,
}

impl BackwardOp for ViewBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        Ok(vec![reshape_op(grad_output, self.input_shape.clone())?])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a_node)]
    }
}

/// Reinterprets a contiguous tensor under a new shape without copying.
///
/// Fails with `ShapeMismatch` when the element counts differ and with
/// `UnsupportedOperation` when the tensor is not contiguous; use
/// [`reshape_op`] to get a copying fallback.
pub fn view_op(a: &Tensor, new_shape: Vec<usize>) -> Result<Tensor, RustensorError> {
    let new_numel: usize = new_shape.iter().product();
    if new_numel != a.numel() {
        return Err(RustensorError::ShapeMismatch {
            expected: format!("shape with {} elements", a.numel()),
            actual: format!("{:?} ({} elements)", new_shape, new_numel),
            operation: "view".to_string(),
        });
    }
    if !a.is_contiguous() {
        return Err(RustensorError::UnsupportedOperation(
            "view requires a contiguous tensor; call contiguous() or reshape() instead"
                .to_string(),
        ));
    }

    let (buffer, offset) = {
        let guard = a.read_data();
        (guard.buffer().clone(), guard.offset)
    };
    let strides = calculate_strides(&new_shape);
    let td = TensorData::new_view(buffer, offset, new_shape, strides);
    let output = Tensor {
        data: Arc::new(RwLock::new(td)),
    };

    if a.requires_grad() || a.grad_fn().is_some() {
        let grad_fn = Arc::new(ViewBackward {
            a_node: Arc::clone(&a.data),
            input_shape: a.shape(),
        });
        let mut guard = output.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }

    Ok(output)
}

/// Changes the shape, sharing storage when the tensor is contiguous and
/// copying through [`contiguous_op`] otherwise.
pub fn reshape_op(a: &Tensor, new_shape: Vec<usize>) -> Result<Tensor, RustensorError> {
    if a.is_contiguous() {
        view_op(a, new_shape)
    } else {
        let materialized = contiguous_op(a)?;
        view_op(&materialized, new_shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::view::transpose_op;

    #[test]
    fn test_view_shares_buffer() {
        let t = Tensor::new_i64(vec![1, 2, 3, 4, 5, 6], vec![6]).unwrap();
        let v = view_op(&t, vec![2, 3]).unwrap();
        assert_eq!(v.shape(), vec![2, 3]);
        let (tb, vb) = (t.read_data().buffer().clone(), v.read_data().buffer().clone());
        assert!(Arc::ptr_eq(&tb, &vb));
    }

    #[test]
    fn test_view_wrong_numel() {
        let t = Tensor::new_i64(vec![1, 2, 3, 4], vec![4]).unwrap();
        assert!(matches!(
            view_op(&t, vec![3, 2]),
            Err(RustensorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_view_rejects_non_contiguous() {
        let t = Tensor::new_i64(vec![1, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
        let tt = transpose_op(&t, 0, 1).unwrap();
        assert!(matches!(
            view_op(&tt, vec![6]),
            Err(RustensorError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_reshape_copies_non_contiguous() {
        let t = Tensor::new_i64(vec![1, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
        let tt = transpose_op(&t, 0, 1).unwrap();
        let r = reshape_op(&tt, vec![6]).unwrap();
        assert_eq!(r.get_i64_data().unwrap(), vec![1, 4, 2, 5, 3, 6]);
        let (tb, rb) = (t.read_data().buffer().clone(), r.read_data().buffer().clone());
        assert!(!Arc::ptr_eq(&tb, &rb));
    }

    #[test]
    fn test_view_backward_restores_shape() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![4]).unwrap();
        t.set_requires_grad(true).unwrap();
        let v = view_op(&t, vec![2, 2]).unwrap();
        let seed = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        v.backward(Some(seed)).unwrap();
        let grad = t.grad().unwrap();
        assert_eq!(grad.shape(), vec![4]);
        assert_eq!(grad.get_f32_data().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }
}
