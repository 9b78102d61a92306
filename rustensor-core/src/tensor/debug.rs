use crate::tensor::Tensor;
use crate::types::DType;
use std::fmt;

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data.read() {
            Ok(guard) => {
                write!(
                    f,
                    "Tensor(shape={:?}, strides={:?}, offset={}, dtype={:?}, requires_grad={}, has_grad={}, has_grad_fn={})",
                    guard.shape,
                    guard.strides,
                    guard.offset,
                    guard.dtype,
                    guard.requires_grad,
                    guard.grad.is_some(),
                    guard.grad_fn.is_some()
                )
            }
            Err(_) => write!(f, "Tensor(Error: RwLock poisoned)"),
        }
    }
}

impl fmt::Display for Tensor {
    /// Renders the tensor values nested by dimension, e.g.
    /// `tensor([[1, 2, 3], [4, 5, 6]], dtype=I64)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (shape, dtype) = {
            let guard = self.data.read().map_err(|_| fmt::Error)?;
            (guard.shape.clone(), guard.dtype)
        };

        let rendered: Vec<String> = match dtype {
            DType::I64 => self
                .get_i64_data()
                .map_err(|_| fmt::Error)?
                .iter()
                .map(|v| format!("{}", v))
                .collect(),
            DType::F32 => self
                .get_f32_data()
                .map_err(|_| fmt::Error)?
                .iter()
                .map(|v| format!("{:.4}", v))
                .collect(),
        };

        write!(f, "tensor(")?;
        fmt_nested(f, &rendered, &shape)?;
        write!(f, ", dtype={:?})", dtype)
    }
}

/// Recursively prints a flat, row-major list of rendered elements with
/// bracket nesting that follows the shape.
fn fmt_nested(f: &mut fmt::Formatter<'_>, data: &[String], shape: &[usize]) -> fmt::Result {
    if shape.is_empty() {
        return write!(f, "{}", data[0]);
    }
    write!(f, "[")?;
    if shape[0] > 0 && !data.is_empty() {
        let chunk = data.len() / shape[0];
        for i in 0..shape[0] {
            if i > 0 {
                write!(f, ", ")?;
            }
            fmt_nested(f, &data[i * chunk..(i + 1) * chunk], &shape[1..])?;
        }
    }
    write!(f, "]")
}

#[cfg(test)]
mod tests {
    use crate::tensor::Tensor;

    #[test]
    fn test_display_rank0() {
        let t = Tensor::new_i64(vec![1], vec![]).unwrap();
        assert_eq!(format!("{}", t), "tensor(1, dtype=I64)");
    }

    #[test]
    fn test_display_rank2() {
        let t = Tensor::new_i64(vec![1, 2, 3, 4], vec![2, 2]).unwrap();
        assert_eq!(format!("{}", t), "tensor([[1, 2], [3, 4]], dtype=I64)");
    }

    #[test]
    fn test_display_rank3_f32() {
        let t = Tensor::new(vec![1.0; 8], vec![2, 2, 2]).unwrap();
        let s = format!("{}", t);
        assert!(s.starts_with("tensor([[[1.0000, 1.0000], [1.0000, 1.0000]],"));
        assert!(s.ends_with("dtype=F32)"));
    }

    #[test]
    fn test_debug_metadata() {
        let t = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        let s = format!("{:?}", t);
        assert!(s.contains("shape=[2]"));
        assert!(s.contains("requires_grad=false"));
    }
}
