use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::ops::arithmetic::{add_op, mul_op, sub_op};
use crate::ops::math_elem::ln_op;
use crate::ops::reduction::{mean_op, sum_op};
use crate::tensor::{self, Tensor};
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::sync::{Arc, RwLock};

/// How per-element losses are collapsed into the scalar result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Mean,
    Sum,
}

impl Reduction {
    fn from_str(s: &str) -> Result<Self, RustensorError> {
        match s {
            "mean" => Ok(Reduction::Mean),
            "sum" => Ok(Reduction::Sum),
            other => Err(RustensorError::UnsupportedOperation(format!(
                "unknown reduction '{}', expected 'mean' or 'sum'",
                other
            ))),
        }
    }
}

/// Analytic backward node for the whole binary cross-entropy expression.
///
/// The forward pass is composed from elementary ops, but their chained
/// gradients would walk several intermediate nodes per element. This node
/// replaces that chain with the closed forms
///   dL/da = (a - y) / (a * (1 - a))
///   dL/dy = ln((1 - a) / a)
/// each scaled by 1/N under mean reduction.
#[derive(Debug)]
struct BCEBackward {
    input_node: Arc<RwLock<TensorData>>,
    target_node: Arc<RwLock<TensorData>>,
    reduction: Reduction,
}

impl BackwardOp for BCEBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError> {
        let input = Tensor {
            data: Arc::clone(&self.input_node),
        };
        let target = Tensor {
            data: Arc::clone(&self.target_node),
        };
        let a = input.get_f32_data()?;
        let y = target.get_f32_data()?;
        let g = grad_output.item_f32()?;

        let scale = match self.reduction {
            Reduction::Mean => g / a.len() as f32,
            Reduction::Sum => g,
        };

        let grad_input: Vec<f32> = a
            .iter()
            .zip(y.iter())
            .map(|(&ai, &yi)| scale * (ai - yi) / (ai * (1.0 - ai)))
            .collect();
        let grad_target: Vec<f32> = a
            .iter()
            .map(|&ai| scale * ((1.0 - ai) / ai).ln())
            .collect();

        Ok(vec![
            Tensor::new(grad_input, input.shape())?,
            Tensor::new(grad_target, target.shape())?,
        ])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![
            Arc::as_ptr(&self.input_node),
            Arc::as_ptr(&self.target_node),
        ]
    }
}

/// Binary cross-entropy between probabilities and targets in [0, 1].
///
/// L_i = -(y_i * ln(a_i) + (1 - y_i) * ln(1 - a_i))
///
/// Inputs are expected to already lie strictly inside (0, 1); a prediction
/// of exactly 0 or 1 produces inf or NaN terms, matching the underlying
/// logarithm.
#[derive(Debug, Clone, Copy)]
pub struct BCELoss {
    reduction: Reduction,
}

impl BCELoss {
    pub fn new(reduction: &str) -> Result<Self, RustensorError> {
        Ok(BCELoss {
            reduction: Reduction::from_str(reduction)?,
        })
    }

    pub fn calculate(&self, input: &Tensor, target: &Tensor) -> Result<Tensor, RustensorError> {
        if input.shape() != target.shape() {
            return Err(RustensorError::ShapeMismatch {
                expected: format!("{:?}", input.shape()),
                actual: format!("{:?}", target.shape()),
                operation: "binary_cross_entropy".to_string(),
            });
        }
        for t in [input, target] {
            if t.dtype() != DType::F32 {
                return Err(RustensorError::DataTypeMismatch {
                    expected: DType::F32,
                    actual: t.dtype(),
                    operation: "binary_cross_entropy".to_string(),
                });
            }
        }

        log::debug!(
            "binary_cross_entropy over {} elements, reduction {:?}",
            input.numel(),
            self.reduction
        );

        // Forward composed from elementary ops:
        // -(y * ln(a) + (1 - y) * ln(1 - a)), then reduced.
        let one = tensor::full(&[], 1.0)?;
        let term_pos = mul_op(target, &ln_op(input)?)?;
        let term_neg = mul_op(&sub_op(&one, target)?, &ln_op(&sub_op(&one, input)?)?)?;
        let total = add_op(&term_pos, &term_neg)?;
        let neg_one = tensor::full(&[], -1.0)?;
        let per_element = mul_op(&total, &neg_one)?;
        let loss = match self.reduction {
            Reduction::Mean => mean_op(&per_element)?,
            Reduction::Sum => sum_op(&per_element)?,
        };

        // Swap the composed chain for the analytic node.
        let track_input = input.requires_grad() || input.grad_fn().is_some();
        let track_target = target.requires_grad() || target.grad_fn().is_some();
        if track_input || track_target {
            loss.set_grad_fn(Some(Arc::new(BCEBackward {
                input_node: Arc::clone(&input.data),
                target_node: Arc::clone(&target.data),
                reduction: self.reduction,
            })));
            loss.write_data().requires_grad = true;
        } else {
            loss.set_grad_fn(None);
            loss.write_data().requires_grad = false;
        }

        Ok(loss)
    }
}

/// Mean-reduced binary cross-entropy.
pub fn binary_cross_entropy(input: &Tensor, target: &Tensor) -> Result<Tensor, RustensorError> {
    BCELoss { reduction: Reduction::Mean }.calculate(input, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

    #[test]
    fn test_bce_reduction_parsing() {
        assert!(BCELoss::new("mean").is_ok());
        assert!(BCELoss::new("sum").is_ok());
        assert!(matches!(
            BCELoss::new("median"),
            Err(RustensorError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_bce_forward_single_element() {
        // a = sigmoid(2.42) ~= 0.9183397, y = 1: loss = -ln(a) ~= 0.0851877
        let a = create_test_tensor(vec![0.9183397], vec![1]);
        let y = create_test_tensor(vec![1.0], vec![1]);
        let loss = binary_cross_entropy(&a, &y).unwrap();
        assert_relative_eq!(loss.item_f32().unwrap(), 0.0851877, epsilon = 1e-5);
    }

    #[test]
    fn test_bce_mean_vs_sum() {
        let a = create_test_tensor(vec![0.8, 0.4], vec![2]);
        let y = create_test_tensor(vec![1.0, 0.0], vec![2]);
        let sum = BCELoss::new("sum").unwrap().calculate(&a, &y).unwrap();
        let mean = BCELoss::new("mean").unwrap().calculate(&a, &y).unwrap();
        assert_relative_eq!(
            sum.item_f32().unwrap(),
            2.0 * mean.item_f32().unwrap(),
            epsilon = 1e-6
        );
        // -(ln(0.8) + ln(0.6)) ~= 0.7339692
        assert_relative_eq!(sum.item_f32().unwrap(), 0.7339692, epsilon = 1e-5);
    }

    #[test]
    fn test_bce_shape_mismatch() {
        let a = create_test_tensor(vec![0.5, 0.5], vec![2]);
        let y = create_test_tensor(vec![1.0], vec![1]);
        assert!(matches!(
            binary_cross_entropy(&a, &y),
            Err(RustensorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_bce_backward_matches_closed_form() {
        let a = create_test_tensor_with_grad(vec![0.9183397], vec![1]);
        let y = create_test_tensor(vec![1.0], vec![1]);
        let loss = binary_cross_entropy(&a, &y).unwrap();
        loss.backward(None).unwrap();
        // dL/da = (a - y) / (a * (1 - a)) = -1 / a ~= -1.0889215
        check_tensor_near(&a.grad().unwrap(), &[1], &[-1.0889215], 1e-4);
    }

    #[test]
    fn test_bce_backward_mean_scaling() {
        let a = create_test_tensor_with_grad(vec![0.8, 0.4], vec![2]);
        let y = create_test_tensor(vec![1.0, 0.0], vec![2]);
        let loss = binary_cross_entropy(&a, &y).unwrap();
        loss.backward(None).unwrap();
        // per element: (a - y) / (a(1 - a)) / N
        // e1: (0.8 - 1) / (0.8 * 0.2) / 2 = -0.625
        // e2: (0.4 - 0) / (0.4 * 0.6) / 2 ~= 0.8333333
        check_tensor_near(&a.grad().unwrap(), &[2], &[-0.625, 0.8333333], 1e-5);
    }

    #[test]
    fn test_bce_untracked_inputs_leave_no_graph() {
        let a = create_test_tensor(vec![0.5], vec![1]);
        let y = create_test_tensor(vec![1.0], vec![1]);
        let loss = binary_cross_entropy(&a, &y).unwrap();
        assert!(loss.grad_fn().is_none());
        assert!(!loss.requires_grad());
    }
}
