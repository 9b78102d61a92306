use crate::error::RustensorError;
use crate::ops::arithmetic::mul::mul_op;
use crate::ops::reduction::sum_op;
use crate::tensor::Tensor;
use approx::relative_eq;

/// Verifies analytic gradients against central finite differences.
///
/// `func` is run twice: once on `requires_grad` copies of `inputs` to obtain
/// the analytic gradients via `backward()`, then repeatedly on perturbed
/// copies to estimate each partial derivative numerically as
/// `(f(x + eps) - f(x - eps)) / (2 * eps)` of the scalar loss
/// `sum(func(inputs) * output_grad)`.
///
/// Returns `Err(RustensorError::BackwardError)` naming the first element
/// whose analytic and numeric gradients disagree beyond `tolerance`.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &Tensor,
    epsilon: f32,
    tolerance: f32,
) -> Result<(), RustensorError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, RustensorError>,
{
    // Analytic pass on fresh leaf copies so we never disturb caller state.
    let grad_inputs: Vec<Tensor> = inputs
        .iter()
        .map(|t| {
            let copy = Tensor::new(t.get_f32_data()?, t.shape())?;
            copy.set_requires_grad(true)?;
            Ok(copy)
        })
        .collect::<Result<Vec<_>, RustensorError>>()?;

    let output = func(&grad_inputs)?;
    if output.shape() != output_grad.shape() {
        return Err(RustensorError::ShapeMismatch {
            expected: format!("{:?}", output.shape()),
            actual: format!("{:?}", output_grad.shape()),
            operation: "check_grad (output_grad)".to_string(),
        });
    }
    output.backward(Some(output_grad.clone()))?;

    let scalar_loss = |ts: &[Tensor]| -> Result<f32, RustensorError> {
        let out = func(ts)?;
        let weighted = mul_op(&out, output_grad)?;
        sum_op(&weighted)?.item_f32()
    };

    for (i, input) in inputs.iter().enumerate() {
        let analytic = grad_inputs[i]
            .grad()
            .ok_or_else(|| {
                RustensorError::BackwardError(format!("no gradient computed for input {}", i))
            })?
            .get_f32_data()?;
        let base = input.get_f32_data()?;

        for j in 0..base.len() {
            let mut plus = base.clone();
            plus[j] += epsilon;
            let mut minus = base.clone();
            minus[j] -= epsilon;

            let mut ts_plus = inputs.to_vec();
            ts_plus[i] = Tensor::new(plus, input.shape())?;
            let mut ts_minus = inputs.to_vec();
            ts_minus[i] = Tensor::new(minus, input.shape())?;

            let numeric = (scalar_loss(&ts_plus)? - scalar_loss(&ts_minus)?) / (2.0 * epsilon);
            let ok = relative_eq!(
                analytic[j],
                numeric,
                epsilon = tolerance,
                max_relative = tolerance
            );
            if !ok {
                return Err(RustensorError::BackwardError(format!(
                    "gradient mismatch for input {} element {}: analytic {} vs numeric {}",
                    i, j, analytic[j], numeric
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor;

    #[test]
    fn test_check_grad_mul() {
        let a = Tensor::new(vec![1.5, -2.0, 0.5], vec![3]).unwrap();
        let b = Tensor::new(vec![0.3, 1.2, -0.7], vec![3]).unwrap();
        let grad = tensor::ones(&[3]).unwrap();
        let result = check_grad(
            |ts| mul_op(&ts[0], &ts[1]),
            &[a, b],
            &grad,
            1e-3,
            1e-2,
        );
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_check_grad_square() {
        let a = Tensor::new(vec![2.0, 3.0, -1.5], vec![3]).unwrap();
        let grad = tensor::ones(&[3]).unwrap();
        let result = check_grad(|ts| mul_op(&ts[0], &ts[0]), &[a], &grad, 1e-3, 1e-2);
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_check_grad_rejects_mismatched_output_grad() {
        let a = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        let b = Tensor::new(vec![3.0, 4.0], vec![2]).unwrap();
        let grad = tensor::ones(&[3]).unwrap();
        let result = check_grad(|ts| mul_op(&ts[0], &ts[1]), &[a, b], &grad, 1e-3, 1e-2);
        assert!(matches!(
            result,
            Err(RustensorError::ShapeMismatch { .. })
        ));
    }
}
