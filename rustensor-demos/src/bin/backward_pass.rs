//! The same logistic regression unit with gradient tracking on the model
//! parameters, showing what a backward pass leaves behind.

use rustensor_core::nn::binary_cross_entropy;
use rustensor_core::tensor;
use rustensor_core::{RustensorError, Tensor};

fn main() -> Result<(), RustensorError> {
    env_logger::init();

    let y = tensor::ones(&[])?;
    let x1 = Tensor::new(vec![1.1], vec![])?;
    let w1 = Tensor::new(vec![2.2], vec![])?;
    let b = tensor::zeros(&[])?;

    // Only the trainable parameters ask for gradients.
    w1.set_requires_grad(true)?;
    b.set_requires_grad(true)?;

    let z = x1.mul(&w1)?.add(&b)?;
    let a = z.sigmoid()?;
    let loss = binary_cross_entropy(&a, &y)?;

    println!("loss = {}", loss);
    println!("loss node: {:?}", loss);

    log::info!("running backward from the loss node");
    loss.backward(None)?;

    match (w1.grad(), b.grad()) {
        (Some(grad_w), Some(grad_b)) => {
            println!("dL/dw = {}", grad_w);
            println!("dL/db = {}", grad_b);
        }
        _ => println!("no gradients were produced"),
    }

    // Inputs that never asked for gradients stay untouched.
    println!("x1 grad present: {}", x1.grad().is_some());

    Ok(())
}
