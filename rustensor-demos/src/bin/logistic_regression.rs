//! Forward pass of a one-feature logistic regression unit: weighted sum,
//! sigmoid activation and binary cross-entropy against the true label.

use rustensor_core::nn::binary_cross_entropy;
use rustensor_core::tensor;
use rustensor_core::{RustensorError, Tensor};

fn main() -> Result<(), RustensorError> {
    env_logger::init();

    let y = tensor::ones(&[])?; // true label
    let x1 = Tensor::new(vec![1.1], vec![])?; // input feature
    let w1 = Tensor::new(vec![2.2], vec![])?; // weight
    let b = tensor::zeros(&[])?; // bias

    log::debug!("computing net input from x1, w1, b");
    let z = x1.mul(&w1)?.add(&b)?; // net input
    let a = z.sigmoid()?; // activation

    println!("z    = {}", z);
    println!("a    = {}", a);

    let loss = binary_cross_entropy(&a, &y)?;
    println!("loss = {}", loss);

    Ok(())
}
