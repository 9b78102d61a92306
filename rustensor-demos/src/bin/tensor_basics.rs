//! Walkthrough of tensor creation, dtypes and shape manipulation.

use rustensor_core::ops::dtype::cast_op;
use rustensor_core::{DType, RustensorError, Tensor};

fn main() -> Result<(), RustensorError> {
    env_logger::init();

    // Tensors of increasing rank from plain vectors.
    let scalar = Tensor::new_i64(vec![1], vec![])?;
    let vector = Tensor::new_i64(vec![1, 2, 3], vec![3])?;
    let matrix = Tensor::new_i64(vec![1, 2, 3, 4], vec![2, 2])?;
    let cube = Tensor::new_i64((1..=8).collect(), vec![2, 2, 2])?;

    println!("scalar: {}", scalar);
    println!("vector: {}", vector);
    println!("matrix: {}", matrix);
    println!("rank-3: {}", cube);

    // Integer data defaults to I64; a cast moves it to F32.
    println!("vector dtype: {:?}", vector.dtype());
    let floats = cast_op(&vector, DType::F32)?;
    println!("after cast:   {:?} -> {}", floats.dtype(), floats);

    // Reshape, view and transpose.
    let flat = Tensor::new_i64(vec![1, 2, 3, 4, 5, 6], vec![6])?;
    let two_by_three = flat.reshape(vec![2, 3])?;
    println!("reshaped to {:?}: {}", two_by_three.shape(), two_by_three);

    let viewed = flat.view(vec![3, 2])?;
    println!("viewed as {:?}:   {}", viewed.shape(), viewed);

    let transposed = two_by_three.t()?;
    println!("transposed:      {}", transposed);
    println!("strides after t(): {:?}", transposed.strides());

    // Matrix product with the tensor's own transpose.
    log::debug!(
        "matmul {:?} x {:?}",
        two_by_three.shape(),
        transposed.shape()
    );
    let product = two_by_three.matmul(&transposed)?;
    println!("A . A^T = {}", product);

    Ok(())
}
