use crate::error::RustensorError;
use crate::tensor::Tensor;
use crate::types::DType;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Creates a new F32 tensor filled with zeros.
pub fn zeros(shape: &[usize]) -> Result<Tensor, RustensorError> {
    let numel = shape.iter().product();
    Tensor::new(vec![0.0; numel], shape.to_vec())
}

/// Creates a new F32 tensor filled with ones.
pub fn ones(shape: &[usize]) -> Result<Tensor, RustensorError> {
    let numel = shape.iter().product();
    Tensor::new(vec![1.0; numel], shape.to_vec())
}

/// Creates a new F32 tensor filled with a specific value.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, RustensorError> {
    let numel = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Creates a new F32 tensor from a `Vec<f32>` and shape.
pub fn from_vec_f32(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Tensor, RustensorError> {
    Tensor::new(data_vec, shape)
}

/// Creates a new I64 tensor from a `Vec<i64>` and shape.
pub fn from_vec_i64(data_vec: Vec<i64>, shape: Vec<usize>) -> Result<Tensor, RustensorError> {
    Tensor::new_i64(data_vec, shape)
}

/// Creates a tensor of zeros with the same shape and dtype as the input.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, RustensorError> {
    let shape = tensor.shape();
    let numel = shape.iter().product();
    match tensor.dtype() {
        DType::F32 => Tensor::new(vec![0.0; numel], shape),
        DType::I64 => Tensor::new_i64(vec![0; numel], shape),
    }
}

/// Creates a tensor of ones with the same shape and dtype as the input.
pub fn ones_like(tensor: &Tensor) -> Result<Tensor, RustensorError> {
    let shape = tensor.shape();
    let numel = shape.iter().product();
    match tensor.dtype() {
        DType::F32 => Tensor::new(vec![1.0; numel], shape),
        DType::I64 => Tensor::new_i64(vec![1; numel], shape),
    }
}

/// Creates an F32 tensor with elements drawn uniformly from [0, 1).
pub fn rand(shape: &[usize]) -> Result<Tensor, RustensorError> {
    let numel = shape.iter().product();
    let mut rng = rand::thread_rng();
    let data_vec: Vec<f32> = (0..numel).map(|_| rng.gen::<f32>()).collect();
    Tensor::new(data_vec, shape.to_vec())
}

/// Creates an F32 tensor with elements drawn from the standard normal
/// distribution.
pub fn randn(shape: &[usize]) -> Result<Tensor, RustensorError> {
    let numel = shape.iter().product();
    let mut rng = rand::thread_rng();
    let data_vec: Vec<f32> = (0..numel)
        .map(|_| StandardNormal.sample(&mut rng))
        .collect();
    Tensor::new(data_vec, shape.to_vec())
}
