pub mod autograd;
pub mod buffer;
pub mod error;
pub mod nn;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod types;
pub mod utils;

pub use error::RustensorError;
pub use tensor::Tensor;
pub use types::DType;

// Re-export for downstream code that extends the generic kernels.
pub use num_traits;
