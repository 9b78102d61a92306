pub mod contiguous;
pub mod reshape;
pub mod transpose;

pub use contiguous::contiguous_op;
pub use reshape::{reshape_op, view_op};
pub use transpose::transpose_op;
