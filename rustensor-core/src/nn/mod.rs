pub mod losses;

pub use losses::bce::{binary_cross_entropy, BCELoss, Reduction};
