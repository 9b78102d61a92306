/// Defines the possible data types for Tensor elements.
///
/// Integer examples use 64-bit integers (the default integer width for
/// tensors built from integer literals) and floating-point work uses 32-bit
/// floats, which trade a little precision for half the memory of f64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 64-bit signed integer type.
    I64,
    /// 32-bit floating-point type.
    F32,
}

impl DType {
    /// Returns true if the dtype supports gradient tracking.
    pub fn is_float(&self) -> bool {
        matches!(self, DType::F32)
    }
}
