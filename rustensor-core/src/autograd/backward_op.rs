use crate::autograd::graph::NodeId;
use crate::error::RustensorError;
use crate::tensor::Tensor;
use std::fmt::Debug;

/// Defines the interface for the backward pass of a differentiable tensor
/// operation.
///
/// Any operation that creates a non-leaf tensor (one produced from inputs
/// that require gradients) stores an implementation of this trait in the
/// output tensor's `grad_fn` field. During `backward()` the chain rule is
/// applied by walking these nodes in reverse topological order.
///
/// `Debug + Send + Sync` are required because the `Arc<dyn BackwardOp>`
/// holding the node may be shared across tensor clones.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes the gradients of the operation's inputs given the gradient
    /// of its output (dL/dOutput).
    ///
    /// Returns one gradient tensor per forward input. The order **must**
    /// match the order of identifiers returned by [`inputs`](Self::inputs),
    /// and each gradient must have the shape of the corresponding input.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RustensorError>;

    /// Returns identifiers for the input tensor nodes of the forward
    /// operation, linking this node back to its predecessors in the graph.
    ///
    /// The identifiers are raw pointers to the shared `RwLock<TensorData>`
    /// of each input. Implementations keep the corresponding `Arc`s alive
    /// for as long as the node exists, so the pointers stay valid for the
    /// duration of any backward pass that can reach them.
    fn inputs(&self) -> Vec<NodeId>;
}
