use crate::error::RustensorError;
use crate::tensor_data::TensorData;
use std::collections::HashSet;
use std::sync::RwLock;

/// Identifier of a node in the computation graph.
///
/// Tensors are identified by the address of their shared `RwLock<TensorData>`,
/// which stays stable across `Tensor` clones and is cheap to hash. Backward
/// nodes hold `Arc`s to their inputs, keeping every reachable pointer valid
/// while the graph is alive.
pub type NodeId = *const RwLock<TensorData>;

/// Produces the nodes reachable from `root` through `grad_fn` links, in
/// reverse topological order (root first). This is the visit order for the
/// backward sweep.
pub(crate) fn topological_sort(root: NodeId) -> Result<Vec<NodeId>, RustensorError> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut in_stack: HashSet<NodeId> = HashSet::new();
    let mut sorted: Vec<NodeId> = Vec::new();
    visit(root, &mut visited, &mut in_stack, &mut sorted)?;
    sorted.reverse();
    Ok(sorted)
}

fn visit(
    node: NodeId,
    visited: &mut HashSet<NodeId>,
    in_stack: &mut HashSet<NodeId>,
    sorted: &mut Vec<NodeId>,
) -> Result<(), RustensorError> {
    if visited.contains(&node) {
        return Ok(());
    }
    if !in_stack.insert(node) {
        return Err(RustensorError::CycleDetected);
    }
    log::trace!("topological_sort: visiting node {:?}", node);

    // Safety: `node` comes from `Arc::as_ptr` on a TensorData that is kept
    // alive either by the caller (the root) or by the BackwardOp that
    // reported it in `inputs()`.
    let grad_fn = {
        let lock = unsafe { &*node };
        let guard = lock.read().map_err(|_| {
            RustensorError::InternalError(
                "Failed to acquire read lock during graph traversal".to_string(),
            )
        })?;
        guard.grad_fn.clone()
    };

    if let Some(op) = grad_fn {
        for input in op.inputs() {
            visit(input, visited, in_stack, sorted)?;
        }
    }

    in_stack.remove(&node);
    visited.insert(node);
    sorted.push(node);
    Ok(())
}
