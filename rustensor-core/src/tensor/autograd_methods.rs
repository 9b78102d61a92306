use crate::autograd::graph::{topological_sort, NodeId};
use crate::autograd::BackwardOp;
use crate::error::RustensorError;
use crate::ops::arithmetic::add::add_op;
use crate::tensor::{self, Tensor};
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

impl Tensor {
    /// Returns `true` if gradients are tracked for this tensor.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Enables or disables gradient tracking.
    ///
    /// Only floating point tensors can require gradients; asking for them on
    /// an integer tensor returns `Err(RustensorError::DataTypeMismatch)`.
    pub fn set_requires_grad(&self, requires_grad: bool) -> Result<(), RustensorError> {
        let mut guard = self.write_data();
        if requires_grad && guard.dtype != DType::F32 {
            return Err(RustensorError::DataTypeMismatch {
                expected: DType::F32,
                actual: guard.dtype,
                operation: "set_requires_grad".to_string(),
            });
        }
        if requires_grad && guard.grad_fn.is_some() {
            log::warn!("set_requires_grad(true) called on a non-leaf tensor");
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// Returns the accumulated gradient, if a backward pass has produced one.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    /// Returns the backward node that produced this tensor, or `None` for
    /// leaf tensors.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp + Send + Sync>> {
        self.read_data().grad_fn.clone()
    }

    pub(crate) fn set_grad_fn(&self, grad_fn: Option<Arc<dyn BackwardOp + Send + Sync>>) {
        self.write_data().grad_fn = grad_fn;
    }

    pub(crate) fn get_node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }

    /// Runs reverse-mode automatic differentiation from this tensor.
    ///
    /// `gradient` seeds dL/dSelf. When omitted it defaults to ones, which is
    /// only allowed for single-element tensors (the usual scalar loss);
    /// calling `backward(None)` on a larger tensor returns
    /// `Err(RustensorError::BackwardNonScalar)`.
    ///
    /// Gradients accumulate into the `grad` field of every reachable leaf
    /// tensor that has `requires_grad` set. Repeated backward passes add up;
    /// call [`clear_grad`](Tensor::clear_grad) between passes to reset.
    pub fn backward(&self, gradient: Option<Tensor>) -> Result<(), RustensorError> {
        if !self.requires_grad() && self.grad_fn().is_none() {
            log::debug!("backward called on a tensor outside the graph; nothing to do");
            return Ok(());
        }

        let grad_init = match gradient {
            Some(g) => {
                if g.shape() != self.shape() {
                    return Err(RustensorError::ShapeMismatch {
                        expected: format!("{:?}", self.shape()),
                        actual: format!("{:?}", g.shape()),
                        operation: "backward (initial gradient)".to_string(),
                    });
                }
                if g.dtype() != DType::F32 {
                    return Err(RustensorError::DataTypeMismatch {
                        expected: DType::F32,
                        actual: g.dtype(),
                        operation: "backward (initial gradient)".to_string(),
                    });
                }
                g
            }
            None => {
                if self.numel() > 1 {
                    return Err(RustensorError::BackwardNonScalar);
                }
                tensor::full(&self.shape(), 1.0)?
            }
        };

        let root = self.get_node_id();
        let order = topological_sort(root)?;
        log::trace!("backward: {} nodes in the graph", order.len());

        let mut grad_map: HashMap<NodeId, Tensor> = HashMap::new();
        grad_map.insert(root, grad_init);

        for node_id in order {
            let node_grad = match grad_map.remove(&node_id) {
                Some(g) => g,
                // Reachable through the sort but no gradient flowed here.
                None => continue,
            };

            // Safety: every id in `order` is kept alive by the root tensor
            // or by a BackwardOp holding an Arc to it.
            let node_lock = unsafe { &*node_id };
            let (requires_grad, grad_fn) = {
                let guard = node_lock.read().map_err(|_| {
                    RustensorError::InternalError(
                        "Failed to acquire read lock during backward".to_string(),
                    )
                })?;
                (guard.requires_grad, guard.grad_fn.clone())
            };

            match grad_fn {
                None => {
                    if requires_grad {
                        Self::accumulate_grad_static(node_lock, node_grad)?;
                    }
                }
                Some(op) => {
                    let input_grads = op.backward(&node_grad)?;
                    let input_ids = op.inputs();
                    if input_grads.len() != input_ids.len() {
                        return Err(RustensorError::InternalError(format!(
                            "backward node {:?} returned {} gradients for {} inputs",
                            op,
                            input_grads.len(),
                            input_ids.len()
                        )));
                    }
                    for (input_id, input_grad) in input_ids.into_iter().zip(input_grads) {
                        match grad_map.remove(&input_id) {
                            Some(existing) => {
                                let summed = add_op(&existing, &input_grad)?;
                                grad_map.insert(input_id, summed);
                            }
                            None => {
                                grad_map.insert(input_id, input_grad);
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn accumulate_grad_static(
        lock: &RwLock<TensorData>,
        grad: Tensor,
    ) -> Result<(), RustensorError> {
        let existing = {
            let mut guard = lock.write().map_err(|_| {
                RustensorError::InternalError(
                    "Failed to acquire write lock while accumulating gradient".to_string(),
                )
            })?;
            if grad.shape() != guard.shape {
                return Err(RustensorError::ShapeMismatch {
                    expected: format!("{:?}", guard.shape),
                    actual: format!("{:?}", grad.shape()),
                    operation: "gradient accumulation".to_string(),
                });
            }
            guard.grad.take()
        };

        // add_op only touches the gradient tensors, so no lock is held here.
        let updated = match existing {
            Some(prev) => add_op(&prev, &grad)?,
            None => grad,
        };

        let mut guard = lock.write().map_err(|_| {
            RustensorError::InternalError(
                "Failed to acquire write lock while storing gradient".to_string(),
            )
        })?;
        guard.grad = Some(updated);
        Ok(())
    }
}
