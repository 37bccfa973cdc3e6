//! Reverse-mode automatic differentiation.
//!
//! The backward pass computes adjoints by:
//! 1. Seeding the output's adjoint with 1 (d(output)/d(output) = 1)
//! 2. Visiting reachable nodes from the newest to the oldest, pushing
//!    `adjoint * local_partial` into each operand's accumulator
//!
//! Node IDs grow with construction order and operands are always older than
//! the nodes using them, so newest-first is a valid reverse topological order.
//! A max-heap of discovered IDs yields it without sorting the graph: a node is
//! popped only once every reachable parent has already contributed to it.

use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use crate::error::{GradError, Result};
use crate::node::{Node, NodeId};
use crate::var::Var;

/// Adjoints of every leaf reached by one backward pass.
///
/// All state of the pass lives here; the graph itself is never modified, so
/// running `backward` repeatedly on the same output gives identical results.
#[derive(Debug, Clone)]
pub struct Gradients {
    /// Map from leaf node ID to its accumulated adjoint.
    adjoints: HashMap<NodeId, f64>,
    /// Number of nodes popped during the pass.
    visited: usize,
}

impl Gradients {
    /// Get d(output)/d(var).
    ///
    /// Returns `0.0` when the output does not depend on `var`, and
    /// [`GradError::NotALeaf`] when `var` is a constant or the result of an
    /// operation.
    pub fn wrt(&self, var: &Var) -> Result<f64> {
        if !var.is_leaf() {
            return Err(GradError::NotALeaf { id: var.id() });
        }
        Ok(self.adjoints.get(&var.id()).copied().unwrap_or(0.0))
    }

    /// Get gradients for a list of variables, in the same order.
    pub fn wrt_many(&self, vars: &[Var]) -> Result<Vec<f64>> {
        vars.iter().map(|v| self.wrt(v)).collect()
    }

    /// Number of graph nodes the pass visited.
    pub fn visited(&self) -> usize {
        self.visited
    }
}

/// Compute the adjoint of every leaf reachable from `output`.
pub fn backward(output: &Var) -> Gradients {
    let root = output.node();

    // Nodes discovered but not yet visited, and the heap ordering them.
    let mut pending: HashMap<NodeId, &Node> = HashMap::new();
    let mut frontier: BinaryHeap<NodeId> = BinaryHeap::new();
    let mut adjoints: HashMap<NodeId, f64> = HashMap::new();
    let mut leaves: HashMap<NodeId, f64> = HashMap::new();
    let mut visited = 0;

    pending.insert(root.id, root);
    frontier.push(root.id);
    adjoints.insert(root.id, 1.0);

    while let Some(id) = frontier.pop() {
        let Some(node) = pending.remove(&id) else {
            continue;
        };
        visited += 1;

        // Every parent has been visited, so this adjoint is final.
        let node_adjoint = adjoints.remove(&id).unwrap_or(0.0);

        if node.is_leaf() {
            leaves.insert(id, node_adjoint);
            continue;
        }

        // Skip if this node has no contribution
        if node_adjoint == 0.0 {
            continue;
        }

        for (operand, local_grad) in node.local_partials().into_iter().flatten() {
            if operand.is_constant() {
                continue;
            }
            // Chain rule: operand_adjoint += node_adjoint * local_gradient.
            // Shared operands are reached once per parent slot and summed.
            *adjoints.entry(operand.id).or_insert(0.0) += node_adjoint * local_grad;

            if let Entry::Vacant(slot) = pending.entry(operand.id) {
                slot.insert(operand);
                frontier.push(operand.id);
            }
        }
    }

    log::trace!(
        "backward from {}: visited {} nodes, reached {} leaves",
        root.id,
        visited,
        leaves.len()
    );

    Gradients {
        adjoints: leaves,
        visited,
    }
}

/// Compute d(output)/d(target) with one reverse pass.
///
/// `target` must be a leaf; see [`Gradients::wrt`]. To differentiate with
/// respect to several variables, use [`grad_many`] or [`Var::backward`] so
/// the pass runs once.
pub fn grad(output: &Var, target: &Var) -> Result<f64> {
    if !target.is_leaf() {
        return Err(GradError::NotALeaf { id: target.id() });
    }
    backward(output).wrt(target)
}

/// Compute d(output)/d(target) for every target from a single reverse pass.
pub fn grad_many(output: &Var, targets: &[Var]) -> Result<Vec<f64>> {
    backward(output).wrt_many(targets)
}
