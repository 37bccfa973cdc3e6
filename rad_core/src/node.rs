//! Core data structures for the expression graph.
//!
//! Every value produced by a [`Var`](crate::Var) is backed by a `Node` that
//! records how it was computed. Nodes are immutable once built and shared
//! through `Arc`, so a sub-expression used by several parents (e.g. both
//! operands of `x * x`) is stored once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::ops::{BinaryOp, UnaryOp};

/// Global counter for generating unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_node_id() -> NodeId {
    NodeId(NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Unique identifier for a node in the expression graph.
///
/// IDs increase with construction order. A node can only reference nodes that
/// already exist, so every operand has a smaller ID than the node using it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a node's value was produced.
#[derive(Debug)]
pub(crate) enum NodeKind {
    /// A literal promoted into the graph. Never differentiated against.
    Constant,
    /// An independent input variable.
    Leaf,
    Unary {
        op: UnaryOp,
        operand: Arc<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Arc<Node>,
        right: Arc<Node>,
    },
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) id: NodeId,
    /// Forward value, computed once when the node is built.
    pub(crate) value: f64,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn constant(value: f64) -> Arc<Node> {
        Self::build(value, NodeKind::Constant)
    }

    pub(crate) fn leaf(value: f64) -> Arc<Node> {
        Self::build(value, NodeKind::Leaf)
    }

    pub(crate) fn unary(op: UnaryOp, operand: Arc<Node>) -> Arc<Node> {
        let value = op.apply(operand.value);
        Self::build(value, NodeKind::Unary { op, operand })
    }

    pub(crate) fn binary(op: BinaryOp, left: Arc<Node>, right: Arc<Node>) -> Arc<Node> {
        let value = op.apply(left.value, right.value);
        Self::build(value, NodeKind::Binary { op, left, right })
    }

    fn build(value: f64, kind: NodeKind) -> Arc<Node> {
        Arc::new(Node {
            id: next_node_id(),
            value,
            kind,
        })
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub(crate) fn is_constant(&self) -> bool {
        matches!(self.kind, NodeKind::Constant)
    }

    /// Short name of the variant, used in `Debug` output and log messages.
    pub(crate) fn kind_name(&self) -> String {
        match &self.kind {
            NodeKind::Constant => "const".to_string(),
            NodeKind::Leaf => "leaf".to_string(),
            NodeKind::Unary { op, .. } => op.to_string(),
            NodeKind::Binary { op, .. } => op.to_string(),
        }
    }

    /// Each direct operand paired with d(self)/d(operand), evaluated at the
    /// operands' stored values.
    ///
    /// A shared operand (`x * x`) appears once per slot; the caller sums them.
    pub(crate) fn local_partials(&self) -> [Option<(&Node, f64)>; 2] {
        match &self.kind {
            NodeKind::Constant | NodeKind::Leaf => [None, None],
            NodeKind::Unary { op, operand } => {
                let d = op.partial(operand.value, self.value);
                [Some((operand.as_ref(), d)), None]
            }
            NodeKind::Binary { op, left, right } => {
                let (dl, dr) = op.partials(left.value, right.value, self.value);
                [Some((left.as_ref(), dl)), Some((right.as_ref(), dr))]
            }
        }
    }

    /// Detach this node's operands, leaving it as a childless constant.
    fn take_operands(&mut self) -> [Option<Arc<Node>>; 2] {
        match std::mem::replace(&mut self.kind, NodeKind::Constant) {
            NodeKind::Constant | NodeKind::Leaf => [None, None],
            NodeKind::Unary { operand, .. } => [Some(operand), None],
            NodeKind::Binary { left, right, .. } => [Some(left), Some(right)],
        }
    }
}

// The derived drop glue would recurse once per level of the graph and overflow
// the stack on long chains, so uniquely owned operands are unlinked with an
// explicit work list instead.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack: Vec<Arc<Node>> = self.take_operands().into_iter().flatten().collect();
        while let Some(node) = stack.pop() {
            if let Ok(mut node) = Arc::try_unwrap(node) {
                stack.extend(node.take_operands().into_iter().flatten());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_construction_order() {
        let x = Node::leaf(1.0);
        let y = Node::leaf(2.0);
        let z = Node::binary(BinaryOp::Add, x.clone(), y.clone());

        assert!(x.id < y.id);
        assert!(y.id < z.id);
    }

    #[test]
    fn test_value_computed_at_construction() {
        let x = Node::leaf(2.0);
        let c = Node::constant(3.0);
        let z = Node::binary(BinaryOp::Mul, x, c);
        assert_eq!(z.value, 6.0);

        let w = Node::unary(UnaryOp::Neg, z);
        assert_eq!(w.value, -6.0);
    }

    #[test]
    fn test_local_partials_of_shared_operand() {
        let x = Node::leaf(3.0);
        let z = Node::binary(BinaryOp::Mul, x.clone(), x.clone());

        let partials: Vec<_> = z.local_partials().into_iter().flatten().collect();
        assert_eq!(partials.len(), 2);
        for (operand, d) in partials {
            assert_eq!(operand.id, x.id);
            assert_eq!(d, 3.0);
        }
    }

    #[test]
    fn test_leaf_and_constant_have_no_operands() {
        assert!(Node::leaf(1.0).local_partials().iter().all(Option::is_none));
        assert!(Node::constant(1.0).local_partials().iter().all(Option::is_none));
    }

    #[test]
    fn test_shared_node_outlives_parent() {
        let x = Node::leaf(4.0);
        let z = Node::unary(UnaryOp::Sqrt, x.clone());
        assert_eq!(Arc::strong_count(&x), 2);

        drop(z);
        assert_eq!(Arc::strong_count(&x), 1);
        assert_eq!(x.value, 4.0);
    }

    #[test]
    fn test_drop_long_chain() {
        let mut node = Node::leaf(0.0);
        for _ in 0..200_000 {
            node = Node::binary(BinaryOp::Add, node, Node::constant(1.0));
        }
        assert_eq!(node.value, 200_000.0);
        drop(node);
    }
}
