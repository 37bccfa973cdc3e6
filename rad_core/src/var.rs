//! The user-facing handle for values in the expression graph.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use crate::backward::{backward, Gradients};
use crate::node::{Node, NodeId};
use crate::ops::{BinaryOp, UnaryOp};

/// A differentiable scalar.
///
/// `Var` is a reference-counted handle to a graph node plus a copy of that
/// node's value. Cloning is O(1) and shares the node. Every arithmetic
/// operator and elementary function on `Var` builds exactly one new node,
/// evaluates it immediately, and returns a new `Var`; operands are never
/// modified.
///
/// `Var::new` (or `Var::from(f64)`) creates a fresh leaf with its own identity.
/// Two leaves holding the same number are still different variables.
///
/// Building one graph from several threads at once is not supported; give
/// each thread its own graph. Finished graphs are immutable and may be read
/// by concurrent backward passes.
#[derive(Clone)]
pub struct Var {
    node: Arc<Node>,
    value: f64,
}

impl Var {
    /// Create a new independent variable (a leaf of the graph).
    pub fn new(value: f64) -> Self {
        Self::wrap(Node::leaf(value))
    }

    /// Create a constant. Constants have no gradient and cannot be
    /// differentiated against.
    pub fn constant(value: f64) -> Self {
        Self::wrap(Node::constant(value))
    }

    fn wrap(node: Arc<Node>) -> Self {
        let value = node.value;
        Var { node, value }
    }

    fn unary(&self, op: UnaryOp) -> Var {
        Self::wrap(Node::unary(op, self.node.clone()))
    }

    fn binary(op: BinaryOp, lhs: &Var, rhs: &Var) -> Var {
        Self::wrap(Node::binary(op, lhs.node.clone(), rhs.node.clone()))
    }

    /// The forward value of this expression.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether this is an independent variable created by [`Var::new`].
    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    pub(crate) fn id(&self) -> NodeId {
        self.node.id
    }

    pub(crate) fn node(&self) -> &Node {
        &self.node
    }

    // === Elementary functions ===

    /// sin(self)
    pub fn sin(&self) -> Var {
        self.unary(UnaryOp::Sin)
    }

    /// cos(self)
    pub fn cos(&self) -> Var {
        self.unary(UnaryOp::Cos)
    }

    /// tan(self)
    pub fn tan(&self) -> Var {
        self.unary(UnaryOp::Tan)
    }

    /// exp(self)
    pub fn exp(&self) -> Var {
        self.unary(UnaryOp::Exp)
    }

    /// Natural logarithm. Non-positive inputs give `-inf` or NaN.
    pub fn log(&self) -> Var {
        self.unary(UnaryOp::Log)
    }

    /// √self
    pub fn sqrt(&self) -> Var {
        self.unary(UnaryOp::Sqrt)
    }

    /// self ^ exponent, differentiable in both base and exponent.
    ///
    /// The derivative with respect to the exponent is `self^exponent * ln(self)`,
    /// which is only real for a positive base.
    pub fn pow(&self, exponent: &Var) -> Var {
        Var::binary(BinaryOp::Pow, self, exponent)
    }

    /// self ^ exponent for a constant exponent.
    pub fn powf(&self, exponent: f64) -> Var {
        Var::binary(BinaryOp::Pow, self, &Var::constant(exponent))
    }

    /// Compute gradients of this expression via one reverse pass.
    pub fn backward(&self) -> Gradients {
        backward(self)
    }
}

impl From<f64> for Var {
    fn from(value: f64) -> Self {
        Var::new(value)
    }
}

impl From<&Var> for f64 {
    fn from(var: &Var) -> f64 {
        var.value
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("id", &self.node.id)
            .field("kind", &self.node.kind_name())
            .field("value", &self.value)
            .finish()
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

// === Operator overloads ===

impl Neg for &Var {
    type Output = Var;

    fn neg(self) -> Var {
        self.unary(UnaryOp::Neg)
    }
}

impl Neg for Var {
    type Output = Var;

    fn neg(self) -> Var {
        self.unary(UnaryOp::Neg)
    }
}

/// Implements a binary operator for every owned/borrowed combination of `Var`
/// and for `f64` on either side. Literals become constant nodes.
macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<&Var> for &Var {
            type Output = Var;

            fn $method(self, rhs: &Var) -> Var {
                Var::binary($op, self, rhs)
            }
        }

        impl $trait<Var> for &Var {
            type Output = Var;

            fn $method(self, rhs: Var) -> Var {
                Var::binary($op, self, &rhs)
            }
        }

        impl $trait<&Var> for Var {
            type Output = Var;

            fn $method(self, rhs: &Var) -> Var {
                Var::binary($op, &self, rhs)
            }
        }

        impl $trait<Var> for Var {
            type Output = Var;

            fn $method(self, rhs: Var) -> Var {
                Var::binary($op, &self, &rhs)
            }
        }

        impl $trait<f64> for &Var {
            type Output = Var;

            fn $method(self, rhs: f64) -> Var {
                Var::binary($op, self, &Var::constant(rhs))
            }
        }

        impl $trait<f64> for Var {
            type Output = Var;

            fn $method(self, rhs: f64) -> Var {
                Var::binary($op, &self, &Var::constant(rhs))
            }
        }

        impl $trait<&Var> for f64 {
            type Output = Var;

            fn $method(self, rhs: &Var) -> Var {
                Var::binary($op, &Var::constant(self), rhs)
            }
        }

        impl $trait<Var> for f64 {
            type Output = Var;

            fn $method(self, rhs: Var) -> Var {
                Var::binary($op, &Var::constant(self), &rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOp::Add);
impl_binary_op!(Sub, sub, BinaryOp::Sub);
impl_binary_op!(Mul, mul, BinaryOp::Mul);
impl_binary_op!(Div, div, BinaryOp::Div);
