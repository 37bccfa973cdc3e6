//! Error types for rad_core.
//!
//! Numeric domain problems (division by zero, `log` of a negative number) are
//! not errors: they surface as NaN or infinities, as in plain `f64` math.

use thiserror::Error;

use crate::node::NodeId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradError {
    /// Derivatives are only defined with respect to independent variables.
    #[error("node {id} is not a leaf; gradients can only be taken with respect to variables created by Var::new")]
    NotALeaf { id: NodeId },

    #[error("finite-difference step must be finite and positive, got {0}")]
    InvalidStep(f64),

    #[error("gradient check expected {expected} inputs, got {got}")]
    ArityMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, GradError>;
