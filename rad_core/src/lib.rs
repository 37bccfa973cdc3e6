//! # rad_core - Reverse-mode Automatic Differentiation Engine
//!
//! Exact derivatives of scalar functions f: ℝⁿ → ℝ built from ordinary
//! arithmetic and elementary functions. Every operation on a [`Var`] records
//! one node in an expression graph and evaluates it on the spot; a single
//! reverse pass over that graph then yields the partial derivative of the
//! output with respect to every input.
//!
//! ## Quick Start
//!
//! ```
//! use rad_core::{grad, var};
//!
//! let x = var(2.0);
//!
//! // y = 1 + x + x^2 + 1/x + ln(x)
//! let y = 1.0 + &x + &x * &x + 1.0 / &x + x.log();
//! assert!((y.value() - 8.193147180559945).abs() < 1e-12);
//!
//! // dy/dx = 1 + 2x - 1/x^2 + 1/x
//! assert!((grad(&y, &x).unwrap() - 5.25).abs() < 1e-12);
//! ```
//!
//! ## Supported Operations
//!
//! | Category | Operations |
//! |----------|------------|
//! | Arithmetic | `+`, `-`, `*`, `/`, unary `-` (on `Var`, `&Var` and `f64`) |
//! | Power | [`Var::pow`] (variable exponent), [`Var::powf`] (constant exponent), [`Var::sqrt`] |
//! | Transcendental | [`Var::exp`], [`Var::log`], [`Var::sin`], [`Var::cos`], [`Var::tan`] |
//!
//! Domain errors are not reported: `log(0)` is `-inf`, `1/0` is `inf`, and
//! NaN flows through values and gradients exactly as in `f64` arithmetic.
//!
//! ## Example: Several Inputs, One Pass
//!
//! ```
//! use rad_core::var;
//!
//! // f(x, y) = x^2 * y + y^3
//! let x = var(2.0);
//! let y = var(3.0);
//! let f = x.powf(2.0) * &y + y.powf(3.0);
//!
//! let grads = f.backward();
//! // df/dx = 2xy = 12, df/dy = x^2 + 3y^2 = 31
//! assert!((grads.wrt(&x).unwrap() - 12.0).abs() < 1e-10);
//! assert!((grads.wrt(&y).unwrap() - 31.0).abs() < 1e-10);
//! ```
//!
//! ## Architecture
//!
//! - **[`Var`]**: reference-counted handle to a graph node plus its value.
//!   Cloning is O(1); shared sub-expressions are stored once.
//! - **[`Gradients`]**: adjoints of every leaf reached by one backward pass.
//! - **[`grad`]** / **[`grad_many`]**: one-call derivative extraction.
//! - **[`check_gradients`]**: validation against central differences.
//!
//! Derivatives can only be taken with respect to leaves (variables made by
//! [`var`] / [`Var::new`]). Asking for anything else returns
//! [`GradError::NotALeaf`].
//!
//! The per-operation derivative rules are internal; graphs are only built
//! through [`Var`]:
//!
//! ```compile_fail
//! use rad_core::UnaryOp;
//! ```

mod backward;
mod error;
mod finite_diff;
mod node;
mod ops;
mod var;

pub use backward::{grad, grad_many, Gradients};
pub use error::{GradError, Result};
pub use finite_diff::{
    central_difference, check_gradients, max_abs_error, GradCheck, GradCheckConfig,
    GradCheckEntry,
};
pub use node::NodeId;
pub use var::Var;

/// Create a new independent variable.
///
/// Each call creates a variable with a unique identity, even for equal values.
pub fn var(value: f64) -> Var {
    Var::new(value)
}

/// Create a constant expression.
///
/// Constants are fixed values in differentiation and have no gradient.
pub fn constant(value: f64) -> Var {
    Var::constant(value)
}
