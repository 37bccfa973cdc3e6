//! Forward values and local derivatives for every supported operation.
//!
//! Each operation knows how to compute its own value from its operands' values
//! and the partial derivative of that value with respect to each operand. The
//! backward pass multiplies these local derivatives by the incoming adjoint.
//!
//! All rules follow plain IEEE 754 arithmetic: `log(0)` is `-inf`, `1/0` is
//! `inf`, `sqrt(-1)` is NaN, and so on. Nothing here panics or returns errors.

use std::fmt;

/// Operations with a single operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum UnaryOp {
    /// -a
    Neg,
    /// sin(a)
    Sin,
    /// cos(a)
    Cos,
    /// tan(a)
    Tan,
    /// exp(a)
    Exp,
    /// ln(a)
    Log,
    /// √a
    Sqrt,
}

impl UnaryOp {
    /// Compute the forward value `op(a)`.
    pub fn apply(self, a: f64) -> f64 {
        match self {
            UnaryOp::Neg => -a,
            UnaryOp::Sin => a.sin(),
            UnaryOp::Cos => a.cos(),
            UnaryOp::Tan => a.tan(),
            UnaryOp::Exp => a.exp(),
            UnaryOp::Log => a.ln(),
            UnaryOp::Sqrt => a.sqrt(),
        }
    }

    /// Compute d(op(a))/da.
    ///
    /// `value` is the already computed `op(a)`; operations whose derivative is
    /// expressed through their own output (exp, tan, sqrt) reuse it instead of
    /// evaluating the function a second time.
    pub fn partial(self, a: f64, value: f64) -> f64 {
        match self {
            // z = -a, dz/da = -1
            UnaryOp::Neg => -1.0,
            // z = sin(a), dz/da = cos(a)
            UnaryOp::Sin => a.cos(),
            // z = cos(a), dz/da = -sin(a)
            UnaryOp::Cos => -a.sin(),
            // z = tan(a), dz/da = 1 + tan(a)^2
            UnaryOp::Tan => 1.0 + value * value,
            // z = exp(a), dz/da = exp(a)
            UnaryOp::Exp => value,
            // z = ln(a), dz/da = 1/a
            UnaryOp::Log => 1.0 / a,
            // z = √a, dz/da = 1/(2√a)
            UnaryOp::Sqrt => 0.5 / value,
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Exp => "exp",
            UnaryOp::Log => "log",
            UnaryOp::Sqrt => "sqrt",
        };
        f.write_str(name)
    }
}

/// Operations with two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BinaryOp {
    /// a + b
    Add,
    /// a - b
    Sub,
    /// a * b
    Mul,
    /// a / b
    Div,
    /// a ^ b
    Pow,
}

impl BinaryOp {
    /// Compute the forward value `a op b`.
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
        }
    }

    /// Compute `(dz/da, dz/db)` for `z = a op b`, where `value` is `z`.
    pub fn partials(self, a: f64, b: f64, value: f64) -> (f64, f64) {
        match self {
            BinaryOp::Add => (1.0, 1.0),
            BinaryOp::Sub => (1.0, -1.0),
            BinaryOp::Mul => (b, a),
            // dz/db = -a/b^2
            BinaryOp::Div => (1.0 / b, -a / (b * b)),
            // dz/da = b * a^(b-1), dz/db = a^b * ln(a)
            //
            // The right partial is only real for a > 0. Anything else yields
            // NaN, which is harmless when b is a constant exponent because
            // constants never receive adjoints.
            BinaryOp::Pow => (b * a.powf(b - 1.0), value * a.ln()),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        };
        f.write_str(symbol)
    }
}
