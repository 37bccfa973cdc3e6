//! Finite difference utilities for gradient verification.
//!
//! [`check_gradients`] runs a function once through the graph, takes its
//! reverse-mode gradient, and compares every component against a central
//! difference. The numerical side is only for validation; the engine itself
//! never approximates.

use crate::error::{GradError, Result};
use crate::var::Var;

/// Settings for a gradient check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckConfig {
    /// Central difference step.
    pub step: f64,
    /// Largest accepted absolute difference between analytic and numeric
    /// gradients.
    pub tolerance: f64,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        Self {
            step: 1e-6,
            tolerance: 1e-5,
        }
    }
}

impl GradCheckConfig {
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// One input's comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckEntry {
    pub analytic: f64,
    pub numeric: f64,
    pub abs_error: f64,
}

/// Outcome of [`check_gradients`].
#[derive(Debug, Clone, PartialEq)]
pub struct GradCheck {
    /// Value of the function at the checked point.
    pub value: f64,
    /// One entry per input, in input order.
    pub entries: Vec<GradCheckEntry>,
    pub tolerance: f64,
}

impl GradCheck {
    /// Largest absolute error over all inputs. NaN errors count as failures.
    pub fn max_error(&self) -> f64 {
        self.entries.iter().fold(0.0, |acc, e| {
            if acc.is_nan() || e.abs_error.is_nan() {
                f64::NAN
            } else {
                acc.max(e.abs_error)
            }
        })
    }

    pub fn passed(&self) -> bool {
        self.max_error() <= self.tolerance
    }

    pub fn analytic(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.analytic).collect()
    }
}

/// Compute gradients using central finite differences.
///
/// # Example
/// ```
/// use rad_core::central_difference;
///
/// // f(x, y) = x^2 + y^2
/// let f = |v: &[f64]| v[0] * v[0] + v[1] * v[1];
/// let grads = central_difference(f, &[3.0, 4.0], 1e-6).unwrap();
///
/// assert!((grads[0] - 6.0).abs() < 1e-5);
/// assert!((grads[1] - 8.0).abs() < 1e-5);
/// ```
pub fn central_difference<F>(f: F, point: &[f64], step: f64) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if !(step.is_finite() && step > 0.0) {
        return Err(GradError::InvalidStep(step));
    }

    let mut perturbed = point.to_vec();
    let mut grads = Vec::with_capacity(point.len());
    for i in 0..point.len() {
        perturbed[i] = point[i] + step;
        let f_plus = f(&perturbed);

        perturbed[i] = point[i] - step;
        let f_minus = f(&perturbed);

        perturbed[i] = point[i];
        grads.push((f_plus - f_minus) / (2.0 * step));
    }
    Ok(grads)
}

/// Maximum absolute difference between two gradient vectors.
pub fn max_abs_error(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(GradError::ArityMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max))
}

/// Check the reverse-mode gradient of `f` at `point` against central
/// differences.
///
/// `f` receives one fresh leaf per coordinate of `point` and returns the
/// output expression. It is called `2 * point.len() + 1` times.
///
/// # Example
/// ```
/// use rad_core::{check_gradients, GradCheckConfig, Var};
///
/// let report = check_gradients(
///     |v: &[Var]| &v[0] * v[1].sin(),
///     &[2.0, 0.5],
///     &GradCheckConfig::default(),
/// )
/// .unwrap();
/// assert!(report.passed());
/// ```
pub fn check_gradients<F>(f: F, point: &[f64], config: &GradCheckConfig) -> Result<GradCheck>
where
    F: Fn(&[Var]) -> Var,
{
    let eval = |vals: &[f64]| {
        let inputs: Vec<Var> = vals.iter().map(|&v| Var::new(v)).collect();
        f(&inputs).value()
    };
    let numeric = central_difference(eval, point, config.step)?;

    let inputs: Vec<Var> = point.iter().map(|&v| Var::new(v)).collect();
    let output = f(&inputs);
    let analytic = output.backward().wrt_many(&inputs)?;

    let entries: Vec<GradCheckEntry> = analytic
        .iter()
        .zip(&numeric)
        .map(|(&analytic, &numeric)| GradCheckEntry {
            analytic,
            numeric,
            abs_error: (analytic - numeric).abs(),
        })
        .collect();

    for (i, e) in entries.iter().enumerate() {
        log::debug!(
            "grad check input {}: analytic={:.10} numeric={:.10} error={:.2e}",
            i,
            e.analytic,
            e.numeric,
            e.abs_error
        );
    }

    Ok(GradCheck {
        value: output.value(),
        entries,
        tolerance: config.tolerance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_central_difference_quadratic() {
        // f(x, y) = x^2 + 2*x*y + y^2
        // df/dx = df/dy = 2x + 2y
        let f = |v: &[f64]| v[0] * v[0] + 2.0 * v[0] * v[1] + v[1] * v[1];
        let grads = central_difference(f, &[1.0, 2.0], 1e-6).unwrap();

        assert_abs_diff_eq!(grads[0], 6.0, epsilon = 1e-5);
        assert_abs_diff_eq!(grads[1], 6.0, epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_step() {
        let f = |v: &[f64]| v[0];
        assert_eq!(
            central_difference(f, &[1.0], 0.0),
            Err(GradError::InvalidStep(0.0))
        );
        assert!(central_difference(f, &[1.0], f64::NAN).is_err());
        assert!(central_difference(f, &[1.0], -1e-3).is_err());
    }

    #[test]
    fn test_max_abs_error() {
        let err = max_abs_error(&[1.0, 2.0, 3.0], &[1.1, 2.0, 2.8]).unwrap();
        assert_abs_diff_eq!(err, 0.2, epsilon = 1e-10);

        assert_eq!(
            max_abs_error(&[1.0], &[1.0, 2.0]),
            Err(GradError::ArityMismatch { expected: 1, got: 2 })
        );
    }

    #[test]
    fn test_check_gradients_transcendental() {
        // f(x) = sin(x) * exp(x)
        let report = check_gradients(
            |v: &[Var]| v[0].sin() * v[0].exp(),
            &[1.0],
            &GradCheckConfig::default(),
        )
        .unwrap();

        let expected = (1.0_f64.cos() + 1.0_f64.sin()) * 1.0_f64.exp();
        assert_abs_diff_eq!(report.entries[0].analytic, expected, epsilon = 1e-12);
        assert!(report.passed());
    }

    #[test]
    fn test_check_gradients_reports_failure() {
        // |x| has a kink at 0; sqrt(x^2) gives derivative 0/0 = NaN there.
        let report = check_gradients(
            |v: &[Var]| v[0].powf(2.0).sqrt(),
            &[0.0],
            &GradCheckConfig::default(),
        )
        .unwrap();

        assert!(report.max_error().is_nan());
        assert!(!report.passed());
    }

    #[test]
    fn test_analytic_matches_single_backward_pass() {
        let f = |v: &[Var]| &v[0] * v[1].exp() - v[0].sqrt();
        let report = check_gradients(f, &[2.0, -0.5], &GradCheckConfig::default()).unwrap();

        let inputs = [Var::new(2.0), Var::new(-0.5)];
        let expected = crate::grad_many(&f(&inputs), &inputs).unwrap();
        assert_eq!(report.analytic(), expected);
    }

    #[test]
    fn test_config_builder() {
        let config = GradCheckConfig::default()
            .with_step(1e-4)
            .with_tolerance(1e-3);
        assert_eq!(config.step, 1e-4);
        assert_eq!(config.tolerance, 1e-3);
    }
}
