//! CLI demo for the reverse-mode autodiff library.
//!
//! Evaluates a few reference expressions, prints their values and gradients,
//! and validates every gradient against central finite differences.
//!
//! Usage:
//!   rad [--scenario a|b|c|all] [--step STEP] [--tolerance TOL] [-v]

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

use rad_core::{check_gradients, GradCheck, GradCheckConfig, Var};

/// Reverse-mode autodiff demo
///
/// Prints values and exact gradients of reference expressions and checks
/// them against finite differences.
#[derive(Parser, Debug)]
#[command(name = "rad")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Which expression to evaluate
    #[arg(short, long, default_value = "all")]
    scenario: Scenario,

    /// Central difference step
    #[arg(long, default_value_t = GradCheckConfig::default().step)]
    step: f64,

    /// Largest accepted |autodiff - finite difference|
    #[arg(long, default_value_t = GradCheckConfig::default().tolerance)]
    tolerance: f64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// y = 1 + x + x^2 + 1/x + ln(x)
    A,
    /// u = 1 + x + y + z + xy + yz + xz + xyz + exp(x/y + y/z)
    B,
    /// y = a sin(x) + b cos(x) + c sin(x) cos(x)
    C,
    All,
}

struct Expression {
    formula: &'static str,
    inputs: &'static [&'static str],
    point: &'static [f64],
    build: fn(&[Var]) -> Var,
}

fn scenario_a(v: &[Var]) -> Var {
    let x = &v[0];
    1.0 + x + x * x + 1.0 / x + x.log()
}

fn scenario_b(v: &[Var]) -> Var {
    let (x, y, z) = (&v[0], &v[1], &v[2]);
    1.0 + x + y + z + x * y + y * z + x * z + x * y * z + (x / y + y / z).exp()
}

fn scenario_c(v: &[Var]) -> Var {
    let (a, b, c, x) = (&v[0], &v[1], &v[2], &v[3]);
    a * x.sin() + b * x.cos() + c * x.sin() * x.cos()
}

impl Scenario {
    fn expressions(self) -> Vec<Expression> {
        let a = Expression {
            formula: "y = 1 + x + x*x + 1/x + log(x)",
            inputs: &["x"],
            point: &[2.0],
            build: scenario_a,
        };
        let b = Expression {
            formula: "u = 1 + x + y + z + x*y + y*z + x*z + x*y*z + exp(x/y + y/z)",
            inputs: &["x", "y", "z"],
            point: &[1.0, 2.0, 3.0],
            build: scenario_b,
        };
        let c = Expression {
            formula: "y = a*sin(x) + b*cos(x) + c*sin(x)*cos(x)",
            inputs: &["a", "b", "c", "x"],
            point: &[1.0, 2.0, 3.0, 0.5],
            build: scenario_c,
        };
        match self {
            Scenario::A => vec![a],
            Scenario::B => vec![b],
            Scenario::C => vec![c],
            Scenario::All => vec![a, b, c],
        }
    }
}

fn format_gradient(grad: &[f64]) -> String {
    let parts: Vec<String> = grad.iter().map(|g| format!("{:.6}", g)).collect();
    format!("[{}]", parts.join(", "))
}

fn report(expr: &Expression, check: &GradCheck) {
    println!("Expression: {}", expr.formula);
    let at: Vec<String> = expr
        .inputs
        .iter()
        .zip(expr.point)
        .map(|(name, v)| format!("{} = {}", name, v))
        .collect();
    println!("At point:   {}", at.join(", "));
    println!("Value:      {:.10}", check.value);
    println!("Gradient:   {}", format_gradient(&check.analytic()));

    for (name, e) in expr.inputs.iter().zip(&check.entries) {
        println!(
            "  d/d{:<2} = {:>15.10}   (fd {:>15.10}, err {:.2e})",
            name, e.analytic, e.numeric, e.abs_error
        );
    }

    let status = if check.passed() { "PASS" } else { "FAIL" };
    println!(
        "{}: max error {:.2e} vs tolerance {:.2e}\n",
        status,
        check.max_error(),
        check.tolerance
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = GradCheckConfig::default()
        .with_step(args.step)
        .with_tolerance(args.tolerance);
    log::debug!("gradient check config: {:?}", config);

    println!("=== Reverse-Mode Autodiff Demo ===\n");

    let mut failures = 0;
    for expr in args.scenario.expressions() {
        let check = check_gradients(expr.build, expr.point, &config)?;
        report(&expr, &check);
        if !check.passed() {
            log::warn!("gradient check failed for {}", expr.formula);
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} expression(s) failed the gradient check", failures);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scenarios_pass_default_check() {
        let config = GradCheckConfig::default();
        for expr in Scenario::All.expressions() {
            assert_eq!(expr.inputs.len(), expr.point.len());
            let check = check_gradients(expr.build, expr.point, &config).unwrap();
            assert!(check.passed(), "{}: {:?}", expr.formula, check.entries);
        }
    }

    #[test]
    fn test_format_gradient_of_scenario() {
        let exprs = Scenario::A.expressions();
        let expr = &exprs[0];
        let check = check_gradients(expr.build, expr.point, &GradCheckConfig::default()).unwrap();
        assert_eq!(format_gradient(&check.analytic()), "[5.250000]");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["rad", "--scenario", "b", "--tolerance", "1e-3"]);
        assert_eq!(args.scenario, Scenario::B);
        assert_eq!(args.tolerance, 1e-3);
        assert_eq!(args.step, GradCheckConfig::default().step);
    }
}
