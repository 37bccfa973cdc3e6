//! Randomized checks of the algebraic properties reverse-mode gradients obey.

use approx::relative_eq;
use proptest::prelude::*;
use rad_core::{grad, var, Var};

fn close(a: f64, b: f64) -> bool {
    relative_eq!(a, b, epsilon = 1e-10, max_relative = 1e-9)
}

proptest! {
    #[test]
    fn grad_of_leaf_wrt_itself_is_one(v in -1e6f64..1e6) {
        let x = var(v);
        prop_assert_eq!(grad(&x, &x).unwrap(), 1.0);
    }

    #[test]
    fn grad_of_independent_output_is_zero(a in -10.0f64..10.0, b in -10.0f64..10.0) {
        let x = var(a);
        let y = var(b);
        let out = y.sin() * 3.0 + Var::constant(a);
        prop_assert_eq!(grad(&out, &x).unwrap(), 0.0);
    }

    #[test]
    fn product_rule_under_sharing(v in -100.0f64..100.0) {
        let x = var(v);
        let y = &x * &x;
        prop_assert!(close(grad(&y, &x).unwrap(), 2.0 * x.value()));
    }

    #[test]
    fn log_and_exp_chain_rule(v in 0.01f64..20.0) {
        let x = var(v);
        prop_assert!(close(grad(&x.log(), &x).unwrap(), 1.0 / v));
        prop_assert!(close(grad(&x.exp(), &x).unwrap(), v.exp()));
    }

    #[test]
    fn linearity(
        alpha in -5.0f64..5.0,
        beta in -5.0f64..5.0,
        a in 0.5f64..2.0,
        b in 0.5f64..2.0,
    ) {
        let x = var(a);
        let y = var(b);
        let y1 = x.sin() * &y;
        let y2 = (&x / &y).exp();

        let combined = alpha * &y1 + beta * &y2;
        for target in [&x, &y] {
            let lhs = grad(&combined, target).unwrap();
            let rhs = alpha * grad(&y1, target).unwrap() + beta * grad(&y2, target).unwrap();
            prop_assert!(close(lhs, rhs), "{} vs {}", lhs, rhs);
        }
    }

    #[test]
    fn repeated_grad_is_idempotent(a in 0.1f64..5.0, b in -5.0f64..5.0) {
        let x = var(a);
        let y = var(b);
        let z = x.sqrt() * y.cos() + &x / (1.0 + &y * &y);
        let value = z.value();

        let first = grad(&z, &x).unwrap();
        let second = grad(&z, &x).unwrap();
        prop_assert_eq!(first.to_bits(), second.to_bits());
        prop_assert_eq!(z.value().to_bits(), value.to_bits());
        prop_assert_eq!(x.value(), a);
    }
}
