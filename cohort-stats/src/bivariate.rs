//! Bivariate functions: Pearson correlation

use cohort_plugin::prelude::*;
use crate::helpers::{extract_two_lists, mean};

/// Pearson product-moment correlation of two aligned samples.
///
/// The caller aligns the samples (truncating to the shorter one). Mismatched
/// or empty input returns 0. If either sample has zero variance the result is
/// NaN and is returned as-is.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut numerator = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;

    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        numerator += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    numerator / (denom_x * denom_y).sqrt()
}

// ============ Correlation ============

pub struct Correlation;

static CORRELATION_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("x", "List<Number>", "First variable"),
    ArgMeta::required("y", "List<Number>", "Second variable (same length)"),
];

static CORRELATION_EXAMPLES: [&str; 2] = [
    "correlation([1,2,3], [2,4,6]) → 1",
    "correlation([1,2,3], [6,4,2]) → -1",
];

static CORRELATION_RELATED: [&str; 1] = ["linear_reg"];

impl FunctionPlugin for Correlation {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "correlation",
            description: "Pearson correlation coefficient (NaN when a variable is constant)",
            usage: "correlation(x, y)",
            args: &CORRELATION_ARGS,
            returns: "Number",
            examples: &CORRELATION_EXAMPLES,
            category: "stats/bivariate",
            related: &CORRELATION_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match extract_two_lists(args, "correlation") {
            Ok((x, y)) => Value::Number(pearson(&x, &y)),
            Err(e) => Value::Error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_perfect_positive() {
        assert_abs_diff_eq!(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perfect_negative() {
        assert_abs_diff_eq!(pearson(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bounded() {
        let r = pearson(&[1.0, 3.0, 2.0, 5.0, 4.0], &[2.0, 1.0, 4.0, 3.0, 5.0]);
        assert!((-1.0..=1.0).contains(&r));
        assert_abs_diff_eq!(r, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_and_mismatched_fall_back_to_zero() {
        assert_eq!(pearson(&[], &[]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_zero_variance_is_nan() {
        // Known-NaN case: a constant variable leaves the coefficient undefined
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_plugin_requires_equal_lengths() {
        let ctx = EvalContext::new(std::sync::Arc::new(PluginRegistry::new()));
        let ok = Correlation.call(&[Value::from(vec![1.0, 2.0, 3.0]), Value::from(vec![2.0, 4.0, 6.0])], &ctx);
        assert!(ok.as_number().is_some());
        let bad = Correlation.call(&[Value::from(vec![1.0, 2.0]), Value::from(vec![2.0])], &ctx);
        assert!(bad.is_error());
    }
}
