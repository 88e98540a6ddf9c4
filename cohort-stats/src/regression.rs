//! Simple linear regression (ordinary least squares, one predictor)

use cohort_plugin::prelude::*;
use serde::{Deserialize, Serialize};
use crate::helpers::{extract_two_lists, mean};

/// Fitted line `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
}

impl RegressionResult {
    /// Value of the fitted line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    pub fn to_value(&self) -> Value {
        Value::object([
            ("slope", Value::Number(self.slope)),
            ("intercept", Value::Number(self.intercept)),
        ])
    }
}

/// Least-squares fit of `y` on `x`.
///
/// Empty or mismatched input yields a zero line. A constant `x` leaves the
/// slope undefined and NaN propagates into both coefficients.
pub fn linear_regression(x: &[f64], y: &[f64]) -> RegressionResult {
    if x.len() != y.len() || x.is_empty() {
        return RegressionResult { slope: 0.0, intercept: 0.0 };
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        numerator += dx * (yi - mean_y);
        denominator += dx * dx;
    }

    let slope = numerator / denominator;
    let intercept = mean_y - slope * mean_x;

    RegressionResult { slope, intercept }
}

// ============ LinearReg ============

pub struct LinearReg;

static LINEAR_REG_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("x", "List<Number>", "Independent variable"),
    ArgMeta::required("y", "List<Number>", "Dependent variable (same length)"),
];

static LINEAR_REG_EXAMPLES: [&str; 1] = ["linear_reg([1,2,3], [2,4,6]) → {slope: 2, intercept: 0}"];

static LINEAR_REG_RELATED: [&str; 1] = ["correlation"];

impl FunctionPlugin for LinearReg {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "linear_reg",
            description: "Ordinary least-squares fit of y on x",
            usage: "linear_reg(x, y)",
            args: &LINEAR_REG_ARGS,
            returns: "Object",
            examples: &LINEAR_REG_EXAMPLES,
            category: "stats/regression",
            related: &LINEAR_REG_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match extract_two_lists(args, "linear_reg") {
            Ok((x, y)) => linear_regression(&x, &y).to_value(),
            Err(e) => Value::Error(e),
        }
    }
}
