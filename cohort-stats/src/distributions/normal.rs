//! Normal distribution functions

use cohort_plugin::prelude::*;

// Abramowitz & Stegun 26.2.17 coefficients
const P: f64 = 0.2316419;
const B1: f64 = 0.319381530;
const B2: f64 = -0.356563782;
const B3: f64 = 1.781477937;
const B4: f64 = -1.821255978;
const B5: f64 = 1.330274429;

/// Beyond this |z| the CDF saturates to exactly 0 or 1
const SATURATION: f64 = 8.0;

/// Standard normal CDF P(Z ≤ z), polynomial approximation (error < 7.5e-8).
///
/// Saturates to exactly 1 above z = 8 and exactly 0 below z = -8. NaN in
/// gives NaN out.
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x > SATURATION {
        return 1.0;
    }
    if x < -SATURATION {
        return 0.0;
    }

    let phi = (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let t = 1.0 / (1.0 + P * x.abs());
    let poly = B1 * t + B2 * t * t + B3 * t.powi(3) + B4 * t.powi(4) + B5 * t.powi(5);
    let z = 1.0 - phi * poly;

    if x >= 0.0 {
        z
    } else {
        1.0 - z
    }
}

// ============ Standard Normal CDF ============

pub struct SnormCdf;

static SNORM_CDF_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value")];

static SNORM_CDF_EXAMPLES: [&str; 2] = ["snorm_cdf(0) → 0.5", "snorm_cdf(1.96) → 0.975"];

static SNORM_CDF_RELATED: [&str; 2] = ["ks_test", "shapiro_wilk"];

impl FunctionPlugin for SnormCdf {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "snorm_cdf",
            description: "Standard normal CDF P(X ≤ x)",
            usage: "snorm_cdf(x)",
            args: &SNORM_CDF_ARGS,
            returns: "Number",
            examples: &SNORM_CDF_EXAMPLES,
            category: "stats/distribution",
            related: &SNORM_CDF_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(StatsError::arg_count("snorm_cdf", 1, args.len()));
        }

        match &args[0] {
            Value::Number(x) => Value::Number(standard_normal_cdf(*x)),
            Value::Error(e) => Value::Error(e.clone()),
            other => Value::Error(StatsError::arg_type("snorm_cdf", "x", "Number", other.type_name())),
        }
    }
}
