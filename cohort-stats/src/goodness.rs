//! Normality tests: Kolmogorov-Smirnov and Shapiro-Wilk
//!
//! Both tests standardize against the sample's own mean and population
//! standard deviation. Samples with fewer than three values are reported as
//! "not rejected" with fixed neutral results.
//!
//! The Shapiro-Wilk statistic uses a simplified coefficient scheme: normal CDF
//! values at plotting positions, standardized by their population standard
//! deviation. Those coefficients have a sum of squares of n rather than 1, so
//! W scales with the sample size and the log-normal p-value approximation
//! returns NaN whenever W > 1. Results are reported as computed.

use cohort_plugin::prelude::*;
use serde::{Deserialize, Serialize};
use crate::distributions::standard_normal_cdf;
use crate::helpers::{extract_numbers, mean, sorted, variance_p};

/// Below this size neither test is computed
const MIN_SAMPLE: usize = 3;

/// Terms of the Kolmogorov limiting-distribution series (k = 1..99)
const KS_SERIES_TERMS: u32 = 99;

/// Outcome of a normality test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    /// Sample size
    #[serde(rename = "df")]
    pub degrees_of_freedom: usize,
    pub p_value: f64,
}

impl TestResult {
    pub fn to_value(&self) -> Value {
        Value::object([
            ("statistic", Value::Number(self.statistic)),
            ("df", Value::from(self.degrees_of_freedom)),
            ("p_value", Value::Number(self.p_value)),
        ])
    }
}

/// Standardize against own mean and population std-dev
fn z_scores(sample: &[f64]) -> Vec<f64> {
    let m = mean(sample);
    let sd = variance_p(sample).sqrt();
    sample.iter().map(|x| (x - m) / sd).collect()
}

/// One-sample Kolmogorov-Smirnov test against N(0,1) after standardizing.
///
/// D is the largest gap between the upper empirical step `(i+1)/n` and the
/// normal CDF. The p-value uses the Stephens-corrected Kolmogorov series,
/// clamped to `[0, 1]`. A constant sample gives D = 0 and p = 1.
pub fn ks_test(sample: &[f64]) -> TestResult {
    let n = sample.len();
    if n < MIN_SAMPLE {
        tracing::debug!(n, "ks_test: sample too small, reporting neutral result");
        return TestResult { statistic: 0.0, degrees_of_freedom: n, p_value: 1.0 };
    }

    let mut z = z_scores(sample);
    z.sort_by(f64::total_cmp);

    let nf = n as f64;
    let mut d = 0.0;
    for (i, zi) in z.iter().enumerate() {
        let empirical = (i + 1) as f64 / nf;
        let diff = (empirical - standard_normal_cdf(*zi)).abs();
        // NaN never wins the comparison
        if diff > d {
            d = diff;
        }
    }

    TestResult { statistic: d, degrees_of_freedom: n, p_value: ks_p_value(d, n) }
}

fn ks_p_value(d: f64, n: usize) -> f64 {
    let sqrt_n = (n as f64).sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d;

    let mut p = 0.0;
    let mut sign = 1.0;
    for k in 1..=KS_SERIES_TERMS {
        let kf = k as f64;
        p += 2.0 * sign * (-2.0 * kf * kf * lambda * lambda).exp();
        sign = -sign;
    }

    if p < 0.0 {
        p = 0.0;
    }
    if p > 1.0 {
        p = 1.0;
    }
    p
}

/// Shapiro-Wilk style coefficients for a sample of size `n`.
///
/// `q_i = Φ((i - 0.375) / (n + 0.25))` for i = 1..n, then standardized by
/// their own mean and population standard deviation.
pub fn shapiro_wilk_coefficients(n: usize) -> Vec<f64> {
    let denom = n as f64 + 0.25;
    let q: Vec<f64> = (1..=n)
        .map(|i| standard_normal_cdf((i as f64 - 0.375) / denom))
        .collect();

    let m = mean(&q);
    let sd = variance_p(&q).sqrt();
    q.iter().map(|v| (v - m) / sd).collect()
}

/// Log-normal approximation of the Shapiro-Wilk p-value.
///
/// `Φ((ln(1-W) - m) / s)` with `m = -1.2725 + 1.0521 ln n` and
/// `s = 1.0308 - 0.26758 ln n`. Defined only for W < 1.
pub fn shapiro_wilk_p_value(w: f64, n: usize) -> f64 {
    let ln_n = (n as f64).ln();
    let y = (1.0 - w).ln();
    let m = -1.2725 + 1.0521 * ln_n;
    let s = 1.0308 - 0.26758 * ln_n;
    standard_normal_cdf((y - m) / s)
}

/// Shapiro-Wilk normality test.
pub fn shapiro_wilk_test(sample: &[f64]) -> TestResult {
    let n = sample.len();
    if n < MIN_SAMPLE {
        tracing::debug!(n, "shapiro_wilk_test: sample too small, reporting neutral result");
        return TestResult { statistic: 1.0, degrees_of_freedom: n, p_value: 1.0 };
    }

    let sorted = sorted(sample);
    let m = mean(&sorted);
    let s2 = sorted.iter().fold(0.0, |acc, x| acc + (x - m) * (x - m));

    let a = shapiro_wilk_coefficients(n);
    let numerator = a
        .iter()
        .zip(sorted.iter().rev())
        .fold(0.0, |acc, (ai, xi)| acc + ai * xi);
    let w = numerator * numerator / s2;

    let p_value = shapiro_wilk_p_value(w, n);
    if p_value.is_nan() {
        tracing::debug!(n, w, "shapiro_wilk_test: p-value undefined for this W");
    }

    TestResult { statistic: w, degrees_of_freedom: n, p_value }
}

// ============ KsTest ============

pub struct KsTest;

static SAMPLE_ARGS: [ArgMeta; 1] = [ArgMeta::required(
    "values",
    "List<Number> | Number...",
    "Sample values",
)];

static KS_TEST_EXAMPLES: [&str; 2] = [
    "ks_test([2,4,4,4,5,5,7,9]) → {statistic: 0.25, df: 8, p_value: 0.63}",
    "ks_test([1,2]) → {statistic: 0, df: 2, p_value: 1}",
];

static KS_TEST_RELATED: [&str; 3] = ["shapiro_wilk", "normality", "snorm_cdf"];

impl FunctionPlugin for KsTest {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "ks_test",
            description: "Kolmogorov-Smirnov normality test (standardized sample vs N(0,1))",
            usage: "ks_test(values)",
            args: &SAMPLE_ARGS,
            returns: "Object",
            examples: &KS_TEST_EXAMPLES,
            category: "stats/normality",
            related: &KS_TEST_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match extract_numbers(args) {
            Ok(numbers) => ks_test(&numbers).to_value(),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ ShapiroWilk ============

pub struct ShapiroWilk;

static SW_EXAMPLES: [&str; 1] = ["shapiro_wilk([1,2]) → {statistic: 1, df: 2, p_value: 1}"];

static SW_RELATED: [&str; 2] = ["ks_test", "normality"];

impl FunctionPlugin for ShapiroWilk {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "shapiro_wilk",
            description: "Shapiro-Wilk normality test (simplified coefficients; p-value is N/A when W > 1)",
            usage: "shapiro_wilk(values)",
            args: &SAMPLE_ARGS,
            returns: "Object",
            examples: &SW_EXAMPLES,
            category: "stats/normality",
            related: &SW_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match extract_numbers(args) {
            Ok(numbers) => shapiro_wilk_test(&numbers).to_value(),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ Normality ============

pub struct Normality;

static NORMALITY_EXAMPLES: [&str; 1] = ["normality(data) → {ks: {...}, sw: {...}}"];

static NORMALITY_RELATED: [&str; 3] = ["ks_test", "shapiro_wilk", "histogram"];

impl FunctionPlugin for Normality {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "normality",
            description: "Both normality tests on one sample",
            usage: "normality(values)",
            args: &SAMPLE_ARGS,
            returns: "Object",
            examples: &NORMALITY_EXAMPLES,
            category: "stats/normality",
            related: &NORMALITY_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        let numbers = match extract_numbers(args) {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };

        Value::object([
            ("ks", ks_test(&numbers).to_value()),
            ("sw", shapiro_wilk_test(&numbers).to_value()),
        ])
    }
}
