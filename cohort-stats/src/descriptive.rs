//! Descriptive statistics: mean, population standard deviation, min, max

use cohort_plugin::prelude::*;
use serde::{Deserialize, Serialize};
use crate::helpers::{extract_numbers, mean, variance_p};

/// Summary of a single sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub mean: f64,
    /// Population standard deviation (divides by n)
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl DescriptiveStats {
    pub fn to_value(&self) -> Value {
        Value::object([
            ("mean", Value::Number(self.mean)),
            ("std_dev", Value::Number(self.std_dev)),
            ("min", Value::Number(self.min)),
            ("max", Value::Number(self.max)),
        ])
    }
}

/// Mean, population standard deviation, min and max of `sample`.
///
/// An empty sample yields all zeros rather than NaN so callers can show a
/// "no data" state without special casing.
pub fn descriptive_stats(sample: &[f64]) -> DescriptiveStats {
    if sample.is_empty() {
        return DescriptiveStats { mean: 0.0, std_dev: 0.0, min: 0.0, max: 0.0 };
    }

    DescriptiveStats {
        mean: mean(sample),
        std_dev: variance_p(sample).sqrt(),
        min: sample.iter().copied().fold(f64::INFINITY, f64::min),
        max: sample.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

// ============ Describe ============

pub struct Describe;

static DESCRIBE_ARGS: [ArgMeta; 1] = [ArgMeta::required(
    "values",
    "List<Number> | Number...",
    "Sample values",
)];

static DESCRIBE_EXAMPLES: [&str; 2] = [
    "describe([2,4,4,4,5,5,7,9]) → {mean: 5, std_dev: 2, min: 2, max: 9}",
    "describe([]) → {mean: 0, std_dev: 0, min: 0, max: 0}",
];

static DESCRIBE_RELATED: [&str; 4] = ["mean", "stddev_p", "min", "max"];

impl FunctionPlugin for Describe {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "describe",
            description: "Mean, population standard deviation, min and max",
            usage: "describe(values)",
            args: &DESCRIBE_ARGS,
            returns: "Object",
            examples: &DESCRIBE_EXAMPLES,
            category: "stats/descriptive",
            related: &DESCRIBE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match extract_numbers(args) {
            Ok(numbers) => descriptive_stats(&numbers).to_value(),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ Single-field reducers ============

/// Declares a plugin returning one field of `DescriptiveStats`.
macro_rules! describe_field {
    ($ty:ident, $name:literal, $field:ident, $desc:literal, $example:literal) => {
        pub struct $ty;

        impl FunctionPlugin for $ty {
            fn meta(&self) -> FunctionMeta {
                static ARGS: [ArgMeta; 1] = [ArgMeta::required(
                    "values",
                    "List<Number> | Number...",
                    "Sample values",
                )];
                static EXAMPLES: [&str; 1] = [$example];
                static RELATED: [&str; 1] = ["describe"];

                FunctionMeta {
                    name: $name,
                    description: $desc,
                    usage: concat!($name, "(values)"),
                    args: &ARGS,
                    returns: "Number",
                    examples: &EXAMPLES,
                    category: "stats/descriptive",
                    related: &RELATED,
                }
            }

            fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
                match extract_numbers(args) {
                    Ok(numbers) => Value::Number(descriptive_stats(&numbers).$field),
                    Err(e) => Value::Error(e),
                }
            }
        }
    };
}

describe_field!(Mean, "mean", mean, "Arithmetic mean (0 for an empty sample)", "mean(1, 2, 3) → 2");
describe_field!(
    StddevP,
    "stddev_p",
    std_dev,
    "Population standard deviation (divides by n)",
    "stddev_p([2,4,4,4,5,5,7,9]) → 2"
);
describe_field!(Min, "min", min, "Smallest value (0 for an empty sample)", "min(3, 1, 2) → 1");
describe_field!(Max, "max", max, "Largest value (0 for an empty sample)", "max(3, 1, 2) → 3");

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn eval_ctx() -> EvalContext {
        EvalContext::new(std::sync::Arc::new(PluginRegistry::new()))
    }

    #[test]
    fn test_empty_sample_is_all_zeros() {
        let stats = descriptive_stats(&[]);
        assert_eq!(stats, DescriptiveStats { mean: 0.0, std_dev: 0.0, min: 0.0, max: 0.0 });
    }

    #[test]
    fn test_population_std_dev() {
        let stats = descriptive_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_abs_diff_eq!(stats.mean, 5.0, epsilon = 1e-12);
        // Sample (n-1) std-dev would be ~2.138
        assert_abs_diff_eq!(stats.std_dev, 2.0, epsilon = 1e-12);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_single_value() {
        let stats = descriptive_stats(&[42.0]);
        assert_eq!(stats.mean, 42.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.min, 42.0);
        assert_eq!(stats.max, 42.0);
    }

    #[test]
    fn test_negative_values() {
        let stats = descriptive_stats(&[-3.0, -1.0, -2.0]);
        assert_eq!(stats.min, -3.0);
        assert_eq!(stats.max, -1.0);
        assert_abs_diff_eq!(stats.mean, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_repeatable() {
        let data = [1.3, 2.7, 9.1, 4.4];
        let a = descriptive_stats(&data);
        let b = descriptive_stats(&data);
        assert_eq!(a.mean.to_bits(), b.mean.to_bits());
        assert_eq!(a.std_dev.to_bits(), b.std_dev.to_bits());
    }

    #[test]
    fn test_describe_plugin() {
        let args = vec![Value::from(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])];
        let result = Describe.call(&args, &eval_ctx());
        assert_eq!(result.get("mean").as_number(), Some(5.0));
        assert_eq!(result.get("max").as_number(), Some(9.0));
    }

    #[test]
    fn test_reducer_plugins() {
        let ctx = eval_ctx();
        let args = vec![Value::Number(3.0), Value::Number(1.0), Value::Number(2.0)];
        assert_eq!(Mean.call(&args, &ctx).as_number(), Some(2.0));
        assert_eq!(Min.call(&args, &ctx).as_number(), Some(1.0));
        assert_eq!(Max.call(&args, &ctx).as_number(), Some(3.0));
        assert_eq!(StddevP.meta().name, "stddev_p");
    }

    #[test]
    fn test_plugin_propagates_errors() {
        let args = vec![Value::from("age")];
        assert!(Mean.call(&args, &eval_ctx()).is_error());
    }
}
