//! Helper functions for statistical operations
//!
//! Argument extraction for plugins plus the small numeric reductions shared by
//! the analysis modules. Reductions fold left to right from zero so results do
//! not depend on how the sample was assembled.

use cohort_core::{StatsError, Value};

/// Extract numbers from arguments, handling both varargs and List
pub fn extract_numbers(args: &[Value]) -> Result<Vec<f64>, StatsError> {
    let mut numbers = Vec::new();

    for arg in args {
        match arg {
            Value::Number(n) => numbers.push(*n),
            Value::List(list) => {
                for item in list {
                    match item {
                        Value::Number(n) => numbers.push(*n),
                        Value::Error(e) => return Err(e.clone()),
                        other => return Err(StatsError::type_error("Number", other.type_name())),
                    }
                }
            }
            Value::Error(e) => return Err(e.clone()),
            other => return Err(StatsError::type_error("Number or List", other.type_name())),
        }
    }

    Ok(numbers)
}

/// Extract exactly two lists of any lengths (two independent groups)
pub fn extract_two_lists_unaligned(args: &[Value], func: &str) -> Result<(Vec<f64>, Vec<f64>), StatsError> {
    if args.len() != 2 {
        return Err(StatsError::arg_count(func, 2, args.len()));
    }

    let x = extract_numbers(&args[0..1])?;
    let y = extract_numbers(&args[1..2])?;
    Ok((x, y))
}

/// Extract exactly two equal-length lists for bivariate functions
pub fn extract_two_lists(args: &[Value], func: &str) -> Result<(Vec<f64>, Vec<f64>), StatsError> {
    let (x, y) = extract_two_lists_unaligned(args, func)?;

    if x.len() != y.len() {
        return Err(StatsError::domain_error(format!(
            "Lists must have equal length: {} vs {}",
            x.len(),
            y.len()
        ))
        .with_suggestion("Truncate both lists to the shorter length"));
    }

    Ok((x, y))
}

/// Extract groups for multi-sample tests.
///
/// Accepts either one argument holding a list of lists, or one list per group.
pub fn extract_groups(args: &[Value]) -> Result<Vec<Vec<f64>>, StatsError> {
    let nested = match args {
        [Value::List(items)] if !items.is_empty() && items.iter().all(|i| matches!(i, Value::List(_))) => {
            items.as_slice()
        }
        _ => args,
    };

    nested
        .iter()
        .map(|group| match group {
            Value::List(_) => extract_numbers(std::slice::from_ref(group)),
            Value::Error(e) => Err(e.clone()),
            other => Err(StatsError::type_error("List", other.type_name())),
        })
        .collect()
}

/// Extract an optional integer argument in `1..=max`
pub fn extract_count(
    arg: Option<&Value>,
    func: &str,
    name: &str,
    max: usize,
) -> Result<Option<usize>, StatsError> {
    match arg {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) if n.fract() == 0.0 && *n >= 1.0 && *n <= max as f64 => Ok(Some(*n as usize)),
        Some(Value::Number(_)) => Err(StatsError::domain_error(format!(
            "{}() argument '{}' must be an integer between 1 and {}",
            func, name, max
        ))),
        Some(Value::Error(e)) => Err(e.clone()),
        Some(other) => Err(StatsError::arg_type(func, name, "Number", other.type_name())),
    }
}

/// Sum, folded left to right
pub fn sum(numbers: &[f64]) -> f64 {
    numbers.iter().fold(0.0, |acc, x| acc + x)
}

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(numbers: &[f64]) -> f64 {
    sum(numbers) / numbers.len() as f64
}

/// Sum of squared deviations from `center`
pub fn sum_sq_dev(numbers: &[f64], center: f64) -> f64 {
    numbers.iter().fold(0.0, |acc, x| acc + (x - center) * (x - center))
}

/// Population variance (divides by n)
pub fn variance_p(numbers: &[f64]) -> f64 {
    sum_sq_dev(numbers, mean(numbers)) / numbers.len() as f64
}

/// Sample variance (divides by n-1). The divisor is computed in floating
/// point, so a single value yields NaN instead of panicking on underflow.
pub fn variance_s(numbers: &[f64]) -> f64 {
    sum_sq_dev(numbers, mean(numbers)) / (numbers.len() as f64 - 1.0)
}

/// Sort numbers ascending (returns new sorted vector)
pub fn sorted(numbers: &[f64]) -> Vec<f64> {
    let mut sorted = numbers.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}
