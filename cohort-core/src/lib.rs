//! Cohort Core - Fundamental types
//!
//! This crate provides the core types used throughout Cohort:
//! - `Value`: Runtime values (numbers, text, objects, errors)
//! - `StatsError`: Structured errors
//! - `parse_number`: Lenient parsing of registry field text

mod number;
mod value;
mod error;

pub use number::{parse_number, NumberError};
pub use value::Value;
pub use error::{StatsError, Severity, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Value, StatsError, Severity};
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod value_tests {
        use super::*;

        #[test]
        fn test_get_field() {
            let obj = Value::object([("mean", Value::Number(5.0))]);
            assert_eq!(obj.get("mean").as_number(), Some(5.0));
        }

        #[test]
        fn test_get_missing_field() {
            let obj = Value::object([("mean", Value::Number(5.0))]);
            let missing = obj.get("median");
            assert_eq!(missing.as_error().map(|e| e.code.as_str()), Some(codes::UNDEFINED_FIELD));
        }

        #[test]
        fn test_get_on_non_object() {
            let v = Value::Number(1.0);
            assert_eq!(v.get("x").as_error().map(|e| e.code.as_str()), Some(codes::TYPE_ERROR));
        }

        #[test]
        fn test_error_propagates_through_get() {
            let v = Value::Error(StatsError::domain_error("bad"));
            assert!(v.get("x").is_error());
        }

        #[test]
        fn test_from_vec() {
            let v: Value = vec![1.0, 2.0].into();
            assert_eq!(v.as_list().map(|l| l.len()), Some(2));
        }

        #[test]
        fn test_display_non_finite() {
            assert_eq!(Value::Number(f64::NAN).to_string(), "N/A");
            assert_eq!(Value::Number(2.5).to_string(), "2.5");
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_display_with_suggestion() {
            let e = StatsError::arg_count("mean", 1, 2);
            let s = e.to_string();
            assert!(s.starts_with("[ARG_COUNT]"));
            assert!(s.contains("suggestion"));
        }

        #[test]
        fn test_from_number_error() {
            let e: StatsError = parse_number("abc").unwrap_err().into();
            assert_eq!(e.code, codes::PARSE_ERROR);
        }

        #[test]
        fn test_severity_defaults() {
            assert_eq!(StatsError::domain_error("x").severity, Severity::Error);
            assert_eq!(StatsError::internal("boom").severity, Severity::Fatal);
            assert_eq!(StatsError::source_error("io").severity, Severity::Fatal);
        }
    }
}
