//! Validation errors for calculator inputs

use thiserror::Error;

/// Result type alias for calculator operations
pub type Result<T> = std::result::Result<T, ValidationError>;

/// An input outside the documented domain of a calculator.
///
/// Raised before any computation runs; calculators never return partial results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be at most {max} (got {value})")]
    AboveMaximum { field: &'static str, value: f64, max: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("unknown {field} '{value}', expected one of: {expected}")]
    UnknownVariant {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("retirement age ({retirement_age}) must be greater than current age ({current_age})")]
    RetirementNotAfterCurrentAge { current_age: i32, retirement_age: i32 },

    #[error("{field} of {value}% must be above {floor}%")]
    AtOrBelowFloor { field: &'static str, value: f64, floor: f64 },
}
