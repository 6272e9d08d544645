//! Financial calculators
//!
//! Five independent, stateless calculators. Each one is a method on its rules
//! table (so thresholds can be overridden through [`crate::Assumptions`]) and a
//! free function that uses the default table.

mod allocation;
mod compound;
mod stock;
mod retirement;
mod comparison;

pub use allocation::{
    allocate, AllocationInput, AllocationResult, AllocationRules, AssetClass, Holding,
    RiskTolerance, SleeveSplit,
};
pub use compound::{project, CompoundInterestInput, CompoundInterestResult, YearlySnapshot};
pub use stock::{
    evaluate, DividendRating, GrowthRating, LeverageRating, Recommendation, Signal,
    StockMetricsInput, StockMetricsResult, StockThresholds, ValuationRating,
};
pub use retirement::{plan, RetirementAssumptions, RetirementInput, RetirementResult};
pub use comparison::{
    compare, ComparisonRules, InvestmentComparisonInput, InvestmentComparisonResult,
    InvestmentOption, OptionProjection, RecommendationBasis, RiskCategory,
    ComparisonRecommendation,
};

use crate::error::{Result, ValidationError};

/// Round a monetary amount to cents
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<f64> {
    ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(value)
}

/// Longest horizon, in years, any projection accepts
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Accept a whole-year horizon in `1..=MAX_HORIZON_YEARS`
pub(crate) fn ensure_horizon(field: &'static str, years: i32) -> Result<u32> {
    if years <= 0 {
        return Err(ValidationError::NotPositive {
            field,
            value: years as f64,
        });
    }
    let years = years as u32;
    if years > MAX_HORIZON_YEARS {
        return Err(ValidationError::AboveMaximum {
            field,
            value: years as f64,
            max: MAX_HORIZON_YEARS as f64,
        });
    }
    Ok(years)
}

/// Format a dollar amount with thousands separators, e.g. `$1,234.50`
pub(crate) fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(10.004), 10.0);
        assert_eq!(round_currency(10.006), 10.01);
        assert_eq!(round_currency(0.0), 0.0);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(999.5), "$999.50");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
        assert_eq!(format_money(-1500.0), "-$1,500.00");
    }

    #[test]
    fn test_guards() {
        assert!(ensure_non_negative("x", 0.0).is_ok());
        assert_eq!(
            ensure_non_negative("x", -1.0),
            Err(ValidationError::Negative { field: "x", value: -1.0 })
        );
        assert_eq!(
            ensure_positive("x", 0.0),
            Err(ValidationError::NotPositive { field: "x", value: 0.0 })
        );
        assert_eq!(
            ensure_finite("x", f64::NAN),
            Err(ValidationError::NotFinite { field: "x" })
        );
    }

    #[test]
    fn test_horizon_limits() {
        assert_eq!(ensure_horizon("years", 1), Ok(1));
        assert_eq!(ensure_horizon("years", MAX_HORIZON_YEARS as i32), Ok(MAX_HORIZON_YEARS));
        assert!(matches!(
            ensure_horizon("years", MAX_HORIZON_YEARS as i32 + 1),
            Err(ValidationError::AboveMaximum { field: "years", .. })
        ));
        assert!(matches!(
            ensure_horizon("years", i32::MAX),
            Err(ValidationError::AboveMaximum { .. })
        ));
        assert!(matches!(
            ensure_horizon("years", 0),
            Err(ValidationError::NotPositive { field: "years", .. })
        ));
    }
}
