//! Retirement corpus sizing and the monthly savings needed to reach it

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    ensure_finite, ensure_horizon, ensure_non_negative, ensure_positive, format_money,
    round_currency,
};
use crate::error::{Result, ValidationError};

/// Sustainable annual withdrawal as a fraction of the corpus (the 4% rule)
pub const WITHDRAWAL_RATE: f64 = 0.04;
/// Planning horizon used to report how long retirement lasts
pub const LIFE_EXPECTANCY: i32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_age: i32,
    pub retirement_age: i32,
    pub current_savings: f64,
    pub desired_annual_income: f64,
    /// Expected annual return as a percentage
    pub expected_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementResult {
    pub current_age: i32,
    pub retirement_age: i32,
    pub years_to_retirement: u32,
    pub current_savings: f64,
    pub desired_annual_income: f64,
    pub expected_return: f64,
    /// Corpus whose withdrawal-rate share covers the desired income
    pub required_corpus: f64,
    /// Current savings compounded annually until retirement
    pub projected_corpus_from_savings: f64,
    pub shortfall: f64,
    pub required_monthly_savings: f64,
    /// Years from retirement to the planning life expectancy
    pub retirement_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementAssumptions {
    pub withdrawal_rate: f64,
    pub life_expectancy: i32,
}

impl Default for RetirementAssumptions {
    fn default() -> Self {
        Self {
            withdrawal_rate: WITHDRAWAL_RATE,
            life_expectancy: LIFE_EXPECTANCY,
        }
    }
}

impl RetirementAssumptions {
    pub fn plan(&self, input: &RetirementInput) -> Result<RetirementResult> {
        if input.current_age < 0 {
            return Err(ValidationError::Negative {
                field: "current_age",
                value: input.current_age as f64,
            });
        }
        if input.retirement_age <= input.current_age {
            return Err(ValidationError::RetirementNotAfterCurrentAge {
                current_age: input.current_age,
                retirement_age: input.retirement_age,
            });
        }
        let savings = ensure_non_negative("current_savings", input.current_savings)?;
        let income = ensure_non_negative("desired_annual_income", input.desired_annual_income)?;
        let annual_rate = ensure_positive("expected_return", input.expected_return)? / 100.0;

        let years = ensure_horizon(
            "years_to_retirement",
            input.retirement_age.saturating_sub(input.current_age),
        )?;
        let required_corpus = ensure_finite("required_corpus", income / self.withdrawal_rate)?;
        let projected = ensure_finite(
            "projected_corpus_from_savings",
            savings * (1.0 + annual_rate).powi(years as i32),
        )?;
        let shortfall = (required_corpus - projected).max(0.0);

        let required_monthly_savings = if shortfall > 0.0 {
            ensure_finite(
                "required_monthly_savings",
                monthly_payment_for(shortfall, annual_rate / 12.0, years * 12),
            )?
        } else {
            0.0
        };

        debug!(
            "plan years={} corpus={:.2} projected={:.2} shortfall={:.2} monthly={:.2}",
            years, required_corpus, projected, shortfall, required_monthly_savings
        );

        Ok(RetirementResult {
            current_age: input.current_age,
            retirement_age: input.retirement_age,
            years_to_retirement: years,
            current_savings: savings,
            desired_annual_income: income,
            expected_return: input.expected_return,
            required_corpus: round_currency(required_corpus),
            projected_corpus_from_savings: round_currency(projected),
            shortfall: round_currency(shortfall),
            required_monthly_savings: round_currency(required_monthly_savings),
            retirement_years: (self.life_expectancy - input.retirement_age).max(0) as u32,
        })
    }
}

/// Level end-of-month payment that accumulates to `future_value`.
///
/// Solves `FV = PMT * ((1 + r)^n - 1) / r` for PMT.
fn monthly_payment_for(future_value: f64, monthly_rate: f64, months: u32) -> f64 {
    let growth = (1.0 + monthly_rate).powi(months as i32) - 1.0;
    future_value * monthly_rate / growth
}

/// Plan with the default withdrawal rate and life expectancy
pub fn plan(
    current_age: i32,
    retirement_age: i32,
    current_savings: f64,
    desired_annual_income: f64,
    expected_return: f64,
) -> Result<RetirementResult> {
    RetirementAssumptions::default().plan(&RetirementInput {
        current_age,
        retirement_age,
        current_savings,
        desired_annual_income,
        expected_return,
    })
}

impl fmt::Display for RetirementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Retirement Planning Analysis")?;
        writeln!(f)?;
        writeln!(f, "YOUR PROFILE:")?;
        writeln!(f, "Current Age: {}", self.current_age)?;
        writeln!(f, "Retirement Age: {}", self.retirement_age)?;
        writeln!(f, "Years Until Retirement: {}", self.years_to_retirement)?;
        writeln!(f, "Current Savings: {}", format_money(self.current_savings))?;
        writeln!(f, "Expected Annual Return: {}%", self.expected_return)?;
        writeln!(f)?;
        writeln!(f, "RETIREMENT GOALS:")?;
        writeln!(f, "Desired Annual Income: {}", format_money(self.desired_annual_income))?;
        writeln!(f, "Estimated Retirement Duration: {} years", self.retirement_years)?;
        writeln!(f)?;
        writeln!(f, "CALCULATIONS:")?;
        writeln!(f, "Retirement Corpus Needed: {}", format_money(self.required_corpus))?;
        writeln!(
            f,
            "Future Value of Current Savings: {}",
            format_money(self.projected_corpus_from_savings)
        )?;
        writeln!(f, "Additional Savings Needed: {}", format_money(self.shortfall))?;
        writeln!(f)?;
        writeln!(f, "MONTHLY SAVINGS REQUIRED: {}", format_money(self.required_monthly_savings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::MAX_HORIZON_YEARS;
    use approx::assert_relative_eq;

    #[test]
    fn test_mid_career_plan() {
        let result = plan(35, 65, 50_000.0, 80_000.0, 7.0).unwrap();
        assert_eq!(result.years_to_retirement, 30);
        assert_eq!(result.required_corpus, 2_000_000.0);
        assert_relative_eq!(
            result.projected_corpus_from_savings,
            50_000.0 * 1.07_f64.powi(30),
            max_relative = 1e-6
        );
        assert!(result.shortfall > 0.0);
        assert!(result.required_monthly_savings > 0.0);
        assert_eq!(result.retirement_years, 25);

        // Saving the required amount every month closes the gap
        let r = 0.07 / 12.0;
        let accumulated = result.required_monthly_savings * ((1.0_f64 + r).powi(360) - 1.0) / r;
        assert_relative_eq!(accumulated, result.shortfall, max_relative = 1e-5);
    }

    #[test]
    fn test_no_shortfall_means_no_monthly_savings() {
        let result = plan(40, 65, 1_000_000.0, 20_000.0, 6.0).unwrap();
        assert!(result.projected_corpus_from_savings >= result.required_corpus);
        assert_eq!(result.shortfall, 0.0);
        assert_eq!(result.required_monthly_savings, 0.0);
    }

    #[test]
    fn test_zero_income_needs_nothing() {
        let result = plan(30, 60, 0.0, 0.0, 5.0).unwrap();
        assert_eq!(result.required_corpus, 0.0);
        assert_eq!(result.required_monthly_savings, 0.0);
    }

    #[test]
    fn test_retiring_after_life_expectancy() {
        let result = plan(80, 95, 10_000.0, 10_000.0, 3.0).unwrap();
        assert_eq!(result.retirement_years, 0);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            plan(65, 65, 0.0, 0.0, 5.0),
            Err(ValidationError::RetirementNotAfterCurrentAge { .. })
        ));
        assert!(matches!(
            plan(65, 60, 0.0, 0.0, 5.0),
            Err(ValidationError::RetirementNotAfterCurrentAge { .. })
        ));
        assert!(matches!(
            plan(-1, 60, 0.0, 0.0, 5.0),
            Err(ValidationError::Negative { field: "current_age", .. })
        ));
        assert!(matches!(
            plan(30, 60, -1.0, 0.0, 5.0),
            Err(ValidationError::Negative { field: "current_savings", .. })
        ));
        assert!(matches!(
            plan(30, 60, 0.0, -1.0, 5.0),
            Err(ValidationError::Negative { field: "desired_annual_income", .. })
        ));
        assert!(matches!(
            plan(30, 60, 0.0, 1.0, 0.0),
            Err(ValidationError::NotPositive { field: "expected_return", .. })
        ));
        assert!(plan(0, 1, 0.0, 1.0, 0.1).is_ok());
    }

    #[test]
    fn test_horizon_capped() {
        let limit = MAX_HORIZON_YEARS as i32;
        let result = plan(0, limit, 0.0, 40_000.0, 5.0).unwrap();
        assert_eq!(result.years_to_retirement, MAX_HORIZON_YEARS);
        assert_eq!(result.shortfall, result.required_corpus);
        assert!(result.required_monthly_savings > 0.0);

        assert!(matches!(
            plan(0, limit + 1, 0.0, 40_000.0, 5.0),
            Err(ValidationError::AboveMaximum { field: "years_to_retirement", .. })
        ));
        assert!(matches!(
            plan(0, 400_000_000, 0.0, 1_000.0, 0.0001),
            Err(ValidationError::AboveMaximum { .. })
        ));
        assert!(matches!(
            plan(0, i32::MAX, 0.0, 1_000.0, 5.0),
            Err(ValidationError::AboveMaximum { .. })
        ));
    }

    #[test]
    fn test_overflowing_growth_rejected() {
        assert!(matches!(
            plan(30, 60, 0.0, 1_000.0, 1.0e300),
            Err(ValidationError::NotFinite { field: "projected_corpus_from_savings" })
        ));
        assert!(matches!(
            plan(30, 60, 1.0e300, 1_000.0, 1.0e6),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_results_finite_and_non_negative_across_domain() {
        let limit = MAX_HORIZON_YEARS as i32;
        for &retirement_age in &[1, 20, 65, limit] {
            for &savings in &[0.0, 25_000.0, 3_000_000.0] {
                for &income in &[0.0, 60_000.0, 250_000.0] {
                    for &expected_return in &[0.1, 4.0, 12.0, 40.0] {
                        let result = plan(0, retirement_age, savings, income, expected_return).unwrap();
                        for value in [
                            result.required_corpus,
                            result.projected_corpus_from_savings,
                            result.shortfall,
                            result.required_monthly_savings,
                        ] {
                            assert!(value.is_finite() && value >= 0.0, "{:?}", result);
                        }
                        if result.required_corpus - result.projected_corpus_from_savings > 0.01 {
                            assert!(result.shortfall > 0.0);
                        }
                    }
                }
            }
        }
    }
}
