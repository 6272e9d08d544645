//! Compound interest projection with monthly contributions

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    ensure_finite, ensure_horizon, ensure_non_negative, format_money, round_currency,
    MAX_HORIZON_YEARS,
};
use crate::error::{Result, ValidationError};

pub const MONTHS_PER_YEAR: u32 = 12;

/// Horizons longer than this print every fifth year in the text report
const DETAILED_REPORT_YEARS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestInput {
    pub principal: f64,
    /// Annual rate as a percentage (8 means 8%)
    pub annual_rate: f64,
    pub years: i32,
    #[serde(default)]
    pub monthly_contribution: f64,
}

/// Balance at the end of a projection year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlySnapshot {
    pub year: u32,
    pub balance: f64,
    pub total_contributed: f64,
    pub interest_earned: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestResult {
    pub principal: f64,
    pub annual_rate: f64,
    pub years: u32,
    pub monthly_contribution: f64,
    pub final_balance: f64,
    /// Principal plus every monthly contribution
    pub total_contributed: f64,
    pub total_interest: f64,
    /// `None` when nothing was contributed
    pub return_on_investment_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub yearly: Vec<YearlySnapshot>,
}

impl CompoundInterestResult {
    /// Year-end balances in order; the iterator can be cloned to restart it
    pub fn schedule(&self) -> impl Iterator<Item = &YearlySnapshot> + Clone + '_ {
        self.yearly.iter()
    }
}

impl CompoundInterestInput {
    fn validate(&self) -> Result<u32> {
        ensure_non_negative("principal", self.principal)?;
        ensure_non_negative("annual_rate", self.annual_rate)?;
        ensure_non_negative("monthly_contribution", self.monthly_contribution)?;
        ensure_horizon("years", self.years)
    }

    /// Run the month-by-month simulation.
    ///
    /// Each month the balance earns `annual_rate / 12` and then receives the
    /// contribution. With `record_yearly` the balance after every twelfth month
    /// is kept.
    pub fn project(&self, record_yearly: bool) -> Result<CompoundInterestResult> {
        let years = self.validate()?;
        let months = years
            .checked_mul(MONTHS_PER_YEAR)
            .ok_or(ValidationError::AboveMaximum {
                field: "years",
                value: years as f64,
                max: MAX_HORIZON_YEARS as f64,
            })?;
        let monthly_rate = self.annual_rate / 100.0 / MONTHS_PER_YEAR as f64;

        let mut balance = self.principal;
        let mut yearly = Vec::with_capacity(if record_yearly { years as usize } else { 0 });

        for month in 1..=months {
            balance = balance * (1.0 + monthly_rate) + self.monthly_contribution;

            if record_yearly && month % MONTHS_PER_YEAR == 0 {
                let contributed = self.contributed_after(month);
                yearly.push(YearlySnapshot {
                    year: month / MONTHS_PER_YEAR,
                    balance: round_currency(balance),
                    total_contributed: round_currency(contributed),
                    interest_earned: round_currency(balance - contributed),
                });
            }
        }

        ensure_finite("final_balance", balance)?;
        let total_contributed = self.contributed_after(months);
        let total_interest = balance - total_contributed;
        let return_on_investment_pct = if total_contributed > 0.0 {
            Some(total_interest / total_contributed * 100.0)
        } else {
            None
        };

        debug!(
            "project principal={:.2} rate={}% years={} monthly={:.2} -> balance={:.2}",
            self.principal, self.annual_rate, years, self.monthly_contribution, balance
        );

        Ok(CompoundInterestResult {
            principal: self.principal,
            annual_rate: self.annual_rate,
            years,
            monthly_contribution: self.monthly_contribution,
            final_balance: round_currency(balance),
            total_contributed: round_currency(total_contributed),
            total_interest: round_currency(total_interest),
            return_on_investment_pct,
            yearly,
        })
    }

    fn contributed_after(&self, months: u32) -> f64 {
        self.principal + self.monthly_contribution * months as f64
    }
}

/// Project growth and record a year-by-year schedule
pub fn project(
    principal: f64,
    annual_rate: f64,
    years: i32,
    monthly_contribution: f64,
) -> Result<CompoundInterestResult> {
    CompoundInterestInput {
        principal,
        annual_rate,
        years,
        monthly_contribution,
    }
    .project(true)
}

impl fmt::Display for CompoundInterestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Investment Growth Projection")?;
        writeln!(f)?;
        writeln!(f, "INITIAL INVESTMENT: {}", format_money(self.principal))?;
        writeln!(f, "MONTHLY CONTRIBUTION: {}", format_money(self.monthly_contribution))?;
        writeln!(f, "ANNUAL RETURN RATE: {}%", self.annual_rate)?;
        writeln!(f, "TIME PERIOD: {} years", self.years)?;
        writeln!(f)?;
        writeln!(f, "RESULTS:")?;
        writeln!(f, "Total Amount Invested: {}", format_money(self.total_contributed))?;
        writeln!(f, "Future Value: {}", format_money(self.final_balance))?;
        writeln!(f, "Total Investment Gains: {}", format_money(self.total_interest))?;
        if let Some(roi) = self.return_on_investment_pct {
            writeln!(f, "Return on Investment: {:.2}%", roi)?;
        }

        if !self.yearly.is_empty() {
            let step = if self.years > DETAILED_REPORT_YEARS { 5 } else { 1 };
            writeln!(f)?;
            writeln!(f, "YEAR-BY-YEAR BREAKDOWN:")?;
            for snapshot in self.schedule().filter(|s| s.year % step == 0) {
                writeln!(f, "Year {}: {}", snapshot.year, format_money(snapshot.balance))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_zero_rate_no_growth() {
        let result = project(10_000.0, 0.0, 5, 0.0).unwrap();
        assert_eq!(result.final_balance, 10_000.0);
        assert_eq!(result.total_interest, 0.0);
        assert_eq!(result.yearly.len(), 5);
        assert!(result.schedule().all(|s| s.balance == 10_000.0));
    }

    #[test]
    fn test_contributions_only() {
        let result = project(0.0, 8.0, 20, 500.0).unwrap();
        assert_eq!(result.total_contributed, 120_000.0);
        assert!(result.final_balance > result.total_contributed);
        // Future value of an ordinary annuity: 500 * ((1 + r)^240 - 1) / r
        let r: f64 = 0.08 / 12.0;
        let expected = 500.0 * ((1.0 + r).powi(240) - 1.0) / r;
        assert_abs_diff_eq!(result.final_balance, expected, epsilon = 0.01);
    }

    #[test]
    fn test_matches_closed_form_with_principal() {
        let result = project(10_000.0, 8.0, 20, 500.0).unwrap();
        let r: f64 = 0.08 / 12.0;
        let n = 240;
        let expected = 10_000.0 * (1.0 + r).powi(n) + 500.0 * ((1.0 + r).powi(n) - 1.0) / r;
        assert_abs_diff_eq!(result.final_balance, expected, epsilon = 0.01);
        assert_relative_eq!(
            result.total_interest,
            result.final_balance - result.total_contributed,
            epsilon = 0.01
        );
    }

    #[test]
    fn test_fifty_year_horizon_no_drift() {
        let result = project(1_000.0, 12.0, 50, 0.0).unwrap();
        let expected = 1_000.0 * (1.0_f64 + 0.01).powi(600);
        assert_abs_diff_eq!(result.final_balance, expected, epsilon = 0.01);
    }

    #[test]
    fn test_schedule_is_ordered_and_restartable() {
        let result = project(5_000.0, 6.0, 3, 100.0).unwrap();
        let schedule = result.schedule();
        let years: Vec<u32> = schedule.clone().map(|s| s.year).collect();
        assert_eq!(years, vec![1, 2, 3]);
        assert_eq!(schedule.count(), 3);
        assert_eq!(result.yearly.last().unwrap().balance, result.final_balance);
        assert!(result.yearly.windows(2).all(|w| w[0].balance < w[1].balance));
    }

    #[test]
    fn test_without_schedule() {
        let input = CompoundInterestInput {
            principal: 1_000.0,
            annual_rate: 5.0,
            years: 2,
            monthly_contribution: 0.0,
        };
        let result = input.project(false).unwrap();
        assert!(result.yearly.is_empty());
        assert_eq!(result.final_balance, project(1_000.0, 5.0, 2, 0.0).unwrap().final_balance);
    }

    #[test]
    fn test_roi_undefined_when_nothing_contributed() {
        let result = project(0.0, 5.0, 1, 0.0).unwrap();
        assert_eq!(result.final_balance, 0.0);
        assert!(result.return_on_investment_pct.is_none());
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            project(1_000.0, 5.0, 0, 0.0),
            Err(ValidationError::NotPositive { field: "years", .. })
        ));
        assert!(matches!(
            project(1_000.0, -1.0, 5, 0.0),
            Err(ValidationError::Negative { field: "annual_rate", .. })
        ));
        assert!(matches!(
            project(-1.0, 5.0, 5, 0.0),
            Err(ValidationError::Negative { field: "principal", .. })
        ));
        assert!(matches!(
            project(1_000.0, 5.0, 5, -10.0),
            Err(ValidationError::Negative { field: "monthly_contribution", .. })
        ));
        assert!(project(1_000.0, 5.0, 1, 0.0).is_ok());
    }

    #[test]
    fn test_horizon_capped() {
        let limit = MAX_HORIZON_YEARS as i32;
        let result = project(1_000.0, 5.0, limit, 100.0).unwrap();
        assert_eq!(result.yearly.len(), MAX_HORIZON_YEARS as usize);

        assert!(matches!(
            project(1_000.0, 5.0, limit + 1, 0.0),
            Err(ValidationError::AboveMaximum { field: "years", .. })
        ));
        assert!(matches!(
            project(1.0, 1.0, 400_000_000, 0.0),
            Err(ValidationError::AboveMaximum { field: "years", .. })
        ));
        assert!(matches!(
            project(1.0, 1.0, i32::MAX, 0.0),
            Err(ValidationError::AboveMaximum { .. })
        ));
    }

    #[test]
    fn test_overflowing_growth_rejected() {
        assert!(matches!(
            project(1.0e300, 1.0e6, 100, 0.0),
            Err(ValidationError::NotFinite { field: "final_balance" })
        ));
    }

    #[test]
    fn test_results_finite_and_non_negative_across_domain() {
        let limit = MAX_HORIZON_YEARS as i32;
        for &principal in &[0.0, 1.0, 10_000.0, 5_000_000.0] {
            for &rate in &[0.0, 0.5, 7.0, 25.0] {
                for &years in &[1, 10, 30, limit] {
                    for &monthly in &[0.0, 250.0] {
                        let result = project(principal, rate, years, monthly).unwrap();
                        for value in [
                            result.final_balance,
                            result.total_contributed,
                            result.total_interest,
                        ] {
                            assert!(value.is_finite() && value >= 0.0, "{:?}", result);
                        }
                        assert!(result.schedule().all(|s| s.balance.is_finite() && s.balance >= 0.0));
                    }
                }
            }
        }
    }

    #[test]
    fn test_contribution_defaults_to_zero() {
        let input: CompoundInterestInput =
            serde_json::from_str(r#"{"principal": 100.0, "annual_rate": 4, "years": 3}"#).unwrap();
        assert_eq!(input.monthly_contribution, 0.0);
    }

    #[test]
    fn test_report_steps_by_five_for_long_horizons() {
        let report = project(10_000.0, 8.0, 20, 500.0).unwrap().to_string();
        assert!(report.contains("Year 5:"));
        assert!(report.contains("Year 20:"));
        assert!(!report.contains("Year 3:"));
        assert!(report.contains("Total Amount Invested: $130,000.00"));
    }
}
