//! Advisory assumptions: every threshold, offset and ratio the calculators use

pub mod loader;

pub use loader::{AssumptionError, DEFAULT_ASSUMPTIONS_FILE};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calculators::{AllocationRules, ComparisonRules, RetirementAssumptions, StockThresholds};

/// Container for all calculator configuration tables
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Assumptions {
    pub allocation: AllocationRules,
    pub stock: StockThresholds,
    pub retirement: RetirementAssumptions,
    pub comparison: ComparisonRules,
}

impl Assumptions {
    /// The documented default tables
    pub fn default_advisory() -> Self {
        Self::default()
    }

    /// Load overrides from a `parameter,value` CSV on top of the defaults
    pub fn from_csv_path(path: &Path) -> Result<Self, AssumptionError> {
        let mut assumptions = Self::default_advisory();
        for (parameter, value) in loader::load_parameters(path)? {
            assumptions.set(&parameter, value)?;
        }
        assumptions.validate()?;
        Ok(assumptions)
    }

    /// Load overrides from any reader (string buffer, request body)
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, AssumptionError> {
        let mut assumptions = Self::default_advisory();
        for (parameter, value) in loader::load_parameters_from_reader(reader)? {
            assumptions.set(&parameter, value)?;
        }
        assumptions.validate()?;
        Ok(assumptions)
    }

    /// Override a single parameter by its dotted key
    pub fn set(&mut self, parameter: &str, value: f64) -> Result<(), AssumptionError> {
        let whole = || -> Result<i32, AssumptionError> {
            if value.fract() != 0.0 || value.abs() > 1000.0 {
                return Err(AssumptionError::InvalidValue {
                    parameter: parameter.to_string(),
                    reason: format!("{} is not a whole number", value),
                });
            }
            Ok(value as i32)
        };

        match parameter {
            "allocation.base_age_offset" => self.allocation.base_age_offset = whole()?,
            "allocation.base_min_stock_pct" => self.allocation.base_min_stock_pct = whole()?,
            "allocation.base_max_stock_pct" => self.allocation.base_max_stock_pct = whole()?,
            "allocation.conservative_offset" => self.allocation.conservative_offset = whole()?,
            "allocation.aggressive_offset" => self.allocation.aggressive_offset = whole()?,
            "allocation.adjusted_min_stock_pct" => self.allocation.adjusted_min_stock_pct = whole()?,
            "allocation.adjusted_max_stock_pct" => self.allocation.adjusted_max_stock_pct = whole()?,
            "allocation.bond_share_of_remainder" => self.allocation.bond_share_of_remainder = value,
            "stock.pe_undervalued_below" => self.stock.pe_undervalued_below = value,
            "stock.pe_overvalued_above" => self.stock.pe_overvalued_above = value,
            "stock.dividend_income_above" => self.stock.dividend_income_above = value,
            "stock.dividend_moderate_above" => self.stock.dividend_moderate_above = value,
            "stock.growth_high_above" => self.stock.growth_high_above = value,
            "stock.leverage_low_below" => self.stock.leverage_low_below = value,
            "stock.leverage_high_above" => self.stock.leverage_high_above = value,
            "retirement.withdrawal_rate" => self.retirement.withdrawal_rate = value,
            "retirement.life_expectancy" => self.retirement.life_expectancy = whole()?,
            "comparison.materiality_threshold_pct" => self.comparison.materiality_threshold_pct = value,
            "comparison.return_floor_pct" => self.comparison.return_floor_pct = value,
            "comparison.risk_free_rate_pct" => self.comparison.risk_free_rate_pct = value,
            other => return Err(AssumptionError::UnknownParameter(other.to_string())),
        }
        Ok(())
    }

    /// Check that every table is internally consistent
    pub fn validate(&self) -> Result<(), AssumptionError> {
        let a = &self.allocation;
        check(
            "allocation.base_min_stock_pct",
            a.base_min_stock_pct <= a.base_max_stock_pct,
            "base clamp minimum exceeds maximum",
        )?;
        check(
            "allocation.adjusted_min_stock_pct",
            0 <= a.adjusted_min_stock_pct
                && a.adjusted_min_stock_pct <= a.adjusted_max_stock_pct
                && a.adjusted_max_stock_pct <= 100,
            "adjusted clamp must satisfy 0 <= min <= max <= 100",
        )?;
        check(
            "allocation.bond_share_of_remainder",
            (0.0..=1.0).contains(&a.bond_share_of_remainder),
            "must be between 0 and 1",
        )?;

        let s = &self.stock;
        check(
            "stock.pe_undervalued_below",
            s.pe_undervalued_below <= s.pe_overvalued_above,
            "undervalued band must sit below the overvalued band",
        )?;
        check(
            "stock.dividend_moderate_above",
            s.dividend_moderate_above <= s.dividend_income_above,
            "moderate band must sit below the income band",
        )?;
        check(
            "stock.leverage_low_below",
            s.leverage_low_below <= s.leverage_high_above,
            "low leverage band must sit below the high leverage band",
        )?;

        check(
            "retirement.withdrawal_rate",
            self.retirement.withdrawal_rate > 0.0 && self.retirement.withdrawal_rate <= 1.0,
            "must be in (0, 1]",
        )?;
        check(
            "comparison.materiality_threshold_pct",
            self.comparison.materiality_threshold_pct >= 0.0,
            "must not be negative",
        )?;
        check(
            "comparison.return_floor_pct",
            self.comparison.return_floor_pct >= -100.0,
            "returns below -100% are meaningless",
        )
    }
}

fn check(parameter: &str, ok: bool, reason: &str) -> Result<(), AssumptionError> {
    if ok {
        Ok(())
    } else {
        Err(AssumptionError::InvalidValue {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_consistent() {
        let assumptions = Assumptions::default_advisory();
        assert!(assumptions.validate().is_ok());
        assert_eq!(assumptions.allocation.base_age_offset, 110);
        assert_eq!(assumptions.retirement.withdrawal_rate, 0.04);
    }

    #[test]
    fn test_overrides_from_reader() {
        let csv = "parameter,value\n\
                   allocation.aggressive_offset,10\n\
                   retirement.withdrawal_rate,0.035\n\
                   stock.pe_overvalued_above,30\n";
        let assumptions = Assumptions::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(assumptions.allocation.aggressive_offset, 10);
        assert_eq!(assumptions.retirement.withdrawal_rate, 0.035);
        assert_eq!(assumptions.stock.pe_overvalued_above, 30.0);
        // Untouched values keep their defaults
        assert_eq!(assumptions.allocation.conservative_offset, -20);
    }

    #[test]
    fn test_unknown_parameter() {
        let csv = "parameter,value\nallocation.crypto_share,5\n";
        assert!(matches!(
            Assumptions::from_reader(csv.as_bytes()),
            Err(AssumptionError::UnknownParameter(p)) if p == "allocation.crypto_share"
        ));
    }

    #[test]
    fn test_inconsistent_tables_rejected() {
        let csv = "parameter,value\nallocation.bond_share_of_remainder,1.5\n";
        assert!(matches!(
            Assumptions::from_reader(csv.as_bytes()),
            Err(AssumptionError::InvalidValue { .. })
        ));

        let csv = "parameter,value\nallocation.aggressive_offset,7.5\n";
        assert!(matches!(
            Assumptions::from_reader(csv.as_bytes()),
            Err(AssumptionError::InvalidValue { .. })
        ));

        let csv = "parameter,value\nretirement.withdrawal_rate,0\n";
        assert!(Assumptions::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_overrides_change_calculations() {
        let mut assumptions = Assumptions::default_advisory();
        assumptions.set("retirement.withdrawal_rate", 0.05).unwrap();
        let result = assumptions
            .retirement
            .plan(&crate::RetirementInput {
                current_age: 35,
                retirement_age: 65,
                current_savings: 0.0,
                desired_annual_income: 50_000.0,
                expected_return: 6.0,
            })
            .unwrap();
        assert_eq!(result.required_corpus, 1_000_000.0);
    }
}
