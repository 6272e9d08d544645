//! Portfolio allocation by age bracket and risk tolerance
//!
//! Stocks follow the "110 minus age" rule, biased by risk tolerance; the
//! remainder is split between bonds and cash at a fixed ratio.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{ensure_non_negative, format_money, round_currency};
use crate::error::{Result, ValidationError};

/// Age subtracted from this number gives the base stock percentage
pub const BASE_AGE_OFFSET: i32 = 110;
/// Clamp applied to the age-based stock percentage
pub const BASE_STOCK_RANGE: (i32, i32) = (20, 90);
/// Points removed from stocks for conservative clients
pub const CONSERVATIVE_OFFSET: i32 = -20;
/// Points added to stocks for aggressive clients
pub const AGGRESSIVE_OFFSET: i32 = 15;
/// Clamp applied after the risk adjustment
pub const ADJUSTED_STOCK_RANGE: (i32, i32) = (10, 95);
/// Share of the non-stock remainder that goes to bonds (the rest is cash)
pub const BOND_SHARE_OF_REMAINDER: f64 = 0.8;

/// Suggested split of the stock holding (label, percent of the holding)
pub const STOCK_SLEEVES: [(&str, u32); 3] = [
    ("Diversified index funds", 70),
    ("International stocks", 20),
    ("Individual stocks", 10),
];

/// Suggested split of the bond holding (label, percent of the holding)
pub const BOND_SLEEVES: [(&str, u32); 2] = [
    ("Government bonds", 60),
    ("Corporate bonds", 40),
];

/// Qualitative client preference used to bias the stock share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    pub const ALL: [RiskTolerance; 3] = [
        RiskTolerance::Conservative,
        RiskTolerance::Moderate,
        RiskTolerance::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Conservative => "conservative",
            RiskTolerance::Moderate => "moderate",
            RiskTolerance::Aggressive => "aggressive",
        }
    }
}

impl FromStr for RiskTolerance {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(RiskTolerance::Conservative),
            "moderate" => Ok(RiskTolerance::Moderate),
            "aggressive" => Ok(RiskTolerance::Aggressive),
            _ => Err(ValidationError::UnknownVariant {
                field: "risk_tolerance",
                value: s.to_string(),
                expected: "conservative, moderate, aggressive",
            }),
        }
    }
}

impl TryFrom<String> for RiskTolerance {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Stocks,
    Bonds,
    Cash,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssetClass::Stocks => "Stocks/Equities",
            AssetClass::Bonds => "Bonds/Fixed Income",
            AssetClass::Cash => "Cash",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationInput {
    pub age: i32,
    pub risk_tolerance: RiskTolerance,
    pub total_amount: f64,
}

/// One asset class of the recommended portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub asset_class: AssetClass,
    /// Whole percent of the portfolio
    pub percentage: u32,
    /// Dollar amount, rounded to cents
    pub amount: f64,
}

/// A suggested sub-allocation inside a holding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleeveSplit {
    pub label: String,
    /// Percent of the parent holding
    pub share: u32,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub age: i32,
    pub risk_tolerance: RiskTolerance,
    pub total_amount: f64,
    pub stocks: Holding,
    pub bonds: Holding,
    pub cash: Holding,
    pub stock_breakdown: Vec<SleeveSplit>,
    pub bond_breakdown: Vec<SleeveSplit>,
}

impl AllocationResult {
    /// Holdings in fixed order: stocks, bonds, cash
    pub fn holdings(&self) -> [&Holding; 3] {
        [&self.stocks, &self.bonds, &self.cash]
    }

    pub fn holding(&self, asset_class: AssetClass) -> &Holding {
        match asset_class {
            AssetClass::Stocks => &self.stocks,
            AssetClass::Bonds => &self.bonds,
            AssetClass::Cash => &self.cash,
        }
    }
}

/// Allocation heuristics; defaults are the module constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationRules {
    pub base_age_offset: i32,
    pub base_min_stock_pct: i32,
    pub base_max_stock_pct: i32,
    pub conservative_offset: i32,
    pub aggressive_offset: i32,
    pub adjusted_min_stock_pct: i32,
    pub adjusted_max_stock_pct: i32,
    pub bond_share_of_remainder: f64,
}

impl Default for AllocationRules {
    fn default() -> Self {
        Self {
            base_age_offset: BASE_AGE_OFFSET,
            base_min_stock_pct: BASE_STOCK_RANGE.0,
            base_max_stock_pct: BASE_STOCK_RANGE.1,
            conservative_offset: CONSERVATIVE_OFFSET,
            aggressive_offset: AGGRESSIVE_OFFSET,
            adjusted_min_stock_pct: ADJUSTED_STOCK_RANGE.0,
            adjusted_max_stock_pct: ADJUSTED_STOCK_RANGE.1,
            bond_share_of_remainder: BOND_SHARE_OF_REMAINDER,
        }
    }
}

impl AllocationRules {
    /// Stock percentage after the age rule and the risk adjustment.
    ///
    /// A range whose minimum exceeds its maximum collapses to the maximum;
    /// `Assumptions::validate` rejects such tables when they are loaded.
    pub fn stock_percentage(&self, age: i32, risk: RiskTolerance) -> u32 {
        let base = bound(
            self.base_age_offset.saturating_sub(age),
            self.base_min_stock_pct,
            self.base_max_stock_pct,
        );

        let adjustment = match risk {
            RiskTolerance::Conservative => self.conservative_offset,
            RiskTolerance::Moderate => 0,
            RiskTolerance::Aggressive => self.aggressive_offset,
        };

        bound(
            base.saturating_add(adjustment),
            self.adjusted_min_stock_pct,
            self.adjusted_max_stock_pct,
        )
        .clamp(0, 100) as u32
    }

    pub fn allocate(&self, input: &AllocationInput) -> Result<AllocationResult> {
        if input.age < 0 {
            return Err(ValidationError::Negative {
                field: "age",
                value: input.age as f64,
            });
        }
        let total = ensure_non_negative("total_amount", input.total_amount)?;

        let stock_pct = self.stock_percentage(input.age, input.risk_tolerance);
        let remainder = 100 - stock_pct;
        let bond_pct = ((remainder as f64) * self.bond_share_of_remainder)
            .round()
            .clamp(0.0, remainder as f64) as u32;
        // Cash takes whatever rounding left over so the three sum to 100
        let cash_pct = remainder - bond_pct;

        let percentages = [stock_pct, bond_pct, cash_pct];
        let amounts = split_amount(total, &percentages);

        debug!(
            "allocate age={} risk={} total={:.2} -> stocks={}% bonds={}% cash={}%",
            input.age, input.risk_tolerance, total, stock_pct, bond_pct, cash_pct
        );

        let stocks = Holding {
            asset_class: AssetClass::Stocks,
            percentage: stock_pct,
            amount: amounts[0],
        };
        let bonds = Holding {
            asset_class: AssetClass::Bonds,
            percentage: bond_pct,
            amount: amounts[1],
        };
        let cash = Holding {
            asset_class: AssetClass::Cash,
            percentage: cash_pct,
            amount: amounts[2],
        };

        Ok(AllocationResult {
            age: input.age,
            risk_tolerance: input.risk_tolerance,
            total_amount: round_currency(total),
            stock_breakdown: sleeves(&STOCK_SLEEVES, stocks.amount),
            bond_breakdown: sleeves(&BOND_SLEEVES, bonds.amount),
            stocks,
            bonds,
            cash,
        })
    }
}

/// Like `i32::clamp`, without the panic when `min > max`
fn bound(value: i32, min: i32, max: i32) -> i32 {
    value.max(min).min(max)
}

/// Split `total` by whole percentages, rounding to cents.
///
/// The rounding residual lands on the largest bucket so the amounts add back
/// up to the rounded total.
fn split_amount(total: f64, percentages: &[u32; 3]) -> [f64; 3] {
    let target = round_currency(total);
    let mut amounts = percentages.map(|pct| round_currency(total * pct as f64 / 100.0));

    let residual = target - amounts.iter().sum::<f64>();
    let largest = percentages
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
        .map(|(i, _)| i)
        .unwrap_or(0);
    amounts[largest] = round_currency((amounts[largest] + residual).max(0.0));

    amounts
}

fn sleeves(table: &[(&str, u32)], amount: f64) -> Vec<SleeveSplit> {
    table
        .iter()
        .map(|&(label, share)| SleeveSplit {
            label: label.to_string(),
            share,
            amount: round_currency(amount * share as f64 / 100.0),
        })
        .collect()
}

/// Allocate with the default rules
pub fn allocate(age: i32, risk_tolerance: RiskTolerance, total_amount: f64) -> Result<AllocationResult> {
    AllocationRules::default().allocate(&AllocationInput {
        age,
        risk_tolerance,
        total_amount,
    })
}

impl fmt::Display for AllocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Portfolio Allocation Recommendation")?;
        writeln!(f)?;
        writeln!(f, "Age: {} years old", self.age)?;
        writeln!(f, "Risk Tolerance: {}", self.risk_tolerance)?;
        writeln!(f, "Total Investment: {}", format_money(self.total_amount))?;
        writeln!(f)?;
        writeln!(f, "RECOMMENDED ALLOCATION:")?;
        for holding in self.holdings() {
            writeln!(
                f,
                "- {}: {}% ({})",
                holding.asset_class,
                holding.percentage,
                format_money(holding.amount)
            )?;
        }

        for (title, breakdown) in [("Stocks", &self.stock_breakdown), ("Bonds", &self.bond_breakdown)] {
            writeln!(f)?;
            writeln!(f, "{} portion:", title)?;
            for sleeve in breakdown {
                writeln!(f, "  - {}% {} ({})", sleeve.share, sleeve.label, format_money(sleeve.amount))?;
            }
        }
        Ok(())
    }
}
