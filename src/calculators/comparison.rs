//! Side-by-side comparison of two investment options

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{ensure_finite, ensure_horizon, ensure_non_negative, format_money, round_currency};
use crate::error::{Result, ValidationError};

/// Return gaps (percentage points) below this are treated as comparable
pub const MATERIALITY_THRESHOLD_PCT: f64 = 1.0;
/// Annual returns at or below this are rejected
pub const RETURN_FLOOR_PCT: f64 = -100.0;
/// Subtracted from the return before dividing by the risk rank
pub const RISK_FREE_RATE_PCT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// 1 for low up to 3 for high
    pub fn rank(&self) -> u32 {
        match self {
            RiskCategory::Low => 1,
            RiskCategory::Medium => 2,
            RiskCategory::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Medium => "medium",
            RiskCategory::High => "high",
        }
    }
}

impl FromStr for RiskCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskCategory::Low),
            "medium" => Ok(RiskCategory::Medium),
            "high" => Ok(RiskCategory::High),
            _ => Err(ValidationError::UnknownVariant {
                field: "risk",
                value: s.to_string(),
                expected: "low, medium, high",
            }),
        }
    }
}

impl TryFrom<String> for RiskCategory {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentOption {
    pub name: String,
    /// Expected annual return as a percentage
    pub annual_return: f64,
    pub risk: RiskCategory,
}

impl InvestmentOption {
    pub fn new(name: impl Into<String>, annual_return: f64, risk: RiskCategory) -> Self {
        Self {
            name: name.into(),
            annual_return,
            risk,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentComparisonInput {
    pub option_a: InvestmentOption,
    pub option_b: InvestmentOption,
    pub investment_amount: f64,
    /// Years
    pub time_horizon: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionProjection {
    pub name: String,
    pub annual_return: f64,
    pub risk: RiskCategory,
    pub ending_value: f64,
    pub total_gain: f64,
    /// `(return - risk free rate) / risk rank`
    pub risk_adjusted_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationBasis {
    /// Returns differ materially; the higher ending value wins
    HigherReturn,
    /// Returns are comparable but risk differs; the safer option wins
    LowerRiskAtComparableReturn,
    /// Same return and same risk
    Indistinguishable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecommendation {
    /// Name of the preferred option, `None` when they are indistinguishable
    pub preferred: Option<String>,
    pub basis: RecommendationBasis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caveat: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentComparisonResult {
    pub investment_amount: f64,
    pub time_horizon: u32,
    pub option_a: OptionProjection,
    pub option_b: OptionProjection,
    /// Option A's return minus option B's, in percentage points
    pub return_difference_pct: f64,
    /// Option A's ending value minus option B's
    pub ending_value_difference: f64,
    pub recommendation: ComparisonRecommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRules {
    pub materiality_threshold_pct: f64,
    pub return_floor_pct: f64,
    pub risk_free_rate_pct: f64,
}

impl Default for ComparisonRules {
    fn default() -> Self {
        Self {
            materiality_threshold_pct: MATERIALITY_THRESHOLD_PCT,
            return_floor_pct: RETURN_FLOOR_PCT,
            risk_free_rate_pct: RISK_FREE_RATE_PCT,
        }
    }
}

impl ComparisonRules {
    fn validate_return(&self, field: &'static str, value: f64) -> Result<f64> {
        ensure_finite(field, value)?;
        if value <= self.return_floor_pct {
            return Err(ValidationError::AtOrBelowFloor {
                field,
                value,
                floor: self.return_floor_pct,
            });
        }
        Ok(value)
    }

    fn projection(
        &self,
        field: &'static str,
        option: &InvestmentOption,
        amount: f64,
        years: u32,
    ) -> Result<OptionProjection> {
        let ending_value = ensure_finite(
            field,
            amount * (1.0 + option.annual_return / 100.0).powi(years as i32),
        )?;
        Ok(OptionProjection {
            name: option.name.clone(),
            annual_return: option.annual_return,
            risk: option.risk,
            ending_value: round_currency(ending_value),
            total_gain: round_currency(ending_value - amount),
            risk_adjusted_score: (option.annual_return - self.risk_free_rate_pct)
                / option.risk.rank() as f64,
        })
    }

    fn recommend(&self, a: &InvestmentOption, b: &InvestmentOption) -> ComparisonRecommendation {
        let gap = (a.annual_return - b.annual_return).abs();

        if a.risk != b.risk && (gap < self.materiality_threshold_pct || gap == 0.0) {
            let safer = if a.risk < b.risk { a } else { b };
            return ComparisonRecommendation {
                preferred: Some(safer.name.clone()),
                basis: RecommendationBasis::LowerRiskAtComparableReturn,
                caveat: None,
            };
        }

        if gap == 0.0 {
            return ComparisonRecommendation {
                preferred: None,
                basis: RecommendationBasis::Indistinguishable,
                caveat: None,
            };
        }

        let (winner, other) = if a.annual_return > b.annual_return { (a, b) } else { (b, a) };
        let caveat = (winner.risk > other.risk).then(|| {
            format!(
                "{} carries {} risk versus {} risk for {}; its extra return comes with a wider range of outcomes",
                winner.name, winner.risk, other.risk, other.name
            )
        });

        ComparisonRecommendation {
            preferred: Some(winner.name.clone()),
            basis: RecommendationBasis::HigherReturn,
            caveat,
        }
    }

    pub fn compare(&self, input: &InvestmentComparisonInput) -> Result<InvestmentComparisonResult> {
        let amount = ensure_non_negative("investment_amount", input.investment_amount)?;
        let years = ensure_horizon("time_horizon", input.time_horizon)?;
        self.validate_return("option_a_return", input.option_a.annual_return)?;
        self.validate_return("option_b_return", input.option_b.annual_return)?;

        let option_a = self.projection("option_a_ending_value", &input.option_a, amount, years)?;
        let option_b = self.projection("option_b_ending_value", &input.option_b, amount, years)?;
        let recommendation = self.recommend(&input.option_a, &input.option_b);

        debug!(
            "compare {} vs {} over {} years -> {:?}",
            option_a.name, option_b.name, years, recommendation.preferred
        );

        Ok(InvestmentComparisonResult {
            investment_amount: amount,
            time_horizon: years,
            return_difference_pct: input.option_a.annual_return - input.option_b.annual_return,
            ending_value_difference: round_currency(option_a.ending_value - option_b.ending_value),
            option_a,
            option_b,
            recommendation,
        })
    }
}

/// Compare with the default materiality threshold and return floor
pub fn compare(
    option_a: InvestmentOption,
    option_b: InvestmentOption,
    investment_amount: f64,
    time_horizon: i32,
) -> Result<InvestmentComparisonResult> {
    ComparisonRules::default().compare(&InvestmentComparisonInput {
        option_a,
        option_b,
        investment_amount,
        time_horizon,
    })
}

impl fmt::Display for InvestmentComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(70);
        writeln!(f, "Investment Comparison Analysis")?;
        writeln!(f)?;
        writeln!(f, "Initial Investment: {}", format_money(self.investment_amount))?;
        writeln!(f, "Time Horizon: {} years", self.time_horizon)?;

        for (label, option) in [("A", &self.option_a), ("B", &self.option_b)] {
            writeln!(f)?;
            writeln!(f, "{}", rule)?;
            writeln!(f, "OPTION {}: {}", label, option.name)?;
            writeln!(f, "{}", rule)?;
            writeln!(f, "Expected Return: {}% annually", option.annual_return)?;
            writeln!(f, "Risk Level: {}", option.risk.as_str().to_uppercase())?;
            writeln!(f, "Future Value: {}", format_money(option.ending_value))?;
            writeln!(f, "Total Gain: {}", format_money(option.total_gain))?;
            writeln!(f, "Risk-Adjusted Return Score: {:.2}", option.risk_adjusted_score)?;
        }

        writeln!(f)?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "COMPARISON")?;
        writeln!(f, "{}", rule)?;
        let (ahead, behind) = if self.ending_value_difference >= 0.0 {
            (&self.option_a, &self.option_b)
        } else {
            (&self.option_b, &self.option_a)
        };
        writeln!(
            f,
            "{} ends {} higher than {} ({:+.2} percentage points per year)",
            ahead.name,
            format_money(self.ending_value_difference.abs()),
            behind.name,
            ahead.annual_return - behind.annual_return
        )?;
        writeln!(f)?;
        match (&self.recommendation.preferred, self.recommendation.basis) {
            (Some(name), RecommendationBasis::LowerRiskAtComparableReturn) => {
                writeln!(f, "RECOMMENDATION: {} (comparable return at lower risk)", name)?
            }
            (Some(name), _) => writeln!(f, "RECOMMENDATION: {} (higher expected return)", name)?,
            (None, _) => writeln!(f, "RECOMMENDATION: Both options are equivalent")?,
        }
        if let Some(caveat) = &self.recommendation.caveat {
            writeln!(f, "CAVEAT: {}", caveat)?;
        }
        Ok(())
    }
}
