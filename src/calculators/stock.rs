//! Stock metric scoring
//!
//! Each metric is rated against a threshold table; the ratings vote +1
//! (favorable), 0 (neutral) or -1 (unfavorable) and the total picks the
//! overall recommendation.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{ensure_finite, ensure_non_negative, format_money};
use crate::error::Result;

/// P/E below this is rated undervalued
pub const PE_UNDERVALUED_BELOW: f64 = 15.0;
/// P/E above this is rated overvalued
pub const PE_OVERVALUED_ABOVE: f64 = 25.0;
/// Dividend yield (%) above this is income-favorable
pub const DIVIDEND_INCOME_ABOVE: f64 = 3.0;
/// Dividend yield (%) above this (and not income-favorable) is moderate
pub const DIVIDEND_MODERATE_ABOVE: f64 = 1.0;
/// Revenue growth (%) above this is high-growth
pub const GROWTH_HIGH_ABOVE: f64 = 15.0;
/// Debt-to-equity below this is low leverage
pub const LEVERAGE_LOW_BELOW: f64 = 0.5;
/// Debt-to-equity above this is highly leveraged
pub const LEVERAGE_HIGH_ABOVE: f64 = 1.5;

/// Minimum score for each recommendation, best first
pub const RECOMMENDATION_BANDS: [(i32, Recommendation); 4] = [
    (3, Recommendation::StrongBuy),
    (1, Recommendation::Buy),
    (0, Recommendation::Hold),
    (-2, Recommendation::Caution),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Favorable,
    Neutral,
    Unfavorable,
}

impl Signal {
    pub fn score(&self) -> i32 {
        match self {
            Signal::Favorable => 1,
            Signal::Neutral => 0,
            Signal::Unfavorable => -1,
        }
    }

    fn marker(&self) -> char {
        match self {
            Signal::Favorable => '+',
            Signal::Neutral => 'o',
            Signal::Unfavorable => '!',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValuationRating {
    Undervalued,
    FairlyValued,
    Overvalued,
    NegativeEarnings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DividendRating {
    IncomeFavorable,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrowthRating {
    HighGrowth,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeverageRating {
    LowLeverage,
    Moderate,
    HighlyLeveraged,
}

impl ValuationRating {
    pub fn signal(&self) -> Signal {
        match self {
            ValuationRating::Undervalued => Signal::Favorable,
            ValuationRating::FairlyValued => Signal::Neutral,
            ValuationRating::Overvalued | ValuationRating::NegativeEarnings => Signal::Unfavorable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ValuationRating::Undervalued => "undervalued",
            ValuationRating::FairlyValued => "fairly valued",
            ValuationRating::Overvalued => "overvalued",
            ValuationRating::NegativeEarnings => "negative earnings",
        }
    }
}

impl DividendRating {
    pub fn signal(&self) -> Signal {
        match self {
            DividendRating::IncomeFavorable => Signal::Favorable,
            DividendRating::Moderate | DividendRating::Low => Signal::Neutral,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DividendRating::IncomeFavorable => "income-favorable",
            DividendRating::Moderate => "moderate income",
            DividendRating::Low => "low yield",
        }
    }
}

impl GrowthRating {
    pub fn signal(&self) -> Signal {
        match self {
            GrowthRating::HighGrowth => Signal::Favorable,
            GrowthRating::Stable => Signal::Neutral,
            GrowthRating::Declining => Signal::Unfavorable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GrowthRating::HighGrowth => "high-growth",
            GrowthRating::Stable => "stable",
            GrowthRating::Declining => "declining",
        }
    }
}

impl LeverageRating {
    pub fn signal(&self) -> Signal {
        match self {
            LeverageRating::LowLeverage => Signal::Favorable,
            LeverageRating::Moderate => Signal::Neutral,
            LeverageRating::HighlyLeveraged => Signal::Unfavorable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LeverageRating::LowLeverage => "low leverage",
            LeverageRating::Moderate => "moderate leverage",
            LeverageRating::HighlyLeveraged => "highly leveraged",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "strong buy")]
    StrongBuy,
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "hold")]
    Hold,
    #[serde(rename = "caution")]
    Caution,
    #[serde(rename = "avoid")]
    Avoid,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "strong buy",
            Recommendation::Buy => "buy",
            Recommendation::Hold => "hold",
            Recommendation::Caution => "caution",
            Recommendation::Avoid => "avoid",
        }
    }

    /// "strong buy" and "buy"
    pub fn is_favorable(&self) -> bool {
        matches!(self, Recommendation::StrongBuy | Recommendation::Buy)
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetricsInput {
    #[serde(alias = "stock_name")]
    pub name: String,
    pub current_price: f64,
    pub pe_ratio: f64,
    /// Percent
    pub dividend_yield: f64,
    /// Percent
    pub revenue_growth: f64,
    pub debt_to_equity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetricsResult {
    pub name: String,
    pub current_price: f64,
    pub pe_ratio: f64,
    pub dividend_yield: f64,
    pub revenue_growth: f64,
    pub debt_to_equity: f64,
    pub valuation: ValuationRating,
    pub dividend: DividendRating,
    pub growth: GrowthRating,
    pub leverage: LeverageRating,
    pub score: i32,
    pub recommendation: Recommendation,
}

impl StockMetricsResult {
    pub fn signals(&self) -> [Signal; 4] {
        [
            self.valuation.signal(),
            self.dividend.signal(),
            self.growth.signal(),
            self.leverage.signal(),
        ]
    }
}

/// Rating thresholds; defaults are the module constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockThresholds {
    pub pe_undervalued_below: f64,
    pub pe_overvalued_above: f64,
    pub dividend_income_above: f64,
    pub dividend_moderate_above: f64,
    pub growth_high_above: f64,
    pub leverage_low_below: f64,
    pub leverage_high_above: f64,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            pe_undervalued_below: PE_UNDERVALUED_BELOW,
            pe_overvalued_above: PE_OVERVALUED_ABOVE,
            dividend_income_above: DIVIDEND_INCOME_ABOVE,
            dividend_moderate_above: DIVIDEND_MODERATE_ABOVE,
            growth_high_above: GROWTH_HIGH_ABOVE,
            leverage_low_below: LEVERAGE_LOW_BELOW,
            leverage_high_above: LEVERAGE_HIGH_ABOVE,
        }
    }
}

impl StockThresholds {
    pub fn rate_valuation(&self, pe_ratio: f64) -> ValuationRating {
        if pe_ratio <= 0.0 {
            ValuationRating::NegativeEarnings
        } else if pe_ratio < self.pe_undervalued_below {
            ValuationRating::Undervalued
        } else if pe_ratio <= self.pe_overvalued_above {
            ValuationRating::FairlyValued
        } else {
            ValuationRating::Overvalued
        }
    }

    pub fn rate_dividend(&self, dividend_yield: f64) -> DividendRating {
        if dividend_yield > self.dividend_income_above {
            DividendRating::IncomeFavorable
        } else if dividend_yield > self.dividend_moderate_above {
            DividendRating::Moderate
        } else {
            DividendRating::Low
        }
    }

    pub fn rate_growth(&self, revenue_growth: f64) -> GrowthRating {
        if revenue_growth > self.growth_high_above {
            GrowthRating::HighGrowth
        } else if revenue_growth > 0.0 {
            GrowthRating::Stable
        } else {
            GrowthRating::Declining
        }
    }

    pub fn rate_leverage(&self, debt_to_equity: f64) -> LeverageRating {
        if debt_to_equity < self.leverage_low_below {
            LeverageRating::LowLeverage
        } else if debt_to_equity <= self.leverage_high_above {
            LeverageRating::Moderate
        } else {
            LeverageRating::HighlyLeveraged
        }
    }

    pub fn evaluate(&self, input: &StockMetricsInput) -> Result<StockMetricsResult> {
        ensure_non_negative("current_price", input.current_price)?;
        ensure_finite("pe_ratio", input.pe_ratio)?;
        ensure_non_negative("dividend_yield", input.dividend_yield)?;
        ensure_finite("revenue_growth", input.revenue_growth)?;
        ensure_non_negative("debt_to_equity", input.debt_to_equity)?;

        let valuation = self.rate_valuation(input.pe_ratio);
        let dividend = self.rate_dividend(input.dividend_yield);
        let growth = self.rate_growth(input.revenue_growth);
        let leverage = self.rate_leverage(input.debt_to_equity);

        let score = valuation.signal().score()
            + dividend.signal().score()
            + growth.signal().score()
            + leverage.signal().score();
        let recommendation = recommendation_for(score);

        debug!("evaluate {} score={} -> {}", input.name, score, recommendation);

        Ok(StockMetricsResult {
            name: input.name.clone(),
            current_price: input.current_price,
            pe_ratio: input.pe_ratio,
            dividend_yield: input.dividend_yield,
            revenue_growth: input.revenue_growth,
            debt_to_equity: input.debt_to_equity,
            valuation,
            dividend,
            growth,
            leverage,
            score,
            recommendation,
        })
    }
}

/// Map a total score onto the recommendation bands
pub fn recommendation_for(score: i32) -> Recommendation {
    RECOMMENDATION_BANDS
        .iter()
        .find(|(min_score, _)| score >= *min_score)
        .map(|&(_, recommendation)| recommendation)
        .unwrap_or(Recommendation::Avoid)
}

/// Evaluate with the default thresholds
pub fn evaluate(
    name: &str,
    current_price: f64,
    pe_ratio: f64,
    dividend_yield: f64,
    revenue_growth: f64,
    debt_to_equity: f64,
) -> Result<StockMetricsResult> {
    StockThresholds::default().evaluate(&StockMetricsInput {
        name: name.to_string(),
        current_price,
        pe_ratio,
        dividend_yield,
        revenue_growth,
        debt_to_equity,
    })
}

impl fmt::Display for StockMetricsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stock Evaluation: {}", self.name)?;
        writeln!(f)?;
        writeln!(f, "CURRENT METRICS:")?;
        writeln!(f, "Price: {}", format_money(self.current_price))?;
        writeln!(f, "P/E Ratio: {:.2}", self.pe_ratio)?;
        writeln!(f, "Dividend Yield: {:.2}%", self.dividend_yield)?;
        writeln!(f, "Revenue Growth: {:.2}%", self.revenue_growth)?;
        writeln!(f, "Debt-to-Equity: {:.2}", self.debt_to_equity)?;
        writeln!(f)?;
        writeln!(f, "ANALYSIS:")?;
        let rows = [
            ("P/E Ratio", self.valuation.label(), self.valuation.signal()),
            ("Dividend Yield", self.dividend.label(), self.dividend.signal()),
            ("Revenue Growth", self.growth.label(), self.growth.signal()),
            ("Debt Level", self.leverage.label(), self.leverage.signal()),
        ];
        for (metric, label, signal) in rows {
            writeln!(f, "[{}] {}: {}", signal.marker(), metric, label)?;
        }
        writeln!(f)?;
        writeln!(f, "SCORE: {:+}", self.score)?;
        writeln!(f, "OVERALL RECOMMENDATION: {}", self.recommendation.as_str().to_uppercase())
    }
}
