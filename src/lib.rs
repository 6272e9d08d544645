//! Financial Tools - Deterministic calculators for financial-advice Q&A
//!
//! This library provides:
//! - Portfolio allocation by age and risk tolerance
//! - Compound interest projection with monthly contributions
//! - Stock metric scoring with an overall recommendation
//! - Retirement corpus sizing (4% rule) and required monthly savings
//! - Two-option investment comparison with a risk-aware recommendation
//! - A named-tool surface so an agent runtime can call the calculators by name
//!
//! Every calculation is pure and synchronous; invalid input is rejected with a
//! [`ValidationError`] before anything is computed.

pub mod assumptions;
pub mod calculators;
pub mod error;
pub mod scenario;
pub mod tools;

// Re-export commonly used types
pub use assumptions::Assumptions;
pub use calculators::{
    allocate, compare, evaluate, plan, project, AllocationInput, AllocationResult,
    CompoundInterestInput, CompoundInterestResult, InvestmentComparisonInput,
    InvestmentComparisonResult, InvestmentOption, RetirementInput, RetirementResult,
    RiskCategory, RiskTolerance, StockMetricsInput, StockMetricsResult,
};
pub use error::{Result, ValidationError};
pub use scenario::ScenarioRunner;
pub use tools::{create_default_registry, Tool, ToolCall, ToolOutput, ToolRegistry};
