//! The five financial calculation tools

use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_arguments, Tool, ToolError};
use crate::calculators::{
    AllocationInput, AllocationRules, ComparisonRules, CompoundInterestInput,
    InvestmentComparisonInput, InvestmentOption, RetirementAssumptions, RetirementInput,
    RiskCategory, StockMetricsInput, StockThresholds, MAX_HORIZON_YEARS,
};

pub struct PortfolioAllocationTool {
    rules: AllocationRules,
}

impl PortfolioAllocationTool {
    pub fn new(rules: AllocationRules) -> Self {
        Self { rules }
    }
}

impl Tool for PortfolioAllocationTool {
    fn name(&self) -> &'static str {
        "calculate_portfolio_allocation"
    }

    fn description(&self) -> &'static str {
        "Calculate recommended portfolio allocation based on age and risk tolerance"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "age": {"type": "integer", "minimum": 0, "description": "Client age in years"},
                "risk_tolerance": {
                    "type": "string",
                    "enum": ["conservative", "moderate", "aggressive"]
                },
                "total_amount": {"type": "number", "minimum": 0, "description": "Amount to invest"}
            },
            "required": ["age", "risk_tolerance", "total_amount"]
        })
    }

    fn call(&self, arguments: &Value) -> Result<Value, ToolError> {
        let input: AllocationInput = parse_arguments(self.name(), arguments)?;
        let result = self.rules.allocate(&input)?;
        Ok(serde_json::to_value(result)?)
    }
}

#[derive(Debug, Deserialize)]
struct CompoundInterestArgs {
    principal: f64,
    annual_rate: f64,
    years: i32,
    #[serde(default)]
    monthly_contribution: f64,
    #[serde(default = "default_include_schedule")]
    include_schedule: bool,
}

fn default_include_schedule() -> bool {
    true
}

pub struct CompoundInterestTool;

impl Tool for CompoundInterestTool {
    fn name(&self) -> &'static str {
        "calculate_compound_interest"
    }

    fn description(&self) -> &'static str {
        "Calculate compound interest and future value of investments"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "principal": {"type": "number", "minimum": 0},
                "annual_rate": {"type": "number", "minimum": 0, "description": "Annual rate as a percentage, e.g. 7 for 7%"},
                "years": {"type": "integer", "minimum": 1, "maximum": MAX_HORIZON_YEARS},
                "monthly_contribution": {"type": "number", "minimum": 0, "default": 0},
                "include_schedule": {"type": "boolean", "default": true, "description": "Include year-end balances"}
            },
            "required": ["principal", "annual_rate", "years"]
        })
    }

    fn call(&self, arguments: &Value) -> Result<Value, ToolError> {
        let args: CompoundInterestArgs = parse_arguments(self.name(), arguments)?;
        let input = CompoundInterestInput {
            principal: args.principal,
            annual_rate: args.annual_rate,
            years: args.years,
            monthly_contribution: args.monthly_contribution,
        };
        let result = input.project(args.include_schedule)?;
        Ok(serde_json::to_value(result)?)
    }
}

pub struct StockMetricsTool {
    thresholds: StockThresholds,
}

impl StockMetricsTool {
    pub fn new(thresholds: StockThresholds) -> Self {
        Self { thresholds }
    }
}

impl Tool for StockMetricsTool {
    fn name(&self) -> &'static str {
        "evaluate_stock_metrics"
    }

    fn description(&self) -> &'static str {
        "Evaluate if a stock's metrics indicate good value"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "stock_name": {"type": "string"},
                "current_price": {"type": "number", "minimum": 0},
                "pe_ratio": {"type": "number"},
                "dividend_yield": {"type": "number", "minimum": 0, "description": "Percent"},
                "revenue_growth": {"type": "number", "description": "Percent"},
                "debt_to_equity": {"type": "number", "minimum": 0}
            },
            "required": ["stock_name", "current_price", "pe_ratio", "dividend_yield", "revenue_growth", "debt_to_equity"]
        })
    }

    fn call(&self, arguments: &Value) -> Result<Value, ToolError> {
        let input: StockMetricsInput = parse_arguments(self.name(), arguments)?;
        let result = self.thresholds.evaluate(&input)?;
        Ok(serde_json::to_value(result)?)
    }
}

pub struct RetirementNeedsTool {
    assumptions: RetirementAssumptions,
}

impl RetirementNeedsTool {
    pub fn new(assumptions: RetirementAssumptions) -> Self {
        Self { assumptions }
    }
}

impl Tool for RetirementNeedsTool {
    fn name(&self) -> &'static str {
        "calculate_retirement_needs"
    }

    fn description(&self) -> &'static str {
        "Calculate retirement savings needed and monthly savings required"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "current_age": {"type": "integer", "minimum": 0},
                "retirement_age": {
                    "type": "integer",
                    "description": format!(
                        "Must exceed current_age by 1 to {} years",
                        MAX_HORIZON_YEARS
                    )
                },
                "current_savings": {"type": "number", "minimum": 0},
                "desired_annual_income": {"type": "number", "minimum": 0},
                "expected_return": {"type": "number", "exclusiveMinimum": 0, "description": "Annual percentage"}
            },
            "required": ["current_age", "retirement_age", "current_savings", "desired_annual_income", "expected_return"]
        })
    }

    fn call(&self, arguments: &Value) -> Result<Value, ToolError> {
        let input: RetirementInput = parse_arguments(self.name(), arguments)?;
        let result = self.assumptions.plan(&input)?;
        Ok(serde_json::to_value(result)?)
    }
}

/// Flat keyword arguments, one field per option attribute
#[derive(Debug, Deserialize)]
struct CompareArgs {
    option_a_name: String,
    option_a_return: f64,
    option_a_risk: RiskCategory,
    option_b_name: String,
    option_b_return: f64,
    option_b_risk: RiskCategory,
    investment_amount: f64,
    time_horizon: i32,
}

impl From<CompareArgs> for InvestmentComparisonInput {
    fn from(args: CompareArgs) -> Self {
        Self {
            option_a: InvestmentOption::new(args.option_a_name, args.option_a_return, args.option_a_risk),
            option_b: InvestmentOption::new(args.option_b_name, args.option_b_return, args.option_b_risk),
            investment_amount: args.investment_amount,
            time_horizon: args.time_horizon,
        }
    }
}

pub struct CompareInvestmentOptionsTool {
    rules: ComparisonRules,
}

impl CompareInvestmentOptionsTool {
    pub fn new(rules: ComparisonRules) -> Self {
        Self { rules }
    }
}

impl Tool for CompareInvestmentOptionsTool {
    fn name(&self) -> &'static str {
        "compare_investment_options"
    }

    fn description(&self) -> &'static str {
        "Compare two investment options side by side"
    }

    fn input_schema(&self) -> Value {
        let risk = json!({"type": "string", "enum": ["low", "medium", "high"]});
        json!({
            "type": "object",
            "properties": {
                "option_a_name": {"type": "string"},
                "option_a_return": {"type": "number", "description": "Expected annual return %"},
                "option_a_risk": risk.clone(),
                "option_b_name": {"type": "string"},
                "option_b_return": {"type": "number", "description": "Expected annual return %"},
                "option_b_risk": risk,
                "investment_amount": {"type": "number", "minimum": 0},
                "time_horizon": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_HORIZON_YEARS,
                    "description": "Years"
                }
            },
            "required": [
                "option_a_name", "option_a_return", "option_a_risk",
                "option_b_name", "option_b_return", "option_b_risk",
                "investment_amount", "time_horizon"
            ]
        })
    }

    fn call(&self, arguments: &Value) -> Result<Value, ToolError> {
        let args: CompareArgs = parse_arguments(self.name(), arguments)?;
        let result = self.rules.compare(&args.into())?;
        Ok(serde_json::to_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{create_default_registry, ToolCall};
    use super::*;

    #[test]
    fn test_allocation_tool() {
        let registry = create_default_registry();
        let output = registry.invoke(&ToolCall::new(
            "calculate_portfolio_allocation",
            json!({"age": 32, "risk_tolerance": "Aggressive", "total_amount": 50000.0}),
        ));
        assert!(output.success, "{:?}", output.error);
        assert_eq!(output.data["stocks"]["percentage"], 93);
        assert_eq!(output.data["risk_tolerance"], "aggressive");
    }

    #[test]
    fn test_allocation_tool_rejects_unknown_risk() {
        let registry = create_default_registry();
        let output = registry.invoke(&ToolCall::new(
            "calculate_portfolio_allocation",
            json!({"age": 32, "risk_tolerance": "yolo", "total_amount": 50000.0}),
        ));
        assert!(!output.success);
        assert!(output.error.unwrap().contains("unknown risk_tolerance 'yolo'"));
    }

    #[test]
    fn test_compound_tool_schedule_flag() {
        let tool = CompoundInterestTool;
        let with = tool
            .call(&json!({"principal": 10000, "annual_rate": 8, "years": 20, "monthly_contribution": 500}))
            .unwrap();
        assert_eq!(with["yearly"].as_array().unwrap().len(), 20);
        assert_eq!(with["total_contributed"], 130000.0);

        assert_eq!(tool.input_schema()["properties"]["years"]["maximum"], MAX_HORIZON_YEARS);
        let err = tool
            .call(&json!({"principal": 1, "annual_rate": 1, "years": 400_000_000}))
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::Validation(crate::ValidationError::AboveMaximum { field: "years", .. })
        ));

        let without = tool
            .call(&json!({"principal": 10000, "annual_rate": 8, "years": 20, "include_schedule": false}))
            .unwrap();
        assert!(without.get("yearly").is_none());
    }

    #[test]
    fn test_stock_tool() {
        let tool = StockMetricsTool::new(StockThresholds::default());
        let data = tool
            .call(&json!({
                "stock_name": "TechCorp",
                "current_price": 125,
                "pe_ratio": 22,
                "dividend_yield": 2.5,
                "revenue_growth": 18,
                "debt_to_equity": 0.8
            }))
            .unwrap();
        assert_eq!(data["name"], "TechCorp");
        assert_eq!(data["recommendation"], "buy");
    }

    #[test]
    fn test_retirement_tool() {
        let tool = RetirementNeedsTool::new(RetirementAssumptions::default());
        let data = tool
            .call(&json!({
                "current_age": 35,
                "retirement_age": 65,
                "current_savings": 50000,
                "desired_annual_income": 80000,
                "expected_return": 7
            }))
            .unwrap();
        assert_eq!(data["years_to_retirement"], 30);
        assert_eq!(data["required_corpus"], 2000000.0);
    }

    #[test]
    fn test_compare_tool_flat_arguments() {
        let tool = CompareInvestmentOptionsTool::new(ComparisonRules::default());
        let data = tool
            .call(&json!({
                "option_a_name": "S&P 500 Index",
                "option_a_return": 10,
                "option_a_risk": "medium",
                "option_b_name": "Treasury Bonds",
                "option_b_return": 4.5,
                "option_b_risk": "low",
                "investment_amount": 25000,
                "time_horizon": 15
            }))
            .unwrap();
        assert_eq!(data["recommendation"]["preferred"], "S&P 500 Index");
        assert_eq!(data["recommendation"]["basis"], "higher_return");
        assert!(data["recommendation"]["caveat"].is_string());
        assert_eq!(
            tool.input_schema()["properties"]["time_horizon"]["maximum"],
            MAX_HORIZON_YEARS
        );
    }
}
