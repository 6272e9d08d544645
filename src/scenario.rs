//! Scenario runner for batch calculations
//!
//! Holds the assumptions and tool registry once, then evaluates many tool
//! calls or growth scenarios in parallel.

use std::io::{Read, Write};

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::Assumptions;
use crate::calculators::{CompoundInterestInput, CompoundInterestResult};
use crate::error::ValidationError;
use crate::tools::{ToolCall, ToolOutput, ToolRegistry};

/// One row of a growth scenario file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionScenario {
    pub label: String,
    pub principal: f64,
    pub annual_rate: f64,
    pub years: i32,
    #[serde(default)]
    pub monthly_contribution: f64,
}

impl ProjectionScenario {
    fn input(&self) -> CompoundInterestInput {
        CompoundInterestInput {
            principal: self.principal,
            annual_rate: self.annual_rate,
            years: self.years,
            monthly_contribution: self.monthly_contribution,
        }
    }
}

/// Summary row written for each scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub label: String,
    pub final_balance: Option<f64>,
    pub total_contributed: Option<f64>,
    pub total_interest: Option<f64>,
    pub return_on_investment_pct: Option<f64>,
    pub error: Option<String>,
}

impl ProjectionSummary {
    fn from_outcome(label: &str, outcome: &Result<CompoundInterestResult, ValidationError>) -> Self {
        match outcome {
            Ok(result) => Self {
                label: label.to_string(),
                final_balance: Some(result.final_balance),
                total_contributed: Some(result.total_contributed),
                total_interest: Some(result.total_interest),
                return_on_investment_pct: result.return_on_investment_pct,
                error: None,
            },
            Err(e) => Self {
                label: label.to_string(),
                final_balance: None,
                total_contributed: None,
                total_interest: None,
                return_on_investment_pct: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Pre-configured runner for batch evaluation
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let outputs = runner.run_calls(&calls);
/// ```
pub struct ScenarioRunner {
    assumptions: Assumptions,
    registry: ToolRegistry,
}

impl ScenarioRunner {
    /// Runner with the default assumptions
    pub fn new() -> Self {
        Self::with_assumptions(Assumptions::default_advisory())
    }

    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            registry: ToolRegistry::with_assumptions(&assumptions),
            assumptions,
        }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one tool call
    pub fn run(&self, call: &ToolCall) -> ToolOutput {
        self.registry.invoke(call)
    }

    /// Run tool calls in parallel; outputs keep the input order
    pub fn run_calls(&self, calls: &[ToolCall]) -> Vec<ToolOutput> {
        let outputs: Vec<ToolOutput> = calls.par_iter().map(|call| self.registry.invoke(call)).collect();
        let failed = outputs.iter().filter(|o| !o.success).count();
        info!("ran {} tool calls ({} failed)", outputs.len(), failed);
        outputs
    }

    /// Project every scenario in parallel; outcomes keep the input order
    pub fn run_projections(
        &self,
        scenarios: &[ProjectionScenario],
        record_yearly: bool,
    ) -> Vec<Result<CompoundInterestResult, ValidationError>> {
        let outcomes: Vec<_> = scenarios
            .par_iter()
            .map(|scenario| scenario.input().project(record_yearly))
            .collect();
        info!("projected {} scenarios", outcomes.len());
        outcomes
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Load growth scenarios from CSV (`label,principal,annual_rate,years,monthly_contribution`)
pub fn load_projection_scenarios<R: Read>(reader: R) -> Result<Vec<ProjectionScenario>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut scenarios = Vec::new();

    for result in csv_reader.deserialize() {
        let scenario: ProjectionScenario = result?;
        scenarios.push(scenario);
    }

    Ok(scenarios)
}

/// Write one summary row per scenario
pub fn write_projection_summaries<W: Write>(
    writer: W,
    scenarios: &[ProjectionScenario],
    outcomes: &[Result<CompoundInterestResult, ValidationError>],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (scenario, outcome) in scenarios.iter().zip(outcomes) {
        csv_writer.serialize(ProjectionSummary::from_outcome(&scenario.label, outcome))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the year-end schedule of a projection
pub fn write_schedule<W: Write>(writer: W, result: &CompoundInterestResult) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for snapshot in result.schedule() {
        csv_writer.serialize(snapshot)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::project;
    use serde_json::json;

    const SCENARIOS: &str = "label,principal,annual_rate,years,monthly_contribution\n\
                             baseline,10000,8,20,500\n\
                             no growth,10000,0,5,0\n\
                             bad,1000,5,0,0\n";

    #[test]
    fn test_load_and_run_projections() {
        let scenarios = load_projection_scenarios(SCENARIOS.as_bytes()).unwrap();
        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[1].label, "no growth");

        let runner = ScenarioRunner::new();
        let outcomes = runner.run_projections(&scenarios, false);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            outcomes[0].as_ref().unwrap().final_balance,
            project(10_000.0, 8.0, 20, 500.0).unwrap().final_balance
        );
        assert_eq!(outcomes[1].as_ref().unwrap().final_balance, 10_000.0);
        assert!(outcomes[2].is_err());
    }

    #[test]
    fn test_write_summaries() {
        let scenarios = load_projection_scenarios(SCENARIOS.as_bytes()).unwrap();
        let outcomes = ScenarioRunner::new().run_projections(&scenarios, false);

        let mut buffer = Vec::new();
        write_projection_summaries(&mut buffer, &scenarios, &outcomes).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("label,final_balance,total_contributed"));
        assert!(lines[2].starts_with("no growth,10000.0,10000.0,0.0"));
        assert!(lines[3].contains("years must be greater than zero"));
    }

    #[test]
    fn test_write_schedule() {
        let result = project(1_000.0, 0.0, 3, 100.0).unwrap();
        let mut buffer = Vec::new();
        write_schedule(&mut buffer, &result).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "year,balance,total_contributed,interest_earned");
        assert_eq!(lines[1], "1,2200.0,2200.0,0.0");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_run_calls_preserves_order() {
        let runner = ScenarioRunner::new();
        let calls: Vec<ToolCall> = (1..=20)
            .map(|years| {
                ToolCall::new(
                    "calculate_compound_interest",
                    json!({"principal": 1000, "annual_rate": 5, "years": years, "include_schedule": false}),
                )
            })
            .chain(std::iter::once(ToolCall::new("nope", json!({}))))
            .collect();

        let outputs = runner.run_calls(&calls);
        assert_eq!(outputs.len(), 21);
        for (i, output) in outputs.iter().take(20).enumerate() {
            assert!(output.success);
            assert_eq!(output.data["years"], (i + 1) as u64);
        }
        assert!(!outputs[20].success);
    }
}
