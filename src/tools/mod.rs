//! Named-tool surface over the calculators
//!
//! An agent runtime calls tools by name with keyword arguments (a JSON
//! object). Each tool deserializes its arguments into the calculator's input
//! type, runs it and returns the result as JSON.

mod financial;

pub use financial::{
    CompareInvestmentOptionsTool, CompoundInterestTool, PortfolioAllocationTool,
    RetirementNeedsTool, StockMetricsTool,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::assumptions::Assumptions;
use crate::error::ValidationError;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A request to run one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(alias = "tool", alias = "tool_name")]
    pub name: String,
    #[serde(default = "empty_arguments", alias = "input", alias = "parameters")]
    pub arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(Default::default())
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool: String,
    pub success: bool,
    pub data: Value,
    pub error: Option<String>,
}

impl ToolOutput {
    fn ok(tool: &str, data: Value) -> Self {
        Self {
            tool: tool.to_string(),
            success: true,
            data,
            error: None,
        }
    }

    fn failure(tool: &str, error: &ToolError) -> Self {
        Self {
            tool: tool.to_string(),
            success: false,
            data: Value::Null,
            error: Some(error.to_string()),
        }
    }
}

/// Name, description and JSON schema advertised to the agent runtime
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// A single deterministic, side-effect-free tool
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;
    fn call(&self, arguments: &Value) -> Result<Value, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

/// Deserialize keyword arguments into a typed input
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    tool: &'static str,
    arguments: &Value,
) -> Result<T, ToolError> {
    serde_json::from_value(arguments.clone())
        .map_err(|source| ToolError::InvalidArguments { tool, source })
}

/// Tool registry for looking up and invoking tools
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Registry with the five financial tools configured from `assumptions`
    pub fn with_assumptions(assumptions: &Assumptions) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PortfolioAllocationTool::new(assumptions.allocation)));
        registry.register(Arc::new(CompoundInterestTool));
        registry.register(Arc::new(StockMetricsTool::new(assumptions.stock)));
        registry.register(Arc::new(RetirementNeedsTool::new(assumptions.retirement)));
        registry.register(Arc::new(CompareInvestmentOptionsTool::new(assumptions.comparison)));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tool names in sorted order
    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Run a call, propagating errors
    pub fn call(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;
        tool.call(&call.arguments)
    }

    /// Run a call and fold any error into the output
    pub fn invoke(&self, call: &ToolCall) -> ToolOutput {
        match self.call(call) {
            Ok(data) => ToolOutput::ok(&call.name, data),
            Err(e) => {
                warn!("tool call {} failed: {}", call.name, e);
                ToolOutput::failure(&call.name, &e)
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry with the five financial tools and default assumptions
pub fn create_default_registry() -> ToolRegistry {
    ToolRegistry::with_assumptions(&Assumptions::default_advisory())
}
