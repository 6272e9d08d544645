//! AWS Lambda handler exposing the financial tools over a Function URL
//!
//! - `GET` returns the tool definitions
//! - `POST` runs a single tool call (`{"name": ..., "arguments": {...}}`) or an
//!   array of them, returning the matching `ToolOutput`(s)
//! - `OPTIONS` answers the CORS preflight
//!
//! Set `FINANCIAL_TOOLS_ASSUMPTIONS` to a CSV path to override the default
//! assumptions.

use std::path::Path;

use aws_lambda_events::event::lambda_function_urls::{
    LambdaFunctionUrlRequest, LambdaFunctionUrlResponse,
};
use aws_lambda_events::http::{HeaderMap, HeaderValue};
use financial_tools::{Assumptions, ScenarioRunner, ToolCall};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{debug, info};
use serde_json::{json, Value};

const ASSUMPTIONS_ENV: &str = "FINANCIAL_TOOLS_ASSUMPTIONS";

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert("access-control-allow-methods", HeaderValue::from_static("GET, POST, OPTIONS"));
    headers.insert("access-control-allow-headers", HeaderValue::from_static("Content-Type"));
    headers
}

fn response(status_code: i64, body: Option<String>) -> LambdaFunctionUrlResponse {
    let mut headers = cors_headers();
    if body.is_some() {
        headers.insert("content-type", HeaderValue::from_static("application/json"));
    }
    LambdaFunctionUrlResponse {
        status_code,
        headers,
        body,
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

fn json_response(status_code: i64, body: &Value) -> LambdaFunctionUrlResponse {
    response(status_code, Some(body.to_string()))
}

fn error_response(status_code: i64, message: &str) -> LambdaFunctionUrlResponse {
    json_response(status_code, &json!({ "error": message }))
}

/// Run the tool call(s) in a POST body
fn run_body(runner: &ScenarioRunner, body: &str) -> Result<Value, serde_json::Error> {
    let payload: Value = serde_json::from_str(body)?;
    if payload.is_array() {
        let calls: Vec<ToolCall> = serde_json::from_value(payload)?;
        serde_json::to_value(runner.run_calls(&calls))
    } else {
        let call: ToolCall = serde_json::from_value(payload)?;
        serde_json::to_value(runner.run(&call))
    }
}

fn respond(runner: &ScenarioRunner, method: &str, body: Option<&str>) -> LambdaFunctionUrlResponse {
    match method {
        "OPTIONS" => response(200, None),
        "GET" => match serde_json::to_value(runner.registry().definitions()) {
            Ok(definitions) => json_response(200, &json!({ "tools": definitions })),
            Err(e) => error_response(500, &e.to_string()),
        },
        "POST" => {
            let body = body.unwrap_or_default();
            match run_body(runner, body) {
                Ok(outputs) => json_response(200, &outputs),
                Err(e) => error_response(400, &format!("Invalid JSON: {}", e)),
            }
        }
        other => error_response(405, &format!("method {} not allowed", other)),
    }
}

/// Lambda handler function
async fn handler(
    runner: &ScenarioRunner,
    event: LambdaEvent<LambdaFunctionUrlRequest>,
) -> Result<LambdaFunctionUrlResponse, Error> {
    let request = event.payload;
    let method = request
        .request_context
        .http
        .method
        .as_deref()
        .unwrap_or("GET")
        .to_ascii_uppercase();
    debug!("{} request {}", method, event.context.request_id);

    if request.is_base64_encoded {
        return Ok(error_response(400, "base64-encoded bodies are not supported"));
    }

    Ok(respond(runner, &method, request.body.as_deref()))
}

fn load_assumptions() -> Result<Assumptions, Error> {
    match std::env::var(ASSUMPTIONS_ENV) {
        Ok(path) => {
            info!("loading assumptions from {}", path);
            Ok(Assumptions::from_csv_path(Path::new(&path))?)
        }
        Err(_) => Ok(Assumptions::default_advisory()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let runner = ScenarioRunner::with_assumptions(load_assumptions()?);
    let runner = &runner;
    run(service_fn(move |event| async move { handler(runner, event).await })).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(response: &LambdaFunctionUrlResponse) -> Value {
        serde_json::from_str(response.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn test_preflight() {
        let runner = ScenarioRunner::new();
        let resp = respond(&runner, "OPTIONS", None);
        assert_eq!(resp.status_code, 200);
        assert!(resp.body.is_none());
        assert_eq!(resp.headers["access-control-allow-origin"], "*");
    }

    #[test]
    fn test_get_lists_tools() {
        let runner = ScenarioRunner::new();
        let resp = respond(&runner, "GET", None);
        assert_eq!(resp.status_code, 200);
        assert_eq!(body_json(&resp)["tools"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_post_single_call() {
        let runner = ScenarioRunner::new();
        let body = r#"{"name": "calculate_portfolio_allocation",
                       "arguments": {"age": 30, "risk_tolerance": "moderate", "total_amount": 10000}}"#;
        let resp = respond(&runner, "POST", Some(body));
        assert_eq!(resp.status_code, 200);
        let output = body_json(&resp);
        assert_eq!(output["success"], true);
        assert_eq!(output["data"]["stocks"]["percentage"], 80);
    }

    #[test]
    fn test_post_batch_keeps_failures_inline() {
        let runner = ScenarioRunner::new();
        let body = r#"[
            {"name": "calculate_compound_interest", "arguments": {"principal": 1000, "annual_rate": 0, "years": 2}},
            {"name": "calculate_compound_interest", "arguments": {"principal": -1, "annual_rate": 5, "years": 2}}
        ]"#;
        let resp = respond(&runner, "POST", Some(body));
        assert_eq!(resp.status_code, 200);
        let outputs = body_json(&resp);
        assert_eq!(outputs[0]["success"], true);
        assert_eq!(outputs[0]["data"]["final_balance"], 1000.0);
        assert_eq!(outputs[1]["success"], false);
    }

    #[test]
    fn test_bad_json_is_400() {
        let runner = ScenarioRunner::new();
        let resp = respond(&runner, "POST", Some("{not json"));
        assert_eq!(resp.status_code, 400);
        assert!(body_json(&resp)["error"].as_str().unwrap().starts_with("Invalid JSON"));

        let resp = respond(&runner, "POST", None);
        assert_eq!(resp.status_code, 400);
    }

    #[test]
    fn test_other_methods_rejected() {
        let runner = ScenarioRunner::new();
        assert_eq!(respond(&runner, "DELETE", None).status_code, 405);
    }
}
