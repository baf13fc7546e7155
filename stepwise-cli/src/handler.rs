//! JSON-lines request handling
//!
//! A request names a calculator with its arguments, or a command:
//!
//! ```text
//! {"id": 1, "calculator": "binomial", "args": {"n": 10, "k": 3, "p": 0.5}}
//! {"id": 2, "calculator": "descriptive", "args": {"data": [1, 2, 3]}, "format": "markdown"}
//! {"id": 3, "command": "list", "category": "hypothesis"}
//! {"id": 4, "command": "help", "name": "poisson"}
//! ```
//!
//! Every line gets exactly one response line: `{"id", "result"}` or
//! `{"id", "error"}`.

use crate::config::{Config, OutputFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use stepwise_core::export::ExportDocument;
use stepwise_core::StatsError;
use stepwise_plugin::{CalcContext, CalculatorRegistry, Report};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<JsonValue>,
    #[serde(default)]
    calculator: Option<String>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    args: JsonValue,
    #[serde(default)]
    format: Option<String>,
}

#[derive(Debug, Serialize)]
struct Response {
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<StatsError>,
}

impl Response {
    fn from_result(id: Option<JsonValue>, result: Result<JsonValue, StatsError>) -> Self {
        match result {
            Ok(value) => Self { id, result: Some(value), error: None },
            Err(error) => Self { id, result: None, error: Some(error) },
        }
    }
}

/// Everything a request needs to run
pub struct Handler {
    registry: CalculatorRegistry,
    ctx: CalcContext,
    format: OutputFormat,
}

impl Handler {
    pub fn new(registry: CalculatorRegistry, config: &Config) -> Self {
        Self {
            registry,
            ctx: CalcContext::default().with_default_alpha(config.alpha),
            format: config.format,
        }
    }

    /// Process one input line into one output line
    pub fn handle_line(&self, line: &str) -> String {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                let id = request.id.clone();
                Response::from_result(id, self.dispatch(request))
            }
            Err(e) => {
                warn!(error = %e, "unparseable request");
                Response::from_result(None, Err(StatsError::parse_error(format!("invalid request: {}", e))))
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|e| {
            format!(
                r#"{{"id":null,"error":{{"code":"SERIALIZATION","message":"{}","severity":"error"}}}}"#,
                e.to_string().replace('"', "'")
            )
        })
    }

    fn dispatch(&self, request: Request) -> Result<JsonValue, StatsError> {
        match (request.calculator.as_deref(), request.command.as_deref()) {
            (Some(calculator), None) => {
                let format = match request.format.as_deref() {
                    Some(raw) => raw.parse::<OutputFormat>().map_err(|msg| {
                        StatsError::parse_error(msg).with_suggestion("Use 'json', 'plain' or 'markdown'")
                    })?,
                    None => self.format,
                };
                let report = self.registry.call(calculator, request.args, &self.ctx)?;
                render(calculator, &report, format)
            }
            (None, Some(command)) => self.command(command, request.name.as_deref(), request.category.as_deref()),
            (Some(_), Some(_)) => Err(StatsError::parse_error("a request has either 'calculator' or 'command', not both")),
            (None, None) => Err(StatsError::parse_error("a request needs a 'calculator' or a 'command'")),
        }
    }

    fn command(&self, command: &str, name: Option<&str>, category: Option<&str>) -> Result<JsonValue, StatsError> {
        debug!(command, "command");
        match command {
            "list" => Ok(self.registry.list(category)),
            "help" => self.registry.help(name),
            other => Err(StatsError::parse_error(format!("unknown command '{}'", other))
                .with_suggestion("Commands: list, help")),
        }
    }
}

fn render(calculator: &str, report: &Report, format: OutputFormat) -> Result<JsonValue, StatsError> {
    match format {
        OutputFormat::Json => serde_json::to_value(report).map_err(StatsError::from),
        OutputFormat::Text(export) => {
            let doc = ExportDocument::from_outcome(Some(calculator), report);
            Ok(JsonValue::String(doc.render(export)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stepwise_stats::load_stats_library;

    fn handler() -> Handler {
        Handler::new(load_stats_library(CalculatorRegistry::new()), &Config::default())
    }

    fn respond(line: &str) -> JsonValue {
        serde_json::from_str(&handler().handle_line(line)).unwrap()
    }

    #[test]
    fn test_calculator_request() {
        let response = respond(r#"{"id": 1, "calculator": "binomial", "args": {"n": 4, "k": 2, "p": 0.5}}"#);
        assert_eq!(response["id"], json!(1));
        assert_eq!(response["result"]["status"], json!("ok"));
        assert_eq!(response["result"]["value"]["probability"], json!(0.375));
    }

    #[test]
    fn test_markdown_format() {
        let response = respond(
            r#"{"id": "a", "calculator": "combinations", "args": {"n": 5, "r": 2}, "format": "markdown"}"#,
        );
        let text = response["result"].as_str().unwrap();
        assert!(text.starts_with("# combinations"));
        assert!(text.contains("**Final answer:** 10"));
    }

    #[test]
    fn test_invalid_outcome_is_a_result() {
        let response = respond(r#"{"id": 2, "calculator": "poisson", "args": {"lambda": -1, "k": 2}}"#);
        assert_eq!(response["result"]["status"], json!("invalid"));
        assert!(response.get("error").is_none());
    }

    #[test]
    fn test_error_response() {
        let response = respond(r#"{"id": 3, "calculator": "nope", "args": {}}"#);
        assert_eq!(response["id"], json!(3));
        assert_eq!(response["error"]["code"], json!("UNKNOWN_CALCULATOR"));
    }

    #[test]
    fn test_unparseable_line() {
        let response = respond("not json");
        assert_eq!(response["id"], JsonValue::Null);
        assert_eq!(response["error"]["code"], json!("PARSE_ERROR"));
    }

    #[test]
    fn test_list_and_help_commands() {
        let list = respond(r#"{"id": 4, "command": "list", "category": "regression"}"#);
        assert_eq!(list["result"].as_array().unwrap().len(), 2);

        let help = respond(r#"{"id": 5, "command": "help", "name": "t_test_paired"}"#);
        assert_eq!(help["result"]["name"], json!("t_test_paired"));
    }

    #[test]
    fn test_configured_alpha_reaches_calculators() {
        let config = Config {
            alpha: 0.01,
            ..Config::default()
        };
        let handler = Handler::new(load_stats_library(CalculatorRegistry::new()), &config);
        let line = r#"{"id": 6, "calculator": "t_test_one_sample", "args": {"data": [1, 2, 3, 4], "mu0": 2}}"#;
        let response: JsonValue = serde_json::from_str(&handler.handle_line(line)).unwrap();
        assert_eq!(response["result"]["value"]["alpha"], json!(0.01));
    }
}
