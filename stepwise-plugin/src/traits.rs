//! Plugin traits

use crate::{Args, CalcContext};
use serde::Serialize;
use serde_json::Value as JsonValue;
use stepwise_core::{Outcome, StatsError};

/// Outcome with its value serialized, as returned by every calculator plugin
pub type Report = Outcome<JsonValue>;

/// Metadata about a calculator argument
#[derive(Debug, Clone, Serialize)]
pub struct ArgMeta {
    pub name: &'static str,
    pub typ: &'static str,
    pub description: &'static str,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl ArgMeta {
    pub const fn required(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, optional: false, default: None }
    }

    pub const fn optional(name: &'static str, typ: &'static str, description: &'static str, default: &'static str) -> Self {
        Self { name, typ, description, optional: true, default: Some(default) }
    }
}

/// Metadata for a calculator plugin
#[derive(Debug, Clone, Serialize)]
pub struct CalculatorMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub args: &'static [ArgMeta],
    pub returns: &'static str,
    pub examples: &'static [&'static str],
    pub category: &'static str,
    pub related: &'static [&'static str],
}

/// Narrated calculator.
///
/// Invalid input comes back as `Outcome::Invalid` inside `Ok`; `Err` is
/// reserved for malformed arguments and for primitives that raise.
pub trait CalculatorPlugin: Send + Sync {
    fn meta(&self) -> CalculatorMeta;
    fn call(&self, args: &Args, ctx: &CalcContext) -> Result<Report, StatsError>;
}

/// Serialize a typed outcome into a plugin report
pub fn into_report<T: Serialize>(outcome: Outcome<T>) -> Result<Report, StatsError> {
    outcome.try_map_value(|v| serde_json::to_value(v).map_err(StatsError::from))
}
