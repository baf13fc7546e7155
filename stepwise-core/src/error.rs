//! Structured errors
//!
//! Two layers. `MathError` is what the numeric primitives raise when a
//! caller hands them something outside their domain. `StatsError` is the
//! structured form that crosses the plugin and CLI boundaries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
    pub const OVERFLOW: &str = "OVERFLOW";
    pub const ARG_MISSING: &str = "ARG_MISSING";
    pub const ARG_TYPE: &str = "ARG_TYPE";
    pub const UNKNOWN_CALCULATOR: &str = "UNKNOWN_CALCULATOR";
    pub const SERIALIZATION: &str = "SERIALIZATION";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Error raised by low-level numeric primitives
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Insufficient data: need at least {needed} values, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Overflow: result too large")]
    Overflow,
}

impl MathError {
    pub fn domain(details: impl Into<String>) -> Self {
        MathError::Domain(details.into())
    }
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Calculation produced a degraded result
    Warning,
    /// Calculation failed
    Error,
    /// Request cannot be processed at all
    Fatal,
}

/// Structured error for calculator callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Severity level
    pub severity: Severity,
}

impl StatsError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    // ========== Common Error Constructors ==========

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
            .with_suggestion("Send one JSON object per line")
    }

    pub fn domain_error(details: impl Into<String>) -> Self {
        Self::new(codes::DOMAIN_ERROR, format!("Domain error: {}", details.into()))
    }

    pub fn insufficient_data(needed: usize, got: usize) -> Self {
        Self::new(
            codes::INSUFFICIENT_DATA,
            format!("Need at least {} numeric values, got {}", needed, got),
        )
        .with_suggestion("Remove blank or non-numeric entries and add more observations")
    }

    pub fn arg_missing(calculator: &str, arg: &str) -> Self {
        Self::new(
            codes::ARG_MISSING,
            format!("{}: missing argument '{}'", calculator, arg),
        )
        .with_suggestion(format!("Use help '{}' for usage", calculator))
    }

    pub fn arg_type(calculator: &str, arg: &str, expected: &str, got: &str) -> Self {
        Self::new(
            codes::ARG_TYPE,
            format!("{}: argument '{}': expected {}, got {}", calculator, arg, expected, got),
        )
    }

    pub fn unknown_calculator(name: &str) -> Self {
        Self::new(codes::UNKNOWN_CALCULATOR, format!("Unknown calculator: {}", name))
            .with_suggestion("Use the 'list' command to see available calculators")
    }

    pub fn serialization(details: impl Into<String>) -> Self {
        Self::new(codes::SERIALIZATION, format!("Serialization error: {}", details.into()))
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }
}

impl std::fmt::Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for StatsError {}

impl From<MathError> for StatsError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::Domain(s) => Self::domain_error(s),
            MathError::InsufficientData { needed, got } => Self::insufficient_data(needed, got),
            MathError::Overflow => Self::new(codes::OVERFLOW, "Numeric overflow")
                .with_suggestion("Keep factorial arguments at or below 170"),
        }
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_error_converts_with_code() {
        let err: StatsError = MathError::InsufficientData { needed: 2, got: 1 }.into();
        assert_eq!(err.code, codes::INSUFFICIENT_DATA);
        assert!(err.message.contains("at least 2"));
    }

    #[test]
    fn test_display_includes_suggestion() {
        let err = StatsError::unknown_calculator("binomail");
        let text = err.to_string();
        assert!(text.starts_with("[UNKNOWN_CALCULATOR]"));
        assert!(text.contains("suggestion"));
    }
}
