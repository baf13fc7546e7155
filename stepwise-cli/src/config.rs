//! Runtime configuration from the environment

use std::env;
use std::str::FromStr;
use stepwise_core::export::ExportFormat;
use tracing::warn;

pub const DEFAULT_ALPHA: f64 = 0.05;
pub const DEFAULT_LOG: &str = "info";

/// How reports are written back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text(ExportFormat),
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("json") {
            return Ok(OutputFormat::Json);
        }
        ExportFormat::from_str(s)
            .map(OutputFormat::Text)
            .map_err(|e| e.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub alpha: f64,
    pub format: OutputFormat,
    /// `tracing_subscriber::EnvFilter` directives
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            format: OutputFormat::Json,
            log: DEFAULT_LOG.to_string(),
        }
    }
}

impl Config {
    /// Read `STEPWISE_ALPHA`, `STEPWISE_FORMAT` and `STEPWISE_LOG`
    /// (falling back to `RUST_LOG`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(raw) = lookup("STEPWISE_ALPHA") {
            match raw.trim().parse::<f64>() {
                Ok(alpha) if alpha > 0.0 && alpha < 1.0 => config.alpha = alpha,
                _ => warn!(value = %raw, "STEPWISE_ALPHA must be a number between 0 and 1, using {}", DEFAULT_ALPHA),
            }
        }

        if let Some(raw) = lookup("STEPWISE_FORMAT") {
            match raw.parse::<OutputFormat>() {
                Ok(format) => config.format = format,
                Err(e) => warn!(value = %raw, "{}, using json", e),
            }
        }

        config.log = log_directives(&lookup);
        config
    }
}

/// Filter directives, readable before the subscriber is installed
pub fn log_directives<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("STEPWISE_LOG")
        .or_else(|| lookup("RUST_LOG"))
        .filter(|log| !log.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG.to_string())
}

pub fn log_directives_from_env() -> String {
    log_directives(&|key: &str| env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_reads_values() {
        let config = Config::from_lookup(lookup(&[
            ("STEPWISE_ALPHA", "0.01"),
            ("STEPWISE_FORMAT", "markdown"),
            ("STEPWISE_LOG", "debug"),
        ]));
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.format, OutputFormat::Text(ExportFormat::Markdown));
        assert_eq!(config.log, "debug");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[("STEPWISE_ALPHA", "1.5"), ("STEPWISE_FORMAT", "html")]));
        assert_eq!(config.alpha, DEFAULT_ALPHA);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_rust_log_fallback() {
        let config = Config::from_lookup(lookup(&[("RUST_LOG", "stepwise_stats=trace")]));
        assert_eq!(config.log, "stepwise_stats=trace");
    }
}
