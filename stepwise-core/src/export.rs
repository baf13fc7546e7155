//! Step-to-text export
//!
//! Turns a step log into a sectioned "exam answer" and renders it as plain
//! text or markdown.

use crate::error::StatsError;
use crate::outcome::Outcome;
use crate::step::StepLog;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output flavour for exported answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Plain,
    Markdown,
}

impl FromStr for ExportFormat {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(ExportFormat::Plain),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            other => Err(StatsError::parse_error(format!("unknown export format '{}'", other))
                .with_suggestion("Use 'plain' or 'markdown'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSection {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub sections: Vec<ExportSection>,
    pub final_answer: String,
}

impl ExportDocument {
    /// One section per step, titled with the step's ordinal
    pub fn from_steps(title: Option<&str>, steps: &StepLog, final_answer: impl Into<String>) -> Self {
        let sections = steps
            .iter()
            .map(|step| ExportSection {
                title: step.numbered_title(),
                lines: step.lines(),
            })
            .collect();
        Self {
            title: title.map(str::to_string),
            sections,
            final_answer: final_answer.into(),
        }
    }

    /// Build from an outcome. The final answer is the result of the last
    /// step that has one, or the invalid reason.
    pub fn from_outcome<T>(title: Option<&str>, outcome: &Outcome<T>) -> Self {
        let final_answer = match outcome.reason() {
            Some(reason) => format!("Cannot compute: {}", reason),
            None => outcome
                .steps()
                .iter()
                .rev()
                .find_map(|s| s.result.clone())
                .unwrap_or_default(),
        };
        Self::from_steps(title, outcome.steps(), final_answer)
    }

    pub fn render(&self, format: ExportFormat) -> String {
        match format {
            ExportFormat::Plain => self.to_plain(),
            ExportFormat::Markdown => self.to_markdown(),
        }
    }

    pub fn to_plain(&self) -> String {
        let mut output = String::new();
        if let Some(ref title) = self.title {
            output.push_str(title);
            output.push('\n');
            output.push_str(&"=".repeat(title.chars().count()));
            output.push_str("\n\n");
        }
        for section in &self.sections {
            output.push_str(&section.title);
            output.push('\n');
            for line in &section.lines {
                output.push_str("  ");
                output.push_str(line);
                output.push('\n');
            }
            output.push('\n');
        }
        output.push_str(&format!("Final answer: {}\n", self.final_answer));
        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        if let Some(ref title) = self.title {
            output.push_str(&format!("# {}\n\n", title));
        }
        for section in &self.sections {
            output.push_str(&format!("### {}\n\n", section.title));
            for line in &section.lines {
                output.push_str(&format!("- {}\n", line));
            }
            output.push('\n');
        }
        output.push_str(&format!("**Final answer:** {}\n", self.final_answer));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Inputs;
    use crate::step::CalculationStep;

    fn sample_log() -> StepLog {
        let mut log = StepLog::new();
        log.push(CalculationStep::new("formula", "State the formula").with_formula("x̄ = Σx / n"));
        log.push(CalculationStep::new("result", "Result").with_result("x̄ = 50"));
        log
    }

    #[test]
    fn test_markdown_layout() {
        let doc = ExportDocument::from_steps(Some("Mean"), &sample_log(), "50");
        let md = doc.to_markdown();
        assert!(md.starts_with("# Mean\n"));
        assert!(md.contains("### 1. State the formula"));
        assert!(md.contains("- Formula: x̄ = Σx / n"));
        assert!(md.ends_with("**Final answer:** 50\n"));
    }

    #[test]
    fn test_final_answer_from_outcome() {
        let outcome = Outcome::ok(50.0, sample_log(), "x̄", Inputs::new());
        let doc = ExportDocument::from_outcome(None, &outcome);
        assert_eq!(doc.final_answer, "x̄ = 50");
        assert!(doc.to_plain().contains("2. Result"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert!("html".parse::<ExportFormat>().is_err());
    }
}
