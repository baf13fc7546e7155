//! Hypothesis tests: t-tests and chi-square tests
//!
//! Every test ends with a `critical-value` step followed by a `decision`
//! step. Critical values come from a `CriticalValues` oracle; a missing
//! entry leaves the decision undetermined unless the normal approximation
//! applies.

pub mod chi_square;
pub mod independent;
pub mod t_test;

pub use chi_square::{chi_square_goodness_of_fit, chi_square_independence, ChiSquareResult};
pub use independent::{
    independent_t_test, independent_t_test_with_steps, pooled_standard_error, welch_standard_error, GroupStats,
    IndependentTTestResult, TTestMethod,
};
pub use t_test::{one_sample_t_test_with_steps, paired_t_test_with_steps, TTestResult};

use crate::distributions::normal_upper_tail;
use serde::{Deserialize, Serialize};
use stepwise_core::prelude::*;
use stepwise_tables::CriticalValues;
use tracing::debug;

pub(crate) const DECIMALS: usize = 4;

/// Smallest df for which a missing t entry falls back to the normal distribution
pub const NORMAL_FALLBACK_MIN_DF: f64 = 30.0;

/// Outcome of comparing a statistic with its critical value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Reject,
    FailToReject,
    /// No critical value was available
    #[default]
    Undetermined,
}

impl Decision {
    pub fn is_reject(self) -> bool {
        self == Decision::Reject
    }

    pub fn describe(self) -> &'static str {
        match self {
            Decision::Reject => "Reject H₀",
            Decision::FailToReject => "Fail to reject H₀",
            Decision::Undetermined => "Cannot determine significance",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tails {
    One,
    #[default]
    Two,
}

impl Tails {
    pub fn from_two_tailed(two_tailed: bool) -> Self {
        if two_tailed {
            Tails::Two
        } else {
            Tails::One
        }
    }

    /// Upper-tail area looked up in the table
    pub fn table_alpha(self, alpha: f64) -> f64 {
        match self {
            Tails::One => alpha,
            Tails::Two => alpha / 2.0,
        }
    }

    fn count(self) -> f64 {
        match self {
            Tails::One => 1.0,
            Tails::Two => 2.0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tails::One => "one-tailed",
            Tails::Two => "two-tailed",
        }
    }
}

/// How a t statistic was judged
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TJudgement {
    pub critical_value: Option<f64>,
    /// Normal-approximation p-value, when the table had no entry
    pub p_value: Option<f64>,
    pub table_df: u32,
    pub decision: Decision,
}

pub(crate) fn judge_t(t: f64, df: f64, alpha: f64, tails: Tails, tables: &dyn CriticalValues) -> TJudgement {
    let table_df = tables.find_closest_df(df);
    match tables.t_value(df, tails.table_alpha(alpha)) {
        Some(c) => TJudgement {
            critical_value: Some(c),
            p_value: None,
            table_df,
            decision: if t.abs() > c.abs() {
                Decision::Reject
            } else {
                Decision::FailToReject
            },
        },
        None if df >= NORMAL_FALLBACK_MIN_DF => {
            let p = (tails.count() * normal_upper_tail(t.abs())).min(1.0);
            debug!(df, p, "no t table entry, using normal approximation");
            TJudgement {
                critical_value: None,
                p_value: Some(p),
                table_df,
                decision: if p < alpha {
                    Decision::Reject
                } else {
                    Decision::FailToReject
                },
            }
        }
        None => {
            debug!(df, alpha, "no t table entry, significance undetermined");
            TJudgement {
                critical_value: None,
                p_value: None,
                table_df,
                decision: Decision::Undetermined,
            }
        }
    }
}

pub(crate) fn t_critical_step(judgement: &TJudgement, df: f64, alpha: f64, tails: Tails) -> CalculationStep {
    let table_alpha = tails.table_alpha(alpha);
    let step = CalculationStep::new("critical-value", "Critical value").with_description(format!(
        "{} test at α = {}, df = {}",
        tails.label(),
        format_number(alpha, DECIMALS),
        format_number(df, DECIMALS)
    ));
    match (judgement.critical_value, judgement.p_value) {
        (Some(c), _) => {
            let mut step = step
                .with_calculation(format!(
                    "t_{{{}, {}}} = {}",
                    format_number(table_alpha, DECIMALS),
                    judgement.table_df,
                    format_number(c, 3)
                ))
                .with_result(format_number(c, 3));
            if (judgement.table_df as f64 - df).abs() > 1e-9 {
                step = step.with_note(format!(
                    "Table row df = {} used for df = {}",
                    judgement.table_df,
                    format_number(df, DECIMALS)
                ));
            }
            step
        }
        (None, Some(p)) => step
            .with_calculation(format!(
                "No table entry; normal approximation: p = {} × P(Z > |t|) = {}",
                format_number(tails.count(), 0),
                format_probability(p, DECIMALS)
            ))
            .with_result(format!("p = {}", format_probability(p, DECIMALS))),
        (None, None) => step
            .with_result("Not available")
            .with_note("No table entry for these degrees of freedom and α"),
    }
}

pub(crate) fn t_decision_step(t: f64, judgement: &TJudgement, alpha: f64) -> CalculationStep {
    let decision = judgement.decision;
    let comparison = match (judgement.critical_value, judgement.p_value) {
        (Some(c), _) => {
            let op = if decision.is_reject() { ">" } else { "≤" };
            format!("|t| = {} {} {}", format_number(t.abs(), DECIMALS), op, format_number(c.abs(), 3))
        }
        (None, Some(p)) => {
            let op = if decision.is_reject() { "<" } else { "≥" };
            format!("p = {} {} α = {}", format_probability(p, DECIMALS), op, format_number(alpha, DECIMALS))
        }
        (None, None) => "No critical value to compare against".to_string(),
    };
    decision_step(decision, comparison)
}

pub(crate) fn decision_step(decision: Decision, comparison: String) -> CalculationStep {
    let note = match decision {
        Decision::Reject => "The result is statistically significant",
        Decision::FailToReject => "The result is not statistically significant",
        Decision::Undetermined => "Significance cannot be determined from the available tables",
    };
    CalculationStep::new("decision", "Decision")
        .with_calculation(comparison)
        .with_result(decision.describe())
        .with_note(note)
}

/// Soft failure for tests and regression
pub(crate) fn error_step(reason: &str) -> CalculationStep {
    CalculationStep::new("error", "Cannot compute").with_description(reason.to_string())
}

pub(crate) fn alpha_problem(alpha: f64) -> Option<String> {
    if alpha > 0.0 && alpha < 1.0 {
        None
    } else {
        Some(format!("Significance level α must be between 0 and 1 (got {})", format_number(alpha, DECIMALS)))
    }
}
