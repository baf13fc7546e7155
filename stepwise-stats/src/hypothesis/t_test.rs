//! One-sample and paired t-tests
//!
//! Both are two-tailed. The paired test is a one-sample test on the
//! differences `after - before` against a mean of 0.

use super::{alpha_problem, error_step, judge_t, t_critical_step, t_decision_step, Decision, Tails, DECIMALS};
use crate::helpers::{mean, sample_variance};
use serde::{Deserialize, Serialize};
use stepwise_core::prelude::*;
use stepwise_tables::CriticalValues;

const FORMULA: &str = "t = \\frac{\\bar{x} - \\mu_0}{s / \\sqrt{n}}";
const PAIRED_FORMULA: &str = "t = \\frac{\\bar{d}}{s_d / \\sqrt{n}}";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    pub n: usize,
    /// Sample mean (mean difference for the paired test)
    pub mean: f64,
    pub std_dev: f64,
    pub standard_error: f64,
    pub hypothesized_mean: f64,
    pub t_statistic: f64,
    pub df: f64,
    pub alpha: f64,
    pub critical_value: Option<f64>,
    /// Only set when the normal approximation was used
    pub p_value: Option<f64>,
    pub decision: Decision,
}

fn fail(
    mut steps: StepLog,
    reason: String,
    formula: &str,
    inputs: Inputs,
) -> Outcome<TTestResult> {
    steps.push(error_step(&reason));
    Outcome::invalid(reason, steps, formula, inputs)
}

/// Sample statistics through the decision, shared by both tests
fn narrate_t(
    mut steps: StepLog,
    values: &[f64],
    mu0: f64,
    alpha: f64,
    tables: &dyn CriticalValues,
    symbols: (&str, &str),
    formula: &str,
    inputs: Inputs,
) -> Outcome<TTestResult> {
    let (bar, sd) = symbols;
    let n = values.len();
    let nf = n as f64;
    let df = nf - 1.0;
    let m = mean(values);
    let s = sample_variance(values).unwrap_or(0.0).sqrt();

    steps.push(
        CalculationStep::new("sample-stats", "Sample statistics")
            .with_calculation(format!(
                "n = {}\n{} = {}\n{} = {} (Bessel-corrected)\ndf = n - 1 = {}",
                n,
                bar,
                format_number(m, DECIMALS),
                sd,
                format_number(s, DECIMALS),
                format_number(df, 0)
            ))
            .with_result(format!("{} = {}, {} = {}", bar, format_number(m, DECIMALS), sd, format_number(s, DECIMALS))),
    );

    let se = s / nf.sqrt();
    steps.push(
        CalculationStep::new("standard-error", "Standard error")
            .with_formula(format!("SE = {}", tex::frac(sd, tex::sqrt("n"))))
            .with_calculation(format!(
                "{} / {} = {}",
                format_number(s, DECIMALS),
                tex::sqrt(n.to_string()),
                format_number(se, DECIMALS)
            ))
            .with_result(format_number(se, DECIMALS)),
    );

    if se == 0.0 {
        return fail(
            steps,
            "All values are identical, so the standard error is 0 and t is undefined".to_string(),
            formula,
            inputs,
        );
    }

    let t = (m - mu0) / se;
    steps.push(
        CalculationStep::new("t-statistic", "Test statistic")
            .with_formula(formula)
            .with_calculation(format!(
                "({} - {}) / {} = {}",
                format_number(m, DECIMALS),
                format_operand(mu0, DECIMALS),
                format_number(se, DECIMALS),
                format_number(t, DECIMALS)
            ))
            .with_result(format_number(t, DECIMALS)),
    );

    let judgement = judge_t(t, df, alpha, Tails::Two, tables);
    steps.push(t_critical_step(&judgement, df, alpha, Tails::Two));
    steps.push(t_decision_step(t, &judgement, alpha));

    let value = TTestResult {
        n,
        mean: m,
        std_dev: s,
        standard_error: se,
        hypothesized_mean: mu0,
        t_statistic: t,
        df,
        alpha,
        critical_value: judgement.critical_value,
        p_value: judgement.p_value,
        decision: judgement.decision,
    };
    Outcome::ok(value, steps, formula, inputs)
}

/// Two-tailed one-sample t-test of `data` against `mu0`
pub fn one_sample_t_test_with_steps(
    data: &[f64],
    mu0: f64,
    alpha: f64,
    tables: &dyn CriticalValues,
) -> Outcome<TTestResult> {
    let inputs = Inputs::new()
        .number("n", data.len() as f64)
        .number("mu0", mu0)
        .number("alpha", alpha);
    let mut steps = StepLog::new();

    steps.push(
        CalculationStep::new("hypotheses", "State the hypotheses")
            .with_calculation(format!(
                "H₀: μ = {}\nH₁: μ ≠ {}",
                format_number(mu0, DECIMALS),
                format_number(mu0, DECIMALS)
            ))
            .with_note(format!("Two-tailed test at α = {}", format_number(alpha, DECIMALS))),
    );

    if data.len() < 2 {
        return fail(
            steps,
            format!("A t-test needs at least 2 values (got {})", data.len()),
            FORMULA,
            inputs,
        );
    }
    if let Some(reason) = alpha_problem(alpha) {
        return fail(steps, reason, FORMULA, inputs);
    }

    narrate_t(steps, data, mu0, alpha, tables, ("x̄", "s"), FORMULA, inputs)
}

/// Two-tailed paired t-test on `after - before`
pub fn paired_t_test_with_steps(
    before: &[f64],
    after: &[f64],
    alpha: f64,
    tables: &dyn CriticalValues,
) -> Outcome<TTestResult> {
    let inputs = Inputs::new()
        .number("n_before", before.len() as f64)
        .number("n_after", after.len() as f64)
        .number("alpha", alpha);
    let mut steps = StepLog::new();

    steps.push(
        CalculationStep::new("hypotheses", "State the hypotheses")
            .with_calculation("H₀: μ_d = 0\nH₁: μ_d ≠ 0")
            .with_note(format!("Two-tailed test at α = {}", format_number(alpha, DECIMALS))),
    );

    if before.len() != after.len() {
        return fail(
            steps,
            format!(
                "Before and after must have the same number of values ({} vs {})",
                before.len(),
                after.len()
            ),
            PAIRED_FORMULA,
            inputs,
        );
    }
    if before.len() < 2 {
        return fail(
            steps,
            format!("A paired t-test needs at least 2 pairs (got {})", before.len()),
            PAIRED_FORMULA,
            inputs,
        );
    }
    if let Some(reason) = alpha_problem(alpha) {
        return fail(steps, reason, PAIRED_FORMULA, inputs);
    }

    let differences: Vec<f64> = before.iter().zip(after).map(|(b, a)| a - b).collect();
    let shown: Vec<String> = before
        .iter()
        .zip(after)
        .zip(&differences)
        .map(|((b, a), d)| {
            format!(
                "{} - {} = {}",
                format_number(*a, DECIMALS),
                format_operand(*b, DECIMALS),
                format_number(*d, DECIMALS)
            )
        })
        .collect();
    steps.push(
        CalculationStep::new("differences", "Differences")
            .with_formula("d_i = after_i - before_i")
            .with_calculation(shown.join("\n"))
            .with_result(format_list(&differences, DECIMALS)),
    );

    narrate_t(steps, &differences, 0.0, alpha, tables, ("d̄", "s_d"), PAIRED_FORMULA, inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_tables::{EmptyTables, StandardTables};

    #[test]
    fn test_one_sample_scenario() {
        let tables = StandardTables::new();
        let outcome = one_sample_t_test_with_steps(&[48.0, 52.0, 50.0, 49.0, 51.0], 50.0, 0.05, &tables);
        let value = outcome.value().unwrap();
        assert_eq!(value.df, 4.0);
        assert_eq!(value.mean, 50.0);
        assert!(value.t_statistic.abs() < 1e-12);
        assert_eq!(value.critical_value, Some(2.776));
        assert_eq!(value.decision, Decision::FailToReject);
        assert_eq!(
            outcome.steps().ids(),
            vec!["hypotheses", "sample-stats", "standard-error", "t-statistic", "critical-value", "decision"]
        );
        assert_eq!(outcome.steps().last().unwrap().id, "decision");
    }

    #[test]
    fn test_one_sample_rejects() {
        let tables = StandardTables::new();
        let outcome = one_sample_t_test_with_steps(&[10.0, 11.0, 12.0, 11.0, 10.5], 5.0, 0.05, &tables);
        assert_eq!(outcome.value().unwrap().decision, Decision::Reject);
    }

    #[test]
    fn test_large_sample_without_tables_uses_normal_approximation() {
        let data: Vec<f64> = (0..40).map(|i| 10.0 + (i % 5) as f64).collect();
        let outcome = one_sample_t_test_with_steps(&data, 11.0, 0.05, &EmptyTables);
        let value = outcome.value().unwrap();
        assert_eq!(value.df, 39.0);
        assert_eq!(value.critical_value, None);
        assert!(value.p_value.unwrap() < 0.05);
        assert_eq!(value.decision, Decision::Reject);

        let critical = outcome.find_step("critical-value").unwrap();
        assert!(critical.calculation.as_deref().unwrap().contains("normal approximation"));
        assert!(outcome.find_step("decision").unwrap().calculation.as_deref().unwrap().starts_with("p = "));
    }

    #[test]
    fn test_small_sample_without_tables_is_undetermined() {
        let outcome = one_sample_t_test_with_steps(&[48.0, 52.0, 50.0, 49.0, 51.0], 45.0, 0.05, &EmptyTables);
        let value = outcome.value().unwrap();
        assert_eq!(value.p_value, None);
        assert_eq!(value.decision, Decision::Undetermined);
    }

    #[test]
    fn test_one_sample_too_small() {
        let tables = StandardTables::new();
        let outcome = one_sample_t_test_with_steps(&[5.0], 5.0, 0.05, &tables);
        assert!(outcome.is_invalid());
        assert_eq!(outcome.steps().ids(), vec!["hypotheses", "error"]);
    }

    #[test]
    fn test_identical_values_soft_error() {
        let tables = StandardTables::new();
        let outcome = one_sample_t_test_with_steps(&[3.0, 3.0, 3.0], 2.0, 0.05, &tables);
        assert!(outcome.is_invalid());
        assert!(outcome.steps().contains("error"));
    }

    #[test]
    fn test_paired() {
        let tables = StandardTables::new();
        let before = [200.0, 190.0, 210.0, 220.0, 205.0];
        let after = [195.0, 185.0, 200.0, 210.0, 200.0];
        let outcome = paired_t_test_with_steps(&before, &after, 0.05, &tables);
        let value = outcome.value().unwrap();
        assert_eq!(value.mean, -7.0);
        assert_eq!(value.df, 4.0);
        assert_eq!(value.decision, Decision::Reject);
        assert!(outcome.steps().contains("differences"));
    }

    #[test]
    fn test_paired_length_mismatch() {
        let tables = StandardTables::new();
        let outcome = paired_t_test_with_steps(&[1.0, 2.0, 3.0], &[1.0, 2.0], 0.05, &tables);
        assert!(outcome.is_invalid());
        assert!(outcome.steps().contains("error"));
    }
}
