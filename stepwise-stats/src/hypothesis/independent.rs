//! Independent-samples t-test
//!
//! An F-test on the two variances (always at α = 0.05) picks the method:
//! pooled variance when they look equal, Welch otherwise. The pooled case
//! with equal group sizes is narrated with the simpler equivalent formula.
//! All three branches share the t-statistic, critical-value and decision
//! steps.

use super::{alpha_problem, error_step, judge_t, t_critical_step, t_decision_step, Decision, Tails, DECIMALS};
use crate::helpers::{mean, sample_variance};
use serde::{Deserialize, Serialize};
use stepwise_core::prelude::*;
use stepwise_tables::CriticalValues;
use tracing::debug;

/// Significance level of the variance-equality check
pub const VARIANCE_TEST_ALPHA: f64 = 0.05;

const FORMULA: &str = "t = \\frac{\\bar{x}_1 - \\bar{x}_2}{SE}";

/// Summary statistics for one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub n: usize,
    pub mean: f64,
    /// Sample (Bessel-corrected) standard deviation
    pub std_dev: f64,
}

impl GroupStats {
    pub fn new(n: usize, mean: f64, std_dev: f64) -> Self {
        Self { n, mean, std_dev }
    }

    /// Statistics of a sample; `None` below two values
    pub fn from_sample(data: &[f64]) -> Option<Self> {
        let variance = sample_variance(data)?;
        Some(Self::new(data.len(), mean(data), variance.sqrt()))
    }

    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }

    fn df(&self) -> f64 {
        self.n as f64 - 1.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TTestMethod {
    #[default]
    Pooled,
    Welch,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndependentTTestResult {
    pub group1: GroupStats,
    pub group2: GroupStats,
    pub f_statistic: f64,
    pub f_critical: Option<f64>,
    pub equal_variances: bool,
    pub method: TTestMethod,
    /// Sp², pooled method only
    pub pooled_variance: Option<f64>,
    pub standard_error: f64,
    pub mean_difference: f64,
    pub t_statistic: f64,
    pub df: f64,
    pub alpha: f64,
    pub tails: super::Tails,
    pub critical_value: Option<f64>,
    pub p_value: Option<f64>,
    pub decision: Decision,
}

/// Pooled variance Sp² and the standard error built from it
pub fn pooled_standard_error(g1: &GroupStats, g2: &GroupStats) -> (f64, f64) {
    let df = g1.df() + g2.df();
    let sp2 = (g1.df() * g1.variance() + g2.df() * g2.variance()) / df;
    let se = (sp2 * (1.0 / g1.n as f64 + 1.0 / g2.n as f64)).sqrt();
    (sp2, se)
}

/// Welch standard error and Satterthwaite degrees of freedom
pub fn welch_standard_error(g1: &GroupStats, g2: &GroupStats) -> (f64, f64) {
    let a = g1.variance() / g1.n as f64;
    let b = g2.variance() / g2.n as f64;
    let se = (a + b).sqrt();
    let df = (a + b).powi(2) / (a * a / g1.df() + b * b / g2.df());
    (se, df)
}

/// Narration template for the standard error and df
#[derive(Debug, Clone, Copy, PartialEq)]
enum Branch {
    PooledEqualN,
    Pooled,
    Welch,
}

impl Branch {
    fn select(equal_variances: bool, g1: &GroupStats, g2: &GroupStats) -> Self {
        match (equal_variances, g1.n == g2.n) {
            (true, true) => Branch::PooledEqualN,
            (true, false) => Branch::Pooled,
            (false, _) => Branch::Welch,
        }
    }

    fn method(self) -> TTestMethod {
        match self {
            Branch::PooledEqualN | Branch::Pooled => TTestMethod::Pooled,
            Branch::Welch => TTestMethod::Welch,
        }
    }
}

struct Spread {
    pooled_variance: Option<f64>,
    standard_error: f64,
    df: f64,
}

fn narrate_branch(branch: Branch, g1: &GroupStats, g2: &GroupStats, steps: &mut StepLog) -> Spread {
    let (n1, n2) = (g1.n, g2.n);
    let (v1, v2) = (g1.variance(), g2.variance());
    let f = |x: f64| format_number(x, DECIMALS);

    match branch {
        Branch::PooledEqualN => {
            let (sp2, se) = pooled_standard_error(g1, g2);
            let df = (n1 + n2 - 2) as f64;
            steps.push(
                CalculationStep::new("standard-error", "Standard error (equal variances, equal sizes)")
                    .with_formula(format!("SE = {}", tex::sqrt(tex::frac("s_1^2 + s_2^2", "n"))))
                    .with_calculation(format!("{} = {}", tex::sqrt(tex::frac(format!("{} + {}", f(v1), f(v2)), n1.to_string())), f(se)))
                    .with_result(f(se))
                    .with_note("With n₁ = n₂ this equals the pooled-variance standard error"),
            );
            steps.push(
                CalculationStep::new("degrees-of-freedom", "Degrees of freedom")
                    .with_formula("df = n_1 + n_2 - 2")
                    .with_calculation(format!("{} + {} - 2 = {}", n1, n2, f(df)))
                    .with_result(f(df)),
            );
            Spread { pooled_variance: Some(sp2), standard_error: se, df }
        }
        Branch::Pooled => {
            let (sp2, se) = pooled_standard_error(g1, g2);
            let df = (n1 + n2 - 2) as f64;
            steps.push(
                CalculationStep::new("pooled-variance", "Pooled variance")
                    .with_formula(format!("S_p^2 = {}", tex::frac("(n_1-1)s_1^2 + (n_2-1)s_2^2", "n_1 + n_2 - 2")))
                    .with_calculation(format!(
                        "({} × {} + {} × {}) / {} = {}",
                        n1 - 1,
                        f(v1),
                        n2 - 1,
                        f(v2),
                        f(df),
                        f(sp2)
                    ))
                    .with_result(f(sp2)),
            );
            steps.push(
                CalculationStep::new("standard-error", "Standard error")
                    .with_formula(format!("SE = {}", tex::sqrt("S_p^2 \\left(\\frac{1}{n_1} + \\frac{1}{n_2}\\right)")))
                    .with_calculation(format!("{} = {}", tex::sqrt(format!("{} × (1/{} + 1/{})", f(sp2), n1, n2)), f(se)))
                    .with_result(f(se)),
            );
            steps.push(
                CalculationStep::new("degrees-of-freedom", "Degrees of freedom")
                    .with_formula("df = n_1 + n_2 - 2")
                    .with_calculation(format!("{} + {} - 2 = {}", n1, n2, f(df)))
                    .with_result(f(df)),
            );
            Spread { pooled_variance: Some(sp2), standard_error: se, df }
        }
        Branch::Welch => {
            let (se, df) = welch_standard_error(g1, g2);
            let (a, b) = (v1 / n1 as f64, v2 / n2 as f64);
            steps.push(
                CalculationStep::new("standard-error", "Standard error (Welch)")
                    .with_formula(format!("SE = {}", tex::sqrt(format!("{} + {}", tex::frac("s_1^2", "n_1"), tex::frac("s_2^2", "n_2")))))
                    .with_calculation(format!("{} = {}", tex::sqrt(format!("{} + {}", f(a), f(b))), f(se)))
                    .with_result(f(se)),
            );
            steps.push(
                CalculationStep::new("degrees-of-freedom", "Welch–Satterthwaite degrees of freedom")
                    .with_formula(format!(
                        "df = {}",
                        tex::frac(
                            "(s_1^2/n_1 + s_2^2/n_2)^2",
                            "\\frac{(s_1^2/n_1)^2}{n_1-1} + \\frac{(s_2^2/n_2)^2}{n_2-1}"
                        )
                    ))
                    .with_calculation(format!(
                        "({} + {})² / ({}² / {} + {}² / {}) = {}",
                        f(a),
                        f(b),
                        f(a),
                        n1 - 1,
                        f(b),
                        n2 - 1,
                        f(df)
                    ))
                    .with_result(f(df)),
            );
            Spread { pooled_variance: None, standard_error: se, df }
        }
    }
}

fn fail(mut steps: StepLog, reason: String, inputs: Inputs) -> Outcome<IndependentTTestResult> {
    steps.push(error_step(&reason));
    Outcome::invalid(reason, steps, FORMULA, inputs)
}

fn group_inputs(g1: &GroupStats, g2: &GroupStats, alpha: f64, tails: Tails) -> Inputs {
    Inputs::new()
        .number("n1", g1.n as f64)
        .number("mean1", g1.mean)
        .number("sd1", g1.std_dev)
        .number("n2", g2.n as f64)
        .number("mean2", g2.mean)
        .number("sd2", g2.std_dev)
        .number("alpha", alpha)
        .text("tails", if tails == Tails::Two { "two" } else { "one" })
}

/// Independent-samples t-test from summary statistics
pub fn independent_t_test(
    g1: GroupStats,
    g2: GroupStats,
    alpha: f64,
    tails: Tails,
    tables: &dyn CriticalValues,
) -> Outcome<IndependentTTestResult> {
    let inputs = group_inputs(&g1, &g2, alpha, tails);
    let mut steps = StepLog::new();

    let alternative = match tails {
        Tails::Two => "H₁: μ₁ ≠ μ₂",
        Tails::One => "H₁: μ₁ > μ₂ (or μ₁ < μ₂, one direction)",
    };
    steps.push(
        CalculationStep::new("hypotheses", "State the hypotheses")
            .with_calculation(format!("H₀: μ₁ = μ₂\n{}", alternative))
            .with_note(format!("{} test at α = {}", tails.label(), format_number(alpha, DECIMALS))),
    );

    if g1.n < 2 || g2.n < 2 {
        return fail(
            steps,
            format!("Each group needs at least 2 values (got {} and {})", g1.n, g2.n),
            inputs,
        );
    }
    if !(g1.std_dev >= 0.0 && g2.std_dev >= 0.0) || !g1.mean.is_finite() || !g2.mean.is_finite() {
        return fail(steps, "Means must be finite and standard deviations non-negative".to_string(), inputs);
    }
    if let Some(reason) = alpha_problem(alpha) {
        return fail(steps, reason, inputs);
    }

    // Larger variance on top
    let (big, small, big_label, small_label) = if g1.variance() >= g2.variance() {
        (&g1, &g2, "1", "2")
    } else {
        (&g2, &g1, "2", "1")
    };
    let f_stat = if small.variance() > 0.0 {
        big.variance() / small.variance()
    } else if big.variance() > 0.0 {
        f64::INFINITY
    } else {
        1.0
    };
    let f_critical = tables.f_value(big.df(), small.df(), VARIANCE_TEST_ALPHA);
    let equal_variances = f_critical.map_or(true, |c| f_stat <= c);
    let branch = Branch::select(equal_variances, &g1, &g2);
    debug!(f = f_stat, ?f_critical, ?branch, "variance check chose t-test method");

    let f_comparison = match f_critical {
        Some(c) => format!(
            "F = {} {} F_crit({}, {}) = {}",
            format_number(f_stat, DECIMALS),
            if equal_variances { "≤" } else { ">" },
            format_number(big.df(), 0),
            format_number(small.df(), 0),
            format_number(c, 3)
        ),
        None => "No F table entry; assuming equal variances".to_string(),
    };
    steps.push(
        CalculationStep::new("variance-test", "Check equality of variances (F-test)")
            .with_formula(format!("F = {}", tex::frac("s_{larger}^2", "s_{smaller}^2")))
            .with_calculation(format!(
                "F = s_{}² / s_{}² = {} / {} = {}\n{}",
                big_label,
                small_label,
                format_number(big.variance(), DECIMALS),
                format_number(small.variance(), DECIMALS),
                format_number(f_stat, DECIMALS),
                f_comparison
            ))
            .with_result(if equal_variances {
                "Variances treated as equal: pooled-variance t-test"
            } else {
                "Variances differ: Welch's t-test"
            })
            .with_note(format!("Checked at α = {} regardless of the test's α", VARIANCE_TEST_ALPHA)),
    );

    let spread = narrate_branch(branch, &g1, &g2, &mut steps);
    if spread.standard_error == 0.0 || !spread.standard_error.is_finite() {
        return fail(
            steps,
            "Both groups have zero variance, so the standard error is 0 and t is undefined".to_string(),
            inputs,
        );
    }

    let mean_difference = g1.mean - g2.mean;
    let t = mean_difference / spread.standard_error;
    steps.push(
        CalculationStep::new("t-statistic", "Test statistic")
            .with_formula(FORMULA)
            .with_calculation(format!(
                "({} - {}) / {} = {}",
                format_number(g1.mean, DECIMALS),
                format_operand(g2.mean, DECIMALS),
                format_number(spread.standard_error, DECIMALS),
                format_number(t, DECIMALS)
            ))
            .with_result(format_number(t, DECIMALS)),
    );

    let judgement = judge_t(t, spread.df, alpha, tails, tables);
    steps.push(t_critical_step(&judgement, spread.df, alpha, tails));
    steps.push(t_decision_step(t, &judgement, alpha));

    let value = IndependentTTestResult {
        group1: g1,
        group2: g2,
        f_statistic: f_stat,
        f_critical,
        equal_variances,
        method: branch.method(),
        pooled_variance: spread.pooled_variance,
        standard_error: spread.standard_error,
        mean_difference,
        t_statistic: t,
        df: spread.df,
        alpha,
        tails,
        critical_value: judgement.critical_value,
        p_value: judgement.p_value,
        decision: judgement.decision,
    };
    Outcome::ok(value, steps, FORMULA, inputs)
}

fn group_step(id: &str, label: &str, data: &[f64], stats: &GroupStats) -> CalculationStep {
    CalculationStep::new(id, format!("{} statistics", label))
        .with_calculation(format!(
            "Data: {}\nn = {}\nx̄ = {} / {} = {}\ns = {}",
            format_list(data, DECIMALS),
            stats.n,
            format_number(data.iter().sum::<f64>(), DECIMALS),
            stats.n,
            format_number(stats.mean, DECIMALS),
            format_number(stats.std_dev, DECIMALS)
        ))
        .with_result(format!(
            "x̄ = {}, s = {}",
            format_number(stats.mean, DECIMALS),
            format_number(stats.std_dev, DECIMALS)
        ))
}

/// Independent-samples t-test from raw samples.
///
/// Narrates each group's statistics, then continues with the
/// summary-statistics test in the same numbered sequence.
pub fn independent_t_test_with_steps(
    sample1: &[f64],
    sample2: &[f64],
    alpha: f64,
    tails: Tails,
    tables: &dyn CriticalValues,
) -> Outcome<IndependentTTestResult> {
    let (g1, g2) = match (GroupStats::from_sample(sample1), GroupStats::from_sample(sample2)) {
        (Some(g1), Some(g2)) => (g1, g2),
        _ => {
            let inputs = Inputs::new()
                .number("n1", sample1.len() as f64)
                .number("n2", sample2.len() as f64)
                .number("alpha", alpha);
            let mut steps = StepLog::new();
            let reason = format!(
                "Each group needs at least 2 values (got {} and {})",
                sample1.len(),
                sample2.len()
            );
            steps.push(error_step(&reason));
            return Outcome::invalid(reason, steps, FORMULA, inputs);
        }
    };

    let mut steps = StepLog::new();
    steps.push(group_step("group-1-stats", "Group 1", sample1, &g1));
    steps.push(group_step("group-2-stats", "Group 2", sample2, &g2));

    match independent_t_test(g1, g2, alpha, tails, tables) {
        Outcome::Ok(core) => {
            steps.append(core.steps);
            Outcome::ok(core.value, steps, core.formula, core.inputs)
        }
        Outcome::Invalid(core) => {
            steps.append(core.steps);
            Outcome::invalid(core.reason, steps, core.formula, core.inputs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_tables::{EmptyTables, StandardTables};

    #[test]
    fn test_pooled_and_welch_agree_when_symmetric() {
        let g1 = GroupStats::new(10, 20.0, 3.0);
        let g2 = GroupStats::new(10, 17.0, 3.0);
        let (_, pooled_se) = pooled_standard_error(&g1, &g2);
        let (welch_se, welch_df) = welch_standard_error(&g1, &g2);
        let diff = g1.mean - g2.mean;
        assert!((diff / pooled_se - diff / welch_se).abs() < 1e-12);
        assert!((welch_df - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_equal_n_branch() {
        let tables = StandardTables::new();
        let outcome = independent_t_test(
            GroupStats::new(10, 20.0, 3.0),
            GroupStats::new(10, 17.0, 3.5),
            0.05,
            Tails::Two,
            &tables,
        );
        let value = outcome.value().unwrap();
        assert_eq!(value.method, TTestMethod::Pooled);
        assert_eq!(value.df, 18.0);
        assert!(!outcome.steps().contains("pooled-variance"));
        assert_eq!(outcome.steps().last().unwrap().id, "decision");
    }

    #[test]
    fn test_pooled_unequal_n_branch() {
        let tables = StandardTables::new();
        let outcome = independent_t_test(
            GroupStats::new(12, 20.0, 3.0),
            GroupStats::new(8, 17.0, 3.5),
            0.05,
            Tails::Two,
            &tables,
        );
        assert!(outcome.steps().contains("pooled-variance"));
        assert_eq!(outcome.value().unwrap().df, 18.0);
    }

    #[test]
    fn test_welch_branch() {
        let tables = StandardTables::new();
        let outcome = independent_t_test(
            GroupStats::new(10, 20.0, 1.0),
            GroupStats::new(10, 17.0, 6.0),
            0.05,
            Tails::Two,
            &tables,
        );
        let value = outcome.value().unwrap();
        assert_eq!(value.method, TTestMethod::Welch);
        assert!(!value.equal_variances);
        assert!(value.df < 18.0);
        assert_eq!(
            outcome.steps().ids(),
            vec![
                "hypotheses",
                "variance-test",
                "standard-error",
                "degrees-of-freedom",
                "t-statistic",
                "critical-value",
                "decision"
            ]
        );
    }

    #[test]
    fn test_welch_fractional_df_snaps_to_table_row() {
        let tables = StandardTables::new();
        let outcome = independent_t_test(
            GroupStats::new(10, 20.0, 2.0),
            GroupStats::new(15, 25.0, 8.0),
            0.05,
            Tails::Two,
            &tables,
        );
        let value = outcome.value().unwrap();
        assert_eq!(value.method, TTestMethod::Welch);
        assert!((value.df - 16.5222).abs() < 1e-3);
        assert_eq!(tables.find_closest_df(value.df), 17);
        assert_eq!(value.critical_value, tables.t_value(17.0, 0.025));
        assert!(value.t_statistic < -2.3 && value.t_statistic > -2.33);
        assert_eq!(value.decision, Decision::Reject);

        let critical = outcome.find_step("critical-value").unwrap();
        assert!(critical.note.as_deref().unwrap().contains("Table row df = 17"));
        assert_eq!(outcome.find_step("decision").unwrap().result.as_deref(), Some("Reject H₀"));
    }

    #[test]
    fn test_missing_f_table_assumes_equal() {
        let outcome = independent_t_test(
            GroupStats::new(10, 20.0, 1.0),
            GroupStats::new(10, 17.0, 6.0),
            0.05,
            Tails::Two,
            &EmptyTables,
        );
        let value = outcome.value().unwrap();
        assert!(value.equal_variances);
        assert_eq!(value.decision, Decision::Undetermined);
    }

    #[test]
    fn test_one_tailed_uses_full_alpha() {
        let tables = StandardTables::new();
        let outcome = independent_t_test(
            GroupStats::new(6, 10.0, 2.0),
            GroupStats::new(6, 8.0, 2.0),
            0.05,
            Tails::One,
            &tables,
        );
        assert_eq!(outcome.value().unwrap().critical_value, tables.t_value(10.0, 0.05));
    }

    #[test]
    fn test_samples_are_spliced_and_renumbered() {
        let tables = StandardTables::new();
        let outcome = independent_t_test_with_steps(
            &[85.0, 90.0, 88.0, 92.0, 87.0],
            &[78.0, 82.0, 80.0, 79.0, 81.0],
            0.05,
            Tails::Two,
            &tables,
        );
        let ids = outcome.steps().ids();
        assert_eq!(&ids[..3], &["group-1-stats", "group-2-stats", "hypotheses"]);
        let ordinals: Vec<usize> = outcome.steps().iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, (1..=ids.len()).collect::<Vec<_>>());
        assert_eq!(outcome.value().unwrap().decision, Decision::Reject);
    }

    #[test]
    fn test_samples_too_small() {
        let tables = StandardTables::new();
        let outcome = independent_t_test_with_steps(&[1.0], &[2.0, 3.0], 0.05, Tails::Two, &tables);
        assert!(outcome.is_invalid());
        assert!(outcome.steps().contains("error"));
    }
}
