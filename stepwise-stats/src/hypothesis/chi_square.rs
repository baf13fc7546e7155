//! Chi-square goodness-of-fit and independence tests

use super::{alpha_problem, decision_step, error_step, Decision, DECIMALS};
use serde::{Deserialize, Serialize};
use stepwise_core::prelude::*;
use stepwise_tables::distributions::chi_cdf;
use stepwise_tables::CriticalValues;
use tracing::debug;

/// Expected counts below this weaken the chi-square approximation
pub const MIN_EXPECTED: f64 = 5.0;

const GOF_FORMULA: &str = "\\chi^2 = \\sum \\frac{(O_i - E_i)^2}{E_i}";
const INDEPENDENCE_FORMULA: &str = "\\chi^2 = \\sum_{i,j} \\frac{(O_{ij} - E_{ij})^2}{E_{ij}}, \\quad E_{ij} = \\frac{R_i \\cdot C_j}{N}";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub df: f64,
    pub alpha: f64,
    pub critical_value: Option<f64>,
    /// Upper-tail probability of the statistic
    pub p_value: f64,
    pub decision: Decision,
    /// Expected counts (one row for goodness of fit)
    pub expected: Vec<Vec<f64>>,
    /// Per-cell (O - E)² / E
    pub contributions: Vec<Vec<f64>>,
    /// Cells with an expected count below 5
    pub low_expected_cells: usize,
}

fn fail(mut steps: StepLog, reason: String, formula: &str, inputs: Inputs) -> Outcome<ChiSquareResult> {
    steps.push(error_step(&reason));
    Outcome::invalid(reason, steps, formula, inputs)
}

fn contribution(o: f64, e: f64) -> f64 {
    (o - e).powi(2) / e
}

/// Statistic, df, critical value and decision, shared by both tests
fn finish(
    mut steps: StepLog,
    statistic: f64,
    df: f64,
    df_calc: String,
    alpha: f64,
    tables: &dyn CriticalValues,
    cells: (Vec<Vec<f64>>, Vec<Vec<f64>>),
    formula: &str,
    inputs: Inputs,
) -> Outcome<ChiSquareResult> {
    let (expected, contributions) = cells;
    steps.push(
        CalculationStep::new("statistic", "Chi-square statistic")
            .with_formula(formula)
            .with_calculation(format!(
                "\\chi^2 = {} = {}",
                contributions
                    .iter()
                    .flatten()
                    .map(|c| format_number(*c, DECIMALS))
                    .collect::<Vec<_>>()
                    .join(" + "),
                format_number(statistic, DECIMALS)
            ))
            .with_result(format_number(statistic, DECIMALS)),
    );

    steps.push(
        CalculationStep::new("degrees-of-freedom", "Degrees of freedom")
            .with_calculation(df_calc)
            .with_result(format_number(df, 0)),
    );

    let critical = tables.chi_square(df, alpha);
    let p_value = (1.0 - chi_cdf(statistic, df)).clamp(0.0, 1.0);
    let critical_step = CalculationStep::new("critical-value", "Critical value")
        .with_description(format!("Upper-tail area α = {}, df = {}", format_number(alpha, DECIMALS), df));
    steps.push(match critical {
        Some(c) => critical_step
            .with_calculation(format!(
                "\\chi^2_{{{}, {}}} = {}",
                format_number(alpha, DECIMALS),
                df,
                format_number(c, 3)
            ))
            .with_result(format_number(c, 3))
            .with_note(format!("p-value = {}", format_probability(p_value, DECIMALS))),
        None => {
            debug!(df, alpha, "no chi-square table entry");
            critical_step
                .with_result("Not available")
                .with_note("No table entry for these degrees of freedom and α")
        }
    });

    let decision = match critical {
        Some(c) if statistic > c => Decision::Reject,
        Some(_) => Decision::FailToReject,
        None => Decision::Undetermined,
    };
    let comparison = match critical {
        Some(c) => format!(
            "\\chi^2 = {} {} {}",
            format_number(statistic, DECIMALS),
            if decision.is_reject() { ">" } else { "≤" },
            format_number(c, 3)
        ),
        None => "No critical value to compare against".to_string(),
    };
    steps.push(decision_step(decision, comparison));

    let low_expected_cells = expected.iter().flatten().filter(|e| **e < MIN_EXPECTED).count();
    let value = ChiSquareResult {
        statistic,
        df,
        alpha,
        critical_value: critical,
        p_value,
        decision,
        expected,
        contributions,
        low_expected_cells,
    };
    Outcome::ok(value, steps, formula, inputs)
}

fn low_expected_note(count: usize) -> Option<String> {
    if count == 0 {
        None
    } else {
        Some(format!(
            "{} expected count(s) below {}; the chi-square approximation may be unreliable",
            count, MIN_EXPECTED
        ))
    }
}

/// Goodness of fit of observed counts to expected counts
pub fn chi_square_goodness_of_fit(
    observed: &[f64],
    expected: &[f64],
    alpha: f64,
    tables: &dyn CriticalValues,
) -> Outcome<ChiSquareResult> {
    let inputs = Inputs::new()
        .number("categories", observed.len() as f64)
        .number("alpha", alpha)
        .text("observed", format_list(observed, DECIMALS))
        .text("expected", format_list(expected, DECIMALS));
    let mut steps = StepLog::new();

    steps.push(
        CalculationStep::new("hypotheses", "State the hypotheses")
            .with_calculation("H₀: the data follow the expected distribution\nH₁: the data do not follow the expected distribution"),
    );

    if observed.len() != expected.len() {
        return fail(
            steps,
            format!(
                "Observed and expected must have the same number of categories ({} vs {})",
                observed.len(),
                expected.len()
            ),
            GOF_FORMULA,
            inputs,
        );
    }
    if observed.len() < 2 {
        return fail(steps, "At least 2 categories are required".to_string(), GOF_FORMULA, inputs);
    }
    if expected.iter().any(|e| !(*e > 0.0) || !e.is_finite()) {
        return fail(steps, "Every expected count must be greater than 0".to_string(), GOF_FORMULA, inputs);
    }
    if observed.iter().any(|o| !(*o >= 0.0) || !o.is_finite()) {
        return fail(steps, "Observed counts cannot be negative".to_string(), GOF_FORMULA, inputs);
    }
    if let Some(reason) = alpha_problem(alpha) {
        return fail(steps, reason, GOF_FORMULA, inputs);
    }

    let total_o: f64 = observed.iter().sum();
    let total_e: f64 = expected.iter().sum();
    let pairs: Vec<String> = observed
        .iter()
        .zip(expected)
        .enumerate()
        .map(|(i, (o, e))| format!("Category {}: O = {}, E = {}", i + 1, format_number(*o, DECIMALS), format_number(*e, DECIMALS)))
        .collect();
    let low = expected.iter().filter(|e| **e < MIN_EXPECTED).count();
    let mut expected_step = CalculationStep::new("expected", "Observed and expected counts")
        .with_calculation(pairs.join("\n"))
        .with_result(format!(
            "ΣO = {}, ΣE = {}",
            format_number(total_o, DECIMALS),
            format_number(total_e, DECIMALS)
        ));
    if let Some(note) = low_expected_note(low) {
        expected_step = expected_step.with_note(note);
    } else if (total_o - total_e).abs() > 1e-6 * total_o.max(1.0) {
        expected_step = expected_step.with_note("Observed and expected totals differ");
    }
    steps.push(expected_step);

    let contributions: Vec<f64> = observed.iter().zip(expected).map(|(o, e)| contribution(*o, *e)).collect();
    let lines: Vec<String> = observed
        .iter()
        .zip(expected)
        .zip(&contributions)
        .map(|((o, e), c)| {
            format!(
                "({} - {})² / {} = {}",
                format_number(*o, DECIMALS),
                format_number(*e, DECIMALS),
                format_number(*e, DECIMALS),
                format_number(*c, DECIMALS)
            )
        })
        .collect();
    steps.push(
        CalculationStep::new("contributions", "Contribution of each category")
            .with_formula("\\frac{(O_i - E_i)^2}{E_i}")
            .with_calculation(lines.join("\n")),
    );

    let statistic: f64 = contributions.iter().sum();
    let k = observed.len();
    let df = (k - 1) as f64;
    finish(
        steps,
        statistic,
        df,
        format!("df = k - 1 = {} - 1 = {}", k, k - 1),
        alpha,
        tables,
        (vec![expected.to_vec()], vec![contributions]),
        GOF_FORMULA,
        inputs,
    )
}

/// Test of independence on a contingency table given as rows of counts
pub fn chi_square_independence(table: &[Vec<f64>], alpha: f64, tables: &dyn CriticalValues) -> Outcome<ChiSquareResult> {
    let rows = table.len();
    let cols = table.first().map_or(0, Vec::len);
    let inputs = Inputs::new()
        .number("rows", rows as f64)
        .number("columns", cols as f64)
        .number("alpha", alpha);
    let mut steps = StepLog::new();

    steps.push(
        CalculationStep::new("hypotheses", "State the hypotheses")
            .with_calculation("H₀: the row and column variables are independent\nH₁: the variables are associated"),
    );

    if rows < 2 || cols < 2 {
        return fail(
            steps,
            format!("The contingency table must be at least 2×2 (got {}×{})", rows, cols),
            INDEPENDENCE_FORMULA,
            inputs,
        );
    }
    if table.iter().any(|r| r.len() != cols) {
        return fail(steps, "Every row must have the same number of columns".to_string(), INDEPENDENCE_FORMULA, inputs);
    }
    if table.iter().flatten().any(|o| !(*o >= 0.0) || !o.is_finite()) {
        return fail(steps, "Observed counts cannot be negative".to_string(), INDEPENDENCE_FORMULA, inputs);
    }
    if let Some(reason) = alpha_problem(alpha) {
        return fail(steps, reason, INDEPENDENCE_FORMULA, inputs);
    }

    let row_totals: Vec<f64> = table.iter().map(|r| r.iter().sum()).collect();
    let col_totals: Vec<f64> = (0..cols).map(|j| table.iter().map(|r| r[j]).sum()).collect();
    let grand: f64 = row_totals.iter().sum();
    steps.push(
        CalculationStep::new("totals", "Row, column and grand totals")
            .with_calculation(format!(
                "Row totals: {}\nColumn totals: {}\nGrand total N = {}",
                format_list(&row_totals, DECIMALS),
                format_list(&col_totals, DECIMALS),
                format_number(grand, DECIMALS)
            ))
            .with_result(format!("N = {}", format_number(grand, DECIMALS))),
    );

    if row_totals.iter().chain(&col_totals).any(|t| *t == 0.0) {
        return fail(
            steps,
            "Every row and column needs a non-zero total to compute expected counts".to_string(),
            INDEPENDENCE_FORMULA,
            inputs,
        );
    }

    let expected: Vec<Vec<f64>> = row_totals
        .iter()
        .map(|r| col_totals.iter().map(|c| r * c / grand).collect())
        .collect();
    let mut expected_lines = Vec::new();
    for (i, row) in expected.iter().enumerate() {
        for (j, e) in row.iter().enumerate() {
            expected_lines.push(format!(
                "E{}{} = {} × {} / {} = {}",
                i + 1,
                j + 1,
                format_number(row_totals[i], DECIMALS),
                format_number(col_totals[j], DECIMALS),
                format_number(grand, DECIMALS),
                format_number(*e, DECIMALS)
            ));
        }
    }
    let low = expected.iter().flatten().filter(|e| **e < MIN_EXPECTED).count();
    let mut expected_step = CalculationStep::new("expected", "Expected counts")
        .with_formula("E_{ij} = \\frac{R_i \\cdot C_j}{N}")
        .with_calculation(expected_lines.join("\n"));
    if let Some(note) = low_expected_note(low) {
        expected_step = expected_step.with_note(note);
    }
    steps.push(expected_step);

    let contributions: Vec<Vec<f64>> = table
        .iter()
        .zip(&expected)
        .map(|(obs, exp)| obs.iter().zip(exp).map(|(o, e)| contribution(*o, *e)).collect())
        .collect();
    let mut lines = Vec::new();
    for (i, row) in contributions.iter().enumerate() {
        for (j, c) in row.iter().enumerate() {
            lines.push(format!(
                "({} - {})² / {} = {}",
                format_number(table[i][j], DECIMALS),
                format_number(expected[i][j], DECIMALS),
                format_number(expected[i][j], DECIMALS),
                format_number(*c, DECIMALS)
            ));
        }
    }
    steps.push(
        CalculationStep::new("contributions", "Contribution of each cell")
            .with_formula("\\frac{(O_{ij} - E_{ij})^2}{E_{ij}}")
            .with_calculation(lines.join("\n")),
    );

    let statistic: f64 = contributions.iter().flatten().sum();
    let df = ((rows - 1) * (cols - 1)) as f64;
    finish(
        steps,
        statistic,
        df,
        format!("df = (r - 1)(c - 1) = ({} - 1)({} - 1) = {}", rows, cols, (rows - 1) * (cols - 1)),
        alpha,
        tables,
        (expected, contributions),
        INDEPENDENCE_FORMULA,
        inputs,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_tables::{EmptyTables, StandardTables};

    #[test]
    fn test_goodness_of_fit_fair_die() {
        let tables = StandardTables::new();
        let observed = [8.0, 12.0, 10.0, 9.0, 11.0, 10.0];
        let expected = [10.0; 6];
        let outcome = chi_square_goodness_of_fit(&observed, &expected, 0.05, &tables);
        let value = outcome.value().unwrap();
        assert!((value.statistic - 1.0).abs() < 1e-12);
        assert_eq!(value.df, 5.0);
        assert_eq!(value.critical_value, Some(11.07));
        assert_eq!(value.decision, Decision::FailToReject);
        assert_eq!(
            outcome.steps().ids(),
            vec!["hypotheses", "expected", "contributions", "statistic", "degrees-of-freedom", "critical-value", "decision"]
        );
    }

    #[test]
    fn test_goodness_of_fit_rejects() {
        let tables = StandardTables::new();
        let outcome = chi_square_goodness_of_fit(&[30.0, 10.0], &[20.0, 20.0], 0.05, &tables);
        let value = outcome.value().unwrap();
        assert!((value.statistic - 10.0).abs() < 1e-12);
        assert_eq!(value.decision, Decision::Reject);
    }

    #[test]
    fn test_goodness_of_fit_length_mismatch() {
        let tables = StandardTables::new();
        let outcome = chi_square_goodness_of_fit(&[1.0, 2.0, 3.0], &[2.0, 2.0], 0.05, &tables);
        assert!(outcome.is_invalid());
        assert_eq!(outcome.steps().ids(), vec!["hypotheses", "error"]);
    }

    #[test]
    fn test_low_expected_note() {
        let tables = StandardTables::new();
        let outcome = chi_square_goodness_of_fit(&[3.0, 5.0], &[4.0, 4.0], 0.05, &tables);
        assert_eq!(outcome.value().unwrap().low_expected_cells, 2);
        assert!(outcome.find_step("expected").unwrap().note.is_some());
    }

    #[test]
    fn test_independence_two_by_two() {
        let tables = StandardTables::new();
        let table = vec![vec![20.0, 30.0], vec![30.0, 20.0]];
        let outcome = chi_square_independence(&table, 0.05, &tables);
        let value = outcome.value().unwrap();
        assert_eq!(value.expected, vec![vec![25.0, 25.0], vec![25.0, 25.0]]);
        assert!((value.statistic - 4.0).abs() < 1e-12);
        assert_eq!(value.df, 1.0);
        assert_eq!(value.decision, Decision::Reject);
        assert!(outcome.steps().contains("totals"));
    }

    #[test]
    fn test_independence_too_small() {
        let tables = StandardTables::new();
        let outcome = chi_square_independence(&[vec![1.0, 2.0]], 0.05, &tables);
        assert!(outcome.is_invalid());
    }

    #[test]
    fn test_missing_table_is_undetermined() {
        let outcome = chi_square_goodness_of_fit(&[30.0, 10.0], &[20.0, 20.0], 0.05, &EmptyTables);
        assert_eq!(outcome.value().unwrap().decision, Decision::Undetermined);
        assert_eq!(outcome.steps().last().unwrap().id, "decision");
    }
}
