//! Box-plot summary: five numbers, IQR, Tukey fences and outliers

use crate::helpers::{finite_values, sorted};
use crate::quartiles::{halves, quartiles_sorted};
use serde::{Deserialize, Serialize};
use stepwise_core::prelude::*;

const DECIMALS: usize = 4;

/// Fence distance in IQRs
pub const FENCE_FACTOR: f64 = 1.5;

const FORMULA: &str = "IQR = Q_3 - Q_1, \\quad Q_1 - 1.5 \\cdot IQR \\le x \\le Q_3 + 1.5 \\cdot IQR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Smallest value inside the fences
    pub lower_whisker: f64,
    /// Largest value inside the fences
    pub upper_whisker: f64,
    /// Values strictly beyond a fence, ascending
    pub outliers: Vec<f64>,
}

/// Box-plot summary of the finite values in `data`
pub fn box_plot(data: &[f64]) -> Result<BoxPlotSummary, MathError> {
    let values = finite_values(data);
    if values.len() < 2 {
        return Err(MathError::InsufficientData {
            needed: 2,
            got: values.len(),
        });
    }
    Ok(summarize(&sorted(&values)))
}

fn summarize(ordered: &[f64]) -> BoxPlotSummary {
    let q = quartiles_sorted(ordered);
    let iqr = q.iqr();
    let lower_fence = q.q1 - FENCE_FACTOR * iqr;
    let upper_fence = q.q3 + FENCE_FACTOR * iqr;

    let (inside, outliers): (Vec<f64>, Vec<f64>) = ordered
        .iter()
        .partition(|x| **x >= lower_fence && **x <= upper_fence);

    // Both fences bracket [Q1, Q3], which always holds data, so `inside` is non-empty
    let lower_whisker = inside.first().copied().unwrap_or(q.q1);
    let upper_whisker = inside.last().copied().unwrap_or(q.q3);

    BoxPlotSummary {
        min: ordered[0],
        q1: q.q1,
        median: q.median,
        q3: q.q3,
        max: ordered[ordered.len() - 1],
        iqr,
        lower_fence,
        upper_fence,
        lower_whisker,
        upper_whisker,
        outliers,
    }
}

/// Box-plot summary with narrated steps
pub fn box_plot_with_steps(data: &[f64]) -> Result<CalculationResult<BoxPlotSummary>, MathError> {
    let values = finite_values(data);
    if values.len() < 2 {
        return Err(MathError::InsufficientData {
            needed: 2,
            got: values.len(),
        });
    }
    let ordered = sorted(&values);
    let summary = summarize(&ordered);
    let n = ordered.len();
    let mut steps = StepLog::new();

    let mut sort_step = CalculationStep::new("sort", "Sort the data")
        .with_calculation(format_list(&ordered, DECIMALS))
        .with_result(format!("n = {}", n));
    if values.len() < data.len() {
        sort_step = sort_step.with_note(format!("{} non-numeric value(s) ignored", data.len() - values.len()));
    }
    steps.push(sort_step);

    steps.push(
        CalculationStep::new("median", "Median")
            .with_calculation(format!(
                "{} values, middle = {}",
                n,
                format_number(summary.median, DECIMALS)
            ))
            .with_result(format_number(summary.median, DECIMALS)),
    );

    let (lower, upper) = halves(&ordered);
    steps.push(
        CalculationStep::new("quartiles", "Quartiles")
            .with_description("Q1 is the median of the lower half, Q3 the median of the upper half (median excluded)")
            .with_calculation(format!(
                "Lower half: {} → Q1 = {}\nUpper half: {} → Q3 = {}",
                format_list(lower, DECIMALS),
                format_number(summary.q1, DECIMALS),
                format_list(upper, DECIMALS),
                format_number(summary.q3, DECIMALS)
            ))
            .with_result(format!(
                "Q1 = {}, Q3 = {}",
                format_number(summary.q1, DECIMALS),
                format_number(summary.q3, DECIMALS)
            )),
    );

    steps.push(
        CalculationStep::new("iqr", "Interquartile range")
            .with_formula("IQR = Q_3 - Q_1")
            .with_calculation(format!(
                "{} - {} = {}",
                format_number(summary.q3, DECIMALS),
                format_operand(summary.q1, DECIMALS),
                format_number(summary.iqr, DECIMALS)
            ))
            .with_result(format_number(summary.iqr, DECIMALS)),
    );

    steps.push(
        CalculationStep::new("fences", "Tukey fences")
            .with_formula("Q_1 - 1.5 \\cdot IQR, \\quad Q_3 + 1.5 \\cdot IQR")
            .with_calculation(format!(
                "Lower: {} - 1.5 × {} = {}\nUpper: {} + 1.5 × {} = {}",
                format_number(summary.q1, DECIMALS),
                format_number(summary.iqr, DECIMALS),
                format_number(summary.lower_fence, DECIMALS),
                format_number(summary.q3, DECIMALS),
                format_number(summary.iqr, DECIMALS),
                format_number(summary.upper_fence, DECIMALS)
            ))
            .with_result(format!(
                "[{}, {}]",
                format_number(summary.lower_fence, DECIMALS),
                format_number(summary.upper_fence, DECIMALS)
            )),
    );

    let outlier_result = if summary.outliers.is_empty() {
        "None".to_string()
    } else {
        format_list(&summary.outliers, DECIMALS)
    };
    steps.push(
        CalculationStep::new("outliers", "Outliers")
            .with_description("Values strictly below the lower fence or above the upper fence")
            .with_result(outlier_result),
    );

    steps.push(
        CalculationStep::new("whiskers", "Whiskers")
            .with_description("Whiskers end at the most extreme values that are not outliers")
            .with_result(format!(
                "{} to {}",
                format_number(summary.lower_whisker, DECIMALS),
                format_number(summary.upper_whisker, DECIMALS)
            )),
    );

    steps.push(
        CalculationStep::new("summary", "Five-number summary").with_result(format!(
            "Min = {}, Q1 = {}, Median = {}, Q3 = {}, Max = {}",
            format_number(summary.min, DECIMALS),
            format_number(summary.q1, DECIMALS),
            format_number(summary.median, DECIMALS),
            format_number(summary.q3, DECIMALS),
            format_number(summary.max, DECIMALS)
        )),
    );

    let inputs = Inputs::new()
        .number("n", n as f64)
        .text("data", format_list(&ordered, DECIMALS));
    Ok(CalculationResult::new(summary, steps, FORMULA, inputs))
}
