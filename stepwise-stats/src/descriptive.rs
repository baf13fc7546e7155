//! Descriptive statistics with narrated steps
//!
//! Input is taken as-is; callers clean non-finite values beforehand.

use crate::helpers::{median_sorted, sorted, sum_sq_dev};
use serde::{Deserialize, Serialize};
use stepwise_core::prelude::*;

const DECIMALS: usize = 4;

const FORMULA: &str = "\\bar{x} = \\frac{\\sum x_i}{n}, \\quad s^{2} = \\frac{\\sum (x_i - \\bar{x})^{2}}{n-1}";

/// Summary of one dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Most frequent values; empty when every value is unique
    pub mode: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub population_variance: f64,
    /// Undefined for a single observation
    pub sample_variance: Option<f64>,
    pub population_std_dev: f64,
    pub sample_std_dev: Option<f64>,
}

/// Values occurring most often, ascending; empty if all are unique
pub fn modes(data: &[f64]) -> Vec<f64> {
    let sorted = sorted(data);
    let mut groups: Vec<(f64, usize)> = Vec::new();
    for x in sorted {
        match groups.last_mut() {
            Some((value, count)) if *value == x => *count += 1,
            _ => groups.push((x, 1)),
        }
    }
    let best = groups.iter().map(|(_, c)| *c).max().unwrap_or(0);
    if best < 2 {
        return Vec::new();
    }
    groups.into_iter().filter(|(_, c)| *c == best).map(|(v, _)| v).collect()
}

fn na_or(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format_number(v, DECIMALS))
}

/// Full descriptive summary with one step per quantity
pub fn descriptive_stats_with_steps(data: &[f64]) -> Outcome<DescriptiveStats> {
    let inputs = Inputs::new()
        .number("n", data.len() as f64)
        .text("data", format_list(data, DECIMALS));
    let mut steps = StepLog::new();

    if data.is_empty() {
        let reason = "No data values were provided";
        steps.push(
            CalculationStep::new("no-data", "No data")
                .with_description(reason)
                .with_result("0"),
        );
        return Outcome::invalid(reason, steps, FORMULA, inputs);
    }

    let n = data.len();
    let nf = n as f64;

    let total: f64 = data.iter().sum();
    steps.push(
        CalculationStep::new("sum", "Sum of the values")
            .with_formula("\\sum x_i")
            .with_calculation(format!(
                "{} = {}",
                data.iter().map(|x| format_operand(*x, DECIMALS)).collect::<Vec<_>>().join(" + "),
                format_number(total, DECIMALS)
            ))
            .with_result(format_number(total, DECIMALS)),
    );

    let mean = total / nf;
    steps.push(
        CalculationStep::new("mean", "Mean")
            .with_formula(format!("{} = {}", tex::bar("x"), tex::frac("\\sum x_i", "n")))
            .with_calculation(format!("{} / {} = {}", format_number(total, DECIMALS), n, format_number(mean, DECIMALS)))
            .with_result(format_number(mean, DECIMALS)),
    );

    let ordered = sorted(data);
    let median = median_sorted(&ordered);
    let median_calc = if n % 2 == 0 {
        format!(
            "Sorted: {}\nMiddle values {} and {}: ({} + {}) / 2 = {}",
            format_list(&ordered, DECIMALS),
            format_number(ordered[n / 2 - 1], DECIMALS),
            format_number(ordered[n / 2], DECIMALS),
            format_number(ordered[n / 2 - 1], DECIMALS),
            format_number(ordered[n / 2], DECIMALS),
            format_number(median, DECIMALS)
        )
    } else {
        format!(
            "Sorted: {}\nMiddle value (position {}) = {}",
            format_list(&ordered, DECIMALS),
            n / 2 + 1,
            format_number(median, DECIMALS)
        )
    };
    steps.push(
        CalculationStep::new("median", "Median")
            .with_description("Sort the values and take the middle one, or the average of the two middle ones")
            .with_calculation(median_calc)
            .with_result(format_number(median, DECIMALS)),
    );

    let mode = modes(data);
    let mode_result = if mode.is_empty() {
        "No mode".to_string()
    } else {
        format_list(&mode, DECIMALS)
    };
    let mut mode_step = CalculationStep::new("mode", "Mode")
        .with_description("The value or values that occur most often")
        .with_result(mode_result);
    if mode.is_empty() {
        mode_step = mode_step.with_note("Every value occurs once");
    }
    steps.push(mode_step);

    let min = ordered[0];
    let max = ordered[n - 1];
    let range = max - min;
    steps.push(
        CalculationStep::new("range", "Range")
            .with_formula("max - min")
            .with_calculation(format!(
                "{} - {} = {}",
                format_number(max, DECIMALS),
                format_operand(min, DECIMALS),
                format_number(range, DECIMALS)
            ))
            .with_result(format_number(range, DECIMALS)),
    );

    let ss = sum_sq_dev(data, mean);
    let shown: Vec<String> = data
        .iter()
        .take(3)
        .map(|x| {
            format!(
                "({} - {})^2 = {}",
                format_number(*x, DECIMALS),
                format_number(mean, DECIMALS),
                format_number((x - mean).powi(2), DECIMALS)
            )
        })
        .collect();
    let mut deviation_lines = shown.join("\n");
    if n > 3 {
        deviation_lines.push_str(&format!("\n… ({} more)", n - 3));
    }
    deviation_lines.push_str(&format!("\n\\sum (x_i - {})^2 = {}", tex::bar("x"), format_number(ss, DECIMALS)));
    steps.push(
        CalculationStep::new("deviations", "Squared deviations from the mean")
            .with_formula(format!("(x_i - {})^{{2}}", tex::bar("x")))
            .with_calculation(deviation_lines)
            .with_result(format_number(ss, DECIMALS)),
    );

    let population_variance = ss / nf;
    steps.push(
        CalculationStep::new("population-variance", "Population variance")
            .with_formula(format!("\\sigma^{{2}} = {}", tex::frac(format!("\\sum (x_i - {})^2", tex::bar("x")), "n")))
            .with_calculation(format!(
                "{} / {} = {}",
                format_number(ss, DECIMALS),
                n,
                format_number(population_variance, DECIMALS)
            ))
            .with_result(format_number(population_variance, DECIMALS)),
    );

    let sample_variance = if n > 1 { Some(ss / (nf - 1.0)) } else { None };
    let mut sample_step = CalculationStep::new("sample-variance", "Sample variance")
        .with_formula(format!("s^{{2}} = {}", tex::frac(format!("\\sum (x_i - {})^2", tex::bar("x")), "n-1")))
        .with_result(na_or(sample_variance));
    sample_step = match sample_variance {
        Some(v) => sample_step.with_calculation(format!(
            "{} / {} = {}",
            format_number(ss, DECIMALS),
            n - 1,
            format_number(v, DECIMALS)
        )),
        None => sample_step.with_note("Undefined for a single value (n - 1 = 0)"),
    };
    steps.push(sample_step);

    let population_std_dev = population_variance.sqrt();
    steps.push(
        CalculationStep::new("population-std-dev", "Population standard deviation")
            .with_formula("\\sigma = \\sqrt{\\sigma^{2}}")
            .with_calculation(format!(
                "{} = {}",
                tex::sqrt(format_number(population_variance, DECIMALS)),
                format_number(population_std_dev, DECIMALS)
            ))
            .with_result(format_number(population_std_dev, DECIMALS)),
    );

    let sample_std_dev = sample_variance.map(f64::sqrt);
    let mut sd_step = CalculationStep::new("sample-std-dev", "Sample standard deviation")
        .with_formula("s = \\sqrt{s^{2}}")
        .with_result(na_or(sample_std_dev));
    if let (Some(v), Some(s)) = (sample_variance, sample_std_dev) {
        sd_step = sd_step.with_calculation(format!(
            "{} = {}",
            tex::sqrt(format_number(v, DECIMALS)),
            format_number(s, DECIMALS)
        ));
    }
    steps.push(sd_step);

    let stats = DescriptiveStats {
        count: n,
        sum: total,
        mean,
        median,
        mode,
        min,
        max,
        range,
        population_variance,
        sample_variance,
        population_std_dev,
        sample_std_dev,
    };

    steps.push(
        CalculationStep::new("summary", "Summary").with_calculation(
            [
                format!("n = {}", n),
                format!("Mean = {}", format_number(mean, DECIMALS)),
                format!("Median = {}", format_number(median, DECIMALS)),
                format!("Mode = {}", if stats.mode.is_empty() { "No mode".to_string() } else { format_list(&stats.mode, DECIMALS) }),
                format!("Range = {}", format_number(range, DECIMALS)),
                format!("Population variance = {}", format_number(population_variance, DECIMALS)),
                format!("Sample variance = {}", na_or(sample_variance)),
                format!("Population SD = {}", format_number(population_std_dev, DECIMALS)),
                format!("Sample SD = {}", na_or(sample_std_dev)),
            ]
            .join("\n"),
        ),
    );

    Outcome::ok(stats, steps, FORMULA, inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_summary() {
        let outcome = descriptive_stats_with_steps(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let stats = outcome.value().unwrap();
        assert_eq!(stats.count, 8);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.median, 4.5);
        assert_eq!(stats.mode, vec![4.0]);
        assert_eq!(stats.range, 7.0);
        assert!((stats.population_variance - 4.0).abs() < 1e-12);
        assert!((stats.population_std_dev - 2.0).abs() < 1e-12);
        assert!((stats.sample_variance.unwrap() - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_order() {
        let outcome = descriptive_stats_with_steps(&[1.0, 2.0, 3.0]);
        assert_eq!(
            outcome.steps().ids(),
            vec![
                "sum",
                "mean",
                "median",
                "mode",
                "range",
                "deviations",
                "population-variance",
                "sample-variance",
                "population-std-dev",
                "sample-std-dev",
                "summary"
            ]
        );
    }

    #[test]
    fn test_no_mode_when_unique() {
        assert!(modes(&[3.0, 1.0, 2.0]).is_empty());
        assert_eq!(modes(&[1.0, 1.0, 2.0, 2.0, 3.0]), vec![1.0, 2.0]);
    }

    #[test]
    fn test_single_value_sample_variance_na() {
        let outcome = descriptive_stats_with_steps(&[7.0]);
        let stats = outcome.value().unwrap();
        assert_eq!(stats.sample_variance, None);
        assert_eq!(outcome.find_step("sample-variance").unwrap().result.as_deref(), Some("N/A"));
    }

    #[test]
    fn test_empty_input_is_soft() {
        let outcome = descriptive_stats_with_steps(&[]);
        assert!(outcome.is_invalid());
        assert!(outcome.steps().contains("no-data"));
        assert_eq!(outcome.value_or_default().mean, 0.0);
    }
}
