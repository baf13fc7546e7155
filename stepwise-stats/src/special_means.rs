//! Trimean, geometric mean and trimmed mean
//!
//! The single-mean functions raise; the composite narrates all three and
//! turns a failing sub-mean into an "N/A" step.

use crate::helpers::{finite_values, mean, sorted};
use crate::quartiles::quartiles_sorted;
use serde::{Deserialize, Serialize};
use stepwise_core::prelude::*;
use tracing::debug;

const DECIMALS: usize = 4;

/// Trim per side used when neither a count nor a percent is given
pub const DEFAULT_TRIM_PERCENT: f64 = 10.0;

const FORMULA: &str = "TM = \\frac{Q_1 + 2M + Q_3}{4}, \\quad G = \\left(\\prod x_i\\right)^{1/n}";

/// How much to trim from each end
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrimSpec {
    /// Values removed per side; takes precedence over `percent`
    pub count: Option<usize>,
    /// Percent removed per side, clamped to [0, 50]
    pub percent: Option<f64>,
}

impl TrimSpec {
    pub fn count(count: usize) -> Self {
        Self { count: Some(count), percent: None }
    }

    pub fn percent(percent: f64) -> Self {
        Self { count: None, percent: Some(percent) }
    }

    /// Values to remove from each end of `n` values
    pub fn per_side(&self, n: usize) -> usize {
        match (self.count, self.percent) {
            (Some(count), _) => count,
            (None, Some(percent)) => {
                let pct = if percent.is_finite() { percent.clamp(0.0, 50.0) } else { 0.0 };
                (n as f64 * pct / 100.0).floor() as usize
            }
            (None, None) => (n as f64 * DEFAULT_TRIM_PERCENT / 100.0).floor() as usize,
        }
    }
}

fn require_two(values: &[f64]) -> Result<(), MathError> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData {
            needed: 2,
            got: values.len(),
        });
    }
    Ok(())
}

/// (Q1 + 2·median + Q3) / 4
pub fn trimean(data: &[f64]) -> Result<f64, MathError> {
    let values = finite_values(data);
    require_two(&values)?;
    let q = quartiles_sorted(&sorted(&values));
    Ok((q.q1 + 2.0 * q.median + q.q3) / 4.0)
}

/// exp(mean(ln x)); every value must be positive
pub fn geometric_mean(data: &[f64]) -> Result<f64, MathError> {
    let values = finite_values(data);
    if values.is_empty() {
        return Err(MathError::InsufficientData { needed: 1, got: 0 });
    }
    if let Some(bad) = values.iter().find(|x| **x <= 0.0) {
        return Err(MathError::domain(format!(
            "geometric mean requires all values to be positive (found {})",
            format_number(*bad, DECIMALS)
        )));
    }
    let log_sum: f64 = values.iter().map(|x| x.ln()).sum();
    Ok((log_sum / values.len() as f64).exp())
}

/// Mean after dropping `trim.per_side(n)` values from each end
pub fn trimmed_mean(data: &[f64], trim: TrimSpec) -> Result<f64, MathError> {
    let values = finite_values(data);
    if values.is_empty() {
        return Err(MathError::InsufficientData { needed: 1, got: 0 });
    }
    let n = values.len();
    let k = trim.per_side(n);
    if k >= n.div_ceil(2) {
        return Err(MathError::domain(format!(
            "trimming {} value(s) from each end would remove all {} values",
            k, n
        )));
    }
    let ordered = sorted(&values);
    Ok(mean(&ordered[k..n - k]))
}

/// The three means; `None` where a mean could not be computed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialMeans {
    pub count: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub trimean: f64,
    pub geometric_mean: Option<f64>,
    pub trimmed_mean: Option<f64>,
    /// Values removed from each end for the trimmed mean
    pub trim_per_side: usize,
}

/// All three means with narrated steps.
///
/// Raises when fewer than two finite values remain. Geometric and trimmed
/// mean failures become "N/A" steps.
pub fn special_means_with_steps(data: &[f64], trim: TrimSpec) -> Result<CalculationResult<SpecialMeans>, MathError> {
    let values = finite_values(data);
    require_two(&values)?;
    let ordered = sorted(&values);
    let n = ordered.len();
    let mut steps = StepLog::new();

    steps.push(
        CalculationStep::new("sort", "Sort the data")
            .with_calculation(format_list(&ordered, DECIMALS))
            .with_result(format!("n = {}", n)),
    );

    let q = quartiles_sorted(&ordered);
    steps.push(
        CalculationStep::new("trimean-quartiles", "Quartiles")
            .with_description("Tukey split: Q1 and Q3 are the medians of the lower and upper halves")
            .with_result(format!(
                "Q1 = {}, Median = {}, Q3 = {}",
                format_number(q.q1, DECIMALS),
                format_number(q.median, DECIMALS),
                format_number(q.q3, DECIMALS)
            )),
    );

    let tri = (q.q1 + 2.0 * q.median + q.q3) / 4.0;
    steps.push(
        CalculationStep::new("trimean", "Trimean")
            .with_formula("TM = \\frac{Q_1 + 2M + Q_3}{4}")
            .with_calculation(format!(
                "({} + 2 × {} + {}) / 4 = {}",
                format_number(q.q1, DECIMALS),
                format_number(q.median, DECIMALS),
                format_number(q.q3, DECIMALS),
                format_number(tri, DECIMALS)
            ))
            .with_result(format_number(tri, DECIMALS)),
    );

    let geo = geometric_mean(&ordered);
    let geo_step = CalculationStep::new("geometric-mean", "Geometric mean")
        .with_formula("G = \\exp\\left(\\frac{1}{n}\\sum \\ln x_i\\right)");
    let geo_value = match geo {
        Ok(g) => {
            let log_sum: f64 = ordered.iter().map(|x| x.ln()).sum();
            steps.push(
                geo_step
                    .with_calculation(format!(
                        "\\sum \\ln x_i = {}\nexp({} / {}) = {}",
                        format_number(log_sum, DECIMALS),
                        format_number(log_sum, DECIMALS),
                        n,
                        format_number(g, DECIMALS)
                    ))
                    .with_result(format_number(g, DECIMALS)),
            );
            Some(g)
        }
        Err(e) => {
            debug!(error = %e, "geometric mean unavailable");
            steps.push(geo_step.with_result("N/A").with_note("Requires every value to be greater than 0"));
            None
        }
    };

    let per_side = trim.per_side(n);
    let trim_step = CalculationStep::new("trimmed-mean", "Trimmed mean");
    let trimmed_value = match trimmed_mean(&ordered, trim) {
        Ok(t) => {
            let kept = &ordered[per_side..n - per_side];
            steps.push(
                trim_step
                    .with_description(format!("Remove {} value(s) from each end, then average the rest", per_side))
                    .with_calculation(format!(
                        "Kept: {}\n{} / {} = {}",
                        format_list(kept, DECIMALS),
                        format_number(kept.iter().sum::<f64>(), DECIMALS),
                        kept.len(),
                        format_number(t, DECIMALS)
                    ))
                    .with_result(format_number(t, DECIMALS)),
            );
            Some(t)
        }
        Err(e) => {
            debug!(error = %e, "trimmed mean unavailable");
            steps.push(trim_step.with_result("N/A").with_note(e.to_string()));
            None
        }
    };

    let na = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), |x| format_number(x, DECIMALS));
    steps.push(
        CalculationStep::new("summary", "Summary").with_calculation(format!(
            "Trimean = {}\nGeometric mean = {}\nTrimmed mean = {}",
            format_number(tri, DECIMALS),
            na(geo_value),
            na(trimmed_value)
        )),
    );

    let value = SpecialMeans {
        count: n,
        q1: q.q1,
        median: q.median,
        q3: q.q3,
        trimean: tri,
        geometric_mean: geo_value,
        trimmed_mean: trimmed_value,
        trim_per_side: per_side,
    };
    let inputs = Inputs::new()
        .number("n", n as f64)
        .number("trim_per_side", per_side as f64)
        .text("data", format_list(&ordered, DECIMALS));
    Ok(CalculationResult::new(value, steps, FORMULA, inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimean() {
        // Q1 = 12.5, M = 20, Q3 = 27.5
        assert_eq!(trimean(&[10.0, 15.0, 20.0, 25.0, 30.0]).unwrap(), 20.0);
    }

    #[test]
    fn test_geometric_mean() {
        let g = geometric_mean(&[2.0, 8.0]).unwrap();
        assert!((g - 4.0).abs() < 1e-12);
        assert!(matches!(geometric_mean(&[2.0, 0.0]), Err(MathError::Domain(_))));
    }

    #[test]
    fn test_trim_spec() {
        assert_eq!(TrimSpec::count(2).per_side(10), 2);
        assert_eq!(TrimSpec::percent(25.0).per_side(10), 2);
        assert_eq!(TrimSpec::percent(80.0).per_side(10), 5);
        assert_eq!(TrimSpec { count: Some(1), percent: Some(40.0) }.per_side(10), 1);
        assert_eq!(TrimSpec::default().per_side(10), 1);
    }

    #[test]
    fn test_trimmed_mean() {
        let data = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert_eq!(trimmed_mean(&data, TrimSpec::count(1)).unwrap(), 3.0);
        assert!(trimmed_mean(&data, TrimSpec::count(3)).is_err());
        assert!(trimmed_mean(&[1.0, 2.0], TrimSpec::percent(50.0)).is_err());
    }

    #[test]
    fn test_trim_count_near_usize_max_raises() {
        let data = [1.0, 2.0, 3.0];
        assert!(matches!(trimmed_mean(&data, TrimSpec::count(usize::MAX)), Err(MathError::Domain(_))));
        assert!(matches!(trimmed_mean(&data, TrimSpec::count(usize::MAX / 2 + 1)), Err(MathError::Domain(_))));
        assert_eq!(trimmed_mean(&data, TrimSpec::count(1)).unwrap(), 2.0);

        let result = special_means_with_steps(&data, TrimSpec::count(usize::MAX)).unwrap();
        assert_eq!(result.value.trimmed_mean, None);
    }

    #[test]
    fn test_composite_downgrades_failures() {
        let result = special_means_with_steps(&[-1.0, 2.0, 3.0, 4.0], TrimSpec::count(2)).unwrap();
        assert_eq!(result.value.geometric_mean, None);
        assert_eq!(result.value.trimmed_mean, None);
        assert_eq!(result.find_step("geometric-mean").unwrap().result.as_deref(), Some("N/A"));
        assert_eq!(result.find_step("trimmed-mean").unwrap().result.as_deref(), Some("N/A"));
        assert!(result.find_step("trimean").is_some());
    }

    #[test]
    fn test_composite_filters_by_prefix() {
        let result = special_means_with_steps(&[1.0, 2.0, 4.0, 8.0], TrimSpec::default()).unwrap();
        let trimean_steps = result.steps.with_prefix("trimean");
        assert_eq!(trimean_steps.len(), 2);
        assert!(special_means_with_steps(&[1.0], TrimSpec::default()).is_err());
    }
}
