//! Probability distributions: binomial, Poisson, hypergeometric, normal

pub mod binomial;
pub mod hypergeometric;
pub mod normal;
pub mod poisson;

pub use binomial::{
    binomial_cdf, binomial_pmf, binomial_range_with_steps, binomial_upper_tail, binomial_with_steps,
};
pub use hypergeometric::{
    hypergeometric_cdf, hypergeometric_pmf, hypergeometric_upper_tail, hypergeometric_with_steps,
};
pub use normal::{normal_cdf, normal_pdf, normal_quantile, normal_upper_tail};
pub use poisson::{
    poisson_cdf, poisson_pmf, poisson_range_with_steps, poisson_upper_tail, poisson_with_steps,
};

use crate::combinatorics::combinations;
use serde::{Deserialize, Serialize};
use stepwise_core::prelude::*;
use stepwise_tables::distributions::gamma_ln;

/// Decimals shown for probabilities and intermediate terms
pub(crate) const PROB_DECIMALS: usize = 6;

/// Range sums list at most this many terms before abbreviating
const MAX_LISTED_TERMS: usize = 12;

/// Probability from a discrete distribution, with the distribution's moments
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityResult {
    pub probability: f64,
    /// `probability × 100`
    pub percentage: f64,
    /// E[X]
    pub mean: f64,
    /// Var(X)
    pub variance: f64,
}

impl ProbabilityResult {
    pub fn new(probability: f64, mean: f64, variance: f64) -> Self {
        let probability = probability.clamp(0.0, 1.0);
        Self {
            probability,
            percentage: probability * 100.0,
            mean,
            variance,
        }
    }
}

/// ln C(n, k) via log-gamma
pub(crate) fn ln_choose(n: i64, k: i64) -> f64 {
    gamma_ln(n as f64 + 1.0) - gamma_ln(k as f64 + 1.0) - gamma_ln((n - k) as f64 + 1.0)
}

/// C(n, k) for already validated arguments
pub(crate) fn choose(n: i64, k: i64) -> f64 {
    combinations(n, k).unwrap_or(f64::INFINITY)
}

/// Final step shared by the point and range calculators
pub(crate) fn result_step(label: &str, result: &ProbabilityResult, moments: String) -> CalculationStep {
    CalculationStep::new("result", "Final result")
        .with_calculation(format!(
            "{} = {} ({})",
            label,
            format_probability(result.probability, PROB_DECIMALS),
            format_percent(result.probability, 4)
        ))
        .with_result(format_probability(result.probability, PROB_DECIMALS))
        .with_note(moments)
}

/// Per-term lines and the sum line for a range calculation
pub(crate) fn range_lines(terms: &[(i64, f64)]) -> (String, String) {
    let line = |(k, p): &(i64, f64)| format!("P(X = {}) = {}", k, format_probability(*p, PROB_DECIMALS));
    let listed: Vec<String> = if terms.len() > MAX_LISTED_TERMS {
        let head = terms[..3].iter().map(line);
        let tail = terms[terms.len() - 3..].iter().map(line);
        head.chain(std::iter::once("…".to_string())).chain(tail).collect()
    } else {
        terms.iter().map(line).collect()
    };

    let total: f64 = terms.iter().map(|(_, p)| p).sum();
    let addends: Vec<String> = terms.iter().map(|(_, p)| format_probability(*p, PROB_DECIMALS)).collect();
    let sum_line = if addends.len() > MAX_LISTED_TERMS {
        format!(
            "{} + … + {} = {}",
            addends[..3].join(" + "),
            addends[addends.len() - 3..].join(" + "),
            format_probability(total, PROB_DECIMALS)
        )
    } else {
        format!("{} = {}", addends.join(" + "), format_probability(total, PROB_DECIMALS))
    };
    (listed.join("\n"), sum_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ln_choose_matches_combinations() {
        assert!((ln_choose(10, 4).exp() - 210.0).abs() < 1e-6);
        assert!((ln_choose(52, 5).exp() - 2598960.0).abs() < 1e-2);
    }

    #[test]
    fn test_range_lines_abbreviate() {
        let terms: Vec<(i64, f64)> = (0..20).map(|k| (k, 0.05)).collect();
        let (listed, sum) = range_lines(&terms);
        assert!(listed.contains('…'));
        assert_eq!(listed.lines().count(), 7);
        assert!(sum.ends_with("= 1"));
    }
}
