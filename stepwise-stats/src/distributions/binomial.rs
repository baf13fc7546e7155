//! Binomial distribution

use super::{choose, ln_choose, range_lines, result_step, ProbabilityResult, PROB_DECIMALS};
use crate::combinatorics::MAX_FACTORIAL;
use stepwise_core::prelude::*;

const FORMULA: &str = "P(X = k) = \\binom{n}{k} \\cdot p^{k} \\cdot (1-p)^{n-k}";
const RANGE_FORMULA: &str = "P(a \\le X \\le b) = \\sum_{k=a}^{b} \\binom{n}{k} \\cdot p^{k} \\cdot (1-p)^{n-k}";

/// P(X = k) for X ~ Binomial(n, p); 0 outside the support
pub fn binomial_pmf(n: i64, k: i64, p: f64) -> f64 {
    if n < 0 || k < 0 || k > n || !(0.0..=1.0).contains(&p) {
        return 0.0;
    }
    if p == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if p == 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }
    if n <= MAX_FACTORIAL {
        choose(n, k) * p.powi(k as i32) * (1.0 - p).powi((n - k) as i32)
    } else {
        (ln_choose(n, k) + k as f64 * p.ln() + (n - k) as f64 * (1.0 - p).ln()).exp()
    }
}

/// P(X ≤ k)
pub fn binomial_cdf(n: i64, k: i64, p: f64) -> f64 {
    if k < 0 {
        return 0.0;
    }
    let upper = k.min(n);
    let total: f64 = (0..=upper).map(|i| binomial_pmf(n, i, p)).sum();
    total.min(1.0)
}

/// P(X ≥ k) = 1 − P(X ≤ k − 1)
pub fn binomial_upper_tail(n: i64, k: i64, p: f64) -> f64 {
    if k <= 0 {
        return 1.0;
    }
    (1.0 - binomial_cdf(n, k - 1, p)).max(0.0)
}

fn moments(n: i64, p: f64) -> (f64, f64) {
    let mean = n as f64 * p;
    (mean, mean * (1.0 - p))
}

fn moments_note(n: i64, p: f64) -> String {
    let (mean, variance) = moments(n, p);
    format!(
        "E[X] = np = {}, Var(X) = np(1-p) = {}",
        format_number(mean, 4),
        format_number(variance, 4)
    )
}

fn parameter_problem(n: i64, p: f64) -> Option<String> {
    if n < 0 {
        Some("The number of trials n must be a non-negative integer".to_string())
    } else if n > MAX_FACTORIAL {
        Some(format!("The number of trials n must be at most {}", MAX_FACTORIAL))
    } else if !(0.0..=1.0).contains(&p) {
        Some(format!("The probability p must be between 0 and 1 (got {})", format_number(p, 4)))
    } else {
        None
    }
}

/// P(X = k) with narrated steps
pub fn binomial_with_steps(n: i64, k: i64, p: f64) -> Outcome<ProbabilityResult> {
    let inputs = Inputs::new().number("n", n as f64).number("k", k as f64).number("p", p);
    let mut steps = StepLog::new();
    let q = 1.0 - p;

    steps.push(
        CalculationStep::new("identify", "Identify the parameters")
            .with_description("X counts successes in n independent trials with success probability p")
            .with_calculation(format!(
                "n = {}, k = {}, p = {}, 1 - p = {}",
                n,
                k,
                format_number(p, PROB_DECIMALS),
                format_number(q, PROB_DECIMALS)
            )),
    );

    let problem = parameter_problem(n, p).or_else(|| {
        if k < 0 || k > n {
            Some(format!("The number of successes k must be between 0 and n ({})", n))
        } else {
            None
        }
    });
    if let Some(reason) = problem {
        steps.push(
            CalculationStep::new("invalid", "Invalid input")
                .with_description(reason.clone())
                .with_result("0"),
        );
        return Outcome::invalid(reason, steps, FORMULA, inputs);
    }

    steps.push(CalculationStep::new("formula", "Binomial probability formula").with_formula(FORMULA));

    let p_str = format_number(p, PROB_DECIMALS);
    let q_str = format_number(q, PROB_DECIMALS);
    steps.push(
        CalculationStep::new("substitution", "Substitute the values").with_calculation(format!(
            "P(X = {}) = {}{}{}{}{}",
            k,
            tex::binom(n.to_string(), k.to_string()),
            tex::CDOT,
            tex::pow(&p_str, k.to_string()),
            tex::CDOT,
            tex::pow(&q_str, (n - k).to_string())
        )),
    );

    let combination = choose(n, k);
    steps.push(
        CalculationStep::new("combination", "Number of ways to choose k successes")
            .with_calculation(format!(
                "{} = {} = {}",
                tex::binom(n.to_string(), k.to_string()),
                tex::frac(format!("{}!", n), format!("{}! \\cdot {}!", k, n - k)),
                format_number(combination, 0)
            ))
            .with_result(format_number(combination, 0)),
    );

    let success = p.powi(k as i32);
    steps.push(
        CalculationStep::new("success-power", "Probability of k successes")
            .with_calculation(format!("{} = {}", tex::pow(&p_str, k.to_string()), format_number(success, PROB_DECIMALS)))
            .with_result(format_number(success, PROB_DECIMALS)),
    );

    let failure = q.powi((n - k) as i32);
    steps.push(
        CalculationStep::new("failure-power", "Probability of n - k failures")
            .with_calculation(format!(
                "{} = {}",
                tex::pow(&q_str, (n - k).to_string()),
                format_number(failure, PROB_DECIMALS)
            ))
            .with_result(format_number(failure, PROB_DECIMALS)),
    );

    let probability = binomial_pmf(n, k, p);
    steps.push(
        CalculationStep::new("multiply", "Multiply the terms")
            .with_calculation(format!(
                "{} × {} × {} = {}",
                format_number(combination, 0),
                format_number(success, PROB_DECIMALS),
                format_number(failure, PROB_DECIMALS),
                format_probability(probability, PROB_DECIMALS)
            ))
            .with_result(format_probability(probability, PROB_DECIMALS)),
    );

    let (mean, variance) = moments(n, p);
    let result = ProbabilityResult::new(probability, mean, variance);
    steps.push(result_step(&format!("P(X = {})", k), &result, moments_note(n, p)));

    Outcome::ok(result, steps, FORMULA, inputs)
}

/// P(min ≤ X ≤ max) with narrated steps.
///
/// The bounds are clamped to the support [0, n] before checking that
/// min ≤ max.
pub fn binomial_range_with_steps(n: i64, min: i64, max: i64, p: f64) -> Outcome<ProbabilityResult> {
    let mut steps = StepLog::new();
    let low = min.max(0);
    let high = if n >= 0 { max.min(n) } else { max };
    let inputs = Inputs::new()
        .number("n", n as f64)
        .number("min", low as f64)
        .number("max", high as f64)
        .number("p", p);

    steps.push(
        CalculationStep::new("identify", "Identify the parameters")
            .with_description("Sum the binomial probabilities over every k in the range")
            .with_calculation(format!(
                "n = {}, p = {}, range {} ≤ X ≤ {}",
                n,
                format_number(p, PROB_DECIMALS),
                low,
                high
            )),
    );

    let problem = parameter_problem(n, p).or_else(|| {
        if min > max {
            Some(format!("The minimum ({}) cannot be greater than the maximum ({})", min, max))
        } else if low > high {
            Some(format!("The range {} to {} lies outside the possible outcomes 0 to {}", min, max, n))
        } else {
            None
        }
    });
    if let Some(reason) = problem {
        steps.push(
            CalculationStep::new("invalid", "Invalid input")
                .with_description(reason.clone())
                .with_result("0"),
        );
        return Outcome::invalid(reason, steps, RANGE_FORMULA, inputs);
    }

    steps.push(CalculationStep::new("formula", "Sum of point probabilities").with_formula(RANGE_FORMULA));

    let terms: Vec<(i64, f64)> = (low..=high).map(|k| (k, binomial_pmf(n, k, p))).collect();
    let (listed, sum_line) = range_lines(&terms);
    steps.push(CalculationStep::new("calculations", "Individual probabilities").with_calculation(listed));

    let probability: f64 = terms.iter().map(|(_, pk)| pk).sum();
    steps.push(
        CalculationStep::new("sum", "Add the probabilities")
            .with_calculation(sum_line)
            .with_result(format_probability(probability, PROB_DECIMALS)),
    );

    let (mean, variance) = moments(n, p);
    let result = ProbabilityResult::new(probability, mean, variance);
    steps.push(result_step(&format!("P({} ≤ X ≤ {})", low, high), &result, moments_note(n, p)));

    Outcome::ok(result, steps, RANGE_FORMULA, inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pmf_matches_formula() {
        let expected = 210.0 * 0.5f64.powi(10);
        assert!((binomial_pmf(10, 4, 0.5) - expected).abs() < 1e-12);
        assert_eq!(binomial_pmf(10, 11, 0.5), 0.0);
        assert_eq!(binomial_pmf(5, 0, 0.0), 1.0);
        assert_eq!(binomial_pmf(5, 5, 1.0), 1.0);
    }

    #[test]
    fn test_pmf_sums_to_one() {
        for &(n, p) in &[(10, 0.3), (25, 0.5), (200, 0.01)] {
            let total: f64 = (0..=n).map(|k| binomial_pmf(n, k, p)).sum();
            assert!((total - 1.0).abs() < 1e-6, "n={} p={} total={}", n, p, total);
        }
    }

    #[test]
    fn test_upper_tail_convention() {
        for k in 1..=10 {
            let expected = 1.0 - binomial_cdf(10, k - 1, 0.4);
            assert!((binomial_upper_tail(10, k, 0.4) - expected).abs() < 1e-12);
        }
        assert_eq!(binomial_upper_tail(10, 0, 0.4), 1.0);
    }

    #[test]
    fn test_with_steps_sequence() {
        let outcome = binomial_with_steps(10, 4, 0.5);
        assert_eq!(
            outcome.steps().ids(),
            vec![
                "identify",
                "formula",
                "substitution",
                "combination",
                "success-power",
                "failure-power",
                "multiply",
                "result"
            ]
        );
        let value = outcome.value().unwrap();
        assert!((value.probability - 0.205078125).abs() < 1e-12);
        assert_eq!(value.mean, 5.0);
        assert_eq!(value.variance, 2.5);
        assert_eq!(outcome.find_step("combination").unwrap().result.as_deref(), Some("210"));
    }

    #[test]
    fn test_with_steps_invalid() {
        let outcome = binomial_with_steps(5, 7, 0.5);
        assert!(outcome.is_invalid());
        assert_eq!(outcome.steps().ids(), vec!["identify", "invalid"]);
        assert_eq!(outcome.value_or_default().probability, 0.0);

        assert!(binomial_with_steps(5, 2, 1.5).is_invalid());
    }

    #[test]
    fn test_range_scenario() {
        let outcome = binomial_range_with_steps(10, 4, 6, 0.5);
        let value = outcome.value().unwrap();
        assert!((value.probability - 0.65625).abs() < 1e-9);
        for id in ["identify", "formula", "calculations", "sum"] {
            assert!(outcome.steps().contains(id), "missing step {}", id);
        }
    }

    #[test]
    fn test_range_min_above_max() {
        let outcome = binomial_range_with_steps(10, 5, 4, 0.5);
        assert!(outcome.is_invalid());
        assert!(outcome.steps().contains("invalid"));
        assert_eq!(outcome.value_or_default().probability, 0.0);
        assert_eq!(outcome.reason(), Some("The minimum (5) cannot be greater than the maximum (4)"));
    }

    #[test]
    fn test_range_beyond_support() {
        let outcome = binomial_range_with_steps(10, 12, 15, 0.5);
        assert!(outcome.is_invalid());
        assert_eq!(outcome.reason(), Some("The range 12 to 15 lies outside the possible outcomes 0 to 10"));

        let below = binomial_range_with_steps(10, -5, -1, 0.5);
        assert_eq!(below.reason(), Some("The range -5 to -1 lies outside the possible outcomes 0 to 10"));
    }
}
