//! Poisson distribution

use super::{range_lines, result_step, ProbabilityResult, PROB_DECIMALS};
use crate::combinatorics::{factorial, MAX_FACTORIAL};
use stepwise_core::prelude::*;
use stepwise_tables::distributions::gamma_ln;

const FORMULA: &str = "P(X = k) = \\frac{e^{-\\lambda} \\cdot \\lambda^{k}}{k!}";

/// Largest upper bound a range sum will enumerate
const MAX_RANGE_K: i64 = 10_000;

const RANGE_FORMULA: &str = "P(a \\le X \\le b) = \\sum_{k=a}^{b} \\frac{e^{-\\lambda} \\cdot \\lambda^{k}}{k!}";

/// P(X = k) for X ~ Poisson(λ); 0 for λ ≤ 0 or k < 0
pub fn poisson_pmf(lambda: f64, k: i64) -> f64 {
    if !(lambda > 0.0) || !lambda.is_finite() || k < 0 {
        return 0.0;
    }
    let k = k as f64;
    (k * lambda.ln() - lambda - gamma_ln(k + 1.0)).exp()
}

/// Past the mode, summing stops once a term falls below this share of the total
const TAIL_CUTOFF: f64 = 1e-17;

/// P(X ≤ k)
pub fn poisson_cdf(lambda: f64, k: i64) -> f64 {
    if k < 0 {
        return 0.0;
    }
    let mut total = 0.0;
    for i in 0..=k {
        let term = poisson_pmf(lambda, i);
        total += term;
        if i as f64 > lambda && term <= total * TAIL_CUTOFF {
            break;
        }
    }
    total.min(1.0)
}

/// P(X > k) = 1 − P(X ≤ k); taken as 1 when λ ≤ 0
pub fn poisson_upper_tail(lambda: f64, k: i64) -> f64 {
    if !(lambda > 0.0) {
        return 1.0;
    }
    (1.0 - poisson_cdf(lambda, k)).max(0.0)
}

fn moments_note(lambda: f64) -> String {
    let l = format_number(lambda, 4);
    format!("E[X] = λ = {}, Var(X) = λ = {}", l, l)
}

fn lambda_problem(lambda: f64) -> Option<String> {
    if !(lambda > 0.0) || !lambda.is_finite() {
        Some(format!("The rate λ must be greater than 0 (got {})", format_number(lambda, 4)))
    } else {
        None
    }
}

fn invalid(
    mut steps: StepLog,
    reason: String,
    formula: &str,
    inputs: Inputs,
) -> Outcome<ProbabilityResult> {
    steps.push(
        CalculationStep::new("invalid", "Invalid input")
            .with_description(reason.clone())
            .with_result("0"),
    );
    Outcome::invalid(reason, steps, formula, inputs)
}

/// P(X = k) with narrated steps
pub fn poisson_with_steps(lambda: f64, k: i64) -> Outcome<ProbabilityResult> {
    let inputs = Inputs::new().number("lambda", lambda).number("k", k as f64);
    let mut steps = StepLog::new();
    let l = format_number(lambda, PROB_DECIMALS);

    steps.push(
        CalculationStep::new("identify", "Identify the parameters")
            .with_description("X counts events in a fixed interval with average rate λ")
            .with_calculation(format!("λ = {}, k = {}", l, k)),
    );

    let problem = lambda_problem(lambda).or_else(|| {
        if k < 0 {
            Some("The number of events k must be a non-negative integer".to_string())
        } else if k > MAX_FACTORIAL {
            Some(format!("The number of events k must be at most {}", MAX_FACTORIAL))
        } else {
            None
        }
    });
    if let Some(reason) = problem {
        return invalid(steps, reason, FORMULA, inputs);
    }

    steps.push(CalculationStep::new("formula", "Poisson probability formula").with_formula(FORMULA));

    steps.push(
        CalculationStep::new("substitution", "Substitute the values").with_calculation(format!(
            "P(X = {}) = {}",
            k,
            tex::frac(
                format!("e^{{-{}}}{}{}", l, tex::CDOT, tex::pow(&l, k.to_string())),
                format!("{}!", k)
            )
        )),
    );

    let exponential = (-lambda).exp();
    steps.push(
        CalculationStep::new("exponential", "Exponential term")
            .with_calculation(format!("e^{{-{}}} = {}", l, format_number(exponential, PROB_DECIMALS)))
            .with_result(format_number(exponential, PROB_DECIMALS)),
    );

    let power = lambda.powi(k as i32);
    steps.push(
        CalculationStep::new("power", "Power term")
            .with_calculation(format!("{} = {}", tex::pow(&l, k.to_string()), format_number(power, PROB_DECIMALS)))
            .with_result(format_number(power, PROB_DECIMALS)),
    );

    let k_factorial = factorial(k).unwrap_or(f64::INFINITY);
    steps.push(
        CalculationStep::new("factorial", "Factorial term")
            .with_calculation(format!("{}! = {}", k, format_number(k_factorial, 0)))
            .with_result(format_number(k_factorial, 0)),
    );

    let probability = poisson_pmf(lambda, k);
    steps.push(
        CalculationStep::new("divide", "Multiply and divide")
            .with_calculation(format!(
                "({} × {}) / {} = {}",
                format_number(exponential, PROB_DECIMALS),
                format_number(power, PROB_DECIMALS),
                format_number(k_factorial, 0),
                format_probability(probability, PROB_DECIMALS)
            ))
            .with_result(format_probability(probability, PROB_DECIMALS)),
    );

    let result = ProbabilityResult::new(probability, lambda, lambda);
    steps.push(result_step(&format!("P(X = {})", k), &result, moments_note(lambda)));

    Outcome::ok(result, steps, FORMULA, inputs)
}

/// P(min ≤ X ≤ max) with narrated steps; min is clamped to 0
pub fn poisson_range_with_steps(lambda: f64, min: i64, max: i64) -> Outcome<ProbabilityResult> {
    let low = min.max(0);
    let inputs = Inputs::new()
        .number("lambda", lambda)
        .number("min", low as f64)
        .number("max", max as f64);
    let mut steps = StepLog::new();

    steps.push(
        CalculationStep::new("identify", "Identify the parameters")
            .with_description("Sum the Poisson probabilities over every k in the range")
            .with_calculation(format!(
                "λ = {}, range {} ≤ X ≤ {}",
                format_number(lambda, PROB_DECIMALS),
                low,
                max
            )),
    );

    let problem = lambda_problem(lambda).or_else(|| {
        if low > max {
            Some(format!("The minimum ({}) cannot be greater than the maximum ({})", min, max))
        } else if max > MAX_RANGE_K {
            Some(format!("The maximum must be at most {}", MAX_RANGE_K))
        } else {
            None
        }
    });
    if let Some(reason) = problem {
        return invalid(steps, reason, RANGE_FORMULA, inputs);
    }

    steps.push(CalculationStep::new("formula", "Sum of point probabilities").with_formula(RANGE_FORMULA));

    let terms: Vec<(i64, f64)> = (low..=max).map(|k| (k, poisson_pmf(lambda, k))).collect();
    let (listed, sum_line) = range_lines(&terms);
    steps.push(CalculationStep::new("calculations", "Individual probabilities").with_calculation(listed));

    let probability: f64 = terms.iter().map(|(_, pk)| pk).sum();
    steps.push(
        CalculationStep::new("sum", "Add the probabilities")
            .with_calculation(sum_line)
            .with_result(format_probability(probability, PROB_DECIMALS)),
    );

    let result = ProbabilityResult::new(probability, lambda, lambda);
    steps.push(result_step(&format!("P({} ≤ X ≤ {})", low, max), &result, moments_note(lambda)));

    Outcome::ok(result, steps, RANGE_FORMULA, inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pmf_values() {
        // λ = 3, k = 2: e^-3 · 9 / 2
        let expected = (-3.0f64).exp() * 4.5;
        assert!((poisson_pmf(3.0, 2) - expected).abs() < 1e-9);
        assert_eq!(poisson_pmf(0.0, 2), 0.0);
        assert_eq!(poisson_pmf(3.0, -1), 0.0);
    }

    #[test]
    fn test_upper_tail_is_strict() {
        for k in 0..10 {
            let expected = 1.0 - poisson_cdf(2.5, k);
            assert!((poisson_upper_tail(2.5, k) - expected).abs() < 1e-12);
        }
        assert_eq!(poisson_upper_tail(0.0, 3), 1.0);
        assert_eq!(poisson_upper_tail(-1.0, 3), 1.0);
    }

    #[test]
    fn test_cdf_with_huge_k_stops_in_the_tail() {
        let total = poisson_cdf(3.0, i64::MAX);
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(total, poisson_cdf(3.0, 60));
        assert!(poisson_upper_tail(3.0, i64::MAX) < 1e-12);
        assert!((poisson_cdf(500.0, i64::MAX) - 1.0).abs() < 1e-9);

        let expected = (-3.0f64).exp() * (1.0 + 3.0 + 4.5);
        assert!((poisson_cdf(3.0, 2) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_with_steps_sequence() {
        let outcome = poisson_with_steps(3.0, 2);
        assert_eq!(
            outcome.steps().ids(),
            vec!["identify", "formula", "substitution", "exponential", "power", "factorial", "divide", "result"]
        );
        let value = outcome.value().unwrap();
        assert!((value.probability - 0.224041807).abs() < 1e-7);
        assert_eq!(value.mean, 3.0);
    }

    #[test]
    fn test_with_steps_invalid_lambda() {
        let outcome = poisson_with_steps(0.0, 2);
        assert!(outcome.is_invalid());
        assert!(outcome.steps().contains("invalid"));
    }

    #[test]
    fn test_range() {
        let outcome = poisson_range_with_steps(2.0, 0, 2);
        let expected = poisson_cdf(2.0, 2);
        assert!((outcome.value().unwrap().probability - expected).abs() < 1e-12);
        assert!(poisson_range_with_steps(2.0, 3, 1).is_invalid());
    }
}
