//! Hypergeometric distribution
//!
//! Drawing n items without replacement from a population of N that holds
//! K successes; X counts the successes drawn.

use super::{choose, ln_choose, result_step, ProbabilityResult, PROB_DECIMALS};
use crate::combinatorics::MAX_FACTORIAL;
use stepwise_core::prelude::*;

const FORMULA: &str = "P(X = k) = \\frac{\\binom{K}{k} \\cdot \\binom{N-K}{n-k}}{\\binom{N}{n}}";

/// Smallest and largest k with non-zero probability
fn support(population: i64, successes: i64, draws: i64) -> (i64, i64) {
    let low = (draws - (population - successes)).max(0);
    let high = draws.min(successes);
    (low, high)
}

fn parameters_valid(population: i64, successes: i64, draws: i64) -> bool {
    population >= 0 && successes >= 0 && draws >= 0 && successes <= population && draws <= population
}

/// P(X = k); 0 outside the support or for inconsistent parameters
pub fn hypergeometric_pmf(population: i64, successes: i64, draws: i64, k: i64) -> f64 {
    if !parameters_valid(population, successes, draws) {
        return 0.0;
    }
    let (low, high) = support(population, successes, draws);
    if k < low || k > high {
        return 0.0;
    }
    (ln_choose(successes, k) + ln_choose(population - successes, draws - k) - ln_choose(population, draws)).exp()
}

/// P(X ≤ k)
pub fn hypergeometric_cdf(population: i64, successes: i64, draws: i64, k: i64) -> f64 {
    if !parameters_valid(population, successes, draws) {
        return 0.0;
    }
    let (low, high) = support(population, successes, draws);
    if k < low {
        return 0.0;
    }
    let total: f64 = (low..=k.min(high))
        .map(|i| hypergeometric_pmf(population, successes, draws, i))
        .sum();
    total.min(1.0)
}

/// P(X ≥ k) = 1 − P(X ≤ k − 1)
pub fn hypergeometric_upper_tail(population: i64, successes: i64, draws: i64, k: i64) -> f64 {
    (1.0 - hypergeometric_cdf(population, successes, draws, k - 1)).max(0.0)
}

fn moments(population: i64, successes: i64, draws: i64) -> (f64, f64) {
    let (big_n, big_k, n) = (population as f64, successes as f64, draws as f64);
    if big_n == 0.0 {
        return (0.0, 0.0);
    }
    let share = big_k / big_n;
    let mean = n * share;
    let variance = if big_n > 1.0 {
        n * share * (1.0 - share) * (big_n - n) / (big_n - 1.0)
    } else {
        0.0
    };
    (mean, variance)
}

fn problem(population: i64, successes: i64, draws: i64, k: i64) -> Option<String> {
    if population < 0 || successes < 0 || draws < 0 || k < 0 {
        return Some("All parameters must be non-negative integers".to_string());
    }
    if population > MAX_FACTORIAL {
        return Some(format!("The population size N must be at most {}", MAX_FACTORIAL));
    }
    if successes > population {
        return Some(format!("Successes in the population K ({}) cannot exceed N ({})", successes, population));
    }
    if draws > population {
        return Some(format!("The sample size n ({}) cannot exceed N ({})", draws, population));
    }
    let (low, high) = support(population, successes, draws);
    if k < low || k > high {
        return Some(format!("k must be between {} and {} for these parameters", low, high));
    }
    None
}

/// P(X = k) with narrated steps
pub fn hypergeometric_with_steps(population: i64, successes: i64, draws: i64, k: i64) -> Outcome<ProbabilityResult> {
    let inputs = Inputs::new()
        .number("N", population as f64)
        .number("K", successes as f64)
        .number("n", draws as f64)
        .number("k", k as f64);
    let mut steps = StepLog::new();

    steps.push(
        CalculationStep::new("identify", "Identify the parameters")
            .with_description("Sampling without replacement: count the ways to draw k successes and n - k failures")
            .with_calculation(format!(
                "N = {} (population), K = {} (successes in population), n = {} (sample size), k = {} (successes drawn)",
                population, successes, draws, k
            )),
    );

    if let Some(reason) = problem(population, successes, draws, k) {
        steps.push(
            CalculationStep::new("invalid", "Invalid input")
                .with_description(reason.clone())
                .with_result("0"),
        );
        return Outcome::invalid(reason, steps, FORMULA, inputs);
    }

    steps.push(CalculationStep::new("formula", "Hypergeometric probability formula").with_formula(FORMULA));

    let failures_pop = population - successes;
    let failures_drawn = draws - k;
    steps.push(
        CalculationStep::new("substitution", "Substitute the values").with_calculation(format!(
            "P(X = {}) = {}",
            k,
            tex::frac(
                format!(
                    "{}{}{}",
                    tex::binom(successes.to_string(), k.to_string()),
                    tex::CDOT,
                    tex::binom(failures_pop.to_string(), failures_drawn.to_string())
                ),
                tex::binom(population.to_string(), draws.to_string())
            )
        )),
    );

    let ways_success = choose(successes, k);
    steps.push(
        CalculationStep::new("successes", "Ways to choose the successes")
            .with_calculation(format!(
                "{} = {}",
                tex::binom(successes.to_string(), k.to_string()),
                format_number(ways_success, 0)
            ))
            .with_result(format_number(ways_success, 0)),
    );

    let ways_failure = choose(failures_pop, failures_drawn);
    steps.push(
        CalculationStep::new("failures", "Ways to choose the failures")
            .with_calculation(format!(
                "{} = {}",
                tex::binom(failures_pop.to_string(), failures_drawn.to_string()),
                format_number(ways_failure, 0)
            ))
            .with_result(format_number(ways_failure, 0)),
    );

    let ways_total = choose(population, draws);
    steps.push(
        CalculationStep::new("total", "Total ways to draw the sample")
            .with_calculation(format!(
                "{} = {}",
                tex::binom(population.to_string(), draws.to_string()),
                format_number(ways_total, 0)
            ))
            .with_result(format_number(ways_total, 0)),
    );

    let probability = hypergeometric_pmf(population, successes, draws, k);
    steps.push(
        CalculationStep::new("divide", "Multiply and divide")
            .with_calculation(format!(
                "({} × {}) / {} = {}",
                format_number(ways_success, 0),
                format_number(ways_failure, 0),
                format_number(ways_total, 0),
                format_probability(probability, PROB_DECIMALS)
            ))
            .with_result(format_probability(probability, PROB_DECIMALS)),
    );

    let (mean, variance) = moments(population, successes, draws);
    let result = ProbabilityResult::new(probability, mean, variance);
    let note = format!(
        "E[X] = nK/N = {}, Var(X) = n(K/N)(1-K/N)(N-n)/(N-1) = {}",
        format_number(mean, 4),
        format_number(variance, 4)
    );
    steps.push(result_step(&format!("P(X = {})", k), &result, note));

    Outcome::ok(result, steps, FORMULA, inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pmf_card_example() {
        // Two aces in a five-card hand
        let expected = 6.0 * 17296.0 / 2598960.0;
        assert!((hypergeometric_pmf(52, 4, 5, 2) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pmf_sums_to_one() {
        let total: f64 = (0..=5).map(|k| hypergeometric_pmf(20, 7, 5, k)).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_support_bounds() {
        // N=10, K=8, n=5: at least 3 successes must be drawn
        assert_eq!(hypergeometric_pmf(10, 8, 5, 2), 0.0);
        assert!(hypergeometric_pmf(10, 8, 5, 3) > 0.0);
        assert!(hypergeometric_with_steps(10, 8, 5, 2).is_invalid());
    }

    #[test]
    fn test_upper_tail() {
        for k in 1..=5 {
            let expected = 1.0 - hypergeometric_cdf(20, 7, 5, k - 1);
            assert!((hypergeometric_upper_tail(20, 7, 5, k) - expected).abs() < 1e-12);
        }
        assert!((hypergeometric_upper_tail(20, 7, 5, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_with_steps() {
        let outcome = hypergeometric_with_steps(52, 4, 5, 2);
        assert_eq!(
            outcome.steps().ids(),
            vec!["identify", "formula", "substitution", "successes", "failures", "total", "divide", "result"]
        );
        assert_eq!(outcome.find_step("total").unwrap().result.as_deref(), Some("2598960"));
        let value = outcome.value().unwrap();
        assert!((value.mean - 5.0 * 4.0 / 52.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_parameters() {
        let outcome = hypergeometric_with_steps(10, 12, 5, 2);
        assert!(outcome.is_invalid());
        assert_eq!(outcome.value_or_default().probability, 0.0);
    }
}
