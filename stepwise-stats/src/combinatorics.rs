//! Factorials, combinations and permutations
//!
//! The plain functions raise on bad input; callers are expected to guard
//! them. The `*_with_steps` variants validate first and narrate.

use crate::helpers::descending_product;
use serde::{Deserialize, Serialize};
use std::sync::{OnceLock, PoisonError, RwLock};
use stepwise_core::prelude::*;
use tracing::trace;

/// Largest n whose factorial is finite in f64
pub const MAX_FACTORIAL: i64 = 170;

/// Memoized factorial table indexed by n.
///
/// Entries are only ever appended, so concurrent readers always see
/// either a miss or the final value.
#[derive(Debug)]
pub struct Factorials {
    memo: RwLock<Vec<f64>>,
}

impl Factorials {
    pub fn new() -> Self {
        Self {
            memo: RwLock::new(vec![1.0, 1.0]),
        }
    }

    /// Process-wide table used by the free functions
    pub fn shared() -> &'static Factorials {
        static SHARED: OnceLock<Factorials> = OnceLock::new();
        SHARED.get_or_init(Factorials::new)
    }

    /// n! for n ≥ 0; infinite above 170
    pub fn factorial(&self, n: i64) -> Result<f64, MathError> {
        if n < 0 {
            return Err(MathError::domain(format!(
                "factorial is not defined for negative numbers (got {})",
                n
            )));
        }
        if n > MAX_FACTORIAL {
            return Ok(f64::INFINITY);
        }
        let n = n as usize;
        {
            let memo = self.memo.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(v) = memo.get(n) {
                return Ok(*v);
            }
        }
        let mut memo = self.memo.write().unwrap_or_else(PoisonError::into_inner);
        while memo.len() <= n {
            let k = memo.len();
            let next = memo[k - 1] * k as f64;
            memo.push(next);
        }
        trace!(cached = memo.len(), "factorial table grew");
        Ok(memo[n])
    }

    pub fn cached_len(&self) -> usize {
        self.memo.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Drop everything but 0! and 1!
    pub fn reset(&self) {
        let mut memo = self.memo.write().unwrap_or_else(PoisonError::into_inner);
        memo.truncate(2);
    }
}

impl Default for Factorials {
    fn default() -> Self {
        Self::new()
    }
}

pub fn factorial(n: i64) -> Result<f64, MathError> {
    Factorials::shared().factorial(n)
}

/// C(n, r): 0 when r > n, 1 when r is 0 or n
pub fn combinations(n: i64, r: i64) -> Result<f64, MathError> {
    if n < 0 || r < 0 {
        return Err(MathError::domain(format!(
            "combinations need non-negative n and r (got n = {}, r = {})",
            n, r
        )));
    }
    if r > n {
        return Ok(0.0);
    }
    if r == 0 || r == n {
        return Ok(1.0);
    }
    if n <= MAX_FACTORIAL {
        let value = factorial(n)? / (factorial(r)? * factorial(n - r)?);
        return Ok(value.round());
    }
    // Multiplicative form stays finite where n! overflows
    let r = r.min(n - r);
    let mut value = 1.0;
    for i in 0..r {
        value *= (n - i) as f64 / (i + 1) as f64;
        if value.is_infinite() {
            return Err(MathError::Overflow);
        }
    }
    Ok(value.round())
}

/// P(n, r): 0 when r > n
pub fn permutations(n: i64, r: i64) -> Result<f64, MathError> {
    if n < 0 || r < 0 {
        return Err(MathError::domain(format!(
            "permutations need non-negative n and r (got n = {}, r = {})",
            n, r
        )));
    }
    if r > n {
        return Ok(0.0);
    }
    if n <= MAX_FACTORIAL {
        return Ok((factorial(n)? / factorial(n - r)?).round());
    }
    let mut value = 1.0;
    for i in 0..r {
        value *= (n - i) as f64;
        if value.is_infinite() {
            return Err(MathError::Overflow);
        }
    }
    Ok(value)
}

/// Number of arrangements or selections
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CountResult {
    pub count: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CountKind {
    Combinations,
    Permutations,
}

impl CountKind {
    fn symbol(self) -> &'static str {
        match self {
            CountKind::Combinations => "C",
            CountKind::Permutations => "P",
        }
    }

    fn formula(self) -> String {
        match self {
            CountKind::Combinations => format!("C(n, r) = {}", tex::frac("n!", "r!(n-r)!")),
            CountKind::Permutations => format!("P(n, r) = {}", tex::frac("n!", "(n-r)!")),
        }
    }
}

/// Validate n and r for a narrated count; the reason when invalid
fn count_problem(n: i64, r: i64) -> Option<String> {
    if n < 0 || r < 0 {
        Some("n and r must be non-negative integers".to_string())
    } else if r > n {
        Some(format!("r ({}) cannot be greater than n ({})", r, n))
    } else if n > MAX_FACTORIAL {
        Some(format!("n must be at most {} to keep n! finite", MAX_FACTORIAL))
    } else {
        None
    }
}

fn narrate_count(kind: CountKind, n: i64, r: i64) -> Result<Outcome<CountResult>, MathError> {
    let symbol = kind.symbol();
    let inputs = Inputs::new().number("n", n as f64).number("r", r as f64);
    let mut steps = StepLog::new();

    let meaning = match kind {
        CountKind::Combinations => "Choosing r items from n where order does not matter",
        CountKind::Permutations => "Arranging r items chosen from n where order matters",
    };
    steps.push(
        CalculationStep::new("identify", "Identify the values")
            .with_description(meaning)
            .with_calculation(format!("n = {}, r = {}", n, r)),
    );

    if let Some(reason) = count_problem(n, r) {
        steps.push(
            CalculationStep::new("invalid", "Invalid input")
                .with_description(reason.clone())
                .with_result("0"),
        );
        return Ok(Outcome::invalid(reason, steps, kind.formula(), inputs));
    }

    steps.push(CalculationStep::new("formula", "State the formula").with_formula(kind.formula()));

    let substituted = match kind {
        CountKind::Combinations => tex::frac(format!("{}!", n), format!("{}! \\cdot {}!", r, n - r)),
        CountKind::Permutations => tex::frac(format!("{}!", n), format!("{}!", n - r)),
    };
    steps.push(
        CalculationStep::new("substitute", "Substitute the values")
            .with_calculation(format!("{}({}, {}) = {}", symbol, n, r, substituted)),
    );

    let count = match kind {
        CountKind::Combinations => combinations(n, r)?,
        CountKind::Permutations => permutations(n, r)?,
    };

    match kind {
        CountKind::Permutations => {
            let mut lines = Vec::new();
            if n <= 12 {
                lines.push(format!("{}! = {}", n, descending_product(n, 0)));
            }
            let cancels = 0 < n - r && n - r < n;
            if cancels {
                lines.push(format!("{}! / {}! = {}", n, n - r, descending_product(n, n - r)));
            } else {
                lines.push(format!(
                    "{} / {} = {}",
                    format_number(factorial(n)?, 0),
                    format_number(factorial(n - r)?, 0),
                    format_number(count, 0)
                ));
            }
            let mut step = CalculationStep::new("expand", "Expand the factorials").with_calculation(lines.join("\n"));
            if cancels {
                step = step.with_note(format!("The {}! terms cancel", n - r));
            }
            steps.push(step);
        }
        CountKind::Combinations => {
            // Cancel the larger factorial in the denominator
            let keep = r.max(n - r);
            let other = r.min(n - r);
            let numerator = permutations(n, n - keep)?;
            let denominator = factorial(other)?;
            steps.push(
                CalculationStep::new("expand", "Cancel and divide")
                    .with_calculation(format!(
                        "{} / {}! = {} / {}",
                        descending_product(n, keep),
                        other,
                        format_number(numerator, 0),
                        format_number(denominator, 0)
                    ))
                    .with_note(format!("The {}! terms cancel", keep)),
            );
        }
    }

    steps.push(
        CalculationStep::new("result", "Result")
            .with_calculation(format!("{}({}, {}) = {}", symbol, n, r, format_number(count, 0)))
            .with_result(format_number(count, 0)),
    );

    Ok(Outcome::ok(CountResult { count }, steps, kind.formula(), inputs))
}

/// C(n, r) with narrated steps
pub fn combinations_with_steps(n: i64, r: i64) -> Result<Outcome<CountResult>, MathError> {
    narrate_count(CountKind::Combinations, n, r)
}

/// P(n, r) with narrated steps
pub fn permutations_with_steps(n: i64, r: i64) -> Result<Outcome<CountResult>, MathError> {
    narrate_count(CountKind::Permutations, n, r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial_values() {
        assert_eq!(factorial(0).unwrap(), 1.0);
        assert_eq!(factorial(1).unwrap(), 1.0);
        assert_eq!(factorial(10).unwrap(), 3628800.0);
        assert!(factorial(170).unwrap().is_finite());
        assert!(factorial(171).unwrap().is_infinite());
    }

    #[test]
    fn test_factorial_negative_raises() {
        assert!(matches!(factorial(-1), Err(MathError::Domain(_))));
    }

    #[test]
    fn test_factorial_cache_is_resettable() {
        let table = Factorials::new();
        assert_eq!(table.cached_len(), 2);
        assert_eq!(table.factorial(6).unwrap(), 720.0);
        assert_eq!(table.cached_len(), 7);
        table.reset();
        assert_eq!(table.cached_len(), 2);
        assert_eq!(table.factorial(5).unwrap(), 120.0);
    }

    #[test]
    fn test_combinations() {
        assert_eq!(combinations(5, 7).unwrap(), 0.0);
        assert_eq!(combinations(9, 0).unwrap(), 1.0);
        assert_eq!(combinations(9, 9).unwrap(), 1.0);
        assert_eq!(combinations(10, 3).unwrap(), 120.0);
        assert_eq!(combinations(200, 2).unwrap(), 19900.0);
    }

    #[test]
    fn test_permutations() {
        assert_eq!(permutations(5, 7).unwrap(), 0.0);
        assert_eq!(permutations(10, 3).unwrap(), 720.0);
        assert_eq!(permutations(4, 4).unwrap(), 24.0);
        assert_eq!(permutations(4, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_large_counts_overflow_early() {
        assert!(matches!(combinations(100_000, 50_000), Err(MathError::Overflow)));
        assert!(matches!(combinations(i64::MAX, i64::MAX / 2), Err(MathError::Overflow)));
        assert!(matches!(permutations(i64::MAX, i64::MAX - 1), Err(MathError::Overflow)));
        assert_eq!(permutations(200, 2).unwrap(), 39800.0);
    }

    #[test]
    fn test_combinations_with_steps_order() {
        let outcome = combinations_with_steps(10, 3).unwrap();
        assert_eq!(outcome.steps().ids(), vec!["identify", "formula", "substitute", "expand", "result"]);
        assert_eq!(outcome.value().map(|v| v.count), Some(120.0));
        assert_eq!(outcome.find_step("result").and_then(|s| s.result.clone()).as_deref(), Some("120"));
    }

    #[test]
    fn test_permutations_with_steps_cancels() {
        let outcome = permutations_with_steps(10, 3).unwrap();
        let expand = outcome.find_step("expand").unwrap();
        assert!(expand.calculation.as_deref().unwrap().contains("10 × 9 × 8"));
        assert_eq!(outcome.value().map(|v| v.count), Some(720.0));
    }

    #[test]
    fn test_with_steps_invalid_is_soft() {
        let outcome = permutations_with_steps(3, 5).unwrap();
        assert!(outcome.is_invalid());
        assert!(outcome.steps().contains("invalid"));
        assert_eq!(outcome.value_or_default().count, 0.0);
    }
}
