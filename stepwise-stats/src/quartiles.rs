//! Quartiles by Tukey's split
//!
//! With `mid = n / 2` the lower half is `[0, mid)` and the upper half
//! starts at `mid` for even n and `mid + 1` for odd n, so the median is
//! never part of either half.

use crate::helpers::{finite_values, median_sorted, sorted};
use serde::{Deserialize, Serialize};
use stepwise_core::MathError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Lower and upper halves of sorted data
pub fn halves(sorted: &[f64]) -> (&[f64], &[f64]) {
    let n = sorted.len();
    let mid = n / 2;
    let upper_start = if n % 2 == 0 { mid } else { mid + 1 };
    (&sorted[..mid], &sorted[upper_start.min(n)..])
}

/// Quartiles of data that is already sorted ascending
pub fn quartiles_sorted(sorted: &[f64]) -> Quartiles {
    let (lower, upper) = halves(sorted);
    Quartiles {
        q1: median_sorted(lower),
        median: median_sorted(sorted),
        q3: median_sorted(upper),
    }
}

/// Quartiles of the finite values in `data`; needs at least two
pub fn quartiles(data: &[f64]) -> Result<Quartiles, MathError> {
    let values = finite_values(data);
    if values.len() < 2 {
        return Err(MathError::InsufficientData {
            needed: 2,
            got: values.len(),
        });
    }
    Ok(quartiles_sorted(&sorted(&values)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_excludes_median() {
        let q = quartiles(&[10.0, 15.0, 20.0, 25.0, 30.0]).unwrap();
        assert_eq!(q.q1, 12.5);
        assert_eq!(q.median, 20.0);
        assert_eq!(q.q3, 27.5);
    }

    #[test]
    fn test_even_split() {
        let q = quartiles(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
        assert_eq!(q.q1, 2.5);
        assert_eq!(q.median, 4.5);
        assert_eq!(q.q3, 6.5);
        assert_eq!(q.iqr(), 4.0);
    }

    #[test]
    fn test_order_independent() {
        let a = quartiles(&[7.0, 1.0, 9.0, 3.0, 5.0, 2.0, 8.0]).unwrap();
        let b = quartiles(&[1.0, 2.0, 3.0, 5.0, 7.0, 8.0, 9.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_filters_non_finite_and_needs_two() {
        let q = quartiles(&[f64::NAN, 1.0, 3.0, f64::INFINITY]).unwrap();
        assert_eq!(q.median, 2.0);
        assert!(matches!(
            quartiles(&[1.0, f64::NAN]),
            Err(MathError::InsufficientData { needed: 2, got: 1 })
        ));
    }
}
