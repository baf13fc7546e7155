//! Helper functions for statistical operations
//!
//! Small numeric building blocks shared by the engines.

use std::cmp::Ordering;

pub fn sum(data: &[f64]) -> f64 {
    data.iter().sum()
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        0.0
    } else {
        sum(data) / data.len() as f64
    }
}

/// Sum of squared deviations from the mean
pub fn sum_sq_dev(data: &[f64], mean: f64) -> f64 {
    data.iter().map(|x| (x - mean).powi(2)).sum()
}

/// Bessel-corrected variance; `None` below two values
pub fn sample_variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let m = mean(data);
    Some(sum_sq_dev(data, m) / (data.len() - 1) as f64)
}

/// Sorted copy in ascending order
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut v = data.to_vec();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    v
}

/// Median of already-sorted data; 0 when empty
pub fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        0.0
    } else if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Drop NaN and infinite values
pub fn finite_values(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| x.is_finite()).collect()
}

pub fn is_whole(x: f64) -> bool {
    x.is_finite() && x.fract() == 0.0
}

/// Descending product `hi × (hi-1) × … × (lo+1)`, abbreviated when long
pub fn descending_product(hi: i64, lo: i64) -> String {
    let terms: Vec<String> = ((lo + 1)..=hi).rev().map(|t| t.to_string()).collect();
    match terms.len() {
        0 => "1".to_string(),
        len if len > 8 => format!(
            "{} × {} × {} × … × {}",
            terms[0],
            terms[1],
            terms[2],
            terms[len - 1]
        ),
        _ => terms.join(" × "),
    }
}
