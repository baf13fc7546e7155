//! Stepwise critical-value tables
//!
//! Hypothesis tests ask an oracle for critical values the way a student
//! reads a printed table: pick the row for the degrees of freedom, the
//! column for the significance level, and read the entry. `None` means the
//! table has no sensible entry; callers treat that as "significance cannot
//! be determined", never as zero.

pub mod distributions;

use distributions::{chi_quantile, f_quantile, t_quantile};
use tracing::debug;

/// Read-only critical-value lookup
pub trait CriticalValues: Send + Sync {
    /// Upper-tail t critical value for `df` at one-tailed `alpha`
    fn t_value(&self, df: f64, alpha_one_tail: f64) -> Option<f64>;

    /// Chi-squared critical value with upper-tail area `alpha`
    fn chi_square(&self, df: f64, alpha: f64) -> Option<f64>;

    /// F critical value with upper-tail area `alpha`
    fn f_value(&self, df1: f64, df2: f64, alpha: f64) -> Option<f64>;

    /// The t-table row actually used for `df`
    fn find_closest_df(&self, df: f64) -> u32;
}

const T_ALPHAS: [f64; 12] = [
    0.25, 0.20, 0.15, 0.10, 0.05, 0.025, 0.02, 0.01, 0.005, 0.0025, 0.001, 0.0005,
];

const CHI_ALPHAS: [f64; 11] = [0.995, 0.99, 0.975, 0.95, 0.90, 0.10, 0.05, 0.025, 0.01, 0.005, 0.001];

const F_ALPHAS: [f64; 4] = [0.10, 0.05, 0.025, 0.01];

const T_EXTRA_ROWS: [u32; 13] = [40, 50, 60, 70, 80, 90, 100, 120, 150, 200, 300, 500, 1000];
const CHI_EXTRA_ROWS: [u32; 7] = [40, 50, 60, 70, 80, 90, 100];
const F_EXTRA_ROWS: [u32; 3] = [40, 60, 120];

/// Printed-table style oracle.
///
/// Rows are df 1–30 plus a sparse tail; columns are the usual significance
/// levels. Entries are rounded to three decimals like a printed table.
#[derive(Debug, Clone)]
pub struct StandardTables {
    t_rows: Vec<u32>,
    chi_rows: Vec<u32>,
    f_rows: Vec<u32>,
}

impl StandardTables {
    pub fn new() -> Self {
        let dense: Vec<u32> = (1..=30).collect();
        let with = |extra: &[u32]| {
            let mut rows = dense.clone();
            rows.extend_from_slice(extra);
            rows
        };
        Self {
            t_rows: with(&T_EXTRA_ROWS),
            chi_rows: with(&CHI_EXTRA_ROWS),
            f_rows: with(&F_EXTRA_ROWS),
        }
    }

    pub fn t_rows(&self) -> &[u32] {
        &self.t_rows
    }
}

impl Default for StandardTables {
    fn default() -> Self {
        Self::new()
    }
}

impl CriticalValues for StandardTables {
    fn t_value(&self, df: f64, alpha_one_tail: f64) -> Option<f64> {
        let alpha = column(&T_ALPHAS, alpha_one_tail)?;
        let row = closest_row(&self.t_rows, df)?;
        Some(round3(t_quantile(1.0 - alpha, row as f64)))
    }

    fn chi_square(&self, df: f64, alpha: f64) -> Option<f64> {
        let alpha = column(&CHI_ALPHAS, alpha)?;
        let row = closest_row(&self.chi_rows, df)?;
        Some(round3(chi_quantile(1.0 - alpha, row as f64)))
    }

    fn f_value(&self, df1: f64, df2: f64, alpha: f64) -> Option<f64> {
        let alpha = column(&F_ALPHAS, alpha)?;
        let r1 = closest_row(&self.f_rows, df1)?;
        let r2 = closest_row(&self.f_rows, df2)?;
        Some(round3(f_quantile(1.0 - alpha, r1 as f64, r2 as f64)))
    }

    fn find_closest_df(&self, df: f64) -> u32 {
        closest_row(&self.t_rows, df).unwrap_or(0)
    }
}

/// Oracle with no entries; every lookup misses
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTables;

impl CriticalValues for EmptyTables {
    fn t_value(&self, _df: f64, _alpha_one_tail: f64) -> Option<f64> {
        None
    }

    fn chi_square(&self, _df: f64, _alpha: f64) -> Option<f64> {
        None
    }

    fn f_value(&self, _df1: f64, _df2: f64, _alpha: f64) -> Option<f64> {
        None
    }

    fn find_closest_df(&self, df: f64) -> u32 {
        df.max(0.0).round() as u32
    }
}

/// Nearest tabulated row, ties going to the smaller df
fn closest_row(rows: &[u32], df: f64) -> Option<u32> {
    if !df.is_finite() || df < 1.0 {
        debug!(df, "no table row for df");
        return None;
    }
    rows.iter().copied().min_by(|a, b| {
        let da = (*a as f64 - df).abs();
        let db = (*b as f64 - df).abs();
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(b))
    })
}

fn column(alphas: &[f64], alpha: f64) -> Option<f64> {
    let found = alphas.iter().copied().find(|a| (a - alpha).abs() < 1e-9);
    if found.is_none() {
        debug!(alpha, "no table column for alpha");
    }
    found
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
