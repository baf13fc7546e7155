//! Chi-squared distribution

use super::special::{gamma_ln, invert_cdf, lower_incomplete_gamma};

pub fn chi_pdf(x: f64, df: f64) -> f64 {
    if x < 0.0 {
        return 0.0;
    }
    if x == 0.0 {
        return if df < 2.0 {
            f64::INFINITY
        } else if df == 2.0 {
            0.5
        } else {
            0.0
        };
    }

    let k = df / 2.0;
    let log_pdf = -k * 2.0_f64.ln() - gamma_ln(k) + (k - 1.0) * x.ln() - x / 2.0;
    log_pdf.exp()
}

pub fn chi_cdf(x: f64, df: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    // P(k/2, x/2), the lower regularized gamma function
    lower_incomplete_gamma(df / 2.0, x / 2.0)
}

/// Quantile: the x with `chi_cdf(x, df) = p`
pub fn chi_quantile(p: f64, df: f64) -> f64 {
    if p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    invert_cdf(p, 0.0, df.max(1.0), |x| chi_cdf(x, df), |x| chi_pdf(x, df))
}
