//! Student's t distribution

use super::special::{gamma_ln, invert_cdf, regularized_incomplete_beta};

pub fn t_pdf(x: f64, df: f64) -> f64 {
    // PDF(x) = Γ((ν+1)/2) / (√(νπ) * Γ(ν/2)) * (1 + x²/ν)^(-(ν+1)/2)
    let nu = df;
    let coef = gamma_ln((nu + 1.0) / 2.0) - gamma_ln(nu / 2.0) - 0.5 * (nu * std::f64::consts::PI).ln();
    let term = -(nu + 1.0) / 2.0 * (1.0 + x * x / nu).ln();
    (coef + term).exp()
}

pub fn t_cdf(x: f64, df: f64) -> f64 {
    let p = df / (df + x * x);
    let tail = 0.5 * regularized_incomplete_beta(df / 2.0, 0.5, p);
    if x >= 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

/// Quantile: the x with `t_cdf(x, df) = p`
pub fn t_quantile(p: f64, df: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    if p == 0.5 {
        return 0.0;
    }
    if p < 0.5 {
        return -t_quantile(1.0 - p, df);
    }
    let start = normal_approx(p);
    invert_cdf(p, 0.0, start, |x| t_cdf(x, df), |x| t_pdf(x, df))
}

/// Rational approximation to the normal quantile for p > 0.5, used as a
/// starting point only
fn normal_approx(p: f64) -> f64 {
    const A: [f64; 3] = [2.515517, 0.802853, 0.010328];
    const B: [f64; 3] = [1.432788, 0.189269, 0.001308];

    let t = (-2.0 * (1.0 - p).ln()).sqrt();
    let num = A[0] + t * (A[1] + t * A[2]);
    let den = 1.0 + t * (B[0] + t * (B[1] + t * B[2]));
    t - num / den
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_cdf_zero() {
        assert!((t_cdf(0.0, 10.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_t_quantile_known_values() {
        assert!((t_quantile(0.975, 4.0) - 2.776445).abs() < 1e-4);
        assert!((t_quantile(0.975, 8.0) - 2.306004).abs() < 1e-4);
        assert!((t_quantile(0.95, 1.0) - 6.313752).abs() < 1e-4);
    }

    #[test]
    fn test_t_quantile_symmetric() {
        assert!((t_quantile(0.1, 5.0) + t_quantile(0.9, 5.0)).abs() < 1e-10);
    }
}
