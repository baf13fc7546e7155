//! Standard normal distribution
//!
//! Used by the hypothesis tests when no tabulated t value is available.

use std::f64::consts::PI;

/// φ(x)
pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Φ(x), Abramowitz & Stegun 26.2.17 (absolute error < 7.5e-8)
pub fn normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.2316419 * z);
    let poly = t * (0.319381530 + t * (-0.356563782 + t * (1.781477937 + t * (-1.821255978 + t * 1.330274429))));
    let upper = normal_pdf(z) * poly;
    if x >= 0.0 {
        1.0 - upper
    } else {
        upper
    }
}

/// P(Z > x) = 1 − Φ(x)
pub fn normal_upper_tail(x: f64) -> f64 {
    1.0 - normal_cdf(x)
}

/// Φ⁻¹(p): A&S 26.2.23 start refined with Newton steps
pub fn normal_quantile(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    let (q, sign) = if p > 0.5 { (1.0 - p, 1.0) } else { (p, -1.0) };
    let t = (-2.0 * q.ln()).sqrt();
    let mut z = sign * (t - (2.515517 + 0.802853 * t + 0.010328 * t * t) / (1.0 + 1.432788 * t + 0.189269 * t * t + 0.001308 * t * t * t));
    for _ in 0..3 {
        let density = normal_pdf(z);
        if density < 1e-300 {
            break;
        }
        z -= (normal_cdf(z) - p) / density;
    }
    z
}
