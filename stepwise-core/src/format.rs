//! Number formatting and formula assembly for step narration
//!
//! Integers print as-is, other values are fixed to a number of decimals
//! with trailing zeros trimmed, and values too small to show at that
//! precision switch to exponential notation.

/// Probabilities below this print in exponential notation
pub const SCIENTIFIC_THRESHOLD: f64 = 1e-4;

/// Format a number for display in a step
pub fn format_number(value: f64, decimals: usize) -> String {
    if let Some(s) = non_finite(value) {
        return s;
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let smallest = 10f64.powi(-(decimals.min(15) as i32));
    if value.abs() < smallest {
        return format_scientific(value, 4);
    }
    trim_zeros(format!("{:.*}", decimals, value))
}

/// Format a probability: literal 0 and 1, exponential below 1e-4
pub fn format_probability(p: f64, decimals: usize) -> String {
    if let Some(s) = non_finite(p) {
        return s;
    }
    if p == 0.0 {
        return "0".to_string();
    }
    if p == 1.0 {
        return "1".to_string();
    }
    if p.abs() < SCIENTIFIC_THRESHOLD {
        return format_scientific(p, 4);
    }
    let fixed = trim_zeros(format!("{:.*}", decimals, p));
    if fixed == "-0" {
        "0".to_string()
    } else {
        fixed
    }
}

/// Format a probability as a percentage, e.g. `0.65625 → "65.625%"`
pub fn format_percent(p: f64, decimals: usize) -> String {
    format!("{}%", format_number(p * 100.0, decimals))
}

/// Exponential notation with the mantissa's trailing zeros trimmed
pub fn format_scientific(value: f64, digits: usize) -> String {
    if let Some(s) = non_finite(value) {
        return s;
    }
    let raw = format!("{:.*e}", digits, value);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => format!("{}e{}", trim_zeros(mantissa.to_string()), exponent),
        None => raw,
    }
}

/// Format a value for substitution into a formula, parenthesizing negatives
pub fn format_operand(value: f64, decimals: usize) -> String {
    let s = format_number(value, decimals);
    if value < 0.0 {
        format!("({})", s)
    } else {
        s
    }
}

/// Comma-separated list of formatted values
pub fn format_list(values: &[f64], decimals: usize) -> String {
    values
        .iter()
        .map(|v| format_number(*v, decimals))
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_finite(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("NaN".to_string())
    } else if value.is_infinite() {
        Some(if value > 0.0 { "∞" } else { "-∞" }.to_string())
    } else {
        None
    }
}

fn trim_zeros(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// TeX-like formula fragments
pub mod tex {
    pub const CDOT: &str = " \\cdot ";
    pub const TIMES: &str = " \\times ";

    pub fn frac(num: impl AsRef<str>, den: impl AsRef<str>) -> String {
        format!("\\frac{{{}}}{{{}}}", num.as_ref(), den.as_ref())
    }

    pub fn sqrt(inner: impl AsRef<str>) -> String {
        format!("\\sqrt{{{}}}", inner.as_ref())
    }

    pub fn binom(n: impl AsRef<str>, k: impl AsRef<str>) -> String {
        format!("\\binom{{{}}}{{{}}}", n.as_ref(), k.as_ref())
    }

    pub fn pow(base: impl AsRef<str>, exponent: impl AsRef<str>) -> String {
        format!("{}^{{{}}}", base.as_ref(), exponent.as_ref())
    }

    pub fn sub(base: impl AsRef<str>, index: impl AsRef<str>) -> String {
        format!("{}_{{{}}}", base.as_ref(), index.as_ref())
    }

    pub fn bar(symbol: impl AsRef<str>) -> String {
        format!("\\bar{{{}}}", symbol.as_ref())
    }

    pub fn hat(symbol: impl AsRef<str>) -> String {
        format!("\\hat{{{}}}", symbol.as_ref())
    }

    pub fn sum(var: &str, lower: impl AsRef<str>, upper: impl AsRef<str>) -> String {
        format!("\\sum_{{{}={}}}^{{{}}}", var, lower.as_ref(), upper.as_ref())
    }
}
