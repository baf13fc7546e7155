//! Simple linear regression with an ANOVA-style decomposition and a t-test
//! on the slope

use crate::hypothesis::{
    alpha_problem, error_step, judge_t, t_critical_step, t_decision_step, Decision, Tails,
};
use serde::{Deserialize, Serialize};
use stepwise_core::prelude::*;
use stepwise_tables::CriticalValues;

const DECIMALS: usize = 4;

const FORMULA: &str = "\\hat{y} = a + bx, \\quad b = \\frac{n\\sum xy - \\sum x \\sum y}{n\\sum x^2 - (\\sum x)^2}";

/// Qualitative strength of a correlation coefficient
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
    #[default]
    VeryWeak,
}

impl CorrelationStrength {
    pub fn from_r(r: f64) -> Self {
        let a = r.abs();
        if a >= 0.9 {
            CorrelationStrength::VeryStrong
        } else if a >= 0.7 {
            CorrelationStrength::Strong
        } else if a >= 0.5 {
            CorrelationStrength::Moderate
        } else if a >= 0.3 {
            CorrelationStrength::Weak
        } else {
            CorrelationStrength::VeryWeak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CorrelationStrength::VeryStrong => "very strong",
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Weak => "weak",
            CorrelationStrength::VeryWeak => "very weak",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub n: usize,
    pub slope: f64,
    pub intercept: f64,
    pub equation: String,
    pub r: f64,
    pub r_squared: f64,
    pub sst: f64,
    pub ssr: f64,
    pub sse: f64,
    /// Standard error of the estimate
    pub standard_error: f64,
    /// Standard error of the slope
    pub slope_standard_error: f64,
    pub t_statistic: f64,
    pub df: f64,
    pub alpha: f64,
    pub critical_value: Option<f64>,
    pub p_value: Option<f64>,
    pub decision: Decision,
    pub is_significant: bool,
    pub strength: CorrelationStrength,
    pub predicted: Vec<f64>,
    pub residuals: Vec<f64>,
}

/// A point prediction from a fitted line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub y: f64,
    pub equation: String,
}

fn equation(slope: f64, intercept: f64) -> String {
    let sign = if slope < 0.0 { "-" } else { "+" };
    format!(
        "ŷ = {} {} {}x",
        format_number(intercept, DECIMALS),
        sign,
        format_number(slope.abs(), DECIMALS)
    )
}

/// ŷ at `x` for a fitted line
pub fn predict_y(slope: f64, intercept: f64, x: f64) -> Prediction {
    let y = intercept + slope * x;
    let sign = if slope < 0.0 { "-" } else { "+" };
    Prediction {
        y,
        equation: format!(
            "ŷ = {} {} {} × {} = {}",
            format_number(intercept, DECIMALS),
            sign,
            format_number(slope.abs(), DECIMALS),
            format_operand(x, DECIMALS),
            format_number(y, DECIMALS)
        ),
    }
}

/// Fit y = a + bx and test the slope
pub fn linear_regression_with_steps(
    x: &[f64],
    y: &[f64],
    alpha: f64,
    tables: &dyn CriticalValues,
) -> Outcome<RegressionResult> {
    let inputs = Inputs::new()
        .number("n", x.len() as f64)
        .number("alpha", alpha)
        .text("x", format_list(x, DECIMALS))
        .text("y", format_list(y, DECIMALS));
    let mut steps = StepLog::new();

    let problem = if x.len() != y.len() {
        Some(format!("X and Y must have the same number of values ({} vs {})", x.len(), y.len()))
    } else if x.len() < 2 {
        Some(format!("Regression needs at least 2 points (got {})", x.len()))
    } else {
        alpha_problem(alpha)
    };
    if let Some(reason) = problem {
        steps.push(error_step(&reason));
        return Outcome::invalid(reason, steps, FORMULA, inputs);
    }

    let f = |v: f64| format_number(v, DECIMALS);
    let n = x.len();
    let nf = n as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();
    let mean_x = sum_x / nf;
    let mean_y = sum_y / nf;

    steps.push(
        CalculationStep::new("sums", "Sums")
            .with_calculation(format!(
                "n = {}\nΣx = {}\nΣy = {}\nΣxy = {}\nΣx² = {}\nΣy² = {}",
                n,
                f(sum_x),
                f(sum_y),
                f(sum_xy),
                f(sum_x2),
                f(sum_y2)
            )),
    );

    steps.push(
        CalculationStep::new("means", "Means")
            .with_calculation(format!(
                "x̄ = {} / {} = {}\nȳ = {} / {} = {}",
                f(sum_x),
                n,
                f(mean_x),
                f(sum_y),
                n,
                f(mean_y)
            ))
            .with_result(format!("x̄ = {}, ȳ = {}", f(mean_x), f(mean_y))),
    );

    let sxx_n = nf * sum_x2 - sum_x * sum_x;
    let sxy_n = nf * sum_xy - sum_x * sum_y;
    let syy_n = nf * sum_y2 - sum_y * sum_y;
    let slope = if sxx_n == 0.0 { 0.0 } else { sxy_n / sxx_n };
    let mut slope_step = CalculationStep::new("slope", "Slope")
        .with_formula(format!("b = {}", tex::frac("n\\sum xy - \\sum x \\sum y", "n\\sum x^2 - (\\sum x)^2")))
        .with_calculation(format!(
            "({} × {} - {} × {}) / ({} × {} - {}²) = {} / {} = {}",
            n,
            f(sum_xy),
            f(sum_x),
            f(sum_y),
            n,
            f(sum_x2),
            f(sum_x),
            f(sxy_n),
            f(sxx_n),
            f(slope)
        ))
        .with_result(f(slope));
    if sxx_n == 0.0 {
        slope_step = slope_step.with_note("All x values are equal, so the slope is taken as 0");
    }
    steps.push(slope_step);

    let intercept = mean_y - slope * mean_x;
    steps.push(
        CalculationStep::new("intercept", "Intercept")
            .with_formula(format!("a = {} - b{}", tex::bar("y"), tex::bar("x")))
            .with_calculation(format!("{} - {} × {} = {}", f(mean_y), format_operand(slope, DECIMALS), format_operand(mean_x, DECIMALS), f(intercept)))
            .with_result(f(intercept)),
    );

    let eq = equation(slope, intercept);
    steps.push(CalculationStep::new("equation", "Regression equation").with_result(eq.clone()));

    let predicted: Vec<f64> = x.iter().map(|xi| intercept + slope * xi).collect();
    let residuals: Vec<f64> = y.iter().zip(&predicted).map(|(yi, pi)| yi - pi).collect();
    let prediction_lines: Vec<String> = x
        .iter()
        .zip(y)
        .zip(predicted.iter().zip(&residuals))
        .map(|((xi, yi), (pi, ri))| {
            format!("x = {}: ŷ = {}, y = {}, residual = {}", f(*xi), f(*pi), f(*yi), f(*ri))
        })
        .collect();
    steps.push(
        CalculationStep::new("predictions", "Predicted values and residuals")
            .with_formula("e_i = y_i - \\hat{y}_i")
            .with_calculation(prediction_lines.join("\n")),
    );

    let r_den = (sxx_n * syy_n).sqrt();
    let r = if r_den == 0.0 || !r_den.is_finite() { 0.0 } else { sxy_n / r_den };
    steps.push(
        CalculationStep::new("correlation", "Correlation coefficient")
            .with_formula(format!(
                "r = {}",
                tex::frac("n\\sum xy - \\sum x \\sum y", tex::sqrt("[n\\sum x^2 - (\\sum x)^2][n\\sum y^2 - (\\sum y)^2]"))
            ))
            .with_calculation(format!("{} / {} = {}", f(sxy_n), tex::sqrt(format!("{} × {}", f(sxx_n), f(syy_n))), f(r)))
            .with_result(f(r)),
    );

    let r_squared = r * r;
    steps.push(
        CalculationStep::new("r-squared", "Coefficient of determination")
            .with_calculation(format!("r² = {}² = {}", f(r), f(r_squared)))
            .with_result(f(r_squared))
            .with_note(format!("{} of the variation in y is explained by x", format_percent(r_squared, 2))),
    );

    let sst: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
    let sse: f64 = residuals.iter().map(|e| e * e).sum();
    let ssr = sst - sse;
    steps.push(
        CalculationStep::new("sum-of-squares", "Sum of squares decomposition")
            .with_formula("SST = SSR + SSE")
            .with_calculation(format!(
                "SST = Σ(y - ȳ)² = {}\nSSE = Σ(y - ŷ)² = {}\nSSR = SST - SSE = {}",
                f(sst),
                f(sse),
                f(ssr)
            )),
    );

    let ratio = if sst == 0.0 { 0.0 } else { ssr / sst };
    steps.push(
        CalculationStep::new("consistency-check", "Check r² against SSR / SST")
            .with_calculation(format!("SSR / SST = {} / {} = {}", f(ssr), f(sst), f(ratio)))
            .with_result(if (ratio - r_squared).abs() < 1e-6 { "Consistent" } else { "Mismatch" }),
    );

    let df = nf - 2.0;
    let se = if df > 0.0 { (sse / df).sqrt() } else { 0.0 };
    steps.push(
        CalculationStep::new("standard-error-estimate", "Standard error of the estimate")
            .with_formula(format!("s_e = {}", tex::sqrt(tex::frac("SSE", "n - 2"))))
            .with_calculation(if df > 0.0 {
                format!("{} = {}", tex::sqrt(format!("{} / {}", f(sse), f(df))), f(se))
            } else {
                "n - 2 = 0, so s_e is taken as 0".to_string()
            })
            .with_result(f(se)),
    );

    let sxx = sum_x2 - sum_x * sum_x / nf;
    let sb = if sxx > 0.0 { se / sxx.sqrt() } else { 0.0 };
    steps.push(
        CalculationStep::new("standard-error-slope", "Standard error of the slope")
            .with_formula(format!("s_b = {}", tex::frac("s_e", tex::sqrt("\\sum x^2 - (\\sum x)^2 / n"))))
            .with_calculation(format!("{} / {} = {}", f(se), tex::sqrt(f(sxx)), f(sb)))
            .with_result(f(sb)),
    );

    let t = if sb > 0.0 {
        slope / sb
    } else if slope == 0.0 {
        0.0
    } else {
        f64::INFINITY.copysign(slope)
    };
    steps.push(
        CalculationStep::new("t-statistic", "t-statistic for the slope")
            .with_formula("t = \\frac{b}{s_b}")
            .with_calculation(format!("{} / {} = {}", f(slope), f(sb), f(t)))
            .with_result(f(t)),
    );

    let judgement = judge_t(t, df, alpha, Tails::Two, tables);
    steps.push(t_critical_step(&judgement, df, alpha, Tails::Two));
    let is_significant = judgement.decision.is_reject();
    let mut significance = t_decision_step(t, &judgement, alpha);
    significance.id = "significance".to_string();
    significance.title = "Significance of the slope".to_string();
    steps.push(significance);

    let strength = CorrelationStrength::from_r(r);
    let direction = if r > 0.0 {
        "positive"
    } else if r < 0.0 {
        "negative"
    } else {
        "no"
    };
    steps.push(
        CalculationStep::new("interpretation", "Interpretation")
            .with_description(format!(
                "r = {} indicates a {} {} linear relationship",
                f(r),
                strength.label(),
                direction
            ))
            .with_result(strength.label()),
    );

    steps.push(
        CalculationStep::new("summary", "Summary").with_calculation(format!(
            "{}\nr = {}, r² = {}\nSST = {}, SSR = {}, SSE = {}\ns_e = {}, s_b = {}\nt = {} (df = {}): {}",
            eq,
            f(r),
            f(r_squared),
            f(sst),
            f(ssr),
            f(sse),
            f(se),
            f(sb),
            f(t),
            f(df),
            judgement.decision.describe()
        )),
    );

    let value = RegressionResult {
        n,
        slope,
        intercept,
        equation: eq,
        r,
        r_squared,
        sst,
        ssr,
        sse,
        standard_error: se,
        slope_standard_error: sb,
        t_statistic: t,
        df,
        alpha,
        critical_value: judgement.critical_value,
        p_value: judgement.p_value,
        decision: judgement.decision,
        is_significant,
        strength,
        predicted,
        residuals,
    };
    Outcome::ok(value, steps, FORMULA, inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_tables::StandardTables;

    const X: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
    const Y: [f64; 10] = [52.0, 59.0, 62.0, 64.0, 72.0, 80.0, 74.0, 83.0, 91.0, 89.0];

    #[test]
    fn test_scenario_significant() {
        let tables = StandardTables::new();
        let outcome = linear_regression_with_steps(&X, &Y, 0.05, &tables);
        let value = outcome.value().unwrap();
        assert!(value.slope > 0.0);
        assert!(value.r > 0.9);
        assert!(value.is_significant);
        assert_eq!(value.strength, CorrelationStrength::VeryStrong);
        assert_eq!(value.df, 8.0);
        assert_eq!(value.critical_value, Some(2.306));
    }

    #[test]
    fn test_decomposition_holds() {
        let tables = StandardTables::new();
        let value = linear_regression_with_steps(&X, &Y, 0.05, &tables).into_result().unwrap().value;
        assert!((value.sst - (value.ssr + value.sse)).abs() < 1e-9);
        assert!((value.r_squared - value.ssr / value.sst).abs() < 1e-9);
    }

    #[test]
    fn test_step_order() {
        let tables = StandardTables::new();
        let outcome = linear_regression_with_steps(&X, &Y, 0.05, &tables);
        assert_eq!(
            outcome.steps().ids(),
            vec![
                "sums",
                "means",
                "slope",
                "intercept",
                "equation",
                "predictions",
                "correlation",
                "r-squared",
                "sum-of-squares",
                "consistency-check",
                "standard-error-estimate",
                "standard-error-slope",
                "t-statistic",
                "critical-value",
                "significance",
                "interpretation",
                "summary"
            ]
        );
    }

    #[test]
    fn test_length_mismatch_is_soft() {
        let tables = StandardTables::new();
        let outcome = linear_regression_with_steps(&[1.0, 2.0, 3.0], &[1.0, 2.0], 0.05, &tables);
        assert!(outcome.is_invalid());
        assert_eq!(outcome.steps().ids(), vec!["error"]);
    }

    #[test]
    fn test_perfect_fit_two_points() {
        let tables = StandardTables::new();
        let value = linear_regression_with_steps(&[0.0, 1.0], &[1.0, 3.0], 0.05, &tables)
            .into_result()
            .unwrap()
            .value;
        assert_eq!(value.slope, 2.0);
        assert_eq!(value.intercept, 1.0);
        assert_eq!(value.standard_error, 0.0);
        assert_eq!(value.decision, Decision::Undetermined);
    }

    #[test]
    fn test_predict_y() {
        let p = predict_y(2.0, 1.0, 3.0);
        assert_eq!(p.y, 7.0);
        assert_eq!(p.equation, "ŷ = 1 + 2 × 3 = 7");
        assert_eq!(predict_y(-0.5, 4.0, 2.0).equation, "ŷ = 4 - 0.5 × 2 = 3");
    }

    #[test]
    fn test_strength_buckets() {
        assert_eq!(CorrelationStrength::from_r(-0.95), CorrelationStrength::VeryStrong);
        assert_eq!(CorrelationStrength::from_r(0.75), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_r(0.55), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_r(0.35), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_r(0.1), CorrelationStrength::VeryWeak);
    }
}
