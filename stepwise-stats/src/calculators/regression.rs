//! Regression calculators

use super::alpha_arg;
use crate::regression::{linear_regression_with_steps, predict_y, Prediction};
use stepwise_plugin::prelude::*;

static REGRESSION_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("x", "List<Number>", "Independent variable"),
    ArgMeta::required("y", "List<Number>", "Dependent variable"),
    ArgMeta::optional("alpha", "Number", "Significance level for the slope test", "0.05"),
];

// ============ Linear Regression ============

pub struct LinearRegression;

static REGRESSION_EXAMPLES: [&str; 1] = [r#"{"x": [1, 2, 3, 4, 5], "y": [2, 4, 5, 4, 5]}"#];

static REGRESSION_RELATED: [&str; 1] = ["regression_predict"];

impl CalculatorPlugin for LinearRegression {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "linear_regression",
            description: "Least-squares line, correlation, sum-of-squares decomposition and slope t-test",
            usage: "linear_regression(x, y, alpha?)",
            args: &REGRESSION_ARGS,
            returns: "RegressionResult",
            examples: &REGRESSION_EXAMPLES,
            category: "regression",
            related: &REGRESSION_RELATED,
        }
    }

    fn call(&self, args: &Args, ctx: &CalcContext) -> Result<Report, StatsError> {
        let x = args.numbers("x")?;
        let y = args.numbers("y")?;
        let alpha = alpha_arg(args, ctx)?;
        into_report(linear_regression_with_steps(&x, &y, alpha, ctx.tables()))
    }
}

// ============ Prediction ============

pub struct RegressionPredict;

static PREDICT_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("x", "List<Number>", "Independent variable"),
    ArgMeta::required("y", "List<Number>", "Dependent variable"),
    ArgMeta::required("at", "Number", "x value to predict at"),
    ArgMeta::optional("alpha", "Number", "Significance level for the slope test", "0.05"),
];

static PREDICT_EXAMPLES: [&str; 1] = [r#"{"x": [1, 2, 3, 4, 5], "y": [2, 4, 5, 4, 5], "at": 6}"#];

static PREDICT_RELATED: [&str; 1] = ["linear_regression"];

impl CalculatorPlugin for RegressionPredict {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "regression_predict",
            description: "Fit a least-squares line and predict y at a given x",
            usage: "regression_predict(x, y, at, alpha?)",
            args: &PREDICT_ARGS,
            returns: "Prediction",
            examples: &PREDICT_EXAMPLES,
            category: "regression",
            related: &PREDICT_RELATED,
        }
    }

    fn call(&self, args: &Args, ctx: &CalcContext) -> Result<Report, StatsError> {
        let x = args.numbers("x")?;
        let y = args.numbers("y")?;
        let at = args.number("at")?;
        let alpha = alpha_arg(args, ctx)?;

        let fit = match linear_regression_with_steps(&x, &y, alpha, ctx.tables()).into_result() {
            Ok(fit) => fit,
            Err(invalid) => return into_report(Outcome::<Prediction>::Invalid(invalid)),
        };
        let prediction = predict_y(fit.value.slope, fit.value.intercept, at);
        let mut steps = fit.steps;
        steps.push(
            CalculationStep::new("prediction", "Prediction")
                .with_formula("\\hat{y} = a + bx")
                .with_calculation(prediction.equation.clone())
                .with_result(format_number(prediction.y, 4)),
        );
        into_report(Outcome::ok(prediction, steps, fit.formula, fit.inputs.number("at", at)))
    }
}
