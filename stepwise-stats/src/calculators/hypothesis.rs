//! Hypothesis test calculators

use super::{alpha_arg, tails_arg};
use crate::hypothesis::{
    chi_square_goodness_of_fit, chi_square_independence, independent_t_test, independent_t_test_with_steps,
    one_sample_t_test_with_steps, paired_t_test_with_steps, GroupStats,
};
use stepwise_plugin::prelude::*;

const ALPHA_DESC: &str = "Significance level";

// ============ One-Sample T-Test ============

pub struct TTestOneSample;

static T_TEST_ONE_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("data", "List<Number>", "Sample data"),
    ArgMeta::required("mu0", "Number", "Hypothesized population mean"),
    ArgMeta::optional("alpha", "Number", ALPHA_DESC, "0.05"),
];

static T_TEST_ONE_EXAMPLES: [&str; 1] = [r#"{"data": [48, 52, 50, 49, 51], "mu0": 50}"#];

static T_TEST_ONE_RELATED: [&str; 2] = ["t_test_paired", "t_test_independent"];

impl CalculatorPlugin for TTestOneSample {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "t_test_one_sample",
            description: "Two-tailed one-sample t-test",
            usage: "t_test_one_sample(data, mu0, alpha?)",
            args: &T_TEST_ONE_ARGS,
            returns: "TTestResult",
            examples: &T_TEST_ONE_EXAMPLES,
            category: "hypothesis",
            related: &T_TEST_ONE_RELATED,
        }
    }

    fn call(&self, args: &Args, ctx: &CalcContext) -> Result<Report, StatsError> {
        let data = args.numbers("data")?;
        let mu0 = args.number("mu0")?;
        let alpha = alpha_arg(args, ctx)?;
        into_report(one_sample_t_test_with_steps(&data, mu0, alpha, ctx.tables()))
    }
}

// ============ Paired T-Test ============

pub struct TTestPaired;

static T_TEST_PAIRED_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("before", "List<Number>", "Measurements before"),
    ArgMeta::required("after", "List<Number>", "Measurements after, in the same order"),
    ArgMeta::optional("alpha", "Number", ALPHA_DESC, "0.05"),
];

static T_TEST_PAIRED_EXAMPLES: [&str; 1] = [r#"{"before": [200, 190, 210], "after": [195, 185, 200]}"#];

static T_TEST_PAIRED_RELATED: [&str; 1] = ["t_test_one_sample"];

impl CalculatorPlugin for TTestPaired {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "t_test_paired",
            description: "Two-tailed paired t-test on after - before",
            usage: "t_test_paired(before, after, alpha?)",
            args: &T_TEST_PAIRED_ARGS,
            returns: "TTestResult",
            examples: &T_TEST_PAIRED_EXAMPLES,
            category: "hypothesis",
            related: &T_TEST_PAIRED_RELATED,
        }
    }

    fn call(&self, args: &Args, ctx: &CalcContext) -> Result<Report, StatsError> {
        let before = args.numbers("before")?;
        let after = args.numbers("after")?;
        let alpha = alpha_arg(args, ctx)?;
        into_report(paired_t_test_with_steps(&before, &after, alpha, ctx.tables()))
    }
}

// ============ Independent T-Test ============

pub struct TTestIndependent;

static T_TEST_INDEPENDENT_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("sample1", "List<Number>", "First sample"),
    ArgMeta::required("sample2", "List<Number>", "Second sample"),
    ArgMeta::optional("alpha", "Number", ALPHA_DESC, "0.05"),
    ArgMeta::optional("two_tailed", "Bool", "Two-tailed test", "true"),
];

static T_TEST_INDEPENDENT_EXAMPLES: [&str; 1] = [r#"{"sample1": [5, 6, 7, 8], "sample2": [9, 10, 11, 12]}"#];

static T_TEST_INDEPENDENT_RELATED: [&str; 2] = ["t_test_independent_summary", "t_test_one_sample"];

impl CalculatorPlugin for TTestIndependent {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "t_test_independent",
            description: "Independent-samples t-test, pooled or Welch after an F-test",
            usage: "t_test_independent(sample1, sample2, alpha?, two_tailed?)",
            args: &T_TEST_INDEPENDENT_ARGS,
            returns: "IndependentTTestResult",
            examples: &T_TEST_INDEPENDENT_EXAMPLES,
            category: "hypothesis",
            related: &T_TEST_INDEPENDENT_RELATED,
        }
    }

    fn call(&self, args: &Args, ctx: &CalcContext) -> Result<Report, StatsError> {
        let sample1 = args.numbers("sample1")?;
        let sample2 = args.numbers("sample2")?;
        let alpha = alpha_arg(args, ctx)?;
        let tails = tails_arg(args, ctx)?;
        into_report(independent_t_test_with_steps(&sample1, &sample2, alpha, tails, ctx.tables()))
    }
}

// ============ Independent T-Test (summary statistics) ============

pub struct TTestIndependentSummary;

static T_TEST_SUMMARY_ARGS: [ArgMeta; 8] = [
    ArgMeta::required("n1", "Integer", "First group size"),
    ArgMeta::required("mean1", "Number", "First group mean"),
    ArgMeta::required("sd1", "Number", "First group standard deviation"),
    ArgMeta::required("n2", "Integer", "Second group size"),
    ArgMeta::required("mean2", "Number", "Second group mean"),
    ArgMeta::required("sd2", "Number", "Second group standard deviation"),
    ArgMeta::optional("alpha", "Number", ALPHA_DESC, "0.05"),
    ArgMeta::optional("two_tailed", "Bool", "Two-tailed test", "true"),
];

static T_TEST_SUMMARY_EXAMPLES: [&str; 1] =
    [r#"{"n1": 30, "mean1": 75, "sd1": 10, "n2": 30, "mean2": 70, "sd2": 12}"#];

static T_TEST_SUMMARY_RELATED: [&str; 1] = ["t_test_independent"];

fn group_size(args: &Args, name: &str) -> Result<usize, StatsError> {
    let n = args.integer(name)?;
    if n < 0 {
        return Err(StatsError::arg_type(args.calculator(), name, "non-negative Integer", "negative Integer"));
    }
    Ok(n as usize)
}

impl CalculatorPlugin for TTestIndependentSummary {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "t_test_independent_summary",
            description: "Independent-samples t-test from group sizes, means and standard deviations",
            usage: "t_test_independent_summary(n1, mean1, sd1, n2, mean2, sd2, alpha?, two_tailed?)",
            args: &T_TEST_SUMMARY_ARGS,
            returns: "IndependentTTestResult",
            examples: &T_TEST_SUMMARY_EXAMPLES,
            category: "hypothesis",
            related: &T_TEST_SUMMARY_RELATED,
        }
    }

    fn call(&self, args: &Args, ctx: &CalcContext) -> Result<Report, StatsError> {
        let g1 = GroupStats::new(group_size(args, "n1")?, args.number("mean1")?, args.number("sd1")?);
        let g2 = GroupStats::new(group_size(args, "n2")?, args.number("mean2")?, args.number("sd2")?);
        let alpha = alpha_arg(args, ctx)?;
        let tails = tails_arg(args, ctx)?;
        into_report(independent_t_test(g1, g2, alpha, tails, ctx.tables()))
    }
}

// ============ Chi-Square Goodness of Fit ============

pub struct ChiSquareGoodnessOfFit;

static CHI_GOF_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("observed", "List<Number>", "Observed counts per category"),
    ArgMeta::required("expected", "List<Number>", "Expected counts per category"),
    ArgMeta::optional("alpha", "Number", ALPHA_DESC, "0.05"),
];

static CHI_GOF_EXAMPLES: [&str; 1] = [r#"{"observed": [8, 12, 10, 11, 9, 10], "expected": [10, 10, 10, 10, 10, 10]}"#];

static CHI_GOF_RELATED: [&str; 1] = ["chi_square_independence"];

impl CalculatorPlugin for ChiSquareGoodnessOfFit {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "chi_square_gof",
            description: "Chi-square goodness-of-fit test",
            usage: "chi_square_gof(observed, expected, alpha?)",
            args: &CHI_GOF_ARGS,
            returns: "ChiSquareResult",
            examples: &CHI_GOF_EXAMPLES,
            category: "hypothesis",
            related: &CHI_GOF_RELATED,
        }
    }

    fn call(&self, args: &Args, ctx: &CalcContext) -> Result<Report, StatsError> {
        let observed = args.numbers("observed")?;
        let expected = args.numbers("expected")?;
        let alpha = alpha_arg(args, ctx)?;
        into_report(chi_square_goodness_of_fit(&observed, &expected, alpha, ctx.tables()))
    }
}

// ============ Chi-Square Independence ============

pub struct ChiSquareIndependence;

static CHI_INDEPENDENCE_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("table", "List<List<Number>>", "Contingency table, one array per row"),
    ArgMeta::optional("alpha", "Number", ALPHA_DESC, "0.05"),
];

static CHI_INDEPENDENCE_EXAMPLES: [&str; 1] = [r#"{"table": [[20, 30], [30, 20]]}"#];

static CHI_INDEPENDENCE_RELATED: [&str; 1] = ["chi_square_gof"];

impl CalculatorPlugin for ChiSquareIndependence {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "chi_square_independence",
            description: "Chi-square test of independence for a contingency table",
            usage: "chi_square_independence(table, alpha?)",
            args: &CHI_INDEPENDENCE_ARGS,
            returns: "ChiSquareResult",
            examples: &CHI_INDEPENDENCE_EXAMPLES,
            category: "hypothesis",
            related: &CHI_INDEPENDENCE_RELATED,
        }
    }

    fn call(&self, args: &Args, ctx: &CalcContext) -> Result<Report, StatsError> {
        let table = args.matrix("table")?;
        let alpha = alpha_arg(args, ctx)?;
        into_report(chi_square_independence(&table, alpha, ctx.tables()))
    }
}
