//! Descriptive calculators: summary statistics, box plot, special means

use crate::box_plot::box_plot_with_steps;
use crate::descriptive::descriptive_stats_with_steps;
use crate::special_means::{special_means_with_steps, TrimSpec};
use stepwise_plugin::prelude::*;

static DATA_ARGS: [ArgMeta; 1] = [ArgMeta::required("data", "List<Number>", "Values, as an array or a comma separated string")];

// ============ Descriptive ============

pub struct Descriptive;

static DESCRIPTIVE_EXAMPLES: [&str; 1] = [r#"{"data": [2, 4, 4, 4, 5, 5, 7, 9]}"#];

static DESCRIPTIVE_RELATED: [&str; 2] = ["box_plot", "special_means"];

impl CalculatorPlugin for Descriptive {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "descriptive",
            description: "Mean, median, mode, range, variance and standard deviation",
            usage: "descriptive(data)",
            args: &DATA_ARGS,
            returns: "DescriptiveStats",
            examples: &DESCRIPTIVE_EXAMPLES,
            category: "descriptive",
            related: &DESCRIPTIVE_RELATED,
        }
    }

    fn call(&self, args: &Args, _ctx: &CalcContext) -> Result<Report, StatsError> {
        let data = args.numbers("data")?;
        into_report(descriptive_stats_with_steps(&data))
    }
}

// ============ Box Plot ============

pub struct BoxPlot;

static BOX_PLOT_EXAMPLES: [&str; 1] = [r#"{"data": "1, 2, 3, 4, 5, 6, 7, 8, 9, 100"}"#];

static BOX_PLOT_RELATED: [&str; 2] = ["descriptive", "special_means"];

impl CalculatorPlugin for BoxPlot {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "box_plot",
            description: "Five-number summary with 1.5·IQR fences and outliers",
            usage: "box_plot(data)",
            args: &DATA_ARGS,
            returns: "BoxPlotSummary",
            examples: &BOX_PLOT_EXAMPLES,
            category: "descriptive",
            related: &BOX_PLOT_RELATED,
        }
    }

    fn call(&self, args: &Args, _ctx: &CalcContext) -> Result<Report, StatsError> {
        let data = args.numbers("data")?;
        into_report(Outcome::Ok(box_plot_with_steps(&data)?))
    }
}

// ============ Special Means ============

pub struct SpecialMeansCalc;

static SPECIAL_MEANS_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("data", "List<Number>", "Values, as an array or a comma separated string"),
    ArgMeta::optional("trim_count", "Integer", "Values trimmed from each end", "none"),
    ArgMeta::optional("trim_percent", "Number", "Percent trimmed from each end", "10"),
];

static SPECIAL_MEANS_EXAMPLES: [&str; 2] = [
    r#"{"data": [2, 4, 6, 8, 10, 12, 14, 16, 18, 20]}"#,
    r#"{"data": [1, 2, 3, 4, 100], "trim_count": 1}"#,
];

static SPECIAL_MEANS_RELATED: [&str; 2] = ["descriptive", "box_plot"];

impl CalculatorPlugin for SpecialMeansCalc {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "special_means",
            description: "Trimean, geometric mean and trimmed mean",
            usage: "special_means(data, trim_count?, trim_percent?)",
            args: &SPECIAL_MEANS_ARGS,
            returns: "SpecialMeans",
            examples: &SPECIAL_MEANS_EXAMPLES,
            category: "descriptive",
            related: &SPECIAL_MEANS_RELATED,
        }
    }

    fn call(&self, args: &Args, _ctx: &CalcContext) -> Result<Report, StatsError> {
        let data = args.numbers("data")?;
        let count = match args.opt_integer("trim_count")? {
            Some(c) if c < 0 => {
                return Err(StatsError::domain_error("trim_count must not be negative"));
            }
            Some(c) => Some(c as usize),
            None => None,
        };
        let trim = TrimSpec {
            count,
            percent: args.opt_number("trim_percent")?,
        };
        into_report(Outcome::Ok(special_means_with_steps(&data, trim)?))
    }
}
