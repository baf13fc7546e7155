//! Counting calculators: combinations, permutations

use crate::combinatorics::{combinations_with_steps, permutations_with_steps};
use stepwise_plugin::prelude::*;

static COUNT_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("n", "Integer", "Total number of items"),
    ArgMeta::required("r", "Integer", "Number of items chosen"),
];

// ============ Combinations ============

pub struct Combinations;

static COMBINATIONS_EXAMPLES: [&str; 1] = [r#"{"n": 10, "r": 4}"#];

static COMBINATIONS_RELATED: [&str; 2] = ["permutations", "binomial"];

impl CalculatorPlugin for Combinations {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "combinations",
            description: "Number of ways to choose r of n items, order ignored",
            usage: "combinations(n, r)",
            args: &COUNT_ARGS,
            returns: "CountResult",
            examples: &COMBINATIONS_EXAMPLES,
            category: "combinatorics",
            related: &COMBINATIONS_RELATED,
        }
    }

    fn call(&self, args: &Args, _ctx: &CalcContext) -> Result<Report, StatsError> {
        let n = args.integer("n")?;
        let r = args.integer("r")?;
        into_report(combinations_with_steps(n, r)?)
    }
}

// ============ Permutations ============

pub struct Permutations;

static PERMUTATIONS_EXAMPLES: [&str; 1] = [r#"{"n": 5, "r": 3}"#];

static PERMUTATIONS_RELATED: [&str; 1] = ["combinations"];

impl CalculatorPlugin for Permutations {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "permutations",
            description: "Number of ordered arrangements of r of n items",
            usage: "permutations(n, r)",
            args: &COUNT_ARGS,
            returns: "CountResult",
            examples: &PERMUTATIONS_EXAMPLES,
            category: "combinatorics",
            related: &PERMUTATIONS_RELATED,
        }
    }

    fn call(&self, args: &Args, _ctx: &CalcContext) -> Result<Report, StatsError> {
        let n = args.integer("n")?;
        let r = args.integer("r")?;
        into_report(permutations_with_steps(n, r)?)
    }
}
