//! Discrete distribution calculators

use crate::distributions::{
    binomial_range_with_steps, binomial_with_steps, hypergeometric_with_steps, poisson_range_with_steps,
    poisson_with_steps,
};
use stepwise_plugin::prelude::*;

// ============ Binomial ============

pub struct Binomial;

static BINOMIAL_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("n", "Integer", "Number of trials"),
    ArgMeta::required("k", "Integer", "Number of successes"),
    ArgMeta::required("p", "Number", "Probability of success on each trial"),
];

static BINOMIAL_EXAMPLES: [&str; 1] = [r#"{"n": 10, "k": 3, "p": 0.5}"#];

static BINOMIAL_RELATED: [&str; 3] = ["binomial_range", "poisson", "combinations"];

impl CalculatorPlugin for Binomial {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "binomial",
            description: "Probability of exactly k successes in n trials",
            usage: "binomial(n, k, p)",
            args: &BINOMIAL_ARGS,
            returns: "ProbabilityResult",
            examples: &BINOMIAL_EXAMPLES,
            category: "distributions",
            related: &BINOMIAL_RELATED,
        }
    }

    fn call(&self, args: &Args, _ctx: &CalcContext) -> Result<Report, StatsError> {
        let n = args.integer("n")?;
        let k = args.integer("k")?;
        let p = args.number("p")?;
        into_report(binomial_with_steps(n, k, p))
    }
}

// ============ Binomial Range ============

pub struct BinomialRange;

static BINOMIAL_RANGE_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("n", "Integer", "Number of trials"),
    ArgMeta::required("min", "Integer", "Smallest number of successes"),
    ArgMeta::required("max", "Integer", "Largest number of successes"),
    ArgMeta::required("p", "Number", "Probability of success on each trial"),
];

static BINOMIAL_RANGE_EXAMPLES: [&str; 1] = [r#"{"n": 10, "min": 4, "max": 6, "p": 0.5}"#];

static BINOMIAL_RANGE_RELATED: [&str; 1] = ["binomial"];

impl CalculatorPlugin for BinomialRange {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "binomial_range",
            description: "Probability that the number of successes lies in [min, max]",
            usage: "binomial_range(n, min, max, p)",
            args: &BINOMIAL_RANGE_ARGS,
            returns: "ProbabilityResult",
            examples: &BINOMIAL_RANGE_EXAMPLES,
            category: "distributions",
            related: &BINOMIAL_RANGE_RELATED,
        }
    }

    fn call(&self, args: &Args, _ctx: &CalcContext) -> Result<Report, StatsError> {
        let n = args.integer("n")?;
        let min = args.integer("min")?;
        let max = args.integer("max")?;
        let p = args.number("p")?;
        into_report(binomial_range_with_steps(n, min, max, p))
    }
}

// ============ Poisson ============

pub struct Poisson;

static POISSON_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("lambda", "Number", "Mean number of events per interval"),
    ArgMeta::required("k", "Integer", "Number of events"),
];

static POISSON_EXAMPLES: [&str; 1] = [r#"{"lambda": 3, "k": 2}"#];

static POISSON_RELATED: [&str; 2] = ["poisson_range", "binomial"];

impl CalculatorPlugin for Poisson {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "poisson",
            description: "Probability of exactly k events at rate lambda",
            usage: "poisson(lambda, k)",
            args: &POISSON_ARGS,
            returns: "ProbabilityResult",
            examples: &POISSON_EXAMPLES,
            category: "distributions",
            related: &POISSON_RELATED,
        }
    }

    fn call(&self, args: &Args, _ctx: &CalcContext) -> Result<Report, StatsError> {
        let lambda = args.number("lambda")?;
        let k = args.integer("k")?;
        into_report(poisson_with_steps(lambda, k))
    }
}

// ============ Poisson Range ============

pub struct PoissonRange;

static POISSON_RANGE_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("lambda", "Number", "Mean number of events per interval"),
    ArgMeta::required("min", "Integer", "Smallest number of events"),
    ArgMeta::required("max", "Integer", "Largest number of events"),
];

static POISSON_RANGE_EXAMPLES: [&str; 1] = [r#"{"lambda": 2, "min": 0, "max": 3}"#];

static POISSON_RANGE_RELATED: [&str; 1] = ["poisson"];

impl CalculatorPlugin for PoissonRange {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "poisson_range",
            description: "Probability that the number of events lies in [min, max]",
            usage: "poisson_range(lambda, min, max)",
            args: &POISSON_RANGE_ARGS,
            returns: "ProbabilityResult",
            examples: &POISSON_RANGE_EXAMPLES,
            category: "distributions",
            related: &POISSON_RANGE_RELATED,
        }
    }

    fn call(&self, args: &Args, _ctx: &CalcContext) -> Result<Report, StatsError> {
        let lambda = args.number("lambda")?;
        let min = args.integer("min")?;
        let max = args.integer("max")?;
        into_report(poisson_range_with_steps(lambda, min, max))
    }
}

// ============ Hypergeometric ============

pub struct Hypergeometric;

static HYPERGEOMETRIC_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("population", "Integer", "Population size N"),
    ArgMeta::required("successes", "Integer", "Successes in the population K"),
    ArgMeta::required("draws", "Integer", "Sample size n"),
    ArgMeta::required("k", "Integer", "Successes in the sample"),
];

static HYPERGEOMETRIC_EXAMPLES: [&str; 1] = [r#"{"population": 52, "successes": 4, "draws": 5, "k": 2}"#];

static HYPERGEOMETRIC_RELATED: [&str; 2] = ["binomial", "combinations"];

impl CalculatorPlugin for Hypergeometric {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "hypergeometric",
            description: "Probability of k successes when drawing without replacement",
            usage: "hypergeometric(population, successes, draws, k)",
            args: &HYPERGEOMETRIC_ARGS,
            returns: "ProbabilityResult",
            examples: &HYPERGEOMETRIC_EXAMPLES,
            category: "distributions",
            related: &HYPERGEOMETRIC_RELATED,
        }
    }

    fn call(&self, args: &Args, _ctx: &CalcContext) -> Result<Report, StatsError> {
        let population = args.integer("population")?;
        let successes = args.integer("successes")?;
        let draws = args.integer("draws")?;
        let k = args.integer("k")?;
        into_report(hypergeometric_with_steps(population, successes, draws, k))
    }
}
