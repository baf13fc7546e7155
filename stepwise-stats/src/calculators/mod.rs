//! Calculator plugins wrapping the engines for the registry

mod counting;
mod describe;
mod distributions;
mod hypothesis;
mod regression;

pub use counting::{Combinations, Permutations};
pub use describe::{BoxPlot, Descriptive, SpecialMeansCalc};
pub use distributions::{Binomial, BinomialRange, Hypergeometric, Poisson, PoissonRange};
pub use hypothesis::{
    ChiSquareGoodnessOfFit, ChiSquareIndependence, TTestIndependent, TTestIndependentSummary, TTestOneSample,
    TTestPaired,
};
pub use regression::{LinearRegression, RegressionPredict};

use crate::hypothesis::Tails;
use stepwise_plugin::{Args, CalcContext};
use stepwise_core::StatsError;

/// `alpha` argument, falling back to the context default
pub(crate) fn alpha_arg(args: &Args, ctx: &CalcContext) -> Result<f64, StatsError> {
    args.number_or("alpha", ctx.default_alpha)
}

/// `two_tailed` argument, falling back to the context default
pub(crate) fn tails_arg(args: &Args, ctx: &CalcContext) -> Result<Tails, StatsError> {
    Ok(Tails::from_two_tailed(args.boolean_or("two_tailed", ctx.two_tailed)?))
}
