//! Stepwise Statistics
//!
//! Narrated statistics calculators. Every `*_with_steps` entry point returns
//! the numeric result together with the derivation that produced it. Invalid
//! input is reported as `Outcome::Invalid` with an explanatory step; only the
//! low-level primitives raise `MathError`.

pub mod box_plot;
pub mod calculators;
pub mod combinatorics;
pub mod descriptive;
pub mod distributions;
pub mod helpers;
pub mod hypothesis;
pub mod quartiles;
pub mod regression;
pub mod special_means;

pub use box_plot::{box_plot, box_plot_with_steps, BoxPlotSummary};
pub use combinatorics::{
    combinations, combinations_with_steps, factorial, permutations, permutations_with_steps, CountResult, Factorials,
};
pub use descriptive::{descriptive_stats_with_steps, DescriptiveStats};
pub use distributions::ProbabilityResult;
pub use hypothesis::{Decision, Tails};
pub use quartiles::{quartiles, Quartiles};
pub use regression::{linear_regression_with_steps, predict_y, CorrelationStrength, Prediction, RegressionResult};
pub use special_means::{geometric_mean, special_means_with_steps, trimean, trimmed_mean, SpecialMeans, TrimSpec};

use stepwise_plugin::CalculatorRegistry;

/// Load every statistics calculator into the registry
pub fn load_stats_library(registry: CalculatorRegistry) -> CalculatorRegistry {
    registry
        // Counting
        .with_calculator(calculators::Combinations)
        .with_calculator(calculators::Permutations)

        // Distributions
        .with_calculator(calculators::Binomial)
        .with_calculator(calculators::BinomialRange)
        .with_calculator(calculators::Poisson)
        .with_calculator(calculators::PoissonRange)
        .with_calculator(calculators::Hypergeometric)

        // Descriptive
        .with_calculator(calculators::Descriptive)
        .with_calculator(calculators::BoxPlot)
        .with_calculator(calculators::SpecialMeansCalc)

        // Hypothesis tests
        .with_calculator(calculators::TTestOneSample)
        .with_calculator(calculators::TTestPaired)
        .with_calculator(calculators::TTestIndependent)
        .with_calculator(calculators::TTestIndependentSummary)
        .with_calculator(calculators::ChiSquareGoodnessOfFit)
        .with_calculator(calculators::ChiSquareIndependence)

        // Regression
        .with_calculator(calculators::LinearRegression)
        .with_calculator(calculators::RegressionPredict)
}
