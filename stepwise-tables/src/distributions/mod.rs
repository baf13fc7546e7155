//! Continuous distributions behind the critical-value tables: t, chi-squared, F

pub mod chi;
pub mod f;
pub mod special;
pub mod t;

pub use chi::{chi_cdf, chi_pdf, chi_quantile};
pub use f::{f_cdf, f_pdf, f_quantile};
pub use special::{gamma_ln, lower_incomplete_gamma, regularized_incomplete_beta};
pub use t::{t_cdf, t_pdf, t_quantile};
