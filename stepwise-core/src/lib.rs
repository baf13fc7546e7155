//! Stepwise Core - Fundamental types
//!
//! This crate provides the core types used throughout Stepwise:
//! - `CalculationStep` / `StepLog`: narrated derivation stages
//! - `Outcome<T>`: a completed result or an explained invalid input
//! - `MathError` / `StatsError`: raised and structured errors
//! - formatting helpers and step-to-text export

mod error;
mod outcome;
mod step;

pub mod export;
pub mod format;

pub use error::{codes, MathError, Severity, StatsError};
pub use outcome::{CalculationResult, InputValue, Inputs, InvalidResult, Outcome};
pub use step::{CalculationStep, StepLog};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::format::{
        format_list, format_number, format_operand, format_percent, format_probability, tex,
    };
    pub use crate::{
        CalculationResult, CalculationStep, Inputs, MathError, Outcome, StatsError, StepLog,
    };
}
