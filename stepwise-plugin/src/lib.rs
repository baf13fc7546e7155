//! Stepwise Plugin System
//!
//! Provides the `CalculatorPlugin` trait that wraps a narrated calculator
//! behind JSON arguments, plus the registry that dispatches by name.

mod args;
mod context;
mod registry;
mod traits;

pub use args::{type_name, Args};
pub use context::CalcContext;
pub use registry::CalculatorRegistry;
pub use traits::{into_report, ArgMeta, CalculatorMeta, CalculatorPlugin, Report};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        into_report, ArgMeta, Args, CalcContext, CalculatorMeta, CalculatorPlugin,
        CalculatorRegistry, Report,
    };
    pub use stepwise_core::prelude::*;
}
