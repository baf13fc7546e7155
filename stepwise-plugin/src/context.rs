//! Calculation context

use std::sync::Arc;
use stepwise_tables::{CriticalValues, StandardTables};

/// Runtime configuration handed to every calculator
#[derive(Clone)]
pub struct CalcContext {
    pub tables: Arc<dyn CriticalValues>,
    /// Significance level used when a request does not give one
    pub default_alpha: f64,
    /// Whether tests default to two-tailed
    pub two_tailed: bool,
}

impl CalcContext {
    pub fn new(tables: Arc<dyn CriticalValues>) -> Self {
        Self {
            tables,
            default_alpha: 0.05,
            two_tailed: true,
        }
    }

    pub fn with_default_alpha(mut self, alpha: f64) -> Self {
        self.default_alpha = alpha;
        self
    }

    pub fn with_two_tailed(mut self, two_tailed: bool) -> Self {
        self.two_tailed = two_tailed;
        self
    }

    pub fn tables(&self) -> &dyn CriticalValues {
        self.tables.as_ref()
    }
}

impl Default for CalcContext {
    fn default() -> Self {
        Self::new(Arc::new(StandardTables::new()))
    }
}

impl std::fmt::Debug for CalcContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalcContext")
            .field("default_alpha", &self.default_alpha)
            .field("two_tailed", &self.two_tailed)
            .finish_non_exhaustive()
    }
}
