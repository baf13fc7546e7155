//! Calculation outcomes
//!
//! Every narrated calculator returns an `Outcome<T>`: either a complete
//! `CalculationResult<T>` or an `InvalidResult` carrying the steps that
//! explain why the inputs could not be used. Invalid input is data, not a
//! panic or an error value, so interactive callers can render the
//! narration next to the offending field.

use crate::step::{CalculationStep, StepLog};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A normalized input value recorded for audit/export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

impl InputValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            InputValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InputValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Named inputs actually used by a calculation, in name order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inputs(BTreeMap<String, InputValue>);

impl Inputs {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn number(mut self, name: &str, value: f64) -> Self {
        self.0.insert(name.to_string(), InputValue::Number(value));
        self
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.insert(name.to_string(), InputValue::Text(value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputValue)> {
        self.0.iter()
    }
}

/// A completed calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult<T> {
    pub value: T,
    pub steps: StepLog,
    /// Canonical formula for this calculation type
    pub formula: String,
    pub inputs: Inputs,
}

impl<T> CalculationResult<T> {
    pub fn new(value: T, steps: StepLog, formula: impl Into<String>, inputs: Inputs) -> Self {
        Self {
            value,
            steps,
            formula: formula.into(),
            inputs,
        }
    }

    pub fn find_step(&self, id: &str) -> Option<&CalculationStep> {
        self.steps.find(id)
    }

    pub fn map_value<U, F: FnOnce(T) -> U>(self, f: F) -> CalculationResult<U> {
        CalculationResult {
            value: f(self.value),
            steps: self.steps,
            formula: self.formula,
            inputs: self.inputs,
        }
    }
}

/// A calculation that stopped at an input check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidResult {
    /// User-facing explanation of what was wrong
    pub reason: String,
    pub steps: StepLog,
    pub formula: String,
    pub inputs: Inputs,
}

/// Tagged outcome of a narrated calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome<T> {
    Ok(CalculationResult<T>),
    Invalid(InvalidResult),
}

impl<T> Outcome<T> {
    pub fn ok(value: T, steps: StepLog, formula: impl Into<String>, inputs: Inputs) -> Self {
        Outcome::Ok(CalculationResult::new(value, steps, formula, inputs))
    }

    pub fn invalid(
        reason: impl Into<String>,
        steps: StepLog,
        formula: impl Into<String>,
        inputs: Inputs,
    ) -> Self {
        Outcome::Invalid(InvalidResult {
            reason: reason.into(),
            steps,
            formula: formula.into(),
            inputs,
        })
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Outcome::Invalid(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Ok(r) => Some(&r.value),
            Outcome::Invalid(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Invalid(i) => Some(&i.reason),
        }
    }

    pub fn steps(&self) -> &StepLog {
        match self {
            Outcome::Ok(r) => &r.steps,
            Outcome::Invalid(i) => &i.steps,
        }
    }

    pub fn formula(&self) -> &str {
        match self {
            Outcome::Ok(r) => &r.formula,
            Outcome::Invalid(i) => &i.formula,
        }
    }

    pub fn inputs(&self) -> &Inputs {
        match self {
            Outcome::Ok(r) => &r.inputs,
            Outcome::Invalid(i) => &i.inputs,
        }
    }

    pub fn find_step(&self, id: &str) -> Option<&CalculationStep> {
        self.steps().find(id)
    }

    pub fn into_result(self) -> Result<CalculationResult<T>, InvalidResult> {
        match self {
            Outcome::Ok(r) => Ok(r),
            Outcome::Invalid(i) => Err(i),
        }
    }

    pub fn map_value<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Ok(r) => Outcome::Ok(r.map_value(f)),
            Outcome::Invalid(i) => Outcome::Invalid(i),
        }
    }

    pub fn try_map_value<U, E, F>(self, f: F) -> Result<Outcome<U>, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        match self {
            Outcome::Ok(r) => {
                let value = f(r.value)?;
                Ok(Outcome::Ok(CalculationResult {
                    value,
                    steps: r.steps,
                    formula: r.formula,
                    inputs: r.inputs,
                }))
            }
            Outcome::Invalid(i) => Ok(Outcome::Invalid(i)),
        }
    }
}

impl<T: Clone + Default> Outcome<T> {
    /// The value, or the zero/empty value of `T` for invalid input
    pub fn value_or_default(&self) -> T {
        self.value().cloned().unwrap_or_default()
    }
}
