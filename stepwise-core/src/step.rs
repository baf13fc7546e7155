//! Narrated calculation steps
//!
//! A `CalculationStep` is one stage of a derivation as a person would write
//! it out by hand. Steps live in a `StepLog`, an append-only sequence that
//! owns the numbering: ordinals are assigned on push, so narrations built
//! separately and then spliced together still read as one numbered list.

use serde::{Deserialize, Serialize};

/// One narrated stage of a derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStep {
    /// 1-based position in the owning log (0 until pushed)
    #[serde(default)]
    pub ordinal: usize,

    /// Stable short identifier, unique within one result
    pub id: String,

    /// Human-readable heading
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,

    /// Formula in notation form, before substitution
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub formula: Option<String>,

    /// Formula with concrete numbers substituted
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calculation: Option<String>,

    /// Outcome of this stage, formatted for display
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

impl CalculationStep {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            ordinal: 0,
            id: id.into(),
            title: title.into(),
            description: None,
            formula: None,
            calculation: None,
            result: None,
            note: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    pub fn with_calculation(mut self, calculation: impl Into<String>) -> Self {
        self.calculation = Some(calculation.into());
        self
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Title prefixed with the ordinal, e.g. `"3. Standard error"`
    pub fn numbered_title(&self) -> String {
        if self.ordinal == 0 {
            self.title.clone()
        } else {
            format!("{}. {}", self.ordinal, self.title)
        }
    }

    /// Description, formula, calculation, result and note as display lines
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(ref d) = self.description {
            lines.extend(d.lines().map(str::to_string));
        }
        if let Some(ref f) = self.formula {
            lines.push(format!("Formula: {}", f));
        }
        if let Some(ref c) = self.calculation {
            lines.extend(c.lines().map(str::to_string));
        }
        if let Some(ref r) = self.result {
            lines.push(format!("Result: {}", r));
        }
        if let Some(ref n) = self.note {
            lines.push(format!("Note: {}", n));
        }
        lines
    }
}

/// Append-only ordered sequence of steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepLog {
    steps: Vec<CalculationStep>,
}

impl StepLog {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step, assigning the next ordinal
    pub fn push(&mut self, mut step: CalculationStep) {
        step.ordinal = self.steps.len() + 1;
        self.steps.push(step);
    }

    /// Splice another log onto this one, continuing the numbering
    pub fn append(&mut self, other: StepLog) {
        for step in other.steps {
            self.push(step);
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CalculationStep> {
        self.steps.iter()
    }

    pub fn last(&self) -> Option<&CalculationStep> {
        self.steps.last()
    }

    /// First step with the given id
    pub fn find(&self, id: &str) -> Option<&CalculationStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn filter<P>(&self, predicate: P) -> Vec<&CalculationStep>
    where
        P: Fn(&CalculationStep) -> bool,
    {
        self.steps.iter().filter(|s| predicate(s)).collect()
    }

    /// Steps whose id starts with `prefix` (e.g. every `trimean-*` step)
    pub fn with_prefix(&self, prefix: &str) -> Vec<&CalculationStep> {
        self.filter(|s| s.id.starts_with(prefix))
    }

    pub fn without_prefix(&self, prefix: &str) -> Vec<&CalculationStep> {
        self.filter(|s| !s.id.starts_with(prefix))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<CalculationStep> {
        self.steps
    }
}

impl<'a> IntoIterator for &'a StepLog {
    type Item = &'a CalculationStep;
    type IntoIter = std::slice::Iter<'a, CalculationStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
