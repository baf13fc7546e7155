//! Calculator Registry

use crate::{Args, CalcContext, CalculatorMeta, CalculatorPlugin, Report};
use serde_json::{json, Value as JsonValue};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use stepwise_core::StatsError;
use tracing::{debug, info_span};

/// Central calculator registry
pub struct CalculatorRegistry {
    calculators: HashMap<String, Arc<dyn CalculatorPlugin>>,
}

impl CalculatorRegistry {
    pub fn new() -> Self {
        Self {
            calculators: HashMap::new(),
        }
    }

    pub fn with_calculator<C: CalculatorPlugin + 'static>(mut self, c: C) -> Self {
        let name = c.meta().name.to_lowercase();
        self.calculators.insert(name, Arc::new(c));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn CalculatorPlugin> {
        self.calculators.get(&name.to_lowercase()).map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }

    /// Run a calculator by name with JSON arguments
    pub fn call(&self, name: &str, args: JsonValue, ctx: &CalcContext) -> Result<Report, StatsError> {
        let calculator = match self.get(name) {
            Some(c) => c,
            None => {
                let similar = self.find_similar(name);
                let mut err = StatsError::unknown_calculator(name);
                if !similar.is_empty() {
                    let suggestions: Vec<&str> = similar.iter().take(5).map(|s| s.as_str()).collect();
                    err = err.with_suggestion(format!(
                        "Similar: {}. Use the 'list' command for the full list.",
                        suggestions.join(", ")
                    ));
                }
                return Err(err);
            }
        };

        let _span = info_span!("calculate", calculator = name).entered();
        let args = Args::new(name, args)?;
        let report = calculator.call(&args, ctx)?;
        debug!(steps = report.steps().len(), invalid = report.is_invalid(), "calculation finished");
        Ok(report)
    }

    /// Calculator names similar to `name`, best first
    fn find_similar(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self
            .calculators
            .keys()
            .filter_map(|candidate| {
                let score = Self::similarity_score(&name_lower, candidate);
                if score > 0 {
                    Some((candidate.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        // Mostly-disjoint names are not suggestions
        if common * 2 < query_chars.len() && score == 0 {
            return 0;
        }
        score += common * 2;

        let len_diff = (query.len() as i64 - candidate.len() as i64).unsigned_abs() as usize;
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        score
    }

    pub fn metas(&self) -> Vec<CalculatorMeta> {
        let mut metas: Vec<CalculatorMeta> = self.calculators.values().map(|c| c.meta()).collect();
        metas.sort_by(|a, b| a.name.cmp(b.name));
        metas
    }

    /// Summary of every calculator, optionally restricted to a category
    pub fn list(&self, category: Option<&str>) -> JsonValue {
        let items: Vec<JsonValue> = self
            .metas()
            .into_iter()
            .filter(|m| category.map_or(true, |c| m.category == c))
            .map(|m| {
                json!({
                    "name": m.name,
                    "description": m.description,
                    "usage": m.usage,
                    "category": m.category,
                })
            })
            .collect();
        JsonValue::Array(items)
    }

    /// Full help for one calculator, or an index by category
    pub fn help(&self, name: Option<&str>) -> Result<JsonValue, StatsError> {
        match name {
            Some(name) => match self.get(name) {
                Some(c) => serde_json::to_value(c.meta()).map_err(StatsError::from),
                None => Err(StatsError::unknown_calculator(name)),
            },
            None => {
                let mut by_category: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
                for meta in self.metas() {
                    by_category.entry(meta.category).or_default().push(meta.name);
                }
                Ok(json!({
                    "calculators": by_category,
                    "usage": "Send {\"command\": \"help\", \"name\": \"<calculator>\"} for details.",
                }))
            }
        }
    }
}

impl Default for CalculatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
