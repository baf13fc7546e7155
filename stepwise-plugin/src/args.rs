//! Argument extraction
//!
//! Calculator arguments arrive as a JSON object. These helpers pull typed
//! values out of it and produce structured errors naming the calculator
//! and argument when something is missing or mistyped.

use serde_json::{Map, Value as JsonValue};
use stepwise_core::StatsError;

/// Named arguments for one calculator call
#[derive(Debug, Clone)]
pub struct Args {
    calculator: String,
    values: Map<String, JsonValue>,
}

impl Args {
    /// Accepts a JSON object, or `null` for no arguments
    pub fn new(calculator: &str, value: JsonValue) -> Result<Self, StatsError> {
        let values = match value {
            JsonValue::Object(map) => map,
            JsonValue::Null => Map::new(),
            other => {
                return Err(StatsError::arg_type(calculator, "args", "Object", type_name(&other)));
            }
        };
        Ok(Self {
            calculator: calculator.to_string(),
            values,
        })
    }

    pub fn calculator(&self) -> &str {
        &self.calculator
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.get(name).map_or(false, |v| !v.is_null())
    }

    fn get(&self, name: &str) -> Option<&JsonValue> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn number(&self, name: &str) -> Result<f64, StatsError> {
        match self.get(name) {
            Some(v) => self.as_number(name, v),
            None => Err(StatsError::arg_missing(&self.calculator, name)),
        }
    }

    pub fn opt_number(&self, name: &str) -> Result<Option<f64>, StatsError> {
        self.get(name).map(|v| self.as_number(name, v)).transpose()
    }

    pub fn number_or(&self, name: &str, default: f64) -> Result<f64, StatsError> {
        Ok(self.opt_number(name)?.unwrap_or(default))
    }

    pub fn integer(&self, name: &str) -> Result<i64, StatsError> {
        let n = self.number(name)?;
        self.as_integer(name, n)
    }

    pub fn opt_integer(&self, name: &str) -> Result<Option<i64>, StatsError> {
        match self.opt_number(name)? {
            Some(n) => self.as_integer(name, n).map(Some),
            None => Ok(None),
        }
    }

    pub fn boolean_or(&self, name: &str, default: bool) -> Result<bool, StatsError> {
        match self.get(name) {
            Some(JsonValue::Bool(b)) => Ok(*b),
            Some(other) => Err(StatsError::arg_type(&self.calculator, name, "Bool", type_name(other))),
            None => Ok(default),
        }
    }

    pub fn opt_text(&self, name: &str) -> Result<Option<&str>, StatsError> {
        match self.get(name) {
            Some(JsonValue::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(StatsError::arg_type(&self.calculator, name, "Text", type_name(other))),
            None => Ok(None),
        }
    }

    /// A list of numbers: a JSON array, or a string of comma/space
    /// separated values
    pub fn numbers(&self, name: &str) -> Result<Vec<f64>, StatsError> {
        match self.get(name) {
            Some(JsonValue::Array(items)) => items.iter().map(|v| self.as_number(name, v)).collect(),
            Some(JsonValue::String(s)) => self.parse_list(name, s),
            Some(other) => Err(StatsError::arg_type(&self.calculator, name, "List<Number>", type_name(other))),
            None => Err(StatsError::arg_missing(&self.calculator, name)),
        }
    }

    /// A table of numbers as an array of rows
    pub fn matrix(&self, name: &str) -> Result<Vec<Vec<f64>>, StatsError> {
        match self.get(name) {
            Some(JsonValue::Array(rows)) => rows
                .iter()
                .map(|row| match row {
                    JsonValue::Array(cells) => cells.iter().map(|v| self.as_number(name, v)).collect(),
                    other => Err(StatsError::arg_type(&self.calculator, name, "List<List<Number>>", type_name(other))),
                })
                .collect(),
            Some(other) => Err(StatsError::arg_type(&self.calculator, name, "List<List<Number>>", type_name(other))),
            None => Err(StatsError::arg_missing(&self.calculator, name)),
        }
    }

    fn as_number(&self, name: &str, value: &JsonValue) -> Result<f64, StatsError> {
        match value {
            JsonValue::Number(n) => n
                .as_f64()
                .ok_or_else(|| StatsError::arg_type(&self.calculator, name, "Number", "out-of-range number")),
            JsonValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| StatsError::arg_type(&self.calculator, name, "Number", "Text")),
            other => Err(StatsError::arg_type(&self.calculator, name, "Number", type_name(other))),
        }
    }

    fn as_integer(&self, name: &str, n: f64) -> Result<i64, StatsError> {
        if n.fract() != 0.0 || !n.is_finite() {
            return Err(StatsError::arg_type(&self.calculator, name, "Integer", "Number"));
        }
        Ok(n as i64)
    }

    fn parse_list(&self, name: &str, text: &str) -> Result<Vec<f64>, StatsError> {
        text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| StatsError::arg_type(&self.calculator, name, "Number", "Text"))
            })
            .collect()
    }
}

/// Type name for error messages
pub fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "Null",
        JsonValue::Bool(_) => "Bool",
        JsonValue::Number(_) => "Number",
        JsonValue::String(_) => "Text",
        JsonValue::Array(_) => "List",
        JsonValue::Object(_) => "Object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stepwise_core::codes;

    #[test]
    fn test_numbers_from_array_and_text() {
        let args = Args::new("descriptive", json!({"data": [1, 2.5, "3"], "pasted": "4, 5 6;7"})).unwrap();
        assert_eq!(args.numbers("data").unwrap(), vec![1.0, 2.5, 3.0]);
        assert_eq!(args.numbers("pasted").unwrap(), vec![4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_missing_and_mistyped() {
        let args = Args::new("binomial", json!({"n": "ten", "k": 2.5})).unwrap();
        assert_eq!(args.number("p").unwrap_err().code, codes::ARG_MISSING);
        assert_eq!(args.number("n").unwrap_err().code, codes::ARG_TYPE);
        assert_eq!(args.integer("k").unwrap_err().code, codes::ARG_TYPE);
    }

    #[test]
    fn test_defaults() {
        let args = Args::new("t_test", JsonValue::Null).unwrap();
        assert_eq!(args.number_or("alpha", 0.05).unwrap(), 0.05);
        assert!(args.boolean_or("two_tailed", true).unwrap());
        assert!(!args.has("alpha"));
    }

    #[test]
    fn test_matrix() {
        let args = Args::new("chi", json!({"table": [[1, 2], [3, 4]]})).unwrap();
        assert_eq!(args.matrix("table").unwrap(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }
}
