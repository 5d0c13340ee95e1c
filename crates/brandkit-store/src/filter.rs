use serde_json::{Map, Value};

/// Conjunction of field-equality predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter with a single `field == value` clause.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and(field, value)
    }

    #[must_use]
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.clauses.iter().map(|(f, v)| (f.as_str(), v))
    }

    /// True when every clause holds for `row`.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| row.get(field) == Some(expected))
    }

    /// Clauses as a JSON object, the shape the RPC endpoints accept.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self.clauses.iter().cloned().collect();
        Value::Object(map)
    }

    /// Clauses as `field=eq.value` query pairs.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.clauses
            .iter()
            .map(|(field, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (field.clone(), format!("eq.{rendered}"))
            })
            .collect()
    }
}
