//! SQL fragments for filter predicates
//!
//! Values are always bound by name; nothing user-supplied is written into
//! the SQL text.

use rusqlite::types::{ToSql, Value};

/// One comparison against a column
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    IsNull,
    IsNotNull,
    Equal(Value),
    NotEqual(Value),
    /// Pattern already escaped with `\`
    Like(String),
    NotLike(String),
    AtLeast(Value),
    Below(Value),
    AtMost(Value),
    Above(Value),
    Within(Value, Value),
    Outside(Value, Value),
}

/// Accumulates WHERE conditions and their named parameters
#[derive(Debug, Default, Clone)]
pub struct SqlClause {
    conditions: Vec<String>,
    params: Vec<(String, Value)>,
}

impl SqlClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under `:name` and return the placeholder
    pub fn bind(&mut self, name: &str, value: Value) -> String {
        let placeholder = format!(":{}", name);
        self.params.push((placeholder.clone(), value));
        placeholder
    }

    /// Add a raw condition; its placeholders must already be bound
    pub fn push_condition(&mut self, condition: impl Into<String>) {
        self.conditions.push(condition.into());
    }

    /// Render `predicate` against `column`, binding values under `name`
    pub fn push(&mut self, column: &str, name: &str, predicate: Predicate) {
        let condition = match predicate {
            Predicate::IsNull => format!("{} IS NULL", column),
            Predicate::IsNotNull => format!("{} IS NOT NULL", column),
            Predicate::Equal(v) => format!("{} = {}", column, self.bind(name, v)),
            Predicate::NotEqual(v) => format!("{} <> {}", column, self.bind(name, v)),
            Predicate::Like(p) => {
                format!("{} LIKE {} ESCAPE '\\'", column, self.bind(name, Value::Text(p)))
            }
            Predicate::NotLike(p) => format!(
                "{} NOT LIKE {} ESCAPE '\\'",
                column,
                self.bind(name, Value::Text(p))
            ),
            Predicate::AtLeast(v) => {
                format!("{} >= {}", column, self.bind(&format!("{}_lower", name), v))
            }
            Predicate::Below(v) => {
                format!("{} < {}", column, self.bind(&format!("{}_lower", name), v))
            }
            Predicate::AtMost(v) => {
                format!("{} <= {}", column, self.bind(&format!("{}_upper", name), v))
            }
            Predicate::Above(v) => {
                format!("{} > {}", column, self.bind(&format!("{}_upper", name), v))
            }
            Predicate::Within(lo, hi) => {
                let lo = self.bind(&format!("{}_lower", name), lo);
                let hi = self.bind(&format!("{}_upper", name), hi);
                format!("{} >= {} AND {} <= {}", column, lo, column, hi)
            }
            Predicate::Outside(lo, hi) => {
                let lo = self.bind(&format!("{}_lower", name), lo);
                let hi = self.bind(&format!("{}_upper", name), hi);
                format!("({} < {} OR {} > {})", column, lo, column, hi)
            }
        };
        self.conditions.push(condition);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    /// ` WHERE a AND b`, or an empty string when there are no conditions
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn params(&self) -> &[(String, Value)] {
        &self.params
    }

    /// Parameters in the shape rusqlite accepts for named binding
    pub fn named_params(&self) -> Vec<(&str, &dyn ToSql)> {
        self.params
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect()
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(n, _)| n.trim_start_matches(':') == name)
            .map(|(_, v)| v)
    }
}
