//! Search filters and their translation into SQL predicates
//!
//! Every filter kind maps `(condition, reverse_condition, value-is-empty)`
//! onto exactly one [`Predicate`] variant. Unsupported combinations fail
//! with [`CriteriaError::NotImplemented`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use super::sql::Predicate;
use super::CriteriaError;
use crate::core::db::format_timestamp;

/// Comparison kind carried by a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    #[default]
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    Between,
}

impl FilterCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterCondition::Equals => "equals",
            FilterCondition::Contains => "contains",
            FilterCondition::StartsWith => "starts_with",
            FilterCondition::EndsWith => "ends_with",
            FilterCondition::Between => "between",
        }
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterCondition {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "equals" | "eq" => Ok(FilterCondition::Equals),
            "contains" => Ok(FilterCondition::Contains),
            "startswith" => Ok(FilterCondition::StartsWith),
            "endswith" => Ok(FilterCondition::EndsWith),
            "between" => Ok(FilterCondition::Between),
            _ => Err(CriteriaError::Parse {
                input: s.to_string(),
                reason: "unknown condition".to_string(),
            }),
        }
    }
}

/// Splits a leading `!` off a filter expression.
fn split_reverse(s: &str) -> (bool, &str) {
    match s.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, s),
    }
}

// =========================================================================
// String filter
// =========================================================================

/// Filter over a text column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterString {
    pub condition: FilterCondition,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub reverse_condition: bool,
}

impl FilterString {
    pub fn new(condition: FilterCondition, value: impl Into<String>) -> Self {
        Self {
            condition,
            value: value.into(),
            reverse_condition: false,
        }
    }

    pub fn equals(value: impl Into<String>) -> Self {
        Self::new(FilterCondition::Equals, value)
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self::new(FilterCondition::Contains, value)
    }

    pub fn starts_with(value: impl Into<String>) -> Self {
        Self::new(FilterCondition::StartsWith, value)
    }

    pub fn ends_with(value: impl Into<String>) -> Self {
        Self::new(FilterCondition::EndsWith, value)
    }

    /// Negate the condition
    pub fn reversed(mut self) -> Self {
        self.reverse_condition = !self.reverse_condition;
        self
    }

    pub fn is_value_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Select the predicate for this filter.
    ///
    /// `name` identifies the filter in error messages.
    pub fn predicate(&self, name: &str) -> Result<Predicate, CriteriaError> {
        let reverse = self.reverse_condition;
        let predicate = match (self.condition, self.is_value_empty()) {
            (FilterCondition::Equals, true) if reverse => Predicate::IsNotNull,
            (FilterCondition::Equals, true) => Predicate::IsNull,
            (FilterCondition::Equals, false) if reverse => {
                Predicate::NotEqual(Value::Text(self.value.clone()))
            }
            (FilterCondition::Equals, false) => Predicate::Equal(Value::Text(self.value.clone())),
            // LIKE '%%' matches every non-null value
            (
                FilterCondition::Contains | FilterCondition::StartsWith | FilterCondition::EndsWith,
                true,
            ) => {
                if reverse {
                    Predicate::IsNull
                } else {
                    Predicate::IsNotNull
                }
            }
            (
                condition @ (FilterCondition::Contains
                | FilterCondition::StartsWith
                | FilterCondition::EndsWith),
                false,
            ) => {
                let pattern = like_pattern(condition, &self.value);
                if reverse {
                    Predicate::NotLike(pattern)
                } else {
                    Predicate::Like(pattern)
                }
            }
            (condition @ FilterCondition::Between, _) => {
                return Err(CriteriaError::NotImplemented {
                    filter: name.to_string(),
                    condition,
                })
            }
        };
        Ok(predicate)
    }
}

impl FromStr for FilterString {
    type Err = CriteriaError;

    /// Parses `[!][condition:]value`; a bare value means `equals`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (reverse_condition, rest) = split_reverse(s);
        let (condition, value) = match rest.split_once(':') {
            Some((head, tail)) => match head.parse::<FilterCondition>() {
                Ok(condition) => (condition, tail),
                Err(_) => (FilterCondition::Equals, rest),
            },
            None => (FilterCondition::Equals, rest),
        };
        if condition == FilterCondition::Between {
            return Err(CriteriaError::Parse {
                input: s.to_string(),
                reason: "text filters do not support 'between'".to_string(),
            });
        }
        Ok(Self {
            condition,
            value: value.to_string(),
            reverse_condition,
        })
    }
}

/// Escape LIKE metacharacters and wrap the value in wildcards.
///
/// The escape character is `\`; fragments must carry `ESCAPE '\'`.
pub fn like_pattern(condition: FilterCondition, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    match condition {
        FilterCondition::StartsWith => format!("{}%", escaped),
        FilterCondition::EndsWith => format!("%{}", escaped),
        _ => format!("%{}%", escaped),
    }
}

// =========================================================================
// Bool filter
// =========================================================================

/// Filter over a 0/1 flag column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterBool {
    pub condition: FilterCondition,
    #[serde(default)]
    pub value: bool,
    #[serde(default)]
    pub reverse_condition: bool,
}

impl FilterBool {
    pub fn equals(value: bool) -> Self {
        Self {
            condition: FilterCondition::Equals,
            value,
            reverse_condition: false,
        }
    }

    pub fn reversed(mut self) -> Self {
        self.reverse_condition = !self.reverse_condition;
        self
    }

    pub fn predicate(&self, name: &str) -> Result<Predicate, CriteriaError> {
        match self.condition {
            FilterCondition::Equals => {
                let value = Value::Integer(i64::from(self.value));
                Ok(if self.reverse_condition {
                    Predicate::NotEqual(value)
                } else {
                    Predicate::Equal(value)
                })
            }
            condition => Err(CriteriaError::NotImplemented {
                filter: name.to_string(),
                condition,
            }),
        }
    }
}

impl FromStr for FilterBool {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (reverse_condition, rest) = split_reverse(s.trim());
        let value = match rest.to_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            _ => {
                return Err(CriteriaError::Parse {
                    input: s.to_string(),
                    reason: "expected true or false".to_string(),
                })
            }
        };
        Ok(Self {
            condition: FilterCondition::Equals,
            value,
            reverse_condition,
        })
    }
}

// =========================================================================
// Range filter
// =========================================================================

/// A value that can bound a range filter
pub trait RangeValue: Clone + fmt::Debug {
    fn to_sql_value(&self) -> Value;

    /// Parse one side of a range; `upper` is set for the right-hand side
    fn parse_bound(s: &str, upper: bool) -> Result<Self, String>;
}

impl RangeValue for i32 {
    fn to_sql_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn parse_bound(s: &str, _upper: bool) -> Result<Self, String> {
        s.parse().map_err(|e| format!("{}", e))
    }
}

impl RangeValue for i64 {
    fn to_sql_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn parse_bound(s: &str, _upper: bool) -> Result<Self, String> {
        s.parse().map_err(|e| format!("{}", e))
    }
}

impl RangeValue for f64 {
    fn to_sql_value(&self) -> Value {
        Value::Real(*self)
    }

    fn parse_bound(s: &str, _upper: bool) -> Result<Self, String> {
        s.parse().map_err(|e| format!("{}", e))
    }
}

impl RangeValue for DateTime<Utc> {
    fn to_sql_value(&self) -> Value {
        Value::Text(format_timestamp(self))
    }

    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare date. A bare date
    /// used as an upper bound covers the whole day.
    fn parse_bound(s: &str, upper: bool) -> Result<Self, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(Utc.from_utc_datetime(&naive));
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("{}", e))?;
        let time = if upper {
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
        } else {
            NaiveTime::from_hms_opt(0, 0, 0)
        }
        .ok_or_else(|| "invalid time of day".to_string())?;
        Ok(Utc.from_utc_datetime(&date.and_time(time)))
    }
}

/// Filter over an ordered column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRange<T> {
    pub condition: FilterCondition,
    pub lower: Option<T>,
    pub upper: Option<T>,
    #[serde(default)]
    pub reverse_condition: bool,
}

impl<T> FilterRange<T> {
    pub fn between(lower: Option<T>, upper: Option<T>) -> Self {
        Self {
            condition: FilterCondition::Between,
            lower,
            upper,
            reverse_condition: false,
        }
    }

    pub fn reversed(mut self) -> Self {
        self.reverse_condition = !self.reverse_condition;
        self
    }
}

impl<T: RangeValue> FilterRange<T> {
    /// Select the predicate for this range; `None` when neither bound is set.
    pub fn predicate(&self, name: &str) -> Result<Option<Predicate>, CriteriaError> {
        if self.condition != FilterCondition::Between {
            return Err(CriteriaError::NotImplemented {
                filter: name.to_string(),
                condition: self.condition,
            });
        }
        let lower = self.lower.as_ref().map(RangeValue::to_sql_value);
        let upper = self.upper.as_ref().map(RangeValue::to_sql_value);
        let reverse = self.reverse_condition;

        let predicate = match (lower, upper) {
            (None, None) => return Ok(None),
            (Some(lo), None) if reverse => Predicate::Below(lo),
            (Some(lo), None) => Predicate::AtLeast(lo),
            (None, Some(hi)) if reverse => Predicate::Above(hi),
            (None, Some(hi)) => Predicate::AtMost(hi),
            (Some(lo), Some(hi)) if reverse => Predicate::Outside(lo, hi),
            (Some(lo), Some(hi)) => Predicate::Within(lo, hi),
        };
        Ok(Some(predicate))
    }
}

impl<T: RangeValue> FromStr for FilterRange<T> {
    type Err = CriteriaError;

    /// Parses `[!]lower..upper`; either side may be left empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (reverse_condition, rest) = split_reverse(s.trim());
        let (lo, hi) = rest.split_once("..").ok_or_else(|| CriteriaError::Parse {
            input: s.to_string(),
            reason: "expected a range like 'lower..upper'".to_string(),
        })?;
        let parse = |text: &str, upper: bool| -> Result<Option<T>, CriteriaError> {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            T::parse_bound(text, upper)
                .map(Some)
                .map_err(|reason| CriteriaError::Parse {
                    input: s.to_string(),
                    reason,
                })
        };
        Ok(Self {
            condition: FilterCondition::Between,
            lower: parse(lo, false)?,
            upper: parse(hi, true)?,
            reverse_condition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(
            like_pattern(FilterCondition::Contains, "50%_off"),
            "%50\\%\\_off%"
        );
        assert_eq!(like_pattern(FilterCondition::StartsWith, "BAW"), "BAW%");
        assert_eq!(like_pattern(FilterCondition::EndsWith, "a\\b"), "%a\\\\b");
    }

    #[test]
    fn test_string_equals_with_value() {
        let p = FilterString::equals("BAW123").predicate("callsign").unwrap();
        assert_eq!(p, Predicate::Equal(Value::Text("BAW123".into())));

        let p = FilterString::equals("BAW123")
            .reversed()
            .predicate("callsign")
            .unwrap();
        assert_eq!(p, Predicate::NotEqual(Value::Text("BAW123".into())));
    }

    #[test]
    fn test_string_equals_empty_is_null_check() {
        assert_eq!(
            FilterString::equals("").predicate("callsign").unwrap(),
            Predicate::IsNull
        );
        assert_eq!(
            FilterString::equals("").reversed().predicate("callsign").unwrap(),
            Predicate::IsNotNull
        );
    }

    #[test]
    fn test_string_like_conditions() {
        assert_eq!(
            FilterString::contains("A_1").predicate("reg").unwrap(),
            Predicate::Like("%A\\_1%".into())
        );
        assert_eq!(
            FilterString::starts_with("G-").reversed().predicate("reg").unwrap(),
            Predicate::NotLike("G-%".into())
        );
        assert_eq!(
            FilterString::contains("").predicate("reg").unwrap(),
            Predicate::IsNotNull
        );
        assert_eq!(
            FilterString::ends_with("").reversed().predicate("reg").unwrap(),
            Predicate::IsNull
        );
    }

    #[test]
    fn test_string_between_not_implemented() {
        let filter = FilterString::new(FilterCondition::Between, "x");
        let err = filter.predicate("callsign").unwrap_err();
        assert!(matches!(
            err,
            CriteriaError::NotImplemented {
                condition: FilterCondition::Between,
                ..
            }
        ));
    }

    #[test]
    fn test_bool_filter() {
        assert_eq!(
            FilterBool::equals(true).predicate("emergency").unwrap(),
            Predicate::Equal(Value::Integer(1))
        );
        assert_eq!(
            FilterBool::equals(true).reversed().predicate("emergency").unwrap(),
            Predicate::NotEqual(Value::Integer(1))
        );
        let bad = FilterBool {
            condition: FilterCondition::Contains,
            value: true,
            reverse_condition: false,
        };
        assert!(bad.predicate("emergency").is_err());
    }

    #[test]
    fn test_range_lower_only() {
        let range = FilterRange::between(Some(1000), None);
        assert_eq!(
            range.predicate("altitude").unwrap(),
            Some(Predicate::AtLeast(Value::Integer(1000)))
        );
        assert_eq!(
            range.reversed().predicate("altitude").unwrap(),
            Some(Predicate::Below(Value::Integer(1000)))
        );
    }

    #[test]
    fn test_range_upper_only() {
        let range = FilterRange::between(None, Some(5000));
        assert_eq!(
            range.predicate("altitude").unwrap(),
            Some(Predicate::AtMost(Value::Integer(5000)))
        );
        assert_eq!(
            range.reversed().predicate("altitude").unwrap(),
            Some(Predicate::Above(Value::Integer(5000)))
        );
    }

    #[test]
    fn test_range_both_bounds() {
        let range = FilterRange::between(Some(1), Some(9));
        assert_eq!(
            range.predicate("altitude").unwrap(),
            Some(Predicate::Within(Value::Integer(1), Value::Integer(9)))
        );
        assert_eq!(
            range.reversed().predicate("altitude").unwrap(),
            Some(Predicate::Outside(Value::Integer(1), Value::Integer(9)))
        );
    }

    #[test]
    fn test_range_without_bounds_has_no_predicate() {
        let range: FilterRange<i32> = FilterRange::between(None, None);
        assert_eq!(range.predicate("altitude").unwrap(), None);
    }

    #[test]
    fn test_range_requires_between() {
        let range = FilterRange {
            condition: FilterCondition::Equals,
            lower: Some(1),
            upper: None,
            reverse_condition: false,
        };
        assert!(matches!(
            range.predicate("altitude"),
            Err(CriteriaError::NotImplemented { .. })
        ));
    }

    #[test]
    fn test_parse_string_filter() {
        let f: FilterString = "!contains:BAW".parse().unwrap();
        assert_eq!(f.condition, FilterCondition::Contains);
        assert_eq!(f.value, "BAW");
        assert!(f.reverse_condition);

        let f: FilterString = "G-ABCD".parse().unwrap();
        assert_eq!(f.condition, FilterCondition::Equals);
        assert_eq!(f.value, "G-ABCD");

        // Unknown prefix is part of the value
        let f: FilterString = "http://x".parse().unwrap();
        assert_eq!(f.value, "http://x");

        let f: FilterString = "starts-with:EZY".parse().unwrap();
        assert_eq!(f.condition, FilterCondition::StartsWith);

        assert!("between:1".parse::<FilterString>().is_err());
    }

    #[test]
    fn test_parse_range_filter() {
        let r: FilterRange<i32> = "1000..".parse().unwrap();
        assert_eq!(r.lower, Some(1000));
        assert_eq!(r.upper, None);

        let r: FilterRange<i32> = "!..-100".parse().unwrap();
        assert_eq!(r.upper, Some(-100));
        assert!(r.reverse_condition);

        assert!("1000".parse::<FilterRange<i32>>().is_err());
        assert!("a..b".parse::<FilterRange<i32>>().is_err());
    }

    #[test]
    fn test_parse_date_range_covers_whole_day() {
        let r: FilterRange<DateTime<Utc>> = "2024-03-01..2024-03-01".parse().unwrap();
        assert_eq!(
            format_timestamp(r.lower.as_ref().unwrap()),
            "2024-03-01 00:00:00.000"
        );
        assert_eq!(
            format_timestamp(r.upper.as_ref().unwrap()),
            "2024-03-01 23:59:59.999"
        );
    }

    #[test]
    fn test_parse_bool_filter() {
        let f: FilterBool = "!true".parse().unwrap();
        assert!(f.value);
        assert!(f.reverse_condition);
        assert!("maybe".parse::<FilterBool>().is_err());
    }
}
