//! Formatter types

use std::fmt;
use std::str::FromStr;

use serde_json::Value as JsonValue;

use crate::core::constants::{FORMAT_JSON, FORMAT_SQL};
use crate::data::QueryError;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON dump of the tree
    Json,
    /// Parenthesized WHERE-clause style text
    Sql,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => FORMAT_JSON,
            Self::Sql => FORMAT_SQL,
        }
    }

    /// Case-insensitive lookup, `None` for unknown names
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case(FORMAT_JSON) {
            Some(Self::Json)
        } else if name.eq_ignore_ascii_case(FORMAT_SQL) {
            Some(Self::Sql)
        } else {
            None
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| QueryError::UnsupportedFormat(s.to_string()))
    }
}

/// Renders the value part of a rule in SQL output
///
/// Any `Fn(&str, &str, &JsonValue) -> String` closure taking field, operator,
/// and value works as a processor.
pub trait ValueProcessor {
    fn process(&self, field: &str, operator: &str, value: &JsonValue) -> String;
}

impl<F> ValueProcessor for F
where
    F: Fn(&str, &str, &JsonValue) -> String,
{
    fn process(&self, field: &str, operator: &str, value: &JsonValue) -> String {
        self(field, operator, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("SQL"), Some(OutputFormat::Sql));
        assert_eq!(OutputFormat::parse("Json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("xml"), None);
    }

    #[test]
    fn test_from_str_error() {
        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedFormat(ref name) if name == "yaml"));
        assert_eq!("sql".parse::<OutputFormat>().unwrap(), OutputFormat::Sql);
    }

    #[test]
    fn test_display() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Sql.to_string(), "sql");
    }

    #[test]
    fn test_closure_processor() {
        let upper = |_field: &str, _op: &str, value: &JsonValue| value.to_string().to_uppercase();
        assert_eq!(upper.process("f", "=", &json!("abc")), r#""ABC""#);
    }
}
