//! JSON utility functions

use serde_json::Value as JsonValue;

/// Loose truthiness used when classifying raw input.
///
/// `null`, `false`, `0`, and `""` are falsy. Every array and object is truthy,
/// including empty ones, so `{"combinator": "and", "rules": []}` is a group.
pub fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Render a JSON value as plain text.
///
/// Strings come back without quotes; anything else uses compact JSON.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use querybuilder::utils::json::value_to_text;
///
/// assert_eq!(value_to_text(&json!("Steve")), "Steve");
/// assert_eq!(value_to_text(&json!(42)), "42");
/// ```
pub fn value_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text form of a truthy value, `None` for falsy ones
pub fn truthy_text(value: &JsonValue) -> Option<String> {
    is_truthy(value).then(|| value_to_text(value))
}

/// Short name of a JSON value's type, for error messages
pub fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_values() {
        assert!(!is_truthy(&JsonValue::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("and")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!("a, b")), "a, b");
        assert_eq!(value_to_text(&json!(1.5)), "1.5");
        assert_eq!(value_to_text(&json!(true)), "true");
        assert_eq!(value_to_text(&JsonValue::Null), "null");
        assert_eq!(value_to_text(&json!(["x"])), r#"["x"]"#);
    }

    #[test]
    fn test_truthy_text() {
        assert_eq!(truthy_text(&json!("g-1")), Some("g-1".to_string()));
        assert_eq!(truthy_text(&json!(7)), Some("7".to_string()));
        assert_eq!(truthy_text(&json!("")), None);
        assert_eq!(truthy_text(&JsonValue::Null), None);
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&json!([1])), "array");
        assert_eq!(json_type_name(&json!("s")), "string");
    }
}
