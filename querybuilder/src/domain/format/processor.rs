//! Default SQL value rendering

use serde_json::Value as JsonValue;

use crate::utils::json::value_to_text;

use super::types::ValueProcessor;

/// Value rendering for the default operator set
///
/// - `null` / `notNull`: no value at all
/// - `in` / `notIn`: comma-separated items, each trimmed and quoted, in
///   parentheses: `a, b` becomes `("a", "b")`
/// - booleans: `TRUE` / `FALSE`
/// - everything else: wrapped in double quotes as-is, without escaping
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValueProcessor;

impl ValueProcessor for DefaultValueProcessor {
    fn process(&self, _field: &str, operator: &str, value: &JsonValue) -> String {
        let operator = operator.to_ascii_lowercase();
        match operator.as_str() {
            "null" | "notnull" => String::new(),
            "in" | "notin" => {
                let items: Vec<String> = list_items(value)
                    .iter()
                    .map(|item| format!("\"{}\"", item.trim()))
                    .collect();
                format!("({})", items.join(", "))
            }
            _ => match value {
                JsonValue::Bool(true) => "TRUE".to_string(),
                JsonValue::Bool(false) => "FALSE".to_string(),
                other => format!("\"{}\"", value_to_text(other)),
            },
        }
    }
}

/// Items of a list value; strings are split on commas
fn list_items(value: &JsonValue) -> Vec<String> {
    match value {
        JsonValue::String(s) => s.split(',').map(str::to_string).collect(),
        JsonValue::Array(items) => items.iter().map(value_to_text).collect(),
        other => vec![value_to_text(other)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn process(operator: &str, value: JsonValue) -> String {
        DefaultValueProcessor.process("field", operator, &value)
    }

    #[test]
    fn test_plain_value_is_quoted() {
        assert_eq!(process("=", json!("Steve")), r#""Steve""#);
        assert_eq!(process(">", json!(30)), r#""30""#);
    }

    #[test]
    fn test_embedded_quotes_are_not_escaped() {
        assert_eq!(process("=", json!(r#"say "hi""#)), r#""say "hi"""#);
    }

    #[test]
    fn test_null_operators_have_no_value() {
        assert_eq!(process("null", json!("ignored")), "");
        assert_eq!(process("notNull", json!("")), "");
        assert_eq!(process("NOTNULL", json!("")), "");
    }

    #[test]
    fn test_in_list() {
        assert_eq!(process("in", json!("a, b, c")), r#"("a", "b", "c")"#);
        assert_eq!(process("notIn", json!(" x ,y")), r#"("x", "y")"#);
    }

    #[test]
    fn test_in_with_array_value() {
        assert_eq!(process("in", json!(["a", 2])), r#"("a", "2")"#);
    }

    #[test]
    fn test_in_with_empty_string() {
        assert_eq!(process("in", json!("")), r#"("")"#);
    }

    #[test]
    fn test_boolean_value() {
        assert_eq!(process("=", json!(true)), "TRUE");
        assert_eq!(process("!=", json!(false)), "FALSE");
    }
}
