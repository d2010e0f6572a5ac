//! SQL-like text rendering
//!
//! Each group renders as `(child combinator child ...)` and each rule as
//! `field operator value`. The output is meant for display and hand-off, not
//! for execution: values are not escaped.

use crate::data::{Rule, RuleGroup, RuleOrGroup};

use super::types::ValueProcessor;

/// Render a whole tree
pub fn format_sql(root: &RuleGroup, processor: &dyn ValueProcessor) -> String {
    format_group(root, processor)
}

fn format_group(group: &RuleGroup, processor: &dyn ValueProcessor) -> String {
    let parts: Vec<String> = group
        .rules
        .iter()
        .map(|child| match child {
            RuleOrGroup::Rule(rule) => format_rule(rule, processor),
            RuleOrGroup::Group(inner) => format_group(inner, processor),
        })
        .collect();
    format!("({})", parts.join(&format!(" {} ", group.combinator)))
}

/// Render one rule, trimmed so value-less operators leave no trailing space
pub fn format_rule(rule: &Rule, processor: &dyn ValueProcessor) -> String {
    let value = processor.process(rule.field(), rule.operator(), rule.value());
    let operator = sql_operator(rule.operator());
    format!("{} {} {}", rule.field(), operator, value)
        .trim()
        .to_string()
}

/// SQL spelling of an operator name
///
/// `null`, `notNull`, and `notIn` (any case) become `is null`, `is not null`,
/// and `not in`; everything else passes through.
pub fn sql_operator(operator: &str) -> &str {
    if operator.eq_ignore_ascii_case("null") {
        "is null"
    } else if operator.eq_ignore_ascii_case("notnull") {
        "is not null"
    } else if operator.eq_ignore_ascii_case("notin") {
        "not in"
    } else {
        operator
    }
}
