//! Raw node classification
//!
//! Raw input carries no type tag. A node is a group exactly when it has a
//! truthy `combinator` and a truthy `rules`; everything else is a rule.

use serde_json::Value as JsonValue;

use crate::core::constants::{PROP_COMBINATOR, PROP_RULES};
use crate::data::NodeKind;
use crate::utils::json::is_truthy;

pub fn is_rule_group(node: &JsonValue) -> bool {
    node.get(PROP_COMBINATOR).is_some_and(is_truthy)
        && node.get(PROP_RULES).is_some_and(is_truthy)
}

pub fn classify(node: &JsonValue) -> NodeKind {
    if is_rule_group(node) {
        NodeKind::Group
    } else {
        NodeKind::Rule
    }
}
