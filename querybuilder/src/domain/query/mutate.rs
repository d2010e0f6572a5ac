//! Structural mutation of a query tree
//!
//! Every operation takes the current root as `&mut Arc<RuleGroup>` and copies
//! only the nodes on the path from the root to the mutation site, through
//! `Arc::make_mut`. Any snapshot a caller still holds keeps its old contents,
//! and subtrees off the path stay shared between old and new roots.
//!
//! Operations return `Ok(true)` when the tree changed and `Ok(false)` when the
//! target id was not found. Targeting the wrong kind of node is an error and
//! leaves the tree untouched.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::core::config::OperatorProvider;
use crate::core::constants::{
    PROP_COMBINATOR, PROP_FIELD, PROP_ID, PROP_OPERATOR, PROP_RULES, PROP_VALUE,
};
use crate::data::{NodeKind, NodeRef, QueryError, Rule, RuleGroup, RuleOrGroup};

use super::locate::{collect_ids, find_node, find_path, node_at_path};

// ============================================================================
// MUTATION COMMANDS
// ============================================================================

/// A mutation expressed as data, e.g. sent by a UI layer as JSON
///
/// `rule` and `group` carry raw node JSON; when absent a default node is
/// created from the builder's configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    AddRule {
        parent_id: String,
        #[serde(default)]
        rule: Option<JsonValue>,
    },
    AddGroup {
        parent_id: String,
        #[serde(default)]
        group: Option<JsonValue>,
    },
    RemoveRule {
        rule_id: String,
        parent_id: String,
    },
    RemoveGroup {
        group_id: String,
        parent_id: String,
    },
    SetProperty {
        property: String,
        value: JsonValue,
        node_id: String,
    },
}

impl Mutation {
    /// Operation name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddRule { .. } => "add_rule",
            Self::AddGroup { .. } => "add_group",
            Self::RemoveRule { .. } => "remove_rule",
            Self::RemoveGroup { .. } => "remove_group",
            Self::SetProperty { .. } => "set_property",
        }
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Append `rule` to the end of the group `parent_id`
pub fn add_rule(
    root: &mut Arc<RuleGroup>,
    rule: Rule,
    parent_id: &str,
) -> Result<bool, QueryError> {
    append_child(root, rule.into(), parent_id)
}

/// Append `group` to the end of the group `parent_id`
pub fn add_group(
    root: &mut Arc<RuleGroup>,
    group: RuleGroup,
    parent_id: &str,
) -> Result<bool, QueryError> {
    append_child(root, group.into(), parent_id)
}

/// Remove the rule `rule_id` from the group `parent_id`
pub fn remove_rule(
    root: &mut Arc<RuleGroup>,
    rule_id: &str,
    parent_id: &str,
) -> Result<bool, QueryError> {
    remove_child(root, rule_id, parent_id, NodeKind::Rule)
}

/// Remove the group `group_id` from the group `parent_id`
pub fn remove_group(
    root: &mut Arc<RuleGroup>,
    group_id: &str,
    parent_id: &str,
) -> Result<bool, QueryError> {
    remove_child(root, group_id, parent_id, NodeKind::Group)
}

/// Set one property on the node `node_id`.
///
/// Rules accept `field`, `operator`, `value`, and any extra property. Setting
/// `field` also resets `operator` to the first operator the provider lists
/// for the new field and clears `value`. Groups accept only `combinator`.
/// `id` can never be changed.
pub fn set_property(
    root: &mut Arc<RuleGroup>,
    property: &str,
    value: JsonValue,
    node_id: &str,
    operators: &dyn OperatorProvider,
) -> Result<bool, QueryError> {
    if property == PROP_ID {
        return Err(QueryError::ImmutableId {
            id: node_id.to_string(),
        });
    }

    let Some(path) = find_path(node_id, root) else {
        tracing::trace!(node_id, property, "Property target not found");
        return Ok(false);
    };
    let Some(kind) = node_at_path(root, &path).map(|node| node.kind()) else {
        return Ok(false);
    };

    match kind {
        NodeKind::Rule => {
            let update = RuleUpdate::parse(property, value)?;
            if let Some(rule) = rule_at_path_mut(root, &path) {
                update.apply(rule, operators);
            }
        }
        NodeKind::Group => {
            if property != PROP_COMBINATOR {
                return Err(QueryError::unsupported_property(property, NodeKind::Group));
            }
            let combinator = non_empty_string(property, value)?;
            if let Some(group) = group_at_path_mut(root, &path) {
                group.combinator = combinator;
            }
        }
    }

    Ok(true)
}

// ============================================================================
// RULE UPDATES
// ============================================================================

/// A validated change to a single rule property
enum RuleUpdate {
    Field(String),
    Operator(String),
    Value(JsonValue),
    Extra(String, JsonValue),
}

impl RuleUpdate {
    fn parse(property: &str, value: JsonValue) -> Result<Self, QueryError> {
        match property {
            PROP_FIELD => Ok(Self::Field(string_value(property, value)?)),
            PROP_OPERATOR => Ok(Self::Operator(string_value(property, value)?)),
            PROP_VALUE => Ok(Self::Value(value)),
            PROP_COMBINATOR | PROP_RULES => {
                Err(QueryError::unsupported_property(property, NodeKind::Rule))
            }
            other => Ok(Self::Extra(other.to_string(), value)),
        }
    }

    fn apply(self, rule: &mut Rule, operators: &dyn OperatorProvider) {
        match self {
            Self::Field(field) => {
                // Operators and values depend on the field, so stale ones go
                rule.operator = Some(
                    operators
                        .operators(&field)
                        .first()
                        .map(|op| op.name.clone())
                        .unwrap_or_default(),
                );
                rule.value = Some(JsonValue::String(String::new()));
                rule.field = Some(field);
            }
            Self::Operator(operator) => rule.operator = Some(operator),
            Self::Value(value) => rule.value = Some(value),
            Self::Extra(key, value) => {
                rule.extra.insert(key, value);
            }
        }
    }
}

fn string_value(property: &str, value: JsonValue) -> Result<String, QueryError> {
    match value {
        JsonValue::String(s) => Ok(s),
        _ => Err(QueryError::invalid_value(property, "a string")),
    }
}

fn non_empty_string(property: &str, value: JsonValue) -> Result<String, QueryError> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Ok(s),
        _ => Err(QueryError::invalid_value(property, "a non-empty string")),
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn append_child(
    root: &mut Arc<RuleGroup>,
    child: RuleOrGroup,
    parent_id: &str,
) -> Result<bool, QueryError> {
    let Some(path) = find_path(parent_id, root) else {
        tracing::trace!(parent_id, "Parent group not found");
        return Ok(false);
    };
    match node_at_path(root, &path) {
        Some(NodeRef::Group(_)) => {}
        Some(NodeRef::Rule(_)) => return Err(QueryError::not_a_group(parent_id)),
        None => return Ok(false),
    }

    let existing: &RuleGroup = root;
    let mut incoming = Vec::new();
    collect_ids(child.as_node(), &mut incoming);
    let mut seen = HashSet::with_capacity(incoming.len());
    if let Some(id) = incoming
        .into_iter()
        .find(|id| !seen.insert(*id) || find_node(id, existing).is_some())
    {
        return Err(QueryError::DuplicateId { id: id.to_string() });
    }

    if let Some(parent) = group_at_path_mut(root, &path) {
        parent.rules.push(child);
    }
    Ok(true)
}

fn remove_child(
    root: &mut Arc<RuleGroup>,
    child_id: &str,
    parent_id: &str,
    expected: NodeKind,
) -> Result<bool, QueryError> {
    let Some(path) = find_path(parent_id, root) else {
        tracing::trace!(parent_id, child_id, "Parent group not found");
        return Ok(false);
    };
    let parent = match node_at_path(root, &path) {
        Some(NodeRef::Group(group)) => group,
        Some(NodeRef::Rule(_)) => return Err(QueryError::not_a_group(parent_id)),
        None => return Ok(false),
    };

    let Some(index) = parent.rules.iter().position(|child| child.id() == child_id) else {
        tracing::trace!(parent_id, child_id, "Child not found in parent");
        return Ok(false);
    };
    if parent.rules[index].kind() != expected {
        return Err(QueryError::kind_mismatch(child_id, expected));
    }

    if let Some(parent) = group_at_path_mut(root, &path) {
        parent.rules.remove(index);
    }
    Ok(true)
}

/// Mutable access to a node, copying every shared node on the way down
enum NodeMut<'a> {
    Rule(&'a mut Rule),
    Group(&'a mut RuleGroup),
}

fn node_at_path_mut<'a>(root: &'a mut Arc<RuleGroup>, path: &[usize]) -> Option<NodeMut<'a>> {
    let mut group = Arc::make_mut(root);
    let Some((last, parents)) = path.split_last() else {
        return Some(NodeMut::Group(group));
    };

    for &index in parents {
        group = match group.rules.get_mut(index)? {
            RuleOrGroup::Group(child) => Arc::make_mut(child),
            RuleOrGroup::Rule(_) => return None,
        };
    }

    match group.rules.get_mut(*last)? {
        RuleOrGroup::Rule(rule) => Some(NodeMut::Rule(Arc::make_mut(rule))),
        RuleOrGroup::Group(child) => Some(NodeMut::Group(Arc::make_mut(child))),
    }
}

fn group_at_path_mut<'a>(
    root: &'a mut Arc<RuleGroup>,
    path: &[usize],
) -> Option<&'a mut RuleGroup> {
    match node_at_path_mut(root, path)? {
        NodeMut::Group(group) => Some(group),
        NodeMut::Rule(_) => None,
    }
}

fn rule_at_path_mut<'a>(root: &'a mut Arc<RuleGroup>, path: &[usize]) -> Option<&'a mut Rule> {
    match node_at_path_mut(root, path)? {
        NodeMut::Rule(rule) => Some(rule),
        NodeMut::Group(_) => None,
    }
}
