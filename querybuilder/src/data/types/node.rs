//! Query tree nodes
//!
//! A query is a [`RuleGroup`] whose children are either [`Rule`] leaves or
//! nested groups. The variant is fixed when a node is built, so a rule can
//! never carry children. Children sit behind `Arc` so snapshots of a tree
//! share every subtree that a later mutation does not touch.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::core::constants::{GROUP_ID_PREFIX, RULE_ID_PREFIX};

// ============================================================================
// NODE KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Rule,
    Group,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Group => "group",
        }
    }

    /// Prefix used when minting ids for this kind
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Rule => RULE_ID_PREFIX,
            Self::Group => GROUP_ID_PREFIX,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RULE
// ============================================================================

/// Leaf condition comparing one field to a value
///
/// `field`, `operator`, and `value` stay `None` when the rule was built from
/// input that lacked them, so serializing it gives back only what it had.
/// The accessors read a missing one as empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Untyped payload; its meaning depends on the operator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    /// Any other properties the rule was created with
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

static EMPTY_VALUE: JsonValue = JsonValue::String(String::new());

impl Rule {
    pub fn new(
        id: impl Into<String>,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Self {
        Self {
            id: id.into(),
            field: Some(field.into()),
            operator: Some(operator.into()),
            value: Some(value.into()),
            extra: Map::new(),
        }
    }

    pub fn field(&self) -> &str {
        self.field.as_deref().unwrap_or_default()
    }

    pub fn operator(&self) -> &str {
        self.operator.as_deref().unwrap_or_default()
    }

    /// The value, or an empty string when none was given
    pub fn value(&self) -> &JsonValue {
        self.value.as_ref().unwrap_or(&EMPTY_VALUE)
    }
}

// ============================================================================
// RULE GROUP
// ============================================================================

/// Internal node joining its children with a combinator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleGroup {
    pub id: String,
    pub combinator: String,
    pub rules: Vec<RuleOrGroup>,
}

impl RuleGroup {
    pub fn new(id: impl Into<String>, combinator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            combinator: combinator.into(),
            rules: Vec::new(),
        }
    }

    /// Append a child, builder style
    pub fn with(mut self, child: impl Into<RuleOrGroup>) -> Self {
        self.rules.push(child.into());
        self
    }

    /// Copy the whole tree so the result shares no nodes with `self`
    pub fn deep_clone(&self) -> RuleGroup {
        RuleGroup {
            id: self.id.clone(),
            combinator: self.combinator.clone(),
            rules: self.rules.iter().map(RuleOrGroup::deep_clone).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ============================================================================
// RULE OR GROUP
// ============================================================================

/// A child slot in a group
///
/// Serialized untagged, so JSON output carries no discriminator field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleOrGroup {
    Rule(Arc<Rule>),
    Group(Arc<RuleGroup>),
}

impl RuleOrGroup {
    pub fn id(&self) -> &str {
        match self {
            Self::Rule(rule) => &rule.id,
            Self::Group(group) => &group.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Rule(_) => NodeKind::Rule,
            Self::Group(_) => NodeKind::Group,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Self::Rule(rule) => Some(rule),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&RuleGroup> {
        match self {
            Self::Rule(_) => None,
            Self::Group(group) => Some(group),
        }
    }

    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            Self::Rule(rule) => NodeRef::Rule(rule),
            Self::Group(group) => NodeRef::Group(group),
        }
    }

    fn deep_clone(&self) -> RuleOrGroup {
        match self {
            Self::Rule(rule) => Self::Rule(Arc::new(Rule::clone(rule))),
            Self::Group(group) => Self::Group(Arc::new(group.deep_clone())),
        }
    }
}

impl From<Rule> for RuleOrGroup {
    fn from(rule: Rule) -> Self {
        Self::Rule(Arc::new(rule))
    }
}

impl From<RuleGroup> for RuleOrGroup {
    fn from(group: RuleGroup) -> Self {
        Self::Group(Arc::new(group))
    }
}

// ============================================================================
// NODE REFERENCE
// ============================================================================

/// Borrowed view of any node, including a query root
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Rule(&'a Rule),
    Group(&'a RuleGroup),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            Self::Rule(rule) => &rule.id,
            Self::Group(group) => &group.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Rule(_) => NodeKind::Rule,
            Self::Group(_) => NodeKind::Group,
        }
    }

    pub fn as_rule(&self) -> Option<&'a Rule> {
        match self {
            Self::Rule(rule) => Some(rule),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&'a RuleGroup> {
        match self {
            Self::Rule(_) => None,
            Self::Group(group) => Some(group),
        }
    }
}
