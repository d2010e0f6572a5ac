//! Query normalization
//!
//! Turns arbitrary, possibly partial JSON into a well-formed tree. Existing
//! ids are kept, missing or empty ids are minted, and rules keep exactly the
//! properties they were given. The input is never modified.
//!
//! Every id already present in the input is reserved before anything is
//! minted, so a generated id never collides with one the input carries.

use std::collections::HashSet;

use serde_json::{Map, Value as JsonValue};

use crate::core::constants::{
    PROP_COMBINATOR, PROP_FIELD, PROP_ID, PROP_OPERATOR, PROP_RULES, PROP_VALUE,
    RULE_RESERVED_PROPS,
};
use crate::data::{NodeKind, NodeRef, QueryError, Rule, RuleGroup, RuleOrGroup};
use crate::utils::json::{json_type_name, truthy_text, value_to_text};

use super::classify::is_rule_group;
use super::ids::{IdGenerator, next_free_id};
use super::locate::collect_ids;

/// Normalize any node, rule or group
pub fn normalize(node: &JsonValue, ids: &dyn IdGenerator) -> Result<RuleOrGroup, QueryError> {
    Normalizer::new(node, ids).node(node)
}

/// Normalize a node that is about to be inserted into `root`
///
/// Minted ids also avoid every id already used in `root`.
pub fn normalize_within(
    node: &JsonValue,
    ids: &dyn IdGenerator,
    root: &RuleGroup,
) -> Result<RuleOrGroup, QueryError> {
    let mut normalizer = Normalizer::new(node, ids);
    let mut existing = Vec::new();
    collect_ids(NodeRef::Group(root), &mut existing);
    normalizer.taken.extend(existing.into_iter().map(str::to_string));
    normalizer.node(node)
}

/// Normalize a query root, which must classify as a group
pub fn normalize_query(node: &JsonValue, ids: &dyn IdGenerator) -> Result<RuleGroup, QueryError> {
    match normalize(node, ids)? {
        RuleOrGroup::Group(group) => Ok(std::sync::Arc::unwrap_or_clone(group)),
        RuleOrGroup::Rule(_) => Err(QueryError::RootNotGroup),
    }
}

impl RuleGroup {
    /// Parse JSON text and normalize it into a query root
    pub fn from_json(text: &str, ids: &dyn IdGenerator) -> Result<RuleGroup, QueryError> {
        let value: JsonValue = serde_json::from_str(text)?;
        normalize_query(&value, ids)
    }
}

struct Normalizer<'a> {
    ids: &'a dyn IdGenerator,
    taken: HashSet<String>,
}

impl<'a> Normalizer<'a> {
    fn new(input: &JsonValue, ids: &'a dyn IdGenerator) -> Self {
        let mut taken = HashSet::new();
        reserve_ids(input, &mut taken);
        Self { ids, taken }
    }

    fn node(&mut self, node: &JsonValue) -> Result<RuleOrGroup, QueryError> {
        let Some(object) = node.as_object() else {
            return Err(QueryError::malformed(format!(
                "expected an object, found {}",
                json_type_name(node)
            )));
        };

        if is_rule_group(node) {
            Ok(self.group(object)?.into())
        } else {
            Ok(self.rule(object).into())
        }
    }

    fn group(&mut self, object: &Map<String, JsonValue>) -> Result<RuleGroup, QueryError> {
        let id = self.id_for(object, NodeKind::Group);
        let combinator = object
            .get(PROP_COMBINATOR)
            .map(value_to_text)
            .unwrap_or_default();

        let Some(JsonValue::Array(children)) = object.get(PROP_RULES) else {
            return Err(QueryError::malformed(format!(
                "rules of group {} must be an array",
                id
            )));
        };

        let rules = children
            .iter()
            .map(|child| self.node(child))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RuleGroup {
            id,
            combinator,
            rules,
        })
    }

    fn rule(&mut self, object: &Map<String, JsonValue>) -> Rule {
        let id = self.id_for(object, NodeKind::Rule);

        let extra: Map<String, JsonValue> = object
            .iter()
            .filter(|(key, _)| !RULE_RESERVED_PROPS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Rule {
            id,
            field: object.get(PROP_FIELD).map(value_to_text),
            operator: object.get(PROP_OPERATOR).map(value_to_text),
            value: object.get(PROP_VALUE).cloned(),
            extra,
        }
    }

    /// The node's own id, or a fresh one nothing else uses
    fn id_for(&mut self, object: &Map<String, JsonValue>, kind: NodeKind) -> String {
        if let Some(id) = existing_id(object) {
            return id;
        }
        let id = next_free_id(self.ids, kind, |candidate| self.taken.contains(candidate));
        self.taken.insert(id.clone());
        id
    }
}

/// Collect every id the raw input already carries
fn reserve_ids(node: &JsonValue, taken: &mut HashSet<String>) {
    let Some(object) = node.as_object() else {
        return;
    };
    if let Some(id) = existing_id(object) {
        taken.insert(id);
    }
    if is_rule_group(node)
        && let Some(JsonValue::Array(children)) = object.get(PROP_RULES)
    {
        for child in children {
            reserve_ids(child, taken);
        }
    }
}

fn existing_id(object: &Map<String, JsonValue>) -> Option<String> {
    object.get(PROP_ID).and_then(truthy_text)
}
