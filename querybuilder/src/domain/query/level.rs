//! Nesting depth of a node

use crate::data::{RuleGroup, RuleOrGroup};

/// Depth of the node with `id`; the root group is level 0.
///
/// A child group sits one level below its parent, and a rule shares the
/// level of the group that contains it. Returns `None` when the id is not in
/// the tree.
pub fn level(id: &str, root: &RuleGroup) -> Option<usize> {
    level_from(id, root, 0)
}

fn level_from(id: &str, group: &RuleGroup, depth: usize) -> Option<usize> {
    if group.id == id {
        return Some(depth);
    }

    for child in &group.rules {
        match child {
            RuleOrGroup::Rule(rule) if rule.id == id => return Some(depth),
            RuleOrGroup::Rule(_) => {}
            RuleOrGroup::Group(inner) => {
                if let Some(found) = level_from(id, inner, depth + 1) {
                    return Some(found);
                }
            }
        }
    }

    None
}
