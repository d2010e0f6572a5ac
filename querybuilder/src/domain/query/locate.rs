//! Node lookup by id
//!
//! Search is pre-order and depth-first: a group's own id first, then each
//! child in order, descending into child groups before moving on. The first
//! match wins. A miss is `None`, never an error.

use crate::data::{NodeRef, RuleGroup, RuleOrGroup};

/// Find the node with `id` anywhere under `root`, including `root` itself
pub fn find_node<'a>(id: &str, root: &'a RuleGroup) -> Option<NodeRef<'a>> {
    if root.id == id {
        return Some(NodeRef::Group(root));
    }

    for child in &root.rules {
        if child.id() == id {
            return Some(child.as_node());
        }
        if let RuleOrGroup::Group(group) = child
            && let Some(found) = find_node(id, group)
        {
            return Some(found);
        }
    }

    None
}

/// Child-index path from `root` to the node with `id`
///
/// The root itself has an empty path.
pub fn find_path(id: &str, root: &RuleGroup) -> Option<Vec<usize>> {
    if root.id == id {
        return Some(Vec::new());
    }
    let mut path = Vec::new();
    path_to(id, root, &mut path).then_some(path)
}

fn path_to(id: &str, group: &RuleGroup, path: &mut Vec<usize>) -> bool {
    for (index, child) in group.rules.iter().enumerate() {
        path.push(index);
        if child.id() == id {
            return true;
        }
        if let RuleOrGroup::Group(inner) = child
            && path_to(id, inner, path)
        {
            return true;
        }
        path.pop();
    }
    false
}

/// Resolve a path produced by [`find_path`]
pub fn node_at_path<'a>(root: &'a RuleGroup, path: &[usize]) -> Option<NodeRef<'a>> {
    let mut node = NodeRef::Group(root);
    for &index in path {
        node = node.as_group()?.rules.get(index)?.as_node();
    }
    Some(node)
}

/// Every id in the subtree rooted at `node`, in pre-order
pub fn collect_ids<'a>(node: NodeRef<'a>, out: &mut Vec<&'a str>) {
    out.push(node.id());
    if let NodeRef::Group(group) = node {
        for child in &group.rules {
            collect_ids(child.as_node(), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{NodeKind, Rule};

    fn tree() -> RuleGroup {
        RuleGroup::new("g-root", "and")
            .with(Rule::new("r-1", "a", "=", "1"))
            .with(
                RuleGroup::new("g-1", "or")
                    .with(Rule::new("r-2", "b", "=", "2"))
                    .with(RuleGroup::new("g-2", "and").with(Rule::new("r-3", "c", "=", "3"))),
            )
            .with(Rule::new("r-4", "d", "=", "4"))
    }

    #[test]
    fn test_find_root() {
        let root = tree();
        let found = find_node("g-root", &root).unwrap();
        assert_eq!(found.kind(), NodeKind::Group);
        assert_eq!(found.id(), "g-root");
    }

    #[test]
    fn test_find_nested_rule() {
        let root = tree();
        let found = find_node("r-3", &root).unwrap();
        assert_eq!(found.as_rule().unwrap().field(), "c");
    }

    #[test]
    fn test_find_missing() {
        let root = tree();
        assert!(find_node("r-404", &root).is_none());
        assert!(find_path("r-404", &root).is_none());
    }

    #[test]
    fn test_first_match_wins_on_duplicates() {
        let root = RuleGroup::new("g-root", "and")
            .with(RuleGroup::new("g-1", "or").with(Rule::new("dup", "inner", "=", "x")))
            .with(Rule::new("dup", "outer", "=", "y"));
        let found = find_node("dup", &root).unwrap();
        assert_eq!(found.as_rule().unwrap().field(), "inner");
    }

    #[test]
    fn test_find_path() {
        let root = tree();
        assert_eq!(find_path("g-root", &root), Some(vec![]));
        assert_eq!(find_path("r-1", &root), Some(vec![0]));
        assert_eq!(find_path("r-3", &root), Some(vec![1, 1, 0]));
        assert_eq!(find_path("r-4", &root), Some(vec![2]));
    }

    #[test]
    fn test_node_at_path_round_trip() {
        let root = tree();
        for id in ["g-root", "r-1", "g-1", "r-2", "g-2", "r-3", "r-4"] {
            let path = find_path(id, &root).unwrap();
            assert_eq!(node_at_path(&root, &path).unwrap().id(), id);
        }
    }

    #[test]
    fn test_node_at_path_through_rule() {
        let root = tree();
        assert!(node_at_path(&root, &[0, 0]).is_none());
        assert!(node_at_path(&root, &[9]).is_none());
    }

    #[test]
    fn test_collect_ids() {
        let root = tree();
        let mut ids = Vec::new();
        collect_ids(NodeRef::Group(&root), &mut ids);
        assert_eq!(ids, vec!["g-root", "r-1", "g-1", "r-2", "g-2", "r-3", "r-4"]);
    }
}
