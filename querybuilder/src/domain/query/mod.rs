//! Query tree operations
//!
//! Classification, normalization, lookup, depth, and persistent mutation of
//! [`RuleGroup`](crate::data::RuleGroup) trees.

mod classify;
mod ids;
mod level;
mod locate;
mod mutate;
mod normalize;


pub use classify::{classify, is_rule_group};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator, next_free_id};
pub use level::level;
pub use locate::{collect_ids, find_node, find_path, node_at_path};
pub use mutate::{Mutation, add_group, add_rule, remove_group, remove_rule, set_property};
pub use normalize::{normalize, normalize_query, normalize_within};
