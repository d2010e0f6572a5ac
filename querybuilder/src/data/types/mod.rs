//! Query tree and option types

mod node;
mod options;

pub use node::{NodeKind, NodeRef, Rule, RuleGroup, RuleOrGroup};
pub use options::{Field, NameLabelPair, ValueEditorType};
