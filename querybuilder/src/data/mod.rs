//! Data model for query trees
//!
//! Contains the node types that make up a query and the error type shared by
//! every operation on them.

pub mod error;
pub mod types;

pub use error::QueryError;
pub use types::{
    Field, NameLabelPair, NodeKind, NodeRef, Rule, RuleGroup, RuleOrGroup, ValueEditorType,
};
