//! Error type for query tree operations
//!
//! Lookups that miss are not errors: they resolve to `None` or to a no-op
//! mutation. Errors here are precondition violations a caller can fix.

use thiserror::Error;

use super::types::NodeKind;

/// Errors raised while building, mutating, or formatting a query tree
#[derive(Error, Debug)]
pub enum QueryError {
    /// A group-only operation targeted a rule
    #[error("Node {id} is a rule, expected a group")]
    NotAGroup { id: String },

    /// A remove operation matched a child of the wrong kind
    #[error("Node {id} is not a {expected}")]
    KindMismatch { id: String, expected: NodeKind },

    /// The top-level node of a query did not classify as a group
    #[error("Query root must be a rule group")]
    RootNotGroup,

    /// Input that cannot be read as a rule or group
    #[error("Malformed query input: {0}")]
    Malformed(String),

    /// Node ids never change once assigned
    #[error("Cannot change id of node {id}")]
    ImmutableId { id: String },

    /// Inserting a node would duplicate an id already in the tree
    #[error("Duplicate node id: {id}")]
    DuplicateId { id: String },

    /// A property was given a value of the wrong shape
    #[error("Invalid value for property {property}: expected {expected}")]
    InvalidPropertyValue {
        property: String,
        expected: &'static str,
    },

    /// A property that cannot be set on this kind of node
    #[error("Property {property} cannot be set on a {kind}")]
    UnsupportedProperty { property: String, kind: NodeKind },

    /// A rule cannot be created without at least one field
    #[error("No fields configured")]
    NoFields,

    /// A group cannot be created without at least one combinator
    #[error("No combinators configured")]
    NoCombinators,

    /// Output format name not recognized
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// JSON parse or serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    pub fn not_a_group(id: impl Into<String>) -> Self {
        Self::NotAGroup { id: id.into() }
    }

    pub fn kind_mismatch(id: impl Into<String>, expected: NodeKind) -> Self {
        Self::KindMismatch {
            id: id.into(),
            expected,
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    pub fn invalid_value(property: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidPropertyValue {
            property: property.into(),
            expected,
        }
    }

    pub fn unsupported_property(property: impl Into<String>, kind: NodeKind) -> Self {
        Self::UnsupportedProperty {
            property: property.into(),
            kind,
        }
    }

    /// True for errors caused by the caller targeting the wrong node kind
    pub fn is_shape_violation(&self) -> bool {
        matches!(self, Self::NotAGroup { .. } | Self::KindMismatch { .. })
    }
}
