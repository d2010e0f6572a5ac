//! Query builder core
//!
//! A query is a tree of groups and rules. Groups join their children with a
//! combinator such as `and` / `or`; rules compare a field against a value
//! with an operator. This crate normalizes raw JSON into such trees, edits
//! them as persistent structures so earlier snapshots stay valid, and renders
//! them as JSON or SQL-like text.
//!
//! - [`data`]: node types and [`QueryError`]
//! - [`domain::query`]: normalize, locate, mutate, and level
//! - [`domain::format`]: JSON and SQL output
//! - [`builder`]: the [`QueryBuilder`] controller UI layers drive
//! - [`sync`]: a thread-safe handle around a builder

pub mod builder;
pub mod core;
pub mod data;
pub mod domain;
mod notify;
pub mod sync;
pub mod utils;

pub use builder::{QueryBuilder, QueryListener};
pub use crate::core::config::BuilderConfig;
pub use data::{Field, NameLabelPair, NodeKind, QueryError, Rule, RuleGroup, RuleOrGroup};
pub use domain::format::{OutputFormat, ValueProcessor};
pub use domain::query::{IdGenerator, Mutation, SequentialIdGenerator, UuidIdGenerator};
pub use sync::SharedQueryBuilder;
