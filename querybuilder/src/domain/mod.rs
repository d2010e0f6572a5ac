//! Query tree logic and output formatting

pub mod format;
pub mod query;
