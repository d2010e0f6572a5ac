//! Query formatting
//!
//! Serializes a query tree as pretty JSON or as SQL-like text. SQL values go
//! through a [`ValueProcessor`]; [`DefaultValueProcessor`] handles the default
//! operator set.
//!
//! ## Usage
//!
//! ```
//! use querybuilder::data::{Rule, RuleGroup};
//! use querybuilder::domain::format::{format_query, OutputFormat};
//!
//! let query = RuleGroup::new("g-1", "and").with(Rule::new("r-1", "firstName", "=", "Steve"));
//! let sql = format_query(&query, OutputFormat::Sql, None).unwrap();
//! assert_eq!(sql, r#"(firstName = "Steve")"#);
//! ```

mod processor;
mod sql;
mod types;

pub use processor::DefaultValueProcessor;
pub use sql::{format_rule, format_sql, sql_operator};
pub use types::{OutputFormat, ValueProcessor};

use crate::data::{QueryError, RuleGroup};

/// Format `root` in the given format
///
/// `processor` only affects SQL output; `None` uses [`DefaultValueProcessor`].
pub fn format_query(
    root: &RuleGroup,
    format: OutputFormat,
    processor: Option<&dyn ValueProcessor>,
) -> Result<String, QueryError> {
    match format {
        OutputFormat::Json => format_json(root),
        OutputFormat::Sql => Ok(format_sql(
            root,
            processor.unwrap_or(&DefaultValueProcessor),
        )),
    }
}

/// Format by format name, matched case-insensitively
///
/// Unknown names produce `Ok(None)` rather than an error.
pub fn format_query_as(
    root: &RuleGroup,
    format: &str,
    processor: Option<&dyn ValueProcessor>,
) -> Result<Option<String>, QueryError> {
    let Some(format) = OutputFormat::parse(format) else {
        tracing::debug!(format, "Unsupported output format");
        return Ok(None);
    };
    format_query(root, format, processor).map(Some)
}

/// Pretty JSON with two-space indentation and stable key order
pub fn format_json(root: &RuleGroup) -> Result<String, QueryError> {
    Ok(serde_json::to_string_pretty(root)?)
}
