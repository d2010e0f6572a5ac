// =============================================================================
// Node Identity
// =============================================================================

/// Prefix for generated rule ids (debugging aid only, never used to classify)
pub const RULE_ID_PREFIX: &str = "r-";

/// Prefix for generated group ids (debugging aid only, never used to classify)
pub const GROUP_ID_PREFIX: &str = "g-";

// =============================================================================
// Node Properties
// =============================================================================

pub const PROP_ID: &str = "id";
pub const PROP_FIELD: &str = "field";
pub const PROP_OPERATOR: &str = "operator";
pub const PROP_VALUE: &str = "value";
pub const PROP_COMBINATOR: &str = "combinator";
pub const PROP_RULES: &str = "rules";

/// Properties a rule stores in dedicated slots rather than in its extra map
pub const RULE_RESERVED_PROPS: &[&str] = &[PROP_ID, PROP_FIELD, PROP_OPERATOR, PROP_VALUE];

// =============================================================================
// Builder Defaults
// =============================================================================

/// Default operators as `(name, label)` pairs
pub const DEFAULT_OPERATORS: &[(&str, &str)] = &[
    ("null", "Is Null"),
    ("notNull", "Is Not Null"),
    ("in", "In"),
    ("notIn", "Not In"),
    ("=", "="),
    ("!=", "!="),
    ("<", "<"),
    (">", ">"),
    ("<=", "<="),
    (">=", ">="),
];

/// Default combinators as `(name, label)` pairs
pub const DEFAULT_COMBINATORS: &[(&str, &str)] = &[("and", "AND"), ("or", "OR")];

/// Input type used when a field does not specify one
pub const DEFAULT_INPUT_TYPE: &str = "text";

// =============================================================================
// Output Formats
// =============================================================================

pub const FORMAT_JSON: &str = "json";
pub const FORMAT_SQL: &str = "sql";
