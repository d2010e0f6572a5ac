use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::constants::{DEFAULT_COMBINATORS, DEFAULT_INPUT_TYPE, DEFAULT_OPERATORS};
use crate::data::{Field, NameLabelPair, ValueEditorType};

// =============================================================================
// Providers
// =============================================================================

/// Ordered list of fields a rule can filter on
pub trait FieldProvider {
    fn fields(&self) -> &[Field];
}

/// Ordered operators valid for a field; the first one is the default
pub trait OperatorProvider {
    fn operators(&self, field: &str) -> &[NameLabelPair];
}

/// Ordered combinators for groups; the first one is the default
pub trait CombinatorProvider {
    fn combinators(&self) -> &[NameLabelPair];
}

// =============================================================================
// File Config
// =============================================================================

/// File-based configuration (JSON), every key optional
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub fields: Option<Vec<Field>>,
    pub operators: Option<Vec<NameLabelPair>>,
    pub combinators: Option<Vec<NameLabelPair>>,
    pub show_combinators_between_rules: Option<bool>,
    pub query: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Read one JSON builder config file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Reading builder config");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read builder config {}", path.display()))?;
        let parsed: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in builder config {}", path.display()))?;
        tracing::trace!(fields = ?parsed.fields.as_ref().map(Vec::len), "Builder config parsed");
        Ok(parsed)
    }

    /// Keys this crate does not recognise, most likely misspelled options
    fn unknown_keys(&self) -> Vec<&str> {
        match &self.extra {
            JsonValue::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    fn warn_unknown_fields(&self) {
        let unknown = self.unknown_keys();
        if !unknown.is_empty() {
            tracing::warn!(
                keys = %unknown.join(", "),
                "Ignoring unrecognised builder config keys"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if other.fields.is_some() {
            tracing::trace!("Merging fields");
            self.fields = other.fields;
        }
        if other.operators.is_some() {
            tracing::trace!("Merging operators");
            self.operators = other.operators;
        }
        if other.combinators.is_some() {
            tracing::trace!("Merging combinators");
            self.combinators = other.combinators;
        }
        if other.show_combinators_between_rules.is_some() {
            tracing::trace!(
                value = ?other.show_combinators_between_rules,
                "Merging show_combinators_between_rules"
            );
            self.show_combinators_between_rules = other.show_combinators_between_rules;
        }
        if other.query.is_some() {
            tracing::trace!("Merging query");
            self.query = other.query;
        }
    }
}

// =============================================================================
// Builder Config
// =============================================================================

/// Resolved configuration for a query builder
///
/// | option | default |
/// |---|---|
/// | `fields` | empty; rule creation needs at least one |
/// | `operators` | null, notNull, in, notIn, =, !=, <, >, <=, >= |
/// | `combinators` | and, or |
/// | `show_combinators_between_rules` | false |
/// | `query` | none, a fresh empty group is used |
///
/// Per-field overrides (`operators`, `value_editor_type`, `input_type`,
/// `values`) live on each [`Field`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderConfig {
    pub fields: Vec<Field>,
    pub operators: Vec<NameLabelPair>,
    pub combinators: Vec<NameLabelPair>,
    pub show_combinators_between_rules: bool,
    pub query: Option<JsonValue>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            operators: NameLabelPair::from_pairs(DEFAULT_OPERATORS),
            combinators: NameLabelPair::from_pairs(DEFAULT_COMBINATORS),
            show_combinators_between_rules: false,
            query: None,
        }
    }
}

impl BuilderConfig {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn with_operators(mut self, operators: Vec<NameLabelPair>) -> Self {
        self.operators = operators;
        self
    }

    pub fn with_combinators(mut self, combinators: Vec<NameLabelPair>) -> Self {
        self.combinators = combinators;
        self
    }

    pub fn with_query(mut self, query: JsonValue) -> Self {
        self.query = Some(query);
        self
    }

    /// Load configuration from a single JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(&[path])
    }

    /// Load configuration from several JSON files
    ///
    /// Files are layered in order, later files overriding earlier ones key by
    /// key, on top of the defaults.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        tracing::debug!("Loading builder configuration");
        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                anyhow::bail!("Builder config {} does not exist", path.display());
            }
            let overlay = FileConfig::load_from_file(path)?;
            overlay.warn_unknown_fields();
            file_config.merge(overlay);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");
        Self::from_file_config(file_config)
    }

    /// Parse configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let file_config: FileConfig =
            serde_json::from_str(text).context("Invalid builder config JSON")?;
        file_config.warn_unknown_fields();
        Self::from_file_config(file_config)
    }

    fn from_file_config(file: FileConfig) -> Result<Self> {
        let defaults = Self::default();

        let operators = file.operators.unwrap_or(defaults.operators);
        if operators.is_empty() {
            anyhow::bail!("Config must list at least one operator");
        }
        let combinators = file.combinators.unwrap_or(defaults.combinators);
        if combinators.is_empty() {
            anyhow::bail!("Config must list at least one combinator");
        }

        Ok(Self {
            fields: file.fields.unwrap_or_default(),
            operators,
            combinators,
            show_combinators_between_rules: file.show_combinators_between_rules.unwrap_or(false),
            query: file.query,
        })
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Editor kind for a field's value, `text` unless the field says otherwise
    pub fn value_editor_type(&self, field: &str) -> ValueEditorType {
        self.field(field)
            .and_then(|f| f.value_editor_type)
            .unwrap_or_default()
    }

    /// Input type hint for text editors, `"text"` unless the field says otherwise
    pub fn input_type(&self, field: &str) -> &str {
        self.field(field)
            .and_then(|f| f.input_type.as_deref())
            .unwrap_or(DEFAULT_INPUT_TYPE)
    }

    /// Allowed values for select and radio editors, empty by default
    pub fn values(&self, field: &str) -> &[NameLabelPair] {
        self.field(field)
            .and_then(|f| f.values.as_deref())
            .unwrap_or(&[])
    }
}

impl FieldProvider for BuilderConfig {
    fn fields(&self) -> &[Field] {
        &self.fields
    }
}

impl OperatorProvider for BuilderConfig {
    fn operators(&self, field: &str) -> &[NameLabelPair] {
        self.field(field)
            .and_then(|f| f.operators.as_deref())
            .unwrap_or(&self.operators)
    }
}

impl CombinatorProvider for BuilderConfig {
    fn combinators(&self) -> &[NameLabelPair] {
        &self.combinators
    }
}
