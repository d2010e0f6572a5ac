//! Field, operator, and combinator option types

use serde::{Deserialize, Serialize};

/// A selectable option (field, operator, combinator, or value)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameLabelPair {
    pub name: String,
    pub label: String,
}

impl NameLabelPair {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }

    /// Build a list from static `(name, label)` pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Vec<Self> {
        pairs
            .iter()
            .map(|(name, label)| Self::new(*name, *label))
            .collect()
    }
}

/// Kind of editor a UI should render for a rule's value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEditorType {
    #[default]
    Text,
    Select,
    Checkbox,
    Radio,
}

impl ValueEditorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
        }
    }
}

/// A filterable field with optional per-field overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Operators for this field; the global list applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operators: Option<Vec<NameLabelPair>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_editor_type: Option<ValueEditorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    /// Allowed values for select and radio editors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<NameLabelPair>>,
}

impl Field {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            id: None,
            operators: None,
            value_editor_type: None,
            input_type: None,
            values: None,
        }
    }

    pub fn with_operators(mut self, operators: Vec<NameLabelPair>) -> Self {
        self.operators = Some(operators);
        self
    }

    pub fn with_value_editor_type(mut self, editor: ValueEditorType) -> Self {
        self.value_editor_type = Some(editor);
        self
    }

    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    pub fn with_values(mut self, values: Vec<NameLabelPair>) -> Self {
        self.values = Some(values);
        self
    }
}
