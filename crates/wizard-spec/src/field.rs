use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Visibility condition tying a field to an earlier answer: the field is
/// shown only while the referenced field's answer equals `equals` exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ShowWhen {
    pub field: String,
    pub equals: String,
}

/// A fixed choice offered by select-style fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

/// A built-in choice of a template field. Unlike plain select options these
/// carry a content body that the wizard can expand after completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TemplateOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Kind-specific payload of a field. Closed set: every consumer matches
/// exhaustively, so adding a kind is a compile-time change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum FieldControl {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
    Textarea {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u16>,
    },
    Select {
        options: Vec<SelectOption>,
    },
    MultiSelect {
        options: Vec<SelectOption>,
    },
    Template {
        options: Vec<TemplateOption>,
        store_name: String,
    },
}

/// One step of the wizard. The field list is supplied once at construction
/// and never changes for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowWhen>,
    #[serde(flatten)]
    pub control: FieldControl,
}

impl FieldDef {
    /// Text and textarea fields route arrow keys to the line editor instead
    /// of wizard navigation.
    pub fn is_text_input(&self) -> bool {
        matches!(
            self.control,
            FieldControl::Text { .. } | FieldControl::Textarea { .. }
        )
    }

    /// Configured fallback used when a non-optional text field is submitted
    /// empty.
    pub fn default_value(&self) -> Option<&str> {
        match &self.control {
            FieldControl::Text { default_value, .. }
            | FieldControl::Textarea { default_value, .. } => default_value.as_deref(),
            _ => None,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self.control {
            FieldControl::Text { .. } => "text",
            FieldControl::Textarea { .. } => "textarea",
            FieldControl::Select { .. } => "select",
            FieldControl::MultiSelect { .. } => "multi-select",
            FieldControl::Template { .. } => "template",
        }
    }
}
