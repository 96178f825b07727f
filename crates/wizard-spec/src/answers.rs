use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The answer to a single field: one string for text/select/template fields,
/// an ordered list for multi-select fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Many(Vec<String>),
}

impl AnswerValue {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            AnswerValue::Single(text) => Some(text),
            AnswerValue::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            AnswerValue::Single(_) => None,
            AnswerValue::Many(items) => Some(items),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Single(text) => text.is_empty(),
            AnswerValue::Many(items) => items.is_empty(),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Single(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Single(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(values: Vec<String>) -> Self {
        AnswerValue::Many(values)
    }
}

/// Session answers, keyed by field key. The controller keeps the key set
/// equal to the visible-and-submitted subset of fields at all times.
pub type Answers = BTreeMap<String, AnswerValue>;
