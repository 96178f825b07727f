use std::collections::BTreeSet;

use thiserror::Error;

use crate::field::{FieldControl, FieldDef};

/// Structural problem that makes a field list unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("field at position {index} has an empty key")]
    EmptyKey { index: usize },
    #[error("duplicate field key '{key}'")]
    DuplicateKey { key: String },
    #[error("field '{key}' must offer at least one option")]
    NoOptions { key: String },
    #[error("template field '{key}' has an empty store name")]
    EmptyStoreName { key: String },
}

/// Outcome of a schema check. Warnings describe fields that are legal but
/// will never be shown, such as a condition on a nonexistent key.
#[derive(Debug, Default)]
pub struct SchemaReport {
    pub errors: Vec<SchemaError>,
    pub warnings: Vec<String>,
}

impl SchemaReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check a field list for well-formedness: non-empty unique keys, options on
/// select-style fields, a store name on template fields, and resolvable
/// `show_when` references.
pub fn check_fields(fields: &[FieldDef]) -> SchemaReport {
    let mut report = SchemaReport::default();
    let mut seen = BTreeSet::new();

    for (index, field) in fields.iter().enumerate() {
        if field.key.trim().is_empty() {
            report.errors.push(SchemaError::EmptyKey { index });
            continue;
        }
        if !seen.insert(field.key.clone()) {
            report.errors.push(SchemaError::DuplicateKey {
                key: field.key.clone(),
            });
        }

        match &field.control {
            FieldControl::Select { options } | FieldControl::MultiSelect { options } => {
                if options.is_empty() {
                    report.errors.push(SchemaError::NoOptions {
                        key: field.key.clone(),
                    });
                }
            }
            FieldControl::Template {
                options,
                store_name,
            } => {
                if options.is_empty() {
                    report.errors.push(SchemaError::NoOptions {
                        key: field.key.clone(),
                    });
                }
                if store_name.trim().is_empty() {
                    report.errors.push(SchemaError::EmptyStoreName {
                        key: field.key.clone(),
                    });
                }
            }
            FieldControl::Text { .. } | FieldControl::Textarea { .. } => {}
        }
    }

    let all_keys: BTreeSet<&str> = fields.iter().map(|field| field.key.as_str()).collect();
    for field in fields {
        if let Some(condition) = &field.show_when
            && !all_keys.contains(condition.field.as_str())
        {
            report.warnings.push(format!(
                "show_when on '{}' references unknown field '{}'; it will never be visible",
                field.key, condition.field
            ));
        }
    }

    report
}
