use std::collections::BTreeSet;

use crate::answers::{AnswerValue, Answers};
use crate::field::FieldDef;
use crate::visibility::is_visible;

/// Status labels exposed to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// More input is required.
    NeedInput,
    /// Every visible field has been answered.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
        }
    }
}

/// One field row of the projection.
#[derive(Debug, Clone)]
pub struct RenderRow {
    pub key: String,
    pub label: String,
    pub kind: &'static str,
    pub optional: bool,
    pub visible: bool,
    pub visited: bool,
    pub current: bool,
    pub value: Option<String>,
}

/// Pure projection of session state for a host to print. Building it never
/// mutates anything, so hosts may rebuild it on every input event.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub title: String,
    pub status: RenderStatus,
    pub step: usize,
    pub total: usize,
    pub rows: Vec<RenderRow>,
}

pub fn build_render_payload(
    title: &str,
    fields: &[FieldDef],
    answers: &Answers,
    visited: &BTreeSet<String>,
    step_index: usize,
    terminal: bool,
) -> RenderPayload {
    let mut rows = Vec::with_capacity(fields.len());
    let mut visible_position = 0usize;
    let mut total = 0usize;

    for field in fields {
        let visible = is_visible(field, answers);
        let current = visible && !terminal && visible_position == step_index;
        if visible {
            visible_position += 1;
            total += 1;
        }
        rows.push(RenderRow {
            key: field.key.clone(),
            label: field.label.clone(),
            kind: field.kind_label(),
            optional: field.optional,
            visible,
            visited: visited.contains(&field.key),
            current,
            value: answers.get(&field.key).map(value_display),
        });
    }

    RenderPayload {
        title: title.to_string(),
        status: if terminal {
            RenderStatus::Complete
        } else {
            RenderStatus::NeedInput
        },
        step: if terminal { total } else { step_index + 1 },
        total,
        rows,
    }
}

/// Human-friendly text rendering of the payload; the host prints it.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("{} ({})", payload.title, payload.status.as_str()));
    lines.push(format!("Step {} of {}", payload.step, payload.total));
    for row in payload.rows.iter().filter(|row| row.visible) {
        let marker = if row.current { ">" } else { " " };
        let mut entry = format!("{} {} ({})", marker, row.label, row.kind);
        if row.optional {
            entry.push_str(" [optional]");
        }
        if let Some(value) = &row.value {
            entry.push_str(&format!(" = {}", value));
        }
        lines.push(entry);
    }
    lines.join("\n")
}

fn value_display(value: &AnswerValue) -> String {
    match value {
        AnswerValue::Single(text) => text.clone(),
        AnswerValue::Many(items) if items.is_empty() => "none".to_string(),
        AnswerValue::Many(items) => items.join(", "),
    }
}
