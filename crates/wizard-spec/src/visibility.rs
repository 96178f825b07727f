use crate::answers::{AnswerValue, Answers};
use crate::field::FieldDef;

/// True iff the field has no condition, or the referenced answer is a single
/// string equal to the expected value. List answers never satisfy a
/// condition, and an unknown referenced key evaluates to not-visible.
pub fn is_visible(field: &FieldDef, answers: &Answers) -> bool {
    match &field.show_when {
        None => true,
        Some(condition) => matches!(
            answers.get(&condition.field),
            Some(AnswerValue::Single(value)) if *value == condition.equals
        ),
    }
}

/// Order-preserving filter of the field list against an answers snapshot.
/// Pure and cheap enough to call on every input event.
pub fn visible_fields<'a>(fields: &'a [FieldDef], answers: &Answers) -> Vec<&'a FieldDef> {
    fields
        .iter()
        .filter(|field| is_visible(field, answers))
        .collect()
}
