use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

use wizard_spec::{AnswerValue, Answers, FieldDef, visible_fields};

/// Why a submission was refused. The step does not change on refusal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("'{submitted}' is not the current field ('{current}')")]
    NotCurrent { submitted: String, current: String },
    #[error("field '{key}' requires an answer")]
    AnswerRequired { key: String },
    #[error("the wizard is already complete")]
    Terminal,
}

/// Result of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Moved to the next visible field.
    Advanced { next_key: String },
    /// No visible fields remain; the session reached its terminal state and
    /// the completion hook has fired.
    Complete,
}

type CompletionHook = Box<dyn FnMut(&Answers)>;

/// Top-level wizard session: owns the step position, the answers, and the
/// set of visited field keys. One instance per session; nothing here is
/// process-global, so concurrent sessions (tests included) cannot interfere.
pub struct WizardController {
    fields: Vec<FieldDef>,
    step_index: usize,
    answers: Answers,
    visited: BTreeSet<String>,
    terminal: bool,
    on_complete: Option<CompletionHook>,
}

impl WizardController {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        let mut visited = BTreeSet::new();
        if let Some(first) = visible_fields(&fields, &Answers::new()).first() {
            visited.insert(first.key.clone());
        }
        Self {
            fields,
            step_index: 0,
            answers: Answers::new(),
            visited,
            terminal: false,
            on_complete: None,
        }
    }

    /// Hook invoked with the answers snapshot on every transition into the
    /// terminal state (a reopened session fires it again on re-completion).
    pub fn on_complete(&mut self, hook: impl FnMut(&Answers) + 'static) {
        self.on_complete = Some(Box::new(hook));
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn visited(&self) -> &BTreeSet<String> {
        &self.visited
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Fields visible under the current answers, in schema order.
    pub fn visible(&self) -> Vec<&FieldDef> {
        visible_fields(&self.fields, &self.answers)
    }

    pub fn current_field(&self) -> Option<&FieldDef> {
        if self.terminal {
            return None;
        }
        self.visible().get(self.step_index).copied()
    }

    pub fn can_go_back(&self) -> bool {
        !self.terminal && self.step_index > 0
    }

    /// Forward is gated on the next field having been visited already: a
    /// user may only move ahead into territory the current answer path has
    /// traversed before.
    pub fn can_go_forward(&self) -> bool {
        if self.terminal {
            return false;
        }
        match self.visible().get(self.step_index + 1) {
            Some(next) => self.visited.contains(&next.key),
            None => false,
        }
    }

    /// Submit an answer for the current field and advance.
    ///
    /// Accepting the answer prunes state in order: answers of fields the new
    /// visible set no longer contains, then visited keys past the submitted
    /// field's position, since a changed upstream answer invalidates what was
    /// known about the old downstream path.
    pub fn submit(
        &mut self,
        key: &str,
        value: AnswerValue,
    ) -> Result<SubmitOutcome, SubmitError> {
        let current = self.current_field().ok_or(SubmitError::Terminal)?;
        if current.key != key {
            return Err(SubmitError::NotCurrent {
                submitted: key.to_string(),
                current: current.key.clone(),
            });
        }
        let value = normalize(current, value)?;

        self.answers.insert(key.to_string(), value);

        let visible_keys: Vec<String> = visible_fields(&self.fields, &self.answers)
            .iter()
            .map(|field| field.key.clone())
            .collect();

        self.answers.retain(|answered, _| {
            visible_keys.iter().any(|visible| visible == answered)
        });

        let position = visible_keys.iter().position(|visible| visible == key);
        let reachable: BTreeSet<&String> = match position {
            Some(position) => visible_keys[..=position].iter().collect(),
            None => BTreeSet::new(),
        };
        self.visited.retain(|visited| reachable.contains(visited));

        let next_position = position.map(|position| position + 1).unwrap_or(0);
        match visible_keys.get(next_position) {
            None => {
                self.terminal = true;
                debug!(answered = self.answers.len(), "wizard complete");
                if let Some(hook) = self.on_complete.as_mut() {
                    hook(&self.answers);
                }
                Ok(SubmitOutcome::Complete)
            }
            Some(next_key) => {
                self.step_index = next_position;
                self.visited.insert(next_key.clone());
                debug!(step = self.step_index, key = %next_key, "advanced");
                Ok(SubmitOutcome::Advanced {
                    next_key: next_key.clone(),
                })
            }
        }
    }

    /// Step back one field. Never mutates answers or visited: the prior
    /// field is still visible and already visited by construction.
    pub fn go_back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.step_index -= 1;
        true
    }

    pub fn go_forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.step_index += 1;
        true
    }

    /// Terminal is not absorbing: reopening returns to the last visible
    /// field with answers intact, for a final look before confirmation.
    pub fn reopen(&mut self) -> bool {
        if !self.terminal {
            return false;
        }
        self.terminal = false;
        self.step_index = self.visible().len().saturating_sub(1);
        true
    }
}

/// Empty-submission policy: optional fields accept the empty string as an
/// answer, non-optional text fields fall back to their configured default,
/// and otherwise the submission is refused. Empty lists are always accepted
/// (a multi-select may legitimately select nothing).
fn normalize(field: &FieldDef, value: AnswerValue) -> Result<AnswerValue, SubmitError> {
    match &value {
        AnswerValue::Single(text) if text.is_empty() => {
            if field.optional {
                Ok(value)
            } else if let Some(default) = field.default_value() {
                Ok(AnswerValue::Single(default.to_string()))
            } else {
                Err(SubmitError::AnswerRequired {
                    key: field.key.clone(),
                })
            }
        }
        _ => Ok(value),
    }
}
