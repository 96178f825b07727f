use wizard_spec::FieldDef;

use crate::manager::EntryKind;

/// Named key events, decoded from the terminal by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Left,
    Right,
    Enter,
    Char(char),
}

/// What a key means for wizard navigation at the current field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    Back,
    Forward,
    /// Terminal state only: return to the last field.
    Reopen,
    /// Terminal state only: accept the answers.
    Confirm,
    /// The key belongs to the field's own editor, not to navigation.
    EditInput,
}

/// Routing rule for an active field. On text and textarea fields the arrow
/// keys are literal editing input and only Escape navigates back; on every
/// other kind Escape/Left go back and Right goes forward.
pub fn route_key(field: &FieldDef, key: Key) -> NavIntent {
    let text_input = field.is_text_input();
    match key {
        Key::Escape => NavIntent::Back,
        Key::Left if !text_input => NavIntent::Back,
        Key::Right if !text_input => NavIntent::Forward,
        _ => NavIntent::EditInput,
    }
}

/// Routing rule for the terminal summary screen.
pub fn route_terminal_key(key: Key) -> Option<NavIntent> {
    match key {
        Key::Escape | Key::Left => Some(NavIntent::Reopen),
        Key::Enter => Some(NavIntent::Confirm),
        _ => None,
    }
}

/// Browse-mode actions on template entries. Only custom entries expose the
/// edit/delete/duplicate bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateAction {
    Edit,
    Delete,
    Duplicate,
}

pub fn route_template_key(kind: EntryKind, key: Key) -> Option<TemplateAction> {
    if kind != EntryKind::Custom {
        return None;
    }
    match key {
        Key::Char('e') => Some(TemplateAction::Edit),
        Key::Char('d') => Some(TemplateAction::Delete),
        Key::Char('c') => Some(TemplateAction::Duplicate),
        _ => None,
    }
}
