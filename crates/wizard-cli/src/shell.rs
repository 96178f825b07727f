use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::debug;

use wizard_engine::{
    EntryKind, JsonStorage, Key, NavIntent, SubmitError, SubmitOutcome, TemplateAction,
    TemplateManager, TemplateMode, TemplateStore, WizardController, route_key,
    route_template_key, route_terminal_key,
};
use wizard_spec::{
    AnswerValue, Answers, FieldControl, FieldDef, SelectOption, TemplateOption,
    build_render_payload, expand, render_text,
};

use crate::CliResult;

pub struct SessionOptions {
    pub verbose: bool,
    pub answers_json: bool,
    pub render_out: Option<PathBuf>,
}

/// One line of user input resolved against the current field.
enum StepInput {
    Value(AnswerValue),
    Nav(NavIntent),
}

/// Drive a wizard session over stdin/stdout until the user confirms the
/// summary screen.
pub fn run_session(
    title: &str,
    fields: Vec<FieldDef>,
    storage: JsonStorage,
    options: &SessionOptions,
) -> CliResult<()> {
    let mut controller = WizardController::new(fields);
    println!("{title}");

    loop {
        if controller.is_terminal() {
            let payload = build_render_payload(
                title,
                controller.fields(),
                controller.answers(),
                controller.visited(),
                controller.step_index(),
                true,
            );
            println!();
            print!("{}", render_text(&payload));
            let Some(line) = read_line("Press enter to accept, :back to revisit: ")? else {
                break;
            };
            match command_key(line.trim()) {
                Some(key) => match route_terminal_key(key) {
                    Some(NavIntent::Reopen) => {
                        controller.reopen();
                        continue;
                    }
                    Some(NavIntent::Confirm) => break,
                    _ => {}
                },
                None => println!("Unknown command '{}'.", line.trim()),
            }
            continue;
        }

        let field = controller
            .current_field()
            .cloned()
            .ok_or("the schema has no visible fields to ask")?;
        if options.verbose {
            let payload = build_render_payload(
                title,
                controller.fields(),
                controller.answers(),
                controller.visited(),
                controller.step_index(),
                false,
            );
            println!();
            print!("{}", render_text(&payload));
        }

        let step = match &field.control {
            FieldControl::Text { .. } => prompt_text(&field)?,
            FieldControl::Textarea { .. } => prompt_textarea(&field)?,
            FieldControl::Select { options } => prompt_select(&field, options)?,
            FieldControl::MultiSelect { options } => prompt_multi_select(&field, options)?,
            FieldControl::Template {
                options,
                store_name,
            } => prompt_template(&field, options, store_name, &storage)?,
        };

        match step {
            None => return Err("input ended before the wizard completed".into()),
            Some(StepInput::Nav(intent)) => match intent {
                NavIntent::Back => {
                    if !controller.go_back() {
                        println!("Already at the first step.");
                    }
                }
                NavIntent::Forward => {
                    if !controller.go_forward() {
                        println!("Nothing ahead to return to.");
                    }
                }
                NavIntent::EditInput => {
                    println!("That command is not available on this field.");
                }
                NavIntent::Reopen | NavIntent::Confirm => {}
            },
            Some(StepInput::Value(value)) => match controller.submit(&field.key, value) {
                Ok(SubmitOutcome::Advanced { next_key }) => {
                    debug!(key = %field.key, next = %next_key, "answer accepted");
                }
                Ok(SubmitOutcome::Complete) => {
                    debug!(key = %field.key, "final answer accepted");
                }
                Err(SubmitError::AnswerRequired { .. }) => {
                    println!("An answer is required here.");
                }
                Err(err) => return Err(err.into()),
            },
        }
    }

    println!("Done");
    if options.answers_json {
        println!("{}", serde_json::to_string_pretty(controller.answers())?);
    }
    if let Some(path) = &options.render_out {
        match render_template_answer(controller.fields(), controller.answers(), &storage)? {
            Some(rendered) => {
                fs::write(path, rendered)?;
                println!("Wrote {}", path.display());
            }
            None => println!("No template answer to render."),
        }
    }
    Ok(())
}

/// Expand the first answered template field against the full answer set.
/// Built-in options match on value; custom entries match on stored label.
fn render_template_answer(
    fields: &[FieldDef],
    answers: &Answers,
    storage: &JsonStorage,
) -> CliResult<Option<String>> {
    let store = TemplateStore::new(storage.clone());
    for field in fields {
        let Some(AnswerValue::Single(choice)) = answers.get(&field.key) else {
            continue;
        };
        let content = store
            .options_for(field)
            .into_iter()
            .find(|option| option.value == *choice)
            .and_then(|option| option.content);
        let Some(content) = content else { continue };
        return Ok(Some(expand(&content, answers)?));
    }
    Ok(None)
}

fn read_line(prompt: &str) -> CliResult<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Decode typed shell commands into the key events the keymap routes. An
/// empty line stands in for Enter; anything else that is not a `:` command
/// is field input.
fn command_key(input: &str) -> Option<Key> {
    match input {
        "" => Some(Key::Enter),
        ":back" | ":b" => Some(Key::Escape),
        ":prev" => Some(Key::Left),
        ":next" | ":n" => Some(Key::Right),
        _ => None,
    }
}

fn is_command(input: &str) -> bool {
    input.starts_with(':')
}

fn check_abort(input: &str) -> CliResult<()> {
    if input.eq_ignore_ascii_case("exit") {
        return Err("wizard aborted by user".into());
    }
    Ok(())
}

fn field_heading(field: &FieldDef) -> String {
    let mut heading = field.label.clone();
    if field.optional {
        heading.push_str(" [optional]");
    }
    if let Some(hint) = placeholder(field) {
        heading.push_str(&format!(" ({hint})"));
    }
    heading
}

fn placeholder(field: &FieldDef) -> Option<&str> {
    match &field.control {
        FieldControl::Text { placeholder, .. }
        | FieldControl::Textarea { placeholder, .. } => placeholder.as_deref(),
        _ => None,
    }
}

fn prompt_text(field: &FieldDef) -> CliResult<Option<StepInput>> {
    println!("{}", field_heading(field));
    let Some(line) = read_line("> ")? else {
        return Ok(None);
    };
    let input = line.trim();
    check_abort(input)?;
    if is_command(input) {
        return Ok(Some(route_command(field, input)));
    }
    Ok(Some(StepInput::Value(AnswerValue::Single(
        input.to_string(),
    ))))
}

fn prompt_textarea(field: &FieldDef) -> CliResult<Option<StepInput>> {
    println!("{} (finish with a single '.')", field_heading(field));
    let mut collected: Vec<String> = Vec::new();
    loop {
        let Some(line) = read_line("| ")? else {
            return Ok(None);
        };
        let trimmed = line.trim();
        if collected.is_empty() && is_command(trimmed) {
            check_abort(trimmed)?;
            return Ok(Some(route_command(field, trimmed)));
        }
        if trimmed == "." {
            break;
        }
        collected.push(line);
    }
    Ok(Some(StepInput::Value(AnswerValue::Single(
        collected.join("\n"),
    ))))
}

fn route_command(field: &FieldDef, input: &str) -> StepInput {
    match command_key(input) {
        Some(key) => StepInput::Nav(route_key(field, key)),
        None => StepInput::Nav(NavIntent::EditInput),
    }
}

fn prompt_select(field: &FieldDef, options: &[SelectOption]) -> CliResult<Option<StepInput>> {
    println!("{}", field_heading(field));
    print_options(options);
    loop {
        let Some(line) = read_line("> ")? else {
            return Ok(None);
        };
        let input = line.trim();
        check_abort(input)?;
        if is_command(input) {
            return Ok(Some(route_command(field, input)));
        }
        match parse_choice(input, options) {
            Ok(value) => return Ok(Some(StepInput::Value(AnswerValue::Single(value)))),
            Err(message) => println!("{message}"),
        }
    }
}

fn prompt_multi_select(
    field: &FieldDef,
    options: &[SelectOption],
) -> CliResult<Option<StepInput>> {
    println!(
        "{} (comma-separated, empty for none)",
        field_heading(field)
    );
    print_options(options);
    loop {
        let Some(line) = read_line("> ")? else {
            return Ok(None);
        };
        let input = line.trim();
        check_abort(input)?;
        if is_command(input) {
            return Ok(Some(route_command(field, input)));
        }
        match parse_multi_choice(input, options) {
            Ok(values) => return Ok(Some(StepInput::Value(AnswerValue::Many(values)))),
            Err(message) => println!("{message}"),
        }
    }
}

fn print_options(options: &[SelectOption]) {
    for (index, option) in options.iter().enumerate() {
        let mut entry = format!("  {}) {}", index + 1, option.label);
        if let Some(description) = &option.description {
            entry.push_str(&format!(" - {description}"));
        }
        if option.disabled {
            entry.push_str(" (unavailable)");
        }
        println!("{entry}");
    }
}

/// Resolve a single selection, by 1-based number or by option value/label.
fn parse_choice(input: &str, options: &[SelectOption]) -> Result<String, String> {
    if input.is_empty() {
        return Err("Choose an option by number or value.".into());
    }
    let option = if let Ok(number) = input.parse::<usize>() {
        number
            .checked_sub(1)
            .and_then(|index| options.get(index))
            .ok_or_else(|| format!("No option {number}."))?
    } else {
        options
            .iter()
            .find(|option| {
                option.value.eq_ignore_ascii_case(input)
                    || option.label.eq_ignore_ascii_case(input)
            })
            .ok_or_else(|| format!("No option matches '{input}'."))?
    };
    if option.disabled {
        return Err(format!("'{}' is unavailable.", option.label));
    }
    Ok(option.value.clone())
}

/// Resolve a comma-separated multi-selection; empty input selects nothing.
fn parse_multi_choice(input: &str, options: &[SelectOption]) -> Result<Vec<String>, String> {
    let mut values = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let value = parse_choice(part, options)?;
        if !values.contains(&value) {
            values.push(value);
        }
    }
    Ok(values)
}

fn prompt_template(
    field: &FieldDef,
    options: &[TemplateOption],
    store_name: &str,
    storage: &JsonStorage,
) -> CliResult<Option<StepInput>> {
    let mut manager = TemplateManager::new(
        TemplateStore::new(storage.clone()),
        store_name,
        options.to_vec(),
    );
    loop {
        match manager.mode() {
            TemplateMode::Browse => {
                println!("{}", field_heading(field));
                for (index, entry) in manager.entries().iter().enumerate() {
                    let mut line = format!("  {}) {}", index + 1, entry.label);
                    if entry.kind == EntryKind::Custom {
                        line.push_str(" (custom)");
                    }
                    if entry.disabled {
                        line.push_str(" (unavailable)");
                    }
                    println!("{line}");
                }
                println!("Pick by number; 'e N' edits, 'd N' deletes, 'c N' copies a custom entry.");
                let Some(line) = read_line("> ")? else {
                    return Ok(None);
                };
                let input = line.trim();
                check_abort(input)?;
                if is_command(input) {
                    return Ok(Some(route_command(field, input)));
                }
                if let Some((action, index)) = parse_entry_action(input) {
                    let Some(entry) = manager.entries().get(index) else {
                        println!("No entry {}.", index + 1);
                        continue;
                    };
                    match route_template_key(entry.kind, Key::Char(action)) {
                        Some(TemplateAction::Edit) => {
                            manager.set_highlight(index);
                            manager.edit();
                        }
                        Some(TemplateAction::Delete) => {
                            manager.set_highlight(index);
                            manager.request_delete();
                        }
                        Some(TemplateAction::Duplicate) => {
                            manager.set_highlight(index);
                            manager.duplicate()?;
                            if let Some(copy) = manager.highlighted() {
                                println!("Created '{}'.", copy.label);
                            }
                        }
                        None => println!("Only custom entries support '{action}'."),
                    }
                    continue;
                }
                match input.parse::<usize>() {
                    Ok(number) if (1..=manager.entries().len()).contains(&number) => {
                        manager.set_highlight(number - 1);
                        if let Some(value) = manager.select() {
                            return Ok(Some(StepInput::Value(AnswerValue::Single(value))));
                        }
                        if let Some(entry) = manager.highlighted()
                            && entry.disabled
                        {
                            println!("'{}' is unavailable.", entry.label);
                        }
                        // Add-new switches the manager to Create.
                    }
                    _ => println!("Choose an entry by number."),
                }
            }
            TemplateMode::Create | TemplateMode::Edit => {
                if manager.mode() == TemplateMode::Edit {
                    println!("Current content:");
                    for line in manager.draft().lines() {
                        println!("| {line}");
                    }
                }
                println!("Template content, finish with a single '.' (:cancel to go back):");
                let mut collected: Vec<String> = Vec::new();
                let mut cancelled = false;
                loop {
                    let Some(line) = read_line("| ")? else {
                        return Ok(None);
                    };
                    let trimmed = line.trim();
                    if collected.is_empty() && trimmed == ":cancel" {
                        cancelled = true;
                        break;
                    }
                    if trimmed == "." {
                        break;
                    }
                    collected.push(line);
                }
                if cancelled {
                    manager.cancel();
                    continue;
                }
                manager.save(&collected.join("\n"))?;
            }
            TemplateMode::Naming => {
                if let Some(error) = manager.name_error() {
                    println!("{error}");
                }
                let Some(line) = read_line("Template name (:cancel to go back): ")? else {
                    return Ok(None);
                };
                let input = line.trim();
                if input == ":cancel" {
                    manager.cancel();
                    continue;
                }
                if manager.submit_name(input)? {
                    println!("Saved '{input}'.");
                }
            }
            TemplateMode::ConfirmDelete => {
                let label = manager
                    .highlighted()
                    .map(|entry| entry.label.clone())
                    .unwrap_or_default();
                let Some(line) = read_line(&format!("Delete '{label}'? [y/N] "))? else {
                    return Ok(None);
                };
                if matches!(line.trim(), "y" | "Y" | "yes") {
                    manager.confirm_delete()?;
                    println!("Deleted '{label}'.");
                } else {
                    manager.cancel();
                }
            }
        }
    }
}

/// Parse browse-mode entry actions like `e 3`, `d2`, `c 1`.
fn parse_entry_action(input: &str) -> Option<(char, usize)> {
    let mut chars = input.chars();
    let action = chars.next()?;
    if !matches!(action, 'e' | 'd' | 'c') {
        return None;
    }
    let rest = chars.as_str().trim();
    let number: usize = rest.parse().ok()?;
    Some((action, number.checked_sub(1)?))
}
