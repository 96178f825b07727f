use std::fs;

use tempfile::TempDir;

use wizard_engine::{
    EntryKind, JsonStorage, Template, TemplateManager, TemplateMode, TemplateStore,
};
use wizard_spec::{FieldControl, FieldDef, TemplateOption};

fn store_in(dir: &TempDir) -> TemplateStore<JsonStorage> {
    TemplateStore::new(JsonStorage::new(dir.path()))
}

fn template(label: &str, content: &str) -> Template {
    Template {
        label: label.into(),
        content: content.into(),
    }
}

fn built_ins() -> Vec<TemplateOption> {
    vec![
        TemplateOption {
            label: "Minimal".into(),
            value: "minimal".into(),
            description: None,
            disabled: false,
            content: Some("# {{name}}".into()),
        },
        TemplateOption {
            label: "Detailed".into(),
            value: "detailed".into(),
            description: None,
            disabled: false,
            content: Some("# {{name}}\n\n{{description}}".into()),
        },
    ]
}

fn manager_in(dir: &TempDir) -> TemplateManager<JsonStorage> {
    TemplateManager::new(store_in(dir), "readme-templates", built_ins())
}

fn labels(manager: &TemplateManager<JsonStorage>) -> Vec<String> {
    manager
        .entries()
        .iter()
        .map(|entry| entry.label.clone())
        .collect()
}

#[test]
fn empty_store_lists_nothing() {
    let dir = TempDir::new().unwrap();
    assert!(store_in(&dir).list("readme-templates").is_empty());
}

#[test]
fn save_then_list_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save("readme-templates", template("Mine", "# custom")).unwrap();

    let listed = store.list("readme-templates");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].label, "Mine");
    assert_eq!(listed[0].content, "# custom");
}

#[test]
fn upsert_replaces_in_place_and_preserves_order() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save("s", template("a", "one")).unwrap();
    store.save("s", template("b", "two")).unwrap();
    store.save("s", template("a", "updated")).unwrap();

    let listed = store.list("s");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].label, "a");
    assert_eq!(listed[0].content, "updated");
    assert_eq!(listed[1].label, "b");
}

#[test]
fn delete_reports_whether_anything_was_removed() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save("s", template("a", "one")).unwrap();

    assert!(store.delete("s", "a").unwrap());
    assert!(!store.delete("s", "a").unwrap());
    assert!(store.list("s").is_empty());
}

#[test]
fn store_file_has_the_expected_shape() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save("readme-templates", template("Mine", "# custom")).unwrap();

    let raw = fs::read_to_string(dir.path().join("readme-templates.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!({
            "templates": [{"label": "Mine", "content": "# custom"}]
        })
    );
}

#[test]
fn malformed_store_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("s.json"), "{not json").unwrap();

    let store = store_in(&dir);
    assert!(store.list("s").is_empty());

    // The store stays writable: the next save replaces the bad file.
    store.save("s", template("a", "one")).unwrap();
    assert_eq!(store.list("s").len(), 1);
}

#[test]
fn storage_lists_and_deletes_store_files() {
    let dir = TempDir::new().unwrap();
    let storage = JsonStorage::new(dir.path());
    let store = TemplateStore::new(JsonStorage::new(dir.path()));
    store.save("readme-templates", template("a", "one")).unwrap();
    store.save("license-templates", template("b", "two")).unwrap();

    assert_eq!(
        storage.list_stores(),
        vec!["license-templates".to_string(), "readme-templates".to_string()]
    );
    assert!(storage.delete_store("license-templates"));
    assert!(!storage.delete_store("license-templates"));
    assert_eq!(storage.list_stores(), vec!["readme-templates".to_string()]);
}

fn readme_field(options: Vec<TemplateOption>) -> FieldDef {
    FieldDef {
        key: "readme".into(),
        label: "README template".into(),
        optional: false,
        show_when: None,
        control: FieldControl::Template {
            options,
            store_name: "readme-templates".into(),
        },
    }
}

#[test]
fn options_list_built_ins_then_stored_with_label_as_value() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save("readme-templates", template("Mine", "# custom")).unwrap();
    store.save("readme-templates", template("Other", "# other")).unwrap();

    let options = store.options_for(&readme_field(built_ins()));
    let pairs: Vec<(&str, &str)> = options
        .iter()
        .map(|option| (option.label.as_str(), option.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Minimal", "minimal"),
            ("Detailed", "detailed"),
            ("Mine", "Mine"),
            ("Other", "Other"),
        ]
    );
    // Stored entries carry their content; built-ins keep theirs.
    assert_eq!(options[0].content.as_deref(), Some("# {{name}}"));
    assert_eq!(options[2].content.as_deref(), Some("# custom"));
}

#[test]
fn non_template_fields_have_no_options() {
    let dir = TempDir::new().unwrap();
    let field = FieldDef {
        key: "name".into(),
        label: "Project name".into(),
        optional: false,
        show_when: None,
        control: FieldControl::Text {
            placeholder: None,
            default_value: None,
        },
    };
    assert!(store_in(&dir).options_for(&field).is_empty());
}

#[test]
fn disabled_built_ins_are_listed_but_not_selectable() {
    let dir = TempDir::new().unwrap();
    let mut options = built_ins();
    options[1].disabled = true;
    let mut manager = TemplateManager::new(store_in(&dir), "readme-templates", options);

    assert!(manager.entries()[1].disabled);
    manager.set_highlight(1);
    assert_eq!(manager.select(), None);
    assert_eq!(manager.mode(), TemplateMode::Browse);

    manager.set_highlight(0);
    assert_eq!(manager.select(), Some("minimal".into()));
}

#[test]
fn browse_lists_built_ins_custom_entries_and_add_new() {
    let dir = TempDir::new().unwrap();
    store_in(&dir)
        .save("readme-templates", template("Mine", "# custom"))
        .unwrap();

    let manager = manager_in(&dir);
    assert_eq!(labels(&manager), vec!["Minimal", "Detailed", "Mine", "Add new"]);
    assert_eq!(manager.entries()[0].kind, EntryKind::BuiltIn);
    assert_eq!(manager.entries()[2].kind, EntryKind::Custom);
    assert_eq!(manager.entries()[3].kind, EntryKind::AddNew);
}

#[test]
fn selecting_a_template_returns_its_value() {
    let dir = TempDir::new().unwrap();
    let mut manager = manager_in(&dir);
    manager.set_highlight(1);
    assert_eq!(manager.select(), Some("detailed".into()));
    assert_eq!(manager.mode(), TemplateMode::Browse);
}

#[test]
fn create_and_name_a_template() {
    let dir = TempDir::new().unwrap();
    let mut manager = manager_in(&dir);

    // Add-new row is the last entry.
    manager.set_highlight(manager.entries().len() - 1);
    assert_eq!(manager.select(), None);
    assert_eq!(manager.mode(), TemplateMode::Create);

    manager.save("# {{name}} badge wall").unwrap();
    assert_eq!(manager.mode(), TemplateMode::Naming);

    assert!(manager.submit_name("Badges").unwrap());
    assert_eq!(manager.mode(), TemplateMode::Browse);
    assert_eq!(labels(&manager), vec!["Minimal", "Detailed", "Badges", "Add new"]);
    // The new entry is highlighted.
    assert_eq!(manager.highlighted().unwrap().label, "Badges");

    let stored = store_in(&dir).list("readme-templates");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content, "# {{name}} badge wall");
}

#[test]
fn naming_rejects_blank_and_taken_names() {
    let dir = TempDir::new().unwrap();
    store_in(&dir)
        .save("readme-templates", template("Mine", "# custom"))
        .unwrap();
    let mut manager = manager_in(&dir);
    manager.set_highlight(manager.entries().len() - 1);
    manager.select();
    manager.save("draft content").unwrap();

    assert!(!manager.submit_name("   ").unwrap());
    assert_eq!(manager.name_error(), Some("Name cannot be empty"));
    assert_eq!(manager.mode(), TemplateMode::Naming);

    // Collisions are case-insensitive, against built-ins and stored alike.
    assert!(!manager.submit_name("minimal").unwrap());
    assert_eq!(
        manager.name_error(),
        Some("A template with this name already exists")
    );
    assert!(!manager.submit_name("MINE").unwrap());
    assert_eq!(manager.mode(), TemplateMode::Naming);

    assert!(manager.submit_name("Mine 2").unwrap());
    assert_eq!(manager.mode(), TemplateMode::Browse);
}

#[test]
fn cancel_from_naming_keeps_the_draft() {
    let dir = TempDir::new().unwrap();
    let mut manager = manager_in(&dir);
    manager.set_highlight(manager.entries().len() - 1);
    manager.select();
    manager.save("kept draft").unwrap();
    assert_eq!(manager.mode(), TemplateMode::Naming);

    manager.cancel();
    assert_eq!(manager.mode(), TemplateMode::Create);
    assert_eq!(manager.draft(), "kept draft");

    manager.cancel();
    assert_eq!(manager.mode(), TemplateMode::Browse);
    assert!(store_in(&dir).list("readme-templates").is_empty());
}

#[test]
fn edit_persists_under_the_original_label() {
    let dir = TempDir::new().unwrap();
    store_in(&dir)
        .save("readme-templates", template("Mine", "# old"))
        .unwrap();
    let mut manager = manager_in(&dir);
    manager.set_highlight(2);

    manager.edit();
    assert_eq!(manager.mode(), TemplateMode::Edit);
    assert_eq!(manager.draft(), "# old");

    manager.save("# new").unwrap();
    assert_eq!(manager.mode(), TemplateMode::Browse);
    // Same entry, same position, new content.
    assert_eq!(manager.highlighted().unwrap().label, "Mine");
    assert_eq!(labels(&manager), vec!["Minimal", "Detailed", "Mine", "Add new"]);

    let stored = store_in(&dir).list("readme-templates");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content, "# new");
}

#[test]
fn edit_ignores_built_ins() {
    let dir = TempDir::new().unwrap();
    let mut manager = manager_in(&dir);
    manager.set_highlight(0);
    manager.edit();
    assert_eq!(manager.mode(), TemplateMode::Browse);
}

#[test]
fn duplicate_picks_the_first_free_copy_name() {
    let dir = TempDir::new().unwrap();
    store_in(&dir)
        .save("readme-templates", template("Mine", "# custom"))
        .unwrap();
    let mut manager = manager_in(&dir);
    manager.set_highlight(2);

    manager.duplicate().unwrap();
    assert_eq!(manager.highlighted().unwrap().label, "Copy of Mine");

    // Duplicating the original again skips the taken plain copy name.
    manager.set_highlight(2);
    manager.duplicate().unwrap();
    assert_eq!(manager.highlighted().unwrap().label, "Copy of Mine (2)");

    let stored: Vec<String> = store_in(&dir)
        .list("readme-templates")
        .into_iter()
        .map(|template| template.label)
        .collect();
    assert_eq!(stored, vec!["Mine", "Copy of Mine", "Copy of Mine (2)"]);
}

#[test]
fn confirm_delete_removes_and_rehighlights_above() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save("readme-templates", template("One", "1")).unwrap();
    store.save("readme-templates", template("Two", "2")).unwrap();
    let mut manager = manager_in(&dir);

    // "Two" sits after the two built-ins and "One".
    manager.set_highlight(3);
    manager.request_delete();
    assert_eq!(manager.mode(), TemplateMode::ConfirmDelete);

    manager.confirm_delete().unwrap();
    assert_eq!(manager.mode(), TemplateMode::Browse);
    assert_eq!(labels(&manager), vec!["Minimal", "Detailed", "One", "Add new"]);
    assert_eq!(manager.highlighted().unwrap().label, "One");
    assert_eq!(store_in(&dir).list("readme-templates").len(), 1);
}

#[test]
fn delete_confirmation_can_be_declined() {
    let dir = TempDir::new().unwrap();
    store_in(&dir)
        .save("readme-templates", template("Mine", "# custom"))
        .unwrap();
    let mut manager = manager_in(&dir);
    manager.set_highlight(2);
    manager.request_delete();
    manager.cancel();
    assert_eq!(manager.mode(), TemplateMode::Browse);
    assert_eq!(store_in(&dir).list("readme-templates").len(), 1);
}
