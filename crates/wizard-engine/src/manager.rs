use std::collections::BTreeSet;

use tracing::debug;

use wizard_spec::field::TemplateOption;

use crate::store::{Storage, StoreError, Template, TemplateStore};

/// Sub-session modes for a template-typed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateMode {
    Browse,
    Create,
    Naming,
    Edit,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    BuiltIn,
    Custom,
    AddNew,
}

/// One row of the browse list. `value` is what selection submits; for custom
/// entries it is the stored label itself.
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub label: String,
    pub value: String,
    pub content: Option<String>,
    pub disabled: bool,
    pub kind: EntryKind,
}

pub const ADD_NEW_VALUE: &str = "__add_new__";

/// Secondary state machine layered over [`TemplateStore`] for one template
/// field: browse built-ins and custom entries, create, rename-at-creation,
/// edit in place, duplicate, delete. The entry list is rebuilt from the
/// store after every mutating transition so Browse always reflects persisted
/// state.
pub struct TemplateManager<S: Storage> {
    store: TemplateStore<S>,
    store_name: String,
    built_ins: Vec<TemplateOption>,
    mode: TemplateMode,
    highlight: usize,
    entries: Vec<TemplateEntry>,
    draft: String,
    edit_target: Option<String>,
    name_error: Option<String>,
}

impl<S: Storage> TemplateManager<S> {
    pub fn new(
        store: TemplateStore<S>,
        store_name: impl Into<String>,
        built_ins: Vec<TemplateOption>,
    ) -> Self {
        let mut manager = Self {
            store,
            store_name: store_name.into(),
            built_ins,
            mode: TemplateMode::Browse,
            highlight: 0,
            entries: Vec::new(),
            draft: String::new(),
            edit_target: None,
            name_error: None,
        };
        manager.entries = manager.build_entries();
        manager
    }

    fn build_entries(&self) -> Vec<TemplateEntry> {
        let built_in_count = self.built_ins.len();
        let mut entries: Vec<TemplateEntry> = self
            .store
            .merged_options(&self.built_ins, &self.store_name)
            .into_iter()
            .enumerate()
            .map(|(index, option)| TemplateEntry {
                label: option.label,
                value: option.value,
                content: option.content,
                disabled: option.disabled,
                kind: if index < built_in_count {
                    EntryKind::BuiltIn
                } else {
                    EntryKind::Custom
                },
            })
            .collect();
        entries.push(TemplateEntry {
            label: "Add new".into(),
            value: ADD_NEW_VALUE.into(),
            content: None,
            disabled: false,
            kind: EntryKind::AddNew,
        });
        entries
    }

    fn refresh(&mut self, target: Option<usize>) {
        self.entries = self.build_entries();
        let last = self.entries.len().saturating_sub(1);
        self.highlight = target.unwrap_or(self.highlight).min(last);
    }

    fn custom_position(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.kind == EntryKind::Custom && entry.value == label)
    }

    /// Case-insensitive union of built-in labels and stored labels, the
    /// namespace both creation and duplication must stay clear of.
    fn taken_labels(&self) -> BTreeSet<String> {
        let mut labels: BTreeSet<String> = self
            .built_ins
            .iter()
            .map(|option| option.label.to_lowercase())
            .collect();
        labels.extend(
            self.store
                .list(&self.store_name)
                .into_iter()
                .map(|template| template.label.to_lowercase()),
        );
        labels
    }

    pub fn mode(&self) -> TemplateMode {
        self.mode
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub fn highlight(&self) -> usize {
        self.highlight
    }

    pub fn highlighted(&self) -> Option<&TemplateEntry> {
        self.entries.get(self.highlight)
    }

    /// Draft content carried between Create and Naming, and the starting
    /// content shown by Edit.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Inline validation error of the Naming mode, if any.
    pub fn name_error(&self) -> Option<&str> {
        self.name_error.as_deref()
    }

    pub fn set_highlight(&mut self, index: usize) {
        self.highlight = index.min(self.entries.len().saturating_sub(1));
    }

    /// Browse-mode commit on the highlighted entry. Selecting a template
    /// returns its value, ending the sub-session; selecting the add-new row
    /// switches to Create instead. Disabled entries cannot be committed.
    pub fn select(&mut self) -> Option<String> {
        if self.mode != TemplateMode::Browse {
            return None;
        }
        let entry = self.entries.get(self.highlight)?;
        if entry.disabled {
            return None;
        }
        match entry.kind {
            EntryKind::AddNew => {
                self.draft.clear();
                self.mode = TemplateMode::Create;
                None
            }
            EntryKind::BuiltIn | EntryKind::Custom => Some(entry.value.clone()),
        }
    }

    /// Begin editing the highlighted custom entry. No-op on built-ins and
    /// the add-new row.
    pub fn edit(&mut self) {
        if self.mode != TemplateMode::Browse {
            return;
        }
        let Some(entry) = self.entries.get(self.highlight) else {
            return;
        };
        if entry.kind != EntryKind::Custom {
            return;
        }
        self.edit_target = Some(entry.value.clone());
        self.draft = entry.content.clone().unwrap_or_default();
        self.mode = TemplateMode::Edit;
    }

    /// Ask for confirmation before deleting the highlighted custom entry.
    pub fn request_delete(&mut self) {
        if self.mode != TemplateMode::Browse {
            return;
        }
        if let Some(entry) = self.entries.get(self.highlight)
            && entry.kind == EntryKind::Custom
        {
            self.mode = TemplateMode::ConfirmDelete;
        }
    }

    /// Copy the highlighted custom entry under a fresh `Copy of {label}`
    /// name, the smallest numeric suffix winning when the plain name is
    /// taken. Executes immediately; Browse mode is kept.
    pub fn duplicate(&mut self) -> Result<(), StoreError> {
        if self.mode != TemplateMode::Browse {
            return Ok(());
        }
        let Some(entry) = self.entries.get(self.highlight) else {
            return Ok(());
        };
        if entry.kind != EntryKind::Custom {
            return Ok(());
        }
        let Some(content) = entry.content.clone() else {
            return Ok(());
        };
        let label = self.copy_label(&entry.value);
        debug!(store = %self.store_name, label = %label, "duplicating template");
        self.store.save(
            &self.store_name,
            Template {
                label: label.clone(),
                content,
            },
        )?;
        self.entries = self.build_entries();
        if let Some(position) = self.custom_position(&label) {
            self.highlight = position;
        }
        Ok(())
    }

    fn copy_label(&self, source: &str) -> String {
        let taken = self.taken_labels();
        let base = format!("Copy of {source}");
        if !taken.contains(&base.to_lowercase()) {
            return base;
        }
        let mut counter = 2usize;
        loop {
            let candidate = format!("{base} ({counter})");
            if !taken.contains(&candidate.to_lowercase()) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Save action of the Create and Edit modes. In Create the content is
    /// held as a draft and the machine moves to Naming; nothing is persisted
    /// yet. In Edit the content is persisted under the original label (the
    /// label is not renamable here) and the machine returns to Browse.
    /// Empty content is ignored.
    pub fn save(&mut self, content: &str) -> Result<(), StoreError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(());
        }
        match self.mode {
            TemplateMode::Create => {
                self.draft = content.to_string();
                self.name_error = None;
                self.mode = TemplateMode::Naming;
            }
            TemplateMode::Edit => {
                if let Some(label) = self.edit_target.take() {
                    self.store.save(
                        &self.store_name,
                        Template {
                            label,
                            content: content.to_string(),
                        },
                    )?;
                    self.refresh(Some(self.highlight));
                }
                self.mode = TemplateMode::Browse;
            }
            _ => {}
        }
        Ok(())
    }

    /// Cancel the current non-Browse mode. Naming falls back to Create with
    /// the draft preserved; everything else discards and returns to Browse.
    pub fn cancel(&mut self) {
        match self.mode {
            TemplateMode::Create => {
                self.draft.clear();
                self.mode = TemplateMode::Browse;
            }
            TemplateMode::Naming => {
                self.name_error = None;
                self.mode = TemplateMode::Create;
            }
            TemplateMode::Edit => {
                self.edit_target = None;
                self.mode = TemplateMode::Browse;
            }
            TemplateMode::ConfirmDelete => {
                self.mode = TemplateMode::Browse;
            }
            TemplateMode::Browse => {}
        }
    }

    /// Naming-mode commit. Returns Ok(true) when the draft was persisted
    /// under the candidate name; Ok(false) leaves the mode at Naming with an
    /// inline error ready for display.
    pub fn submit_name(&mut self, name: &str) -> Result<bool, StoreError> {
        if self.mode != TemplateMode::Naming {
            return Ok(false);
        }
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.name_error = Some("Name cannot be empty".into());
            return Ok(false);
        }
        if self.taken_labels().contains(&trimmed.to_lowercase()) {
            self.name_error = Some("A template with this name already exists".into());
            return Ok(false);
        }
        self.store.save(
            &self.store_name,
            Template {
                label: trimmed.to_string(),
                content: std::mem::take(&mut self.draft),
            },
        )?;
        self.name_error = None;
        self.mode = TemplateMode::Browse;
        self.entries = self.build_entries();
        if let Some(position) = self.custom_position(trimmed) {
            self.highlight = position;
        }
        Ok(true)
    }

    /// ConfirmDelete commit: delete the highlighted entry and re-highlight
    /// the row above it (clamped at zero).
    pub fn confirm_delete(&mut self) -> Result<(), StoreError> {
        if self.mode != TemplateMode::ConfirmDelete {
            return Ok(());
        }
        if let Some(entry) = self.entries.get(self.highlight)
            && entry.kind == EntryKind::Custom
        {
            let label = entry.value.clone();
            self.store.delete(&self.store_name, &label)?;
            let target = self.highlight.saturating_sub(1);
            self.refresh(Some(target));
        }
        self.mode = TemplateMode::Browse;
        Ok(())
    }
}
