use std::fs;
use std::io;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wizard_spec::{FieldControl, FieldDef, TemplateOption};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] io::Error),
    #[error("store encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One persisted user-authored content block. Labels are stored
/// case-sensitively; creation-time uniqueness checks are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub label: String,
    pub content: String,
}

/// On-disk shape of a store file: `{ "templates": [ ... ] }`, insertion
/// order preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateCollection {
    #[serde(default)]
    pub templates: Vec<Template>,
}

/// Persistence collaborator. Reads recover silently: a missing, unreadable,
/// or malformed record yields the supplied defaults.
pub trait Storage {
    fn read<T: DeserializeOwned>(&self, name: &str, defaults: T) -> T;
    fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError>;
}

/// JSON-file storage under a single directory, one file per store name.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    dir: PathBuf,
}

impl JsonStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform data directory, e.g.
    /// `~/.local/share/<app>` on Linux.
    pub fn in_data_dir(app: &str) -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self { dir: base.join(app) }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn store_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Remove a store file entirely. Returns false when no file existed.
    pub fn delete_store(&self, name: &str) -> bool {
        let path = self.store_path(name);
        if !path.exists() {
            return false;
        }
        fs::remove_file(&path).is_ok()
    }

    /// Names of every store file present in the directory.
    pub fn list_stores(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                    return None;
                }
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(String::from)
            })
            .collect();
        names.sort();
        names
    }
}

impl Storage for JsonStorage {
    fn read<T: DeserializeOwned>(&self, name: &str, defaults: T) -> T {
        let path = self.store_path(name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    debug!(store = name, error = %err, "store unreadable, using defaults");
                }
                return defaults;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                debug!(store = name, error = %err, "store malformed, using defaults");
                defaults
            }
        }
    }

    fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.store_path(name);
        let mut json = serde_json::to_string_pretty(value)?;
        json.push('\n');
        // Write-then-rename so a crash never leaves a truncated store.
        let tmp = self.dir.join(format!("{name}.json.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        debug!(store = name, path = %path.display(), "store written");
        Ok(())
    }
}

/// Named collections of templates over an injected storage collaborator.
#[derive(Debug, Clone)]
pub struct TemplateStore<S: Storage> {
    storage: S,
}

impl<S: Storage> TemplateStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// All templates of a store, in insertion order.
    pub fn list(&self, store: &str) -> Vec<Template> {
        self.storage
            .read(store, TemplateCollection::default())
            .templates
    }

    /// Upsert by exact label: an existing entry is replaced in place, a new
    /// one is appended. Duplicate-name rejection is the Naming mode's job,
    /// not the store's; Edit relies on the overwrite.
    pub fn save(&self, store: &str, template: Template) -> Result<(), StoreError> {
        let mut collection = self.storage.read(store, TemplateCollection::default());
        match collection
            .templates
            .iter_mut()
            .find(|existing| existing.label == template.label)
        {
            Some(existing) => *existing = template,
            None => collection.templates.push(template),
        }
        self.storage.write(store, &collection)
    }

    /// Remove by exact label. Returns false when no entry matched.
    pub fn delete(&self, store: &str, label: &str) -> Result<bool, StoreError> {
        let mut collection = self.storage.read(store, TemplateCollection::default());
        let before = collection.templates.len();
        collection.templates.retain(|template| template.label != label);
        if collection.templates.len() == before {
            return Ok(false);
        }
        self.storage.write(store, &collection)?;
        Ok(true)
    }

    /// Selectable options of a template field: the field's built-ins first,
    /// then one entry per stored template in insertion order, the label
    /// doubling as the value. Non-template fields have no options.
    pub fn options_for(&self, field: &FieldDef) -> Vec<TemplateOption> {
        let FieldControl::Template {
            options,
            store_name,
        } = &field.control
        else {
            return Vec::new();
        };
        self.merged_options(options, store_name)
    }

    /// Same list built from the raw parts, for callers that hold a store
    /// name and built-ins without a full field.
    pub fn merged_options(
        &self,
        built_ins: &[TemplateOption],
        store: &str,
    ) -> Vec<TemplateOption> {
        let mut merged = built_ins.to_vec();
        merged.extend(self.list(store).into_iter().map(|template| TemplateOption {
            label: template.label.clone(),
            value: template.label,
            description: None,
            disabled: false,
            content: Some(template.content),
        }));
        merged
    }
}
