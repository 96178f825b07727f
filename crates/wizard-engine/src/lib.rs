#![allow(missing_docs)]

pub mod controller;
pub mod keymap;
pub mod manager;
pub mod store;

pub use controller::{SubmitError, SubmitOutcome, WizardController};
pub use keymap::{Key, NavIntent, TemplateAction, route_key, route_template_key, route_terminal_key};
pub use manager::{EntryKind, TemplateEntry, TemplateManager, TemplateMode};
pub use store::{JsonStorage, Storage, StoreError, Template, TemplateCollection, TemplateStore};
