#![allow(missing_docs)]

pub mod answers;
pub mod field;
pub mod render;
pub mod template;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerValue, Answers};
pub use field::{FieldControl, FieldDef, SelectOption, ShowWhen, TemplateOption};
pub use render::{RenderPayload, RenderRow, RenderStatus, build_render_payload, render_text};
pub use template::{TemplateError, expand};
pub use validate::{SchemaError, SchemaReport, check_fields};
pub use visibility::{is_visible, visible_fields};
