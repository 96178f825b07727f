use handlebars::Handlebars;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::answers::{AnswerValue, Answers};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template render failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Expand `{{key}}` placeholders in a template body against the final
/// answers. Rendering is non-strict: placeholders without a matching answer
/// come out empty, which is what optional fields rely on.
pub fn expand(content: &str, answers: &Answers) -> Result<String, TemplateError> {
    let registry = Handlebars::new();
    let mut context = Map::new();
    for (key, value) in answers {
        let json = match value {
            AnswerValue::Single(text) => Value::String(text.clone()),
            AnswerValue::Many(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        };
        context.insert(key.clone(), json);
    }
    Ok(registry.render_template(content, &Value::Object(context))?)
}
