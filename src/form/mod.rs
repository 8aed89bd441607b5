//! Interactive forms embedded in model replies: the descriptor types, the
//! extraction parser and the answer formatting.

mod answers;
mod parser;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub use answers::{format_response, FieldValue, FormAnswers};
pub use parser::{extract, FormExtractor, GeneratedReply, SpanRule};

/// Input widget a field asks for. Serialized with the tokens the model is
/// instructed to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    #[serde(rename = "text")]
    SingleLine,
    #[serde(rename = "textarea")]
    MultiLine,
    #[serde(rename = "editable-list")]
    EditableList,
    #[serde(rename = "radio")]
    SingleChoice,
    #[serde(rename = "checkbox")]
    MultiChoice,
}

impl FieldKind {
    pub fn requires_options(&self) -> bool {
        matches!(self, FieldKind::SingleChoice | FieldKind::MultiChoice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Suggested entries pre-filled into an editable list.
    #[serde(
        default,
        rename = "values",
        deserialize_with = "flatten_values",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub default_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDescriptor {
    #[serde(rename = "intro", default, skip_serializing_if = "Option::is_none")]
    pub intro_text: Option<String>,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("embedded form is not valid JSON: {0}")]
    Malformed(String),

    #[error("field id '{0}' appears more than once")]
    DuplicateFieldId(String),

    #[error("choice field '{0}' has no options")]
    MissingOptions(String),
}

impl FormDescriptor {
    /// Checks that field ids are unique and choice fields carry options.
    pub fn validate(&self) -> Result<(), FormError> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.id.as_str()) {
                return Err(FormError::DuplicateFieldId(field.id.clone()));
            }
            if field.kind.requires_options() && field.options.is_empty() {
                return Err(FormError::MissingOptions(field.id.clone()));
            }
        }
        Ok(())
    }
}

/// Models sometimes emit list entries as objects (`{"action": .., "priority": ..}`)
/// despite being told to use strings; those are flattened to `a - b`.
fn flatten_values<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().iter().map(value_to_text).collect())
}

fn value_to_text(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => map.values().map(value_to_text).collect::<Vec<_>>().join(" - "),
        Value::Array(items) => items.iter().map(value_to_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
