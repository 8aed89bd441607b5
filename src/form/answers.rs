use std::collections::HashMap;

use super::{FieldKind, FormDescriptor};

/// A borrowed view of one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
}

/// The user's in-progress answers to one form, keyed by field id. A field
/// holds either a text or a list, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormAnswers {
    texts: HashMap<String, String>,
    lists: HashMap<String, Vec<String>>,
}

impl FormAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with every editable list pre-filled from its suggested values.
    pub fn from_descriptor(form: &FormDescriptor) -> Self {
        let lists = form
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::EditableList && !f.default_values.is_empty())
            .map(|f| (f.id.clone(), f.default_values.clone()))
            .collect();
        Self { texts: HashMap::new(), lists }
    }

    pub fn get(&self, field_id: &str) -> Option<FieldValue<'_>> {
        if let Some(items) = self.lists.get(field_id) {
            return Some(FieldValue::List(items));
        }
        self.texts.get(field_id).map(|text| FieldValue::Text(text))
    }

    pub fn set_text(&mut self, field_id: &str, value: impl Into<String>) {
        self.lists.remove(field_id);
        self.texts.insert(field_id.to_string(), value.into());
    }

    pub fn set_list(&mut self, field_id: &str, items: Vec<String>) {
        self.texts.remove(field_id);
        self.lists.insert(field_id.to_string(), items);
    }

    /// Replaces one entry of a list, padding with empty entries if `index`
    /// is past the end.
    pub fn set_list_item(&mut self, field_id: &str, index: usize, value: impl Into<String>) {
        let list = self.list_mut(field_id);
        if index >= list.len() {
            list.resize(index + 1, String::new());
        }
        list[index] = value.into();
    }

    pub fn add_list_item(&mut self, field_id: &str) {
        self.list_mut(field_id).push(String::new());
    }

    /// Out-of-range indexes are ignored.
    pub fn remove_list_item(&mut self, field_id: &str, index: usize) {
        let list = self.list_mut(field_id);
        if index < list.len() {
            list.remove(index);
        }
    }

    /// Adds or removes one option of a multi-choice field.
    pub fn toggle_choice(&mut self, field_id: &str, option: &str, checked: bool) {
        let list = self.list_mut(field_id);
        if checked {
            if !list.iter().any(|o| o == option) {
                list.push(option.to_string());
            }
        } else {
            list.retain(|o| o != option);
        }
    }

    /// The list under `field_id`; a text answer becomes a one-entry list.
    fn list_mut(&mut self, field_id: &str) -> &mut Vec<String> {
        let seed = self
            .texts
            .remove(field_id)
            .filter(|text| !text.is_empty())
            .map(|text| vec![text])
            .unwrap_or_default();
        self.lists.entry(field_id.to_string()).or_insert(seed)
    }
}

/// Formats answers as one user turn: a `**label**: value` line per answered
/// field, in the form's field order. List entries that are blank are dropped
/// and the rest joined with `; `; fields left blank are omitted.
pub fn format_response(form: &FormDescriptor, answers: &FormAnswers) -> String {
    form.fields
        .iter()
        .filter_map(|field| {
            let value = match answers.get(&field.id)? {
                FieldValue::Text(text) if text.trim().is_empty() => return None,
                FieldValue::Text(text) => text.to_string(),
                FieldValue::List(items) => {
                    let kept: Vec<&str> = items
                        .iter()
                        .map(String::as_str)
                        .filter(|item| !item.trim().is_empty())
                        .collect();
                    if kept.is_empty() {
                        return None;
                    }
                    kept.join("; ")
                }
            };
            Some(format!("**{}**: {}", field.label, value))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
