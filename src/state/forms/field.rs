//! Form field value objects

use super::validation::{FieldKind, FieldName};

/// Represents a single form input with its configuration and raw value
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: FieldName,
    pub label: String,
    pub kind: FieldKind,
    pub value: String,
    /// Hint shown while the field is empty
    pub placeholder: Option<&'static str>,
}

impl FormField {
    /// Create a new empty field
    pub fn new(name: FieldName, label: &str, kind: FieldKind) -> Self {
        Self {
            name,
            label: label.to_string(),
            kind,
            value: String::new(),
            placeholder: None,
        }
    }

    pub fn placeholder(mut self, hint: &'static str) -> Self {
        self.placeholder = Some(hint);
        self
    }

    pub fn as_text(&self) -> &str {
        &self.value
    }

    pub fn set_text(&mut self, value: String) {
        self.value = value;
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, c: char) {
        // Dates and numbers never contain newlines or control characters
        if c.is_control() {
            return;
        }
        self.value.push(c);
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn is_secret(&self) -> bool {
        matches!(self.kind, FieldKind::Secret)
    }

    /// Get the display value for rendering (secrets are masked)
    pub fn display_value(&self) -> String {
        if self.is_secret() {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}
