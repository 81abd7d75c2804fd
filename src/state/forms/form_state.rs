//! Form state management and form structs

use super::field::FormField;
use super::validation::{ErrorMap, FieldKind, FieldName, FieldSource};

/// Trait for common form operations.
///
/// Field indices run over the input fields and then one extra slot for the
/// action (buttons) row.
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
    /// `None` when the action row is focused
    fn get_active_field_mut(&mut self) -> Option<&mut FormField>;
    fn get_field(&self, index: usize) -> Option<&FormField>;
    fn errors(&self) -> &ErrorMap;

    fn is_buttons_row_active(&self) -> bool {
        self.active_field() == self.field_count() - 1
    }

    fn error_for(&self, name: FieldName) -> Option<&str> {
        self.errors().get(&name).map(String::as_str)
    }
}

// Login Form
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: FormField,
    pub password: FormField,
    pub errors: ErrorMap,
    pub active_field_index: usize,
}

impl LoginForm {
    pub fn new() -> Self {
        Self {
            email: FormField::new(FieldName::Email, "Email", FieldKind::Email)
                .placeholder("you@example.com"),
            password: FormField::new(FieldName::Password, "Password", FieldKind::Secret),
            errors: ErrorMap::new(),
            active_field_index: 0,
        }
    }

    /// Pre-fill the email (remembered from the last successful login)
    pub fn with_email(email: &str) -> Self {
        let mut form = Self::new();
        form.email.set_text(email.to_string());
        if !email.is_empty() {
            form.active_field_index = 1;
        }
        form
    }
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldSource for LoginForm {
    fn raw(&self, name: FieldName) -> &str {
        match name {
            FieldName::Email => self.email.as_text(),
            FieldName::Password => self.password.as_text(),
            _ => "",
        }
    }
}

impl Form for LoginForm {
    fn field_count(&self) -> usize {
        3 // email, password, buttons
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(2);
    }
    fn get_active_field_mut(&mut self) -> Option<&mut FormField> {
        match self.active_field_index {
            0 => Some(&mut self.email),
            1 => Some(&mut self.password),
            _ => None,
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        match index {
            0 => Some(&self.email),
            1 => Some(&self.password),
            _ => None,
        }
    }
    fn errors(&self) -> &ErrorMap {
        &self.errors
    }
}

/// Buttons on the policy form's action row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyFormButton {
    #[default]
    Submit,
    Cancel,
}

impl PolicyFormButton {
    pub fn toggle(&mut self) {
        *self = match self {
            Self::Submit => Self::Cancel,
            Self::Cancel => Self::Submit,
        };
    }
}

// Policy Create Form
#[derive(Debug, Clone)]
pub struct PolicyForm {
    pub name: FormField,
    pub company: FormField,
    pub value: FormField,
    pub premium: FormField,
    pub start_date: FormField,
    pub end_date: FormField,
    pub nominees: FormField,
    pub errors: ErrorMap,
    pub active_field_index: usize,
    pub selected_button: PolicyFormButton,
}

impl PolicyForm {
    /// Index of the action row
    pub const BUTTONS_ROW: usize = 7;

    pub fn new() -> Self {
        Self {
            name: FormField::new(FieldName::Name, "Policy Name", FieldKind::Text),
            company: FormField::new(FieldName::Company, "Company", FieldKind::Text),
            value: FormField::new(FieldName::Value, "Value", FieldKind::Number),
            premium: FormField::new(FieldName::Premium, "Premium", FieldKind::Number),
            start_date: FormField::new(FieldName::StartDate, "Start Date", FieldKind::Date)
                .placeholder("YYYY-MM-DD"),
            end_date: FormField::new(FieldName::EndDate, "End Date", FieldKind::Date)
                .placeholder("YYYY-MM-DD"),
            nominees: FormField::new(FieldName::Nominees, "Nominees (1-5)", FieldKind::Number),
            errors: ErrorMap::new(),
            active_field_index: 0,
            selected_button: PolicyFormButton::Submit,
        }
    }

    /// Clear values and errors after a successful submission
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn fields(&self) -> [&FormField; 7] {
        [
            &self.name,
            &self.company,
            &self.value,
            &self.premium,
            &self.start_date,
            &self.end_date,
            &self.nominees,
        ]
    }
}

impl Default for PolicyForm {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldSource for PolicyForm {
    fn raw(&self, name: FieldName) -> &str {
        match name {
            FieldName::Name => self.name.as_text(),
            FieldName::Company => self.company.as_text(),
            FieldName::Value => self.value.as_text(),
            FieldName::Premium => self.premium.as_text(),
            FieldName::StartDate => self.start_date.as_text(),
            FieldName::EndDate => self.end_date.as_text(),
            FieldName::Nominees => self.nominees.as_text(),
            FieldName::Email | FieldName::Password => "",
        }
    }
}

impl Form for PolicyForm {
    fn field_count(&self) -> usize {
        8 // seven inputs + buttons
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(Self::BUTTONS_ROW);
    }
    fn get_active_field_mut(&mut self) -> Option<&mut FormField> {
        match self.active_field_index {
            0 => Some(&mut self.name),
            1 => Some(&mut self.company),
            2 => Some(&mut self.value),
            3 => Some(&mut self.premium),
            4 => Some(&mut self.start_date),
            5 => Some(&mut self.end_date),
            6 => Some(&mut self.nominees),
            _ => None,
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        self.fields().get(index).copied()
    }
    fn errors(&self) -> &ErrorMap {
        &self.errors
    }
}
