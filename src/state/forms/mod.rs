//! Form domain layer
//!
//! Type-safe form handling for the login and policy-creation views:
//! field values, per-form state and the pure validation layer.

mod field;
mod form_state;
pub mod validation;

pub use field::FormField;
pub use form_state::{Form, LoginForm, PolicyForm, PolicyFormButton};
pub use validation::{ErrorMap, FieldName, PolicyRules};
