//! Form rendering module
//!
//! - `field_renderer`: field and help line rendering
//! - `login_form`: sign-in form
//! - `policy_form`: policy create form

mod field_renderer;
mod login_form;
mod policy_form;

pub use login_form::draw_login;
pub use policy_form::draw_policy_create;
