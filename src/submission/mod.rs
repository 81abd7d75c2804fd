//! Validated form submission: the generic controller and the two flows
//! built on it

mod controller;
mod login;
mod policy;

pub use controller::{call_with_timeout, Outcome, Trigger};
pub use login::LoginFlow;
pub use policy::PolicyFlow;
