//! Application state module

mod app_state;
pub mod forms;
mod notices;
mod policy;

pub use app_state::*;
pub use forms::*;
pub use notices::*;
pub use policy::*;
