//! Remote API module: HTTP client and collaborator traits

mod client;
mod error;
mod traits;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::{RemoteError, RemoteErrorKind};
pub use traits::{AuthService, Navigator, Notifier, PolicyHooks, PolicyService};

#[cfg(test)]
pub use error::GENERIC_FAILURE;
#[cfg(test)]
pub use traits::{
    MockAuthService, MockNavigator, MockNotifier, MockPolicyHooks, MockPolicyService,
};
