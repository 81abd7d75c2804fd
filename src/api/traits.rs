//! Trait abstractions for remote collaborators and UI side effects,
//! enabling mocking in tests

use super::error::RemoteError;
use crate::state::{Credentials, PolicyDraft, PolicyResource, View};
use async_trait::async_trait;

/// Remote policy store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PolicyService: Send + Sync {
    /// Create a policy; the returned resource carries the server-assigned id
    async fn create_policy(&self, draft: PolicyDraft) -> Result<PolicyResource, RemoteError>;

    /// List policies visible to the current session
    async fn list_policies(&self) -> Result<Vec<PolicyResource>, RemoteError>;
}

/// Remote authentication. Owns the session; callers only learn whether
/// login succeeded.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Establish a session. `Ok(false)` means the credentials were refused.
    async fn login(&self, credentials: Credentials) -> Result<bool, RemoteError>;

    /// Drop the current session
    async fn logout(&self);

    /// Email of the signed-in user, if any
    fn current_user(&self) -> Option<String>;
}

/// Route changes, fire-and-forget
#[cfg_attr(test, mockall::automock)]
pub trait Navigator {
    fn go_to(&mut self, view: View);
}

/// Transient user notifications, fire-and-forget
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify_success(&mut self, message: &str);
    fn notify_error(&mut self, message: &str);
}

/// Callbacks the policy form's owner supplies
#[cfg_attr(test, mockall::automock)]
pub trait PolicyHooks {
    /// A policy was created; append it to the owner's collection
    fn policy_added(&mut self, policy: PolicyResource);

    /// The form should be dismissed
    fn close_form(&mut self);
}
