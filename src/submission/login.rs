//! Login flow: validate credentials, let the auth service establish a
//! session, then navigate

use super::controller::{call_with_timeout, Outcome, Resolution, SubmissionController, Trigger};
use crate::api::{AuthService, Navigator, Notifier, RemoteError, RemoteErrorKind};
use crate::state::forms::validation::validate_login;
use crate::state::{Credentials, LoginForm, View};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const BAD_CREDENTIALS: &str = "Invalid email or password";

pub struct LoginFlow {
    auth: Arc<dyn AuthService>,
    controller: SubmissionController,
    destination: View,
    timeout: Duration,
}

impl LoginFlow {
    pub fn new(auth: Arc<dyn AuthService>, destination: View, timeout: Duration) -> Self {
        Self {
            auth,
            controller: SubmissionController::new("login"),
            destination,
            timeout,
        }
    }

    pub fn controller(&self) -> &SubmissionController {
        &self.controller
    }

    pub fn is_submitting(&self) -> bool {
        self.controller.is_submitting()
    }

    pub fn trigger(&mut self, form: &mut LoginForm) -> Trigger<Credentials> {
        let trigger = self.controller.trigger(|| validate_login(&*form));
        match &trigger {
            Trigger::Invalid(errors) => form.errors = errors.clone(),
            Trigger::Dispatch(credentials) => {
                form.errors.clear();
                tracing::debug!(?credentials, "dispatching login");
            }
            Trigger::Ignored => {}
        }
        trigger
    }

    /// The login call, bounded by the flow's timeout. A refused login
    /// (`Ok(false)`) comes back as an `Unauthorized` error.
    pub fn dispatch(
        &self,
        credentials: Credentials,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send + 'static {
        let auth = Arc::clone(&self.auth);
        let timeout = self.timeout;
        async move {
            match call_with_timeout(timeout, auth.login(credentials)).await? {
                true => Ok(()),
                false => Err(RemoteError::new(RemoteErrorKind::Unauthorized)
                    .with_message(BAD_CREDENTIALS)
                    .with_code("invalid_credentials")),
            }
        }
    }

    pub fn resolve(
        &mut self,
        form: &mut LoginForm,
        result: Result<(), RemoteError>,
        navigator: &mut dyn Navigator,
        notifier: &mut dyn Notifier,
    ) -> Outcome {
        match self.controller.resolve(result) {
            Resolution::Succeeded(()) => {
                let user = self.auth.current_user();
                tracing::info!(user = ?user, "signed in");
                // The password never outlives the call
                form.password.clear();
                notifier.notify_success(&match user {
                    Some(email) => format!("Signed in as {email}"),
                    None => "Signed in".to_string(),
                });
                navigator.go_to(self.destination.clone());
                Outcome::Succeeded
            }
            Resolution::Failed(err) => {
                notifier.notify_error(err.user_message());
                Outcome::Failed
            }
            Resolution::Stale => Outcome::Stale,
        }
    }

    #[allow(dead_code)] // Inline variant for callers that do not spawn the call
    pub async fn submit(
        &mut self,
        form: &mut LoginForm,
        navigator: &mut dyn Navigator,
        notifier: &mut dyn Notifier,
    ) -> Outcome {
        match self.trigger(form) {
            Trigger::Ignored => Outcome::Ignored,
            Trigger::Invalid(_) => Outcome::Invalid,
            Trigger::Dispatch(credentials) => {
                let result = self.dispatch(credentials).await;
                self.resolve(form, result, navigator, notifier)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockAuthService, MockNavigator, MockNotifier};
    use crate::state::{FieldName, Form};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn form(email: &str, password: &str) -> LoginForm {
        let mut form = LoginForm::with_email(email);
        form.password.set_text(password.to_string());
        form
    }

    fn flow(auth: MockAuthService) -> LoginFlow {
        LoginFlow::new(Arc::new(auth), View::Policies, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_success_navigates_and_clears_password() {
        let mut auth = MockAuthService::new();
        auth.expect_login()
            .times(1)
            .withf(|c| c.email == "agent@example.com" && c.password == "s3cret")
            .returning(|_| Ok(true));
        auth.expect_current_user()
            .return_const(Some("agent@example.com".to_string()));

        let mut navigator = MockNavigator::new();
        navigator
            .expect_go_to()
            .with(eq(View::Policies))
            .times(1)
            .return_const(());
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify_success()
            .with(eq("Signed in as agent@example.com"))
            .times(1)
            .return_const(());

        let mut flow = flow(auth);
        let mut form = form("agent@example.com", "s3cret");
        let outcome = flow.submit(&mut form, &mut navigator, &mut notifier).await;

        assert_eq!(outcome, Outcome::Succeeded);
        assert!(!flow.is_submitting());
        assert_eq!(form.email.as_text(), "agent@example.com");
        assert_eq!(form.password.as_text(), "");
    }

    #[tokio::test]
    async fn test_refused_login_reports_bad_credentials() {
        let mut auth = MockAuthService::new();
        auth.expect_login().times(1).returning(|_| Ok(false));
        let mut navigator = MockNavigator::new();
        navigator.expect_go_to().never();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify_error()
            .with(eq(BAD_CREDENTIALS))
            .times(1)
            .return_const(());

        let mut flow = flow(auth);
        let mut form = form("agent@example.com", "wrong");
        let outcome = flow.submit(&mut form, &mut navigator, &mut notifier).await;

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(form.password.as_text(), "wrong", "kept for correction");
        assert!(!flow.is_submitting());
    }

    #[tokio::test]
    async fn test_network_failure_uses_fallback_message() {
        let mut auth = MockAuthService::new();
        auth.expect_login()
            .returning(|_| Err(RemoteError::new(RemoteErrorKind::Network)));
        let mut navigator = MockNavigator::new();
        navigator.expect_go_to().never();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify_error()
            .withf(|m: &str| m.contains("Could not reach the server"))
            .times(1)
            .return_const(());

        let mut flow = flow(auth);
        let mut form = form("agent@example.com", "pw");
        assert_eq!(
            flow.submit(&mut form, &mut navigator, &mut notifier).await,
            Outcome::Failed
        );
    }

    #[tokio::test]
    async fn test_invalid_email_blocks_call() {
        let mut auth = MockAuthService::new();
        auth.expect_login().never();
        let mut navigator = MockNavigator::new();
        let mut notifier = MockNotifier::new();

        let mut flow = flow(auth);
        let mut form = form("not-an-email", "");
        let outcome = flow.submit(&mut form, &mut navigator, &mut notifier).await;

        assert_eq!(outcome, Outcome::Invalid);
        assert!(form.error_for(FieldName::Email).is_some());
        assert_eq!(form.error_for(FieldName::Password), Some("Password is required"));
    }

    #[tokio::test]
    async fn test_double_submit_logs_in_once() {
        let mut auth = MockAuthService::new();
        auth.expect_login().times(1).returning(|_| Ok(true));
        auth.expect_current_user().return_const(None::<String>);
        let mut navigator = MockNavigator::new();
        navigator.expect_go_to().times(1).return_const(());
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify_success()
            .with(eq("Signed in"))
            .return_const(());

        let mut flow = flow(auth);
        let mut form = form("agent@example.com", "pw");

        let Trigger::Dispatch(credentials) = flow.trigger(&mut form) else {
            panic!("expected dispatch");
        };
        assert_eq!(flow.trigger(&mut form), Trigger::Ignored);

        let result = flow.dispatch(credentials).await;
        assert_eq!(
            flow.resolve(&mut form, result, &mut navigator, &mut notifier),
            Outcome::Succeeded
        );
        assert_eq!(flow.controller().dispatched(), 1);
    }
}
