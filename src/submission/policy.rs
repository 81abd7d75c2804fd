//! Policy creation flow: validate the form, create the policy remotely and
//! hand the stored resource to the form's owner

use super::controller::{call_with_timeout, Outcome, Resolution, SubmissionController, Trigger};
use crate::api::{Notifier, PolicyHooks, PolicyService, RemoteError};
use crate::state::forms::validation::validate_policy;
use crate::state::{PolicyDraft, PolicyForm, PolicyResource, PolicyRules};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct PolicyFlow {
    service: Arc<dyn PolicyService>,
    controller: SubmissionController,
    rules: PolicyRules,
    timeout: Duration,
}

impl PolicyFlow {
    pub fn new(service: Arc<dyn PolicyService>, rules: PolicyRules, timeout: Duration) -> Self {
        Self {
            service,
            controller: SubmissionController::new("policy"),
            rules,
            timeout,
        }
    }

    pub fn controller(&self) -> &SubmissionController {
        &self.controller
    }

    pub fn is_submitting(&self) -> bool {
        self.controller.is_submitting()
    }

    /// Validate the form and, if it passes, hand back the draft to dispatch.
    /// Field errors are written into the form.
    pub fn trigger(&mut self, form: &mut PolicyForm) -> Trigger<PolicyDraft> {
        let rules = self.rules;
        let trigger = self.controller.trigger(|| validate_policy(&*form, &rules));
        match &trigger {
            Trigger::Invalid(errors) => form.errors = errors.clone(),
            Trigger::Dispatch(draft) => {
                form.errors.clear();
                tracing::debug!(?draft, "dispatching policy draft");
            }
            Trigger::Ignored => {}
        }
        trigger
    }

    /// The remote call for a draft, bounded by the flow's timeout.
    /// Owns everything it needs so it can be spawned.
    pub fn dispatch(
        &self,
        draft: PolicyDraft,
    ) -> impl Future<Output = Result<PolicyResource, RemoteError>> + Send + 'static {
        let service = Arc::clone(&self.service);
        let timeout = self.timeout;
        async move { call_with_timeout(timeout, service.create_policy(draft)).await }
    }

    /// Apply the remote result: on success the owner receives the policy
    /// and closes the form; on failure the values stay for a retry.
    pub fn resolve(
        &mut self,
        form: &mut PolicyForm,
        result: Result<PolicyResource, RemoteError>,
        hooks: &mut dyn PolicyHooks,
        notifier: &mut dyn Notifier,
    ) -> Outcome {
        match self.controller.resolve(result) {
            Resolution::Succeeded(policy) => {
                tracing::info!(id = %policy.id, name = %policy.name, "policy created");
                let message = format!("Policy \"{}\" created", policy.name);
                hooks.policy_added(policy);
                notifier.notify_success(&message);
                form.reset();
                hooks.close_form();
                Outcome::Succeeded
            }
            Resolution::Failed(err) => {
                notifier.notify_error(err.user_message());
                Outcome::Failed
            }
            Resolution::Stale => Outcome::Stale,
        }
    }

    /// Trigger, dispatch and resolve inline
    #[allow(dead_code)]
    pub async fn submit(
        &mut self,
        form: &mut PolicyForm,
        hooks: &mut dyn PolicyHooks,
        notifier: &mut dyn Notifier,
    ) -> Outcome {
        match self.trigger(form) {
            Trigger::Ignored => Outcome::Ignored,
            Trigger::Invalid(_) => Outcome::Invalid,
            Trigger::Dispatch(draft) => {
                let result = self.dispatch(draft).await;
                self.resolve(form, result, hooks, notifier)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockNotifier, MockPolicyHooks, MockPolicyService};
    use crate::state::{FieldName, Form, PolicyStatus};
    use crate::submission::controller::{LastOutcome, SubmitPhase};
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn filled_form() -> PolicyForm {
        let mut form = PolicyForm::new();
        form.name.set_text("Life".into());
        form.company.set_text("Met".into());
        form.value.set_text("100000".into());
        form.premium.set_text("50".into());
        form.start_date.set_text("2024-01-01".into());
        form.end_date.set_text("2025-01-01".into());
        form.nominees.set_text("2".into());
        form
    }

    fn stored(draft: &PolicyDraft) -> PolicyResource {
        PolicyResource {
            id: "pol_1".into(),
            name: draft.name.clone(),
            company: draft.company.clone(),
            value: draft.value,
            premium: draft.premium,
            start_date: draft.start_date,
            end_date: draft.end_date,
            nominees: draft.nominees,
            status: draft.status,
            created_at: None,
        }
    }

    fn flow(service: MockPolicyService) -> PolicyFlow {
        PolicyFlow::new(Arc::new(service), PolicyRules::default(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_valid_submit_appends_and_closes() {
        let mut service = MockPolicyService::new();
        service
            .expect_create_policy()
            .times(1)
            .withf(|draft| {
                draft.value == 100000.0
                    && draft.status == PolicyStatus::Active
                    && draft.start_date == Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            })
            .returning(|draft| Ok(stored(&draft)));

        let mut hooks = MockPolicyHooks::new();
        hooks
            .expect_policy_added()
            .times(1)
            .withf(|p| p.id == "pol_1" && p.name == "Life")
            .return_const(());
        hooks.expect_close_form().times(1).return_const(());

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify_success()
            .with(eq("Policy \"Life\" created"))
            .times(1)
            .return_const(());
        notifier.expect_notify_error().never();

        let mut flow = flow(service);
        let mut form = filled_form();
        let outcome = flow.submit(&mut form, &mut hooks, &mut notifier).await;

        assert_eq!(outcome, Outcome::Succeeded);
        assert!(!flow.is_submitting());
        assert_eq!(form.name.as_text(), "", "form is reset after success");
    }

    #[tokio::test]
    async fn test_invalid_submit_makes_no_call() {
        let mut service = MockPolicyService::new();
        service.expect_create_policy().never();
        let mut hooks = MockPolicyHooks::new();
        hooks.expect_policy_added().never();
        hooks.expect_close_form().never();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify_success().never();
        notifier.expect_notify_error().never();

        let mut flow = flow(service);
        let mut form = filled_form();
        form.value.set_text("-5".into());

        let outcome = flow.submit(&mut form, &mut hooks, &mut notifier).await;

        assert_eq!(outcome, Outcome::Invalid);
        assert_eq!(
            form.error_for(FieldName::Value),
            Some("Value must be a positive number")
        );
        assert_eq!(form.errors.len(), 1);
        assert_eq!(flow.controller().phase(), SubmitPhase::Idle);
        assert_eq!(flow.controller().dispatched(), 0);
    }

    #[tokio::test]
    async fn test_rejection_keeps_values_and_reports_message() {
        let mut service = MockPolicyService::new();
        service
            .expect_create_policy()
            .times(1)
            .returning(|_| Err(RemoteError::rejected("duplicate policy")));
        let mut hooks = MockPolicyHooks::new();
        hooks.expect_policy_added().never();
        hooks.expect_close_form().never();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify_error()
            .with(eq("duplicate policy"))
            .times(1)
            .return_const(());

        let mut flow = flow(service);
        let mut form = filled_form();
        let outcome = flow.submit(&mut form, &mut hooks, &mut notifier).await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(!flow.is_submitting());
        assert_eq!(form.name.as_text(), "Life");
        assert_eq!(form.nominees.as_text(), "2");
    }

    #[tokio::test]
    async fn test_generic_message_without_server_message() {
        let mut service = MockPolicyService::new();
        service
            .expect_create_policy()
            .returning(|_| Err(RemoteError::new(crate::api::RemoteErrorKind::Server)));
        let mut hooks = MockPolicyHooks::new();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify_error()
            .with(eq(crate::api::GENERIC_FAILURE))
            .times(1)
            .return_const(());

        let mut flow = flow(service);
        let mut form = filled_form();
        assert_eq!(
            flow.submit(&mut form, &mut hooks, &mut notifier).await,
            Outcome::Failed
        );
    }

    #[tokio::test]
    async fn test_rapid_retrigger_dispatches_once() {
        let mut service = MockPolicyService::new();
        service
            .expect_create_policy()
            .times(1)
            .returning(|draft| Ok(stored(&draft)));
        let mut hooks = MockPolicyHooks::new();
        hooks.expect_policy_added().times(1).return_const(());
        hooks.expect_close_form().times(1).return_const(());
        let mut notifier = MockNotifier::new();
        notifier.expect_notify_success().times(1).return_const(());

        let mut flow = flow(service);
        let mut form = filled_form();

        let Trigger::Dispatch(draft) = flow.trigger(&mut form) else {
            panic!("expected dispatch");
        };
        assert!(flow.is_submitting());
        // Re-clicks while the call is pending
        assert_eq!(flow.trigger(&mut form), Trigger::Ignored);
        assert_eq!(flow.trigger(&mut form), Trigger::Ignored);

        let result = flow.dispatch(draft).await;
        assert!(flow.is_submitting(), "still submitting until resolved");
        assert_eq!(
            flow.resolve(&mut form, result, &mut hooks, &mut notifier),
            Outcome::Succeeded
        );
        assert!(!flow.is_submitting());
        assert_eq!(flow.controller().dispatched(), 1);
    }

    #[tokio::test]
    async fn test_flag_held_until_resolved() {
        let mut service = MockPolicyService::new();
        service
            .expect_create_policy()
            .returning(|draft| Ok(stored(&draft)));

        let mut flow = flow(service);
        let mut form = filled_form();
        let Trigger::Dispatch(draft) = flow.trigger(&mut form) else {
            panic!("expected dispatch");
        };

        let mut call = tokio_test::task::spawn(flow.dispatch(draft));
        let result = tokio_test::assert_ready!(call.poll());
        assert!(result.is_ok());
        // The call finished but nobody resolved it yet
        assert!(flow.is_submitting());
        assert_eq!(flow.controller().phase(), SubmitPhase::Submitting);
    }

    #[tokio::test]
    async fn test_hanging_call_times_out_and_releases() {
        struct Hanging;

        #[async_trait::async_trait]
        impl PolicyService for Hanging {
            async fn create_policy(
                &self,
                _draft: PolicyDraft,
            ) -> Result<PolicyResource, RemoteError> {
                std::future::pending().await
            }
            async fn list_policies(&self) -> Result<Vec<PolicyResource>, RemoteError> {
                Ok(Vec::new())
            }
        }

        let mut hooks = MockPolicyHooks::new();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify_error().times(1).return_const(());

        let mut flow = PolicyFlow::new(
            Arc::new(Hanging),
            PolicyRules::default(),
            Duration::from_millis(20),
        );
        let mut form = filled_form();
        let outcome = flow.submit(&mut form, &mut hooks, &mut notifier).await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(!flow.is_submitting());
        assert!(matches!(
            flow.controller().last_outcome(),
            Some(LastOutcome::Failed(e)) if e.kind == crate::api::RemoteErrorKind::Timeout
        ));
    }

    #[tokio::test]
    async fn test_fix_and_resubmit_clears_errors() {
        let mut service = MockPolicyService::new();
        service.expect_create_policy().never();
        let mut hooks = MockPolicyHooks::new();
        let mut notifier = MockNotifier::new();

        let mut flow = flow(service);
        let mut form = filled_form();
        form.nominees.set_text("6".into());
        assert_eq!(flow.submit(&mut form, &mut hooks, &mut notifier).await, Outcome::Invalid);
        assert!(form.error_for(FieldName::Nominees).is_some());

        form.nominees.set_text("5".into());
        assert!(matches!(flow.trigger(&mut form), Trigger::Dispatch(_)));
        assert!(form.errors.is_empty());
    }
}
