//! Submission state machine shared by every form
//!
//! ```text
//! Idle ──trigger──▶ Validating ──invalid──▶ Idle
//!                       │
//!                       └──valid──▶ Submitting ──ok──▶ Succeeded ──▶ Idle
//!                                       │
//!                                       └──err──▶ Failed ──▶ Idle
//! ```
//!
//! The controller does not perform the remote call itself. [`trigger`] hands
//! back the payload to dispatch and [`resolve`] is fed the result, so the
//! caller decides whether to await inline or spawn and keep the UI loop
//! running in between.
//!
//! [`trigger`]: SubmissionController::trigger
//! [`resolve`]: SubmissionController::resolve

use crate::api::RemoteError;
use crate::state::ErrorMap;
use std::future::Future;
use std::time::Duration;

/// Named phases of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmitPhase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// What a submit trigger produced
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger<P> {
    /// A submission is already in flight; nothing happened
    Ignored,
    /// Validation failed; no remote call should be made
    Invalid(ErrorMap),
    /// Validation passed; dispatch this payload and feed the result to `resolve`
    Dispatch(P),
}

/// Result of feeding a remote outcome back into the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<O> {
    Succeeded(O),
    Failed(RemoteError),
    /// No submission was in flight; the result was dropped
    Stale,
}

/// Summary of a whole submit attempt, as reported by the flows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Invalid,
    Succeeded,
    Failed,
    Stale,
}

/// How the most recent attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastOutcome {
    Invalid,
    Succeeded,
    Failed(RemoteError),
}

/// Per-form submission state machine
#[derive(Debug)]
pub struct SubmissionController {
    form: &'static str,
    phase: SubmitPhase,
    last_outcome: Option<LastOutcome>,
    dispatched: u64,
}

impl SubmissionController {
    pub fn new(form: &'static str) -> Self {
        Self {
            form,
            phase: SubmitPhase::Idle,
            last_outcome: None,
            dispatched: 0,
        }
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    /// True from the moment a trigger is accepted until it is resolved
    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, SubmitPhase::Validating | SubmitPhase::Submitting)
    }

    #[allow(dead_code)]
    pub fn last_outcome(&self) -> Option<&LastOutcome> {
        self.last_outcome.as_ref()
    }

    /// Number of payloads handed out for dispatch over the controller's life
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    fn transition(&mut self, to: SubmitPhase) {
        tracing::debug!(
            form = self.form,
            from = self.phase.label(),
            to = to.label(),
            "submission transition"
        );
        self.phase = to;
    }

    /// Accept a submit trigger and run validation synchronously
    pub fn trigger<P>(&mut self, validate: impl FnOnce() -> Result<P, ErrorMap>) -> Trigger<P> {
        if self.is_submitting() {
            tracing::debug!(form = self.form, "submit ignored, already in flight");
            return Trigger::Ignored;
        }

        self.transition(SubmitPhase::Validating);
        match validate() {
            Err(errors) => {
                tracing::info!(
                    form = self.form,
                    invalid_fields = errors.len(),
                    "validation failed"
                );
                self.last_outcome = Some(LastOutcome::Invalid);
                self.transition(SubmitPhase::Idle);
                Trigger::Invalid(errors)
            }
            Ok(payload) => {
                self.dispatched += 1;
                self.transition(SubmitPhase::Submitting);
                Trigger::Dispatch(payload)
            }
        }
    }

    /// Feed the remote result back. Always ends in `Idle` when a submission
    /// was in flight.
    pub fn resolve<O>(&mut self, result: Result<O, RemoteError>) -> Resolution<O> {
        if self.phase != SubmitPhase::Submitting {
            tracing::warn!(
                form = self.form,
                phase = self.phase.label(),
                "stale submission result dropped"
            );
            return Resolution::Stale;
        }

        let resolution = match result {
            Ok(output) => {
                self.transition(SubmitPhase::Succeeded);
                self.last_outcome = Some(LastOutcome::Succeeded);
                Resolution::Succeeded(output)
            }
            Err(err) => {
                tracing::warn!(
                    form = self.form,
                    kind = ?err.kind,
                    code = ?err.code,
                    "submission failed: {err}"
                );
                self.transition(SubmitPhase::Failed);
                self.last_outcome = Some(LastOutcome::Failed(err.clone()));
                Resolution::Failed(err)
            }
        };
        self.transition(SubmitPhase::Idle);
        resolution
    }
}

/// Await a collaborator call, turning a missed deadline into a timeout error
pub async fn call_with_timeout<O, F>(timeout: Duration, call: F) -> Result<O, RemoteError>
where
    F: Future<Output = Result<O, RemoteError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "remote call timed out");
            Err(RemoteError::timeout())
        }
    }
}
