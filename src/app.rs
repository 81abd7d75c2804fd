//! Application state and core logic

use crate::api::{
    ApiClient, AuthService, Navigator, Notifier, PolicyHooks, PolicyService, RemoteError,
    RemoteErrorKind,
};
use crate::config::{Settings, TuiConfig};
use crate::platform::is_submit_shortcut;
use crate::state::{
    AppState, Form, LoginForm, Notices, PolicyForm, PolicyFormButton, PolicyResource, View,
};
use crate::submission::{call_with_timeout, LoginFlow, Outcome, PolicyFlow, Trigger};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A finished remote call, tagged with where it came from and the session
/// it was started in
#[derive(Debug)]
pub enum SubmissionResult {
    Login {
        epoch: u64,
        result: Result<(), RemoteError>,
    },
    Policy {
        epoch: u64,
        result: Result<PolicyResource, RemoteError>,
    },
    PoliciesLoaded {
        epoch: u64,
        result: Result<Vec<PolicyResource>, RemoteError>,
    },
}

/// Side-effect sink for calls that outlived their session
struct Detached;

impl Navigator for Detached {
    fn go_to(&mut self, _view: View) {}
}

impl Notifier for Detached {
    fn notify_success(&mut self, _message: &str) {}
    fn notify_error(&mut self, _message: &str) {}
}

impl PolicyHooks for Detached {
    fn policy_added(&mut self, _policy: PolicyResource) {}
    fn close_form(&mut self) {}
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Status line and error queue
    pub notices: Notices,
    pub login_form: LoginForm,
    pub policy_form: PolicyForm,
    login_flow: LoginFlow,
    policy_flow: PolicyFlow,
    auth: Arc<dyn AuthService>,
    policies: Arc<dyn PolicyService>,
    config: TuiConfig,
    settings: Settings,
    /// Write `config` back to disk when it changes
    persist_config: bool,
    /// Bumped on logout so loads from an old session are dropped
    session_epoch: u64,
    results_tx: UnboundedSender<SubmissionResult>,
    results_rx: UnboundedReceiver<SubmissionResult>,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App talking to the configured API
    pub fn new() -> Result<Self> {
        let config = TuiConfig::load().unwrap_or_else(|err| {
            tracing::warn!("Failed to load config, using defaults: {err}");
            TuiConfig::default()
        });
        let settings = config.settings();
        let client = Arc::new(ApiClient::new(
            &settings.api_base_url,
            settings.request_timeout,
        )?);
        tracing::info!(api = client.base_url(), "API client ready");
        let mut app = Self::with_services(client.clone(), client, config);
        app.persist_config = true;
        Ok(app)
    }

    /// Create an App over explicit collaborators. Config changes stay in memory.
    pub fn with_services(
        auth: Arc<dyn AuthService>,
        policies: Arc<dyn PolicyService>,
        config: TuiConfig,
    ) -> Self {
        let settings = config.settings();
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let login_form = LoginForm::with_email(config.last_email.as_deref().unwrap_or(""));

        Self {
            state: AppState::default(),
            notices: Notices::default(),
            login_form,
            policy_form: PolicyForm::new(),
            login_flow: LoginFlow::new(
                Arc::clone(&auth),
                settings.post_login_view.clone(),
                settings.request_timeout,
            ),
            policy_flow: PolicyFlow::new(
                Arc::clone(&policies),
                settings.policy_rules,
                settings.request_timeout,
            ),
            auth,
            policies,
            config,
            settings,
            persist_config: false,
            session_epoch: 0,
            results_tx,
            results_rx,
            quit: false,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Email of the signed-in user, for the status bar
    pub fn current_user(&self) -> Option<String> {
        self.auth.current_user()
    }

    pub fn login_submitting(&self) -> bool {
        self.login_flow.is_submitting()
    }

    pub fn policy_submitting(&self) -> bool {
        self.policy_flow.is_submitting()
    }

    /// Expire stale status messages
    pub fn tick(&mut self) {
        self.notices.tick();
    }

    /// Run a remote call in the background and deliver its result to the
    /// event loop. A call that panics or is cancelled still reports back,
    /// as `Interrupted`, so its controller always leaves `Submitting`.
    fn spawn_call<T, F>(
        &self,
        call: F,
        wrap: impl FnOnce(Result<T, RemoteError>) -> SubmissionResult + Send + 'static,
    ) where
        T: Send + 'static,
        F: Future<Output = Result<T, RemoteError>> + Send + 'static,
    {
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let result = match tokio::spawn(call).await {
                Ok(result) => result,
                Err(err) => {
                    tracing::error!("Remote call task failed: {err}");
                    Err(RemoteError::interrupted())
                }
            };
            // A closed channel means the app is shutting down
            let _ = tx.send(wrap(result));
        });
    }

    /// Apply every finished call. Returns how many were applied.
    pub fn drain_results(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(result) = self.results_rx.try_recv() {
            self.apply_result(result);
            applied += 1;
        }
        applied
    }

    fn apply_result(&mut self, result: SubmissionResult) {
        match result {
            SubmissionResult::Login { epoch, result } if epoch != self.session_epoch => {
                tracing::debug!(epoch, "dropping login result from an old session");
                let mut scratch = LoginForm::new();
                self.login_flow.resolve(&mut scratch, result, &mut Detached, &mut Detached);
            }
            SubmissionResult::Login { result, .. } => {
                let outcome = self.login_flow.resolve(
                    &mut self.login_form,
                    result,
                    &mut self.state,
                    &mut self.notices,
                );
                if outcome == Outcome::Succeeded {
                    self.remember_email();
                    self.load_policies();
                }
            }
            SubmissionResult::Policy { epoch, result } if epoch != self.session_epoch => {
                // Settle the controller without touching the new session's form or list
                tracing::debug!(epoch, "dropping policy result from an old session");
                let mut scratch = PolicyForm::new();
                self.policy_flow.resolve(&mut scratch, result, &mut Detached, &mut Detached);
            }
            SubmissionResult::Policy { result, .. } => {
                self.policy_flow.resolve(
                    &mut self.policy_form,
                    result,
                    &mut self.state,
                    &mut self.notices,
                );
            }
            SubmissionResult::PoliciesLoaded { epoch, result } => {
                if epoch != self.session_epoch {
                    tracing::debug!(epoch, "dropping policies loaded for an old session");
                    return;
                }
                match result {
                    Ok(policies) => {
                        tracing::info!(count = policies.len(), "policies loaded");
                        self.state.set_policies(policies);
                    }
                    Err(err) => {
                        self.state.policies_loading = false;
                        self.notices.push_error(err.user_message());
                        if err.kind == RemoteErrorKind::Unauthorized {
                            self.end_session();
                        }
                    }
                }
            }
        }
    }

    fn remember_email(&mut self) {
        let Some(email) = self.auth.current_user() else {
            return;
        };
        self.config.last_email = Some(email);
        if self.persist_config {
            if let Err(err) = self.config.save() {
                tracing::warn!("Failed to save config: {err}");
            }
        }
    }

    /// Fetch the policy list for the current session
    pub fn load_policies(&mut self) {
        if self.state.policies_loading {
            return;
        }
        self.state.policies_loading = true;
        let policies = Arc::clone(&self.policies);
        let timeout = self.settings.request_timeout;
        let epoch = self.session_epoch;
        self.spawn_call(
            async move { call_with_timeout(timeout, policies.list_policies()).await },
            move |result| SubmissionResult::PoliciesLoaded { epoch, result },
        );
    }

    fn submit_login(&mut self) {
        match self.login_flow.trigger(&mut self.login_form) {
            Trigger::Dispatch(credentials) => {
                tracing::debug!(
                    attempt = self.login_flow.controller().dispatched(),
                    "signing in"
                );
                let call = self.login_flow.dispatch(credentials);
                let epoch = self.session_epoch;
                self.spawn_call(call, move |result| SubmissionResult::Login { epoch, result });
            }
            Trigger::Invalid(errors) => {
                tracing::debug!(fields = errors.len(), "login form invalid");
            }
            Trigger::Ignored => {}
        }
    }

    fn submit_policy(&mut self) {
        match self.policy_flow.trigger(&mut self.policy_form) {
            Trigger::Dispatch(draft) => {
                tracing::debug!(
                    attempt = self.policy_flow.controller().dispatched(),
                    "creating policy"
                );
                let call = self.policy_flow.dispatch(draft);
                let epoch = self.session_epoch;
                self.spawn_call(call, move |result| SubmissionResult::Policy { epoch, result });
            }
            Trigger::Invalid(errors) => {
                tracing::debug!(fields = errors.len(), "policy form invalid");
            }
            Trigger::Ignored => {}
        }
    }

    /// Sign out remotely, then drop everything tied to the session
    pub async fn logout(&mut self) {
        self.auth.logout().await;
        self.end_session();
        self.notices.set_status("Signed out");
    }

    fn end_session(&mut self) {
        self.session_epoch += 1;
        self.state.sign_out();
        self.policy_form.reset();
        self.login_form = LoginForm::with_email(self.config.last_email.as_deref().unwrap_or(""));
    }

    fn open_policy_form(&mut self) {
        if !self.policy_flow.is_submitting() {
            self.policy_form.reset();
        }
        self.state.navigate(View::PolicyCreate);
    }

    fn cancel_policy_form(&mut self) {
        self.policy_form.reset();
        self.state.go_back();
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.notices.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.notices.dismiss_error();
            }
            return Ok(());
        }

        match self.state.current_view {
            View::Login => self.handle_login_key(key),
            View::Policies => self.handle_policies_key(key).await,
            View::PolicyCreate => self.handle_policy_create_key(key),
        }
        Ok(())
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        if is_submit_shortcut(&key) {
            self.submit_login();
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.login_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.login_form.prev_field(),
            // Enter on the email field moves on; anywhere else signs in
            KeyCode::Enter if self.login_form.active_field() == 0 => self.login_form.next_field(),
            KeyCode::Enter => self.submit_login(),
            KeyCode::Char(c) => {
                if let Some(field) = self.login_form.get_active_field_mut() {
                    field.push_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.login_form.get_active_field_mut() {
                    field.pop_char();
                }
            }
            _ => {}
        }
    }

    async fn handle_policies_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                let count = self.state.policies.len();
                self.state.move_selection_down(count);
            }
            KeyCode::Up | KeyCode::Char('k') => self.state.move_selection_up(),
            KeyCode::Char('n') => self.open_policy_form(),
            KeyCode::Char('r') => self.load_policies(),
            KeyCode::Char('l') => self.logout().await,
            _ => {}
        }
    }

    fn handle_policy_create_key(&mut self, key: KeyEvent) {
        if is_submit_shortcut(&key) {
            self.submit_policy();
            return;
        }

        let on_buttons = self.policy_form.is_buttons_row_active();

        match key.code {
            KeyCode::Tab => self.policy_form.next_field(),
            KeyCode::BackTab => self.policy_form.prev_field(),
            KeyCode::Esc => self.cancel_policy_form(),
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l')
                if on_buttons =>
            {
                self.policy_form.selected_button.toggle();
            }
            KeyCode::Enter if on_buttons => match self.policy_form.selected_button {
                PolicyFormButton::Submit => self.submit_policy(),
                PolicyFormButton::Cancel => self.cancel_policy_form(),
            },
            KeyCode::Enter => self.policy_form.next_field(),
            KeyCode::Char(c) => {
                if let Some(field) = self.policy_form.get_active_field_mut() {
                    field.push_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.policy_form.get_active_field_mut() {
                    field.pop_char();
                }
            }
            _ => {}
        }
    }
}
