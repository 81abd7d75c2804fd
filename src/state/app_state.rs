//! Application state definitions

use super::policy::PolicyResource;
use crate::api::{Navigator, PolicyHooks};

/// Current view in the application
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Policies,
    PolicyCreate,
}

impl View {
    /// Parse a route path such as `"policies"` or `"/policies/new"`
    pub fn from_route(path: &str) -> Option<Self> {
        match path.trim().trim_matches('/') {
            "login" => Some(Self::Login),
            "policies" | "dashboard" | "" => Some(Self::Policies),
            "policies/new" => Some(Self::PolicyCreate),
            _ => None,
        }
    }

    pub fn route(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Policies => "/policies",
            Self::PolicyCreate => "/policies/new",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign In",
            Self::Policies => "Policies",
            Self::PolicyCreate => "New Policy",
        }
    }

    /// Views that should not be returned to via "back"
    fn is_transient(&self) -> bool {
        matches!(self, Self::PolicyCreate)
    }
}

/// Main application state
#[derive(Debug, Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub view_history: Vec<View>,

    // Data
    pub policies: Vec<PolicyResource>,
    pub policies_loading: bool,

    // Selection
    pub selected_index: usize,
}

impl AppState {
    /// Switch view, remembering the current one for `go_back`
    pub fn navigate(&mut self, view: View) {
        if self.current_view == view {
            return;
        }
        let previous = std::mem::replace(&mut self.current_view, view);
        if !previous.is_transient() {
            self.view_history.push(previous);
        }
        tracing::debug!(route = self.current_view.route(), "navigate");
    }

    /// Return to the previous view (or the policy list)
    pub fn go_back(&mut self) {
        self.current_view = self.view_history.pop().unwrap_or(View::Policies);
    }

    /// Forget everything tied to the signed-in session
    pub fn sign_out(&mut self) {
        self.policies.clear();
        self.policies_loading = false;
        self.view_history.clear();
        self.reset_selection();
        self.current_view = View::Login;
    }

    /// Move selection down
    pub fn move_selection_down(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    /// Move selection up
    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn reset_selection(&mut self) {
        self.selected_index = 0;
    }

    pub fn selected_policy(&self) -> Option<&PolicyResource> {
        self.policies.get(self.selected_index)
    }

    /// Replace the policy list with a freshly loaded one, newest first
    pub fn set_policies(&mut self, mut policies: Vec<PolicyResource>) {
        policies.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        self.policies = policies;
        self.policies_loading = false;
        if self.selected_index >= self.policies.len() {
            self.selected_index = self.policies.len().saturating_sub(1);
        }
    }

    /// Total insured value across all policies
    pub fn total_value(&self) -> f64 {
        self.policies.iter().map(|p| p.value).sum()
    }
}

impl Navigator for AppState {
    fn go_to(&mut self, view: View) {
        self.navigate(view);
    }
}

impl PolicyHooks for AppState {
    fn policy_added(&mut self, policy: PolicyResource) {
        // An id we already hold means a refresh raced the create
        if let Some(existing) = self.policies.iter_mut().find(|p| p.id == policy.id) {
            *existing = policy;
            return;
        }
        self.policies.insert(0, policy);
        self.selected_index = 0;
    }

    fn close_form(&mut self) {
        if self.current_view == View::PolicyCreate {
            self.go_back();
        }
    }
}
