//! HTTP client for the policy API
//!
//! Implements both [`AuthService`] and [`PolicyService`] over a JSON API.
//! The bearer token obtained at login is kept in memory only and attached to
//! every policy request.

use super::error::{RemoteError, RemoteErrorKind};
use super::traits::{AuthService, PolicyService};
use crate::state::{Credentials, PolicyDraft, PolicyResource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use uuid::Uuid;

/// Default API address
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";

/// Authenticated session returned by the login endpoint
#[derive(Debug, Clone)]
struct Session {
    token: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "accessToken")]
    token: String,
    #[serde(default)]
    user: Option<LoginUser>,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    email: Option<String>,
}

/// Error body shape most JSON backends agree on
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    code: Option<String>,
}

/// Client for communicating with the policy API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: RwLock<Option<Session>>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("policydesk-tui/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn read_session(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.session.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_session(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.session.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bearer_token(&self) -> Result<String, RemoteError> {
        self.read_session()
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or_else(|| RemoteError::unauthorized().with_message("Please sign in first"))
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, RemoteError> {
        Ok(request.bearer_auth(self.bearer_token()?))
    }

    /// Send a request and decode a JSON body, mapping every failure to a
    /// [`RemoteError`]
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let request_id = Uuid::new_v4();
        let response = request
            .header("x-request-id", request_id.to_string())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%request_id, status = status.as_u16(), "API request failed");
            return Err(error_from_response(status.as_u16(), &body));
        }

        let body = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(%request_id, "Unreadable API response: {e}");
            RemoteError::new(RemoteErrorKind::Server).with_status(status.as_u16())
        })
    }
}

#[async_trait]
impl AuthService for ApiClient {
    async fn login(&self, credentials: Credentials) -> Result<bool, RemoteError> {
        let request = self.http.post(self.url("auth/login")).json(&credentials);

        match self.send_json::<LoginResponse>(request).await {
            Ok(response) => {
                let email = response
                    .user
                    .and_then(|u| u.email)
                    .unwrap_or_else(|| credentials.email.clone());
                tracing::info!(%email, "Session established");
                *self.write_session() = Some(Session {
                    token: response.token,
                    email,
                });
                Ok(true)
            }
            Err(err) if err.status == Some(StatusCode::UNAUTHORIZED.as_u16()) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn logout(&self) {
        if let Ok(request) = self.authorized(self.http.post(self.url("auth/logout"))) {
            // Best effort; the local session is dropped regardless
            if let Err(e) = request.send().await {
                tracing::debug!("Logout request failed: {e}");
            }
        }
        *self.write_session() = None;
        tracing::info!("Session cleared");
    }

    fn current_user(&self) -> Option<String> {
        self.read_session().as_ref().map(|s| s.email.clone())
    }
}

#[async_trait]
impl PolicyService for ApiClient {
    async fn create_policy(&self, draft: PolicyDraft) -> Result<PolicyResource, RemoteError> {
        let request = self.authorized(self.http.post(self.url("policies")).json(&draft))?;
        self.send_json(request).await
    }

    async fn list_policies(&self) -> Result<Vec<PolicyResource>, RemoteError> {
        let request = self.authorized(self.http.get(self.url("policies")))?;
        self.send_json(request).await
    }
}

fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::timeout()
    } else {
        RemoteError::network(e.to_string())
    }
}

fn kind_for_status(status: u16) -> RemoteErrorKind {
    match status {
        401 | 403 => RemoteErrorKind::Unauthorized,
        408 | 504 => RemoteErrorKind::Timeout,
        400..=499 => RemoteErrorKind::Rejected,
        _ => RemoteErrorKind::Server,
    }
}

/// Build a [`RemoteError`] from a non-2xx status and its (possibly non-JSON) body
fn error_from_response(status: u16, body: &str) -> RemoteError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let mut err = RemoteError::new(kind_for_status(status)).with_status(status);
    if let Some(message) = parsed.message.or(parsed.error) {
        err = err.with_message(message);
    }
    if let Some(code) = parsed.code {
        err = err.with_code(code);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:9000/api/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = client();
        assert_eq!(client.base_url(), "http://localhost:9000/api");
        assert_eq!(client.url("policies"), "http://localhost:9000/api/policies");
        assert_eq!(client.url("/auth/login"), "http://localhost:9000/api/auth/login");
    }

    #[test]
    fn test_no_session_initially() {
        let client = client();
        assert!(client.current_user().is_none());
        let err = client.bearer_token().unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_create_policy_without_session_is_unauthorized() {
        use chrono::Utc;
        let draft = PolicyDraft {
            name: "Life".into(),
            company: "Met".into(),
            value: 1.0,
            premium: 1.0,
            start_date: Utc::now(),
            end_date: Utc::now(),
            nominees: 1,
            status: Default::default(),
        };
        let err = client().create_policy(draft).await.unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::Unauthorized);
        assert_eq!(err.user_message(), "Please sign in first");
    }

    #[test]
    fn test_error_from_json_body() {
        let err = error_from_response(409, r#"{"message":"duplicate policy","code":"DUPLICATE"}"#);
        assert_eq!(err.kind, RemoteErrorKind::Rejected);
        assert_eq!(err.user_message(), "duplicate policy");
        assert_eq!(err.code.as_deref(), Some("DUPLICATE"));
        assert_eq!(err.status, Some(409));
    }

    #[test]
    fn test_error_field_used_when_message_missing() {
        let err = error_from_response(400, r#"{"error":"premium too low"}"#);
        assert_eq!(err.user_message(), "premium too low");
    }

    #[test]
    fn test_error_from_html_body_falls_back() {
        let err = error_from_response(502, "<html>Bad Gateway</html>");
        assert_eq!(err.kind, RemoteErrorKind::Server);
        assert!(err.message.is_none());
        assert_eq!(err.user_message(), crate::api::GENERIC_FAILURE);
    }

    #[test]
    fn test_kind_for_status() {
        assert_eq!(kind_for_status(401), RemoteErrorKind::Unauthorized);
        assert_eq!(kind_for_status(403), RemoteErrorKind::Unauthorized);
        assert_eq!(kind_for_status(408), RemoteErrorKind::Timeout);
        assert_eq!(kind_for_status(422), RemoteErrorKind::Rejected);
        assert_eq!(kind_for_status(500), RemoteErrorKind::Server);
    }

    #[test]
    fn test_login_response_accepts_access_token_alias() {
        let parsed: LoginResponse =
            serde_json::from_str(r#"{"accessToken":"abc","user":{"email":"a@b.co"}}"#).unwrap();
        assert_eq!(parsed.token, "abc");
        assert_eq!(parsed.user.and_then(|u| u.email).as_deref(), Some("a@b.co"));
    }
}
