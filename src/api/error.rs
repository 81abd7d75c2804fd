//! Errors reported by remote collaborators

use thiserror::Error;

/// Fallback shown when the server gave no usable message
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Broad category of a remote failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Connection refused, DNS failure, TLS error, ...
    Network,
    /// No response within the configured deadline
    Timeout,
    /// Credentials rejected or session missing/expired
    Unauthorized,
    /// The server understood the request and refused it (4xx)
    Rejected,
    /// Server-side failure (5xx) or an unreadable response
    Server,
    /// The dispatching task ended without delivering a result
    Interrupted,
}

impl RemoteErrorKind {
    fn fallback_message(self) -> &'static str {
        match self {
            Self::Network => "Could not reach the server. Check your connection and try again.",
            Self::Timeout => "The server took too long to respond. Please try again.",
            Self::Unauthorized => "Your session is not authorized. Please sign in again.",
            Self::Interrupted => "The request was interrupted. Please try again.",
            Self::Rejected | Self::Server => GENERIC_FAILURE,
        }
    }
}

/// Failure of a call to a remote collaborator.
///
/// Keeps whatever the server told us (`message`, `code`, `status`) so the UI
/// can react to specific failures instead of a single generic string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.user_message())]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: Option<String>,
    pub code: Option<String>,
    pub status: Option<u16>,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind) -> Self {
        Self {
            kind,
            message: None,
            code: None,
            status: None,
        }
    }

    /// A rejection carrying a human-readable message from the collaborator
    #[allow(dead_code)]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Rejected).with_message(message)
    }

    pub fn network(detail: impl Into<String>) -> Self {
        // Transport details are for the log, not for the user
        tracing::debug!(detail = %detail.into(), "network failure");
        Self::new(RemoteErrorKind::Network)
    }

    pub fn timeout() -> Self {
        Self::new(RemoteErrorKind::Timeout).with_code("timeout")
    }

    pub fn interrupted() -> Self {
        Self::new(RemoteErrorKind::Interrupted)
    }

    pub fn unauthorized() -> Self {
        Self::new(RemoteErrorKind::Unauthorized)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.trim().is_empty() {
            self.message = Some(message);
        }
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Text suitable for an error notification
    pub fn user_message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.fallback_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = RemoteError::rejected("duplicate policy");
        assert_eq!(err.user_message(), "duplicate policy");
        assert_eq!(err.to_string(), "duplicate policy");
    }

    #[test]
    fn test_user_message_falls_back_per_kind() {
        assert_eq!(
            RemoteError::new(RemoteErrorKind::Server).user_message(),
            GENERIC_FAILURE
        );
        assert!(RemoteError::timeout().user_message().contains("too long"));
        assert!(RemoteError::network("refused")
            .user_message()
            .contains("Could not reach"));
    }

    #[test]
    fn test_blank_message_is_ignored() {
        let err = RemoteError::new(RemoteErrorKind::Rejected).with_message("   ");
        assert!(err.message.is_none());
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_code_and_status_are_preserved() {
        let err = RemoteError::rejected("exists")
            .with_code("POLICY_EXISTS")
            .with_status(409);
        assert_eq!(err.code.as_deref(), Some("POLICY_EXISTS"));
        assert_eq!(err.status, Some(409));
    }

    #[test]
    fn test_timeout_has_code() {
        let err = RemoteError::timeout();
        assert_eq!(err.kind, RemoteErrorKind::Timeout);
        assert_eq!(err.code.as_deref(), Some("timeout"));
    }
}
