//! Error taxonomy for the portal client.
//!
//! Every failure a view can see falls in one of three families:
//! transport (`Network`), a non-2xx answer from the backend (`Api`), or
//! input the client refused to send (`Validation`). The remaining variants
//! cover local plumbing (credential storage, session state, locks).

use crate::credentials::CredentialError;

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("API returned {status}{}", message_suffix(.message))]
    Api { status: u16, message: Option<String> },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("Credential storage error: {0}")]
    Storage(#[from] CredentialError),

    #[error("No active session")]
    NoSession,

    #[error("Internal lock poisoned")]
    LockPoisoned,
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl PortalError {
    /// Server-supplied message if the backend sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            PortalError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text to show the user: the server message, or `fallback`.
    /// Validation failures carry their own user-facing text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            PortalError::Validation(msg) => msg.clone(),
            other => other
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }

    /// The backend rejected our bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PortalError::Api { status: 401, .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PortalError::Validation(_))
    }
}
