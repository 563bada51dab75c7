//! Signed-in identity and its persisted credentials.
//!
//! `SessionStore` is the one context object every dashboard reads. It is
//! built once by `restore()` from whatever credential pair was left on
//! disk, mutated only by `login()`, `logout()` and `handle_rejection()`,
//! and hands out the shared `ApiClient` whose token slot it manages.
//!
//! A restored session is trusted as-is; the first API call that comes
//! back 401 is what invalidates it.

use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::api::{ApiClient, LoginResponse};
use crate::credentials::{CredentialStore, TOKEN_KEY, USER_KEY};
use crate::error::PortalError;
use crate::models::{Doctor, Patient, Role, SessionIdentity};

/// Fallback shown when login fails without a server message.
pub const LOGIN_FAILED: &str = "Login failed";

/// Where to send the user once they have logged out.
pub trait Navigator: Send + Sync {
    fn redirect(&self, url: &str);
}

/// Result of a login attempt, as shown on the sign-in form.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success(LoginResponse),
    Failure { message: String },
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success(_))
    }
}

pub struct SessionStore {
    identity: RwLock<Option<SessionIdentity>>,
    client: ApiClient,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    public_entry_url: String,
}

impl SessionStore {
    /// Build the store from the persisted `{token, user}` pair.
    ///
    /// Both keys must be present and `user` must decode into a known
    /// role; anything else starts signed out. Storage errors are logged
    /// and also start signed out.
    pub fn restore(
        client: ApiClient,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        public_entry_url: impl Into<String>,
    ) -> Self {
        let identity = match read_persisted(credentials.as_ref()) {
            Ok(Some((token, identity))) => match client.set_token(Some(&token)) {
                Ok(()) => {
                    tracing::info!(role = %identity.role(), user_id = %identity.id(), "Session restored");
                    Some(identity)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not install restored token");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read persisted credentials");
                None
            }
        };

        Self {
            identity: RwLock::new(identity),
            client,
            credentials,
            navigator,
            public_entry_url: public_entry_url.into(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn identity(&self) -> Option<SessionIdentity> {
        self.identity.read().ok().and_then(|guard| guard.clone())
    }

    pub fn doctor(&self) -> Option<Doctor> {
        self.identity().and_then(|i| i.as_doctor().cloned())
    }

    pub fn patient(&self) -> Option<Patient> {
        self.identity().and_then(|i| i.as_patient().cloned())
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity().is_some()
    }

    // ── Login ───────────────────────────────────────────────

    /// `POST /api/login`. Only an exact 200 with a decodable body signs
    /// the user in; the previous identity (if any) is replaced.
    pub async fn login(&self, email: &str, password: &str, role: Role) -> LoginOutcome {
        let (status, body) = match self.client.login(email, password, role).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::info!(%role, error = %e, "Login rejected");
                return LoginOutcome::Failure {
                    message: e.user_message(LOGIN_FAILED),
                };
            }
        };

        if status != 200 {
            tracing::info!(%role, status, "Login answered with unexpected status");
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(LOGIN_FAILED);
            return LoginOutcome::Failure {
                message: message.to_string(),
            };
        }

        let response: LoginResponse = match serde_json::from_value(body) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%role, error = %e, "Login response could not be decoded");
                return failure();
            }
        };

        match self.establish(&response) {
            Ok(()) => {
                tracing::info!(role = %response.user.role(), user_id = %response.user.id(), "Signed in");
                LoginOutcome::Success(response)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not persist session");
                self.clear();
                failure()
            }
        }
    }

    fn establish(&self, response: &LoginResponse) -> Result<(), PortalError> {
        let user_json = serde_json::to_string(&response.user)
            .map_err(|e| PortalError::Decode(e.to_string()))?;
        self.credentials.set(TOKEN_KEY, &response.token)?;
        self.credentials.set(USER_KEY, &user_json)?;
        self.client.set_token(Some(&response.token))?;

        let mut identity = self.identity.write().map_err(|_| PortalError::LockPoisoned)?;
        *identity = Some(response.user.clone());
        Ok(())
    }

    // ── Logout / invalidation ───────────────────────────────

    /// Clear everything and redirect to the public entry point. Runs
    /// whether or not anyone is signed in.
    pub fn logout(&self) {
        self.clear();
        tracing::info!("Signed out");
        self.navigator.redirect(&self.public_entry_url);
    }

    /// Drop the session if `err` says the backend no longer accepts our
    /// token. Returns whether the session was cleared.
    pub fn handle_rejection(&self, err: &PortalError) -> bool {
        if !err.is_unauthorized() {
            return false;
        }
        tracing::warn!("Token rejected by backend, clearing session");
        self.clear();
        true
    }

    fn clear(&self) {
        match self.identity.write() {
            Ok(mut identity) => *identity = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
        if let Err(e) = self.client.set_token(None) {
            tracing::warn!(error = %e, "Could not clear in-memory token");
        }
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.credentials.remove(key) {
                tracing::warn!(key, error = %e, "Could not clear persisted credential");
            }
        }
    }
}

fn failure() -> LoginOutcome {
    LoginOutcome::Failure {
        message: LOGIN_FAILED.to_string(),
    }
}

fn read_persisted(
    store: &dyn CredentialStore,
) -> Result<Option<(String, SessionIdentity)>, PortalError> {
    let (Some(token), Some(user)) = (store.get(TOKEN_KEY)?, store.get(USER_KEY)?) else {
        return Ok(None);
    };
    match serde_json::from_str::<SessionIdentity>(&user) {
        Ok(identity) => Ok(Some((token, identity))),
        Err(e) => {
            tracing::warn!(error = %e, "Persisted user is unreadable, starting signed out");
            Ok(None)
        }
    }
}
