//! Bearer-authenticated HTTP client for the portal backend.
//!
//! One `ApiClient` is shared (cheap `Clone`) by the session store and
//! every view. The token slot is the only shared mutable state: read
//! on every request, written by login, logout and session restore.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use zeroize::Zeroizing;

use crate::config::PortalConfig;
use crate::error::PortalError;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Arc<RwLock<Option<Zeroizing<String>>>>,
    timeout_secs: u64,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.has_token())
            .finish()
    }
}

impl ApiClient {
    /// Create a client for `base_url` (scheme + host, no `/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PortalError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            token: Arc::new(RwLock::new(None)),
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn from_config(config: &PortalConfig) -> Result<Self, PortalError> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Token slot ──────────────────────────────────────────

    /// Replace the bearer token. `None` stops sending the header.
    /// The previous token is zeroed when dropped.
    pub fn set_token(&self, token: Option<&str>) -> Result<(), PortalError> {
        let mut slot = self.token.write().map_err(|_| PortalError::LockPoisoned)?;
        *slot = token.map(|t| Zeroizing::new(t.to_string()));
        Ok(())
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    // ── Requests ────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, PortalError> {
        let builder = self.http.request(method, self.url(path));
        let slot = self.token.read().map_err(|_| PortalError::LockPoisoned)?;
        Ok(match slot.as_deref() {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        })
    }

    pub async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, PortalError> {
        let req = self.request(Method::GET, path)?.query(query);
        self.execute(req).await.map(|(_, body)| body)
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, PortalError> {
        self.post_json_with_status(path, body).await.map(|(_, body)| body)
    }

    /// POST and also hand back the exact 2xx status code.
    pub async fn post_json_with_status<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(u16, Value), PortalError> {
        let req = self.request(Method::POST, path)?.json(body);
        self.execute(req).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, PortalError> {
        let req = self.request(Method::PUT, path)?.json(body);
        self.execute(req).await.map(|(_, body)| body)
    }

    pub async fn delete(&self, path: &str) -> Result<Value, PortalError> {
        let req = self.request(Method::DELETE, path)?;
        self.execute(req).await.map(|(_, body)| body)
    }

    async fn execute(&self, req: RequestBuilder) -> Result<(u16, Value), PortalError> {
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                PortalError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                PortalError::Network(format!("Cannot reach {}", self.base_url))
            } else {
                PortalError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PortalError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string));
            tracing::debug!(status = status.as_u16(), ?message, "API request rejected");
            return Err(PortalError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok((status.as_u16(), Value::Null));
        }
        let body = serde_json::from_str(&text).map_err(|e| PortalError::Decode(e.to_string()))?;
        Ok((status.as_u16(), body))
    }
}

/// Pull one field out of a response envelope such as `{"patient": {...}}`.
pub fn take_field<T: DeserializeOwned>(mut body: Value, field: &str) -> Result<T, PortalError> {
    let inner = body
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| PortalError::Decode(format!("missing `{field}` in response")))?;
    serde_json::from_value(inner).map_err(|e| PortalError::Decode(format!("`{field}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBackend, TEST_TOKEN};

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/api/login"), "http://localhost:5000/api/login");
    }

    #[test]
    fn token_slot_round_trip() {
        let client = ApiClient::new("http://localhost:5000", Duration::from_secs(5)).unwrap();
        assert!(!client.has_token());
        client.set_token(Some("abc")).unwrap();
        assert!(client.has_token());

        let clone = client.clone();
        clone.set_token(None).unwrap();
        assert!(!client.has_token(), "Clones share the token slot");
    }

    #[test]
    fn debug_output_hides_token() {
        let client = ApiClient::new("http://localhost:5000", Duration::from_secs(5)).unwrap();
        client.set_token(Some("super-secret")).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("has_token: true"));
    }

    #[test]
    fn take_field_reports_missing_envelope() {
        let body = serde_json::json!({ "patients": [] });
        let err = take_field::<Vec<String>>(body, "patient").unwrap_err();
        assert!(matches!(err, PortalError::Decode(_)));
    }

    #[tokio::test]
    async fn bearer_header_is_attached_when_token_set() {
        let backend = MockBackend::start().await;
        backend.seed_patient("p1", "John", "Smith");
        let client = backend.client();
        client.set_token(Some(TEST_TOKEN)).unwrap();

        client.get_json("/api/patients/p1", &[]).await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some(format!("Bearer {TEST_TOKEN}").as_str())
        );
    }

    #[tokio::test]
    async fn missing_token_yields_401_with_server_message() {
        let backend = MockBackend::start().await;
        let client = backend.client();

        let err = client.get_json("/api/patients/p1", &[]).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.server_message(), Some("Unauthorized"));
        assert!(backend.requests()[0].authorization.is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        // Bind then drop a listener so the port is free but closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        let err = client.get_json("/api/patients/p1", &[]).await.unwrap_err();
        assert!(matches!(err, PortalError::Network(_) | PortalError::Timeout(_)));
    }
}
