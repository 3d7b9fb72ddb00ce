//! HTTP transport with bearer auth and single-flight token refresh.
//!
//! Every outgoing request gets `Authorization: Bearer <access_token>` when
//! the session holds a token set. A 401 response triggers a token refresh
//! and a single retry of the original request.
//!
//! # Refresh coordination
//!
//! At most one refresh call is in flight at a time. Refreshers serialize on
//! a `tokio::sync::Mutex`; an atomic generation counter records completed
//! refresh attempts. A caller that 401s snapshots the generation before the
//! original send, and after acquiring the gate checks it again: if it moved,
//! another caller already refreshed (or failed and cleared the session)
//! while this one waited, and the outcome is reused without a second
//! refresh call. A hung refresh request blocks waiters until the transport
//! timeout fires; there is no cancellation beyond that.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::{SessionStore, TokenSet};

/// Client for the Orbitcart storefront API.
///
/// Cheap to clone; all clones share the underlying connection pool, session
/// store, and refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
    /// Serializes refresh attempts; waiters queue here during a refresh.
    refresh_gate: Mutex<()>,
    /// Bumped after every completed refresh attempt, success or failure.
    refresh_generation: AtomicU64,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    /// Present when the backend rotates refresh tokens.
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(config: ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()?;

        let mut base_url = config.api_url;
        // Url::join treats the last path segment as a file unless the base
        // ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                session,
                refresh_gate: Mutex::new(()),
                refresh_generation: AtomicU64::new(0),
            }),
        })
    }

    /// The session store this client authenticates from.
    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.inner.session
    }

    /// The resolved API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Typed request helpers
    // ─────────────────────────────────────────────────────────────────────

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_json_with_query(path, &[]).await
    }

    pub(crate) async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, query, None).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let response = self.request(Method::POST, path, &[], Some(body)).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let response = self.request(Method::PUT, path, &[], Some(body)).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn post_no_content(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<(), ApiError> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, &[], Some(body)).await?;
        Ok(())
    }

    pub(crate) async fn delete_no_content(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Interceptor core
    // ─────────────────────────────────────────────────────────────────────

    /// Send a request, refreshing the session and retrying once on 401.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint(path)?;

        // Snapshot before sending so a refresh that completes between our
        // 401 and our turn at the gate is detectable.
        let observed = self.inner.refresh_generation.load(Ordering::Acquire);
        let token = self.inner.session.load().map(|t| t.access_token);

        let response = self
            .send_once(&method, &url, query, body.as_ref(), token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED || token.is_none() {
            return Self::check_status(response).await;
        }

        // Authenticated request bounced: refresh and retry exactly once.
        debug!(%url, "request returned 401, refreshing session");
        let fresh_token = self.refresh_access_token(observed).await?;
        let response = self
            .send_once(&method, &url, query, body.as_ref(), Some(&fresh_token))
            .await?;
        Self::check_status(response).await
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        query: &[(&str, String)],
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.inner.http.request(method.clone(), url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = Self::error_message(response).await;
        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized(message)),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
            _ => Err(ApiError::Server {
                status: status.as_u16(),
                message,
            }),
        }
    }

    /// Pull a human-readable message out of an error response body.
    async fn error_message(response: reqwest::Response) -> String {
        let text = response.text().await.unwrap_or_default();
        serde_json::from_str::<ErrorBody>(&text).map_or(text, |body| body.message)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Single-flight refresh
    // ─────────────────────────────────────────────────────────────────────

    /// Obtain a usable access token after a 401, refreshing at most once.
    ///
    /// `observed` is the refresh generation snapshotted before the original
    /// send. If the generation advanced while this caller waited for the
    /// gate, another caller's refresh already resolved and its stored
    /// outcome is reused.
    async fn refresh_access_token(&self, observed: u64) -> Result<String, ApiError> {
        let _gate = self.inner.refresh_gate.lock().await;

        if self.inner.refresh_generation.load(Ordering::Acquire) != observed {
            return self.inner.session.load().map_or_else(
                // The refresh we waited on failed and cleared the session.
                || Err(ApiError::Unauthorized("session expired".to_string())),
                |tokens| Ok(tokens.access_token),
            );
        }

        let Some(tokens) = self.inner.session.load() else {
            return Err(ApiError::Unauthorized("not logged in".to_string()));
        };

        // Update the session before bumping the generation, so a caller that
        // observes the new generation always sees the new session state.
        let outcome = match self.call_refresh_endpoint(&tokens).await {
            Ok(refreshed) => {
                let access_token = refreshed.access_token.clone();
                self.inner.session.store(refreshed);
                debug!("session refreshed");
                Ok(access_token)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.inner.session.clear();
                Err(ApiError::Unauthorized(
                    "session expired, please log in again".to_string(),
                ))
            }
        };
        self.inner.refresh_generation.fetch_add(1, Ordering::Release);
        outcome
    }

    /// Call `POST /auth/refresh` with the stored refresh token.
    async fn call_refresh_endpoint(&self, tokens: &TokenSet) -> Result<TokenSet, ApiError> {
        let url = self.endpoint("auth/refresh")?;
        let body = serde_json::json!({ "refresh_token": tokens.refresh_token() });

        let response = self.inner.http.post(url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = Self::error_message(response).await;
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let refreshed: RefreshResponse = response.json().await?;
        Ok(match refreshed.refresh_token {
            Some(rotated) => TokenSet::new(refreshed.access_token, rotated, &tokens.session_id),
            // Backend did not rotate: keep the old refresh token.
            None => TokenSet {
                access_token: refreshed.access_token,
                refresh_token: tokens.refresh_token.clone(),
                session_id: tokens.session_id.clone(),
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::MemorySession;

    fn test_client() -> ApiClient {
        let config = ClientConfig::new("http://localhost:9/api".parse().unwrap());
        ApiClient::new(config, Arc::new(MemorySession::new())).unwrap()
    }

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let client = test_client();
        assert_eq!(client.base_url().as_str(), "http://localhost:9/api/");
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let client = test_client();
        let url = client.endpoint("/auth/login").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9/api/auth/login");
    }
}
