//! Session state: the token set and the stores that hold it.
//!
//! The session is an explicitly passed object rather than ambient global
//! state, so the request plumbing stays testable without a real persistent
//! store behind it. Stores are pure accessors: no validation and no expiry
//! tracking happens here - an expired access token is discovered reactively
//! when the backend answers 401.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};

use orbitcart_core::UserId;

/// The credentials held for an authenticated session.
///
/// Invariant: no stored `TokenSet` means the session is anonymous and
/// requests go out without an `Authorization` header.
#[derive(Clone)]
pub struct TokenSet {
    /// Short-lived bearer token attached to API requests.
    pub access_token: String,
    /// Long-lived token exchanged for a new access token on 401.
    pub refresh_token: SecretString,
    /// Server-assigned session identifier.
    pub session_id: String,
}

impl TokenSet {
    /// Create a token set from the raw credential strings.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: SecretString::from(refresh_token.into()),
            session_id: session_id.into(),
        }
    }

    /// Expose the refresh token for the refresh request body.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &self.access_token)
            .field("refresh_token", &"[REDACTED]")
            .field("session_id", &self.session_id)
            .finish()
    }
}

/// Storage for session credentials and the logged-in user id.
///
/// Implementations are plain get/set/clear accessors. The client never
/// inspects tokens beyond attaching them to requests.
pub trait SessionStore: Send + Sync {
    /// The current token set, if authenticated.
    fn load(&self) -> Option<TokenSet>;

    /// Replace the stored token set (login, refresh).
    fn store(&self, tokens: TokenSet);

    /// Drop all session state (logout, refresh failure).
    fn clear(&self);

    /// The logged-in user's id, when known.
    fn user_id(&self) -> Option<UserId>;

    /// Record or forget the logged-in user's id.
    fn set_user_id(&self, user_id: Option<UserId>);
}

#[derive(Default)]
struct SessionState {
    tokens: Option<TokenSet>,
    user_id: Option<UserId>,
}

/// In-process session store.
///
/// Suitable for tests and for applications that do not persist sessions
/// across restarts.
#[derive(Default)]
pub struct MemorySession {
    state: RwLock<SessionState>,
}

impl MemorySession {
    /// Create an empty (anonymous) session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn load(&self) -> Option<TokenSet> {
        self.state.read().ok()?.tokens.clone()
    }

    fn store(&self, tokens: TokenSet) {
        if let Ok(mut state) = self.state.write() {
            state.tokens = Some(tokens);
        }
    }

    fn clear(&self) {
        if let Ok(mut state) = self.state.write() {
            state.tokens = None;
            state.user_id = None;
        }
    }

    fn user_id(&self) -> Option<UserId> {
        self.state.read().ok()?.user_id
    }

    fn set_user_id(&self, user_id: Option<UserId>) {
        if let Ok(mut state) = self.state.write() {
            state.user_id = user_id;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_session_roundtrip() {
        let session = MemorySession::new();
        assert!(session.load().is_none());

        session.store(TokenSet::new("access", "refresh", "sess-1"));
        let tokens = session.load().unwrap();
        assert_eq!(tokens.access_token, "access");
        assert_eq!(tokens.refresh_token(), "refresh");
        assert_eq!(tokens.session_id, "sess-1");
    }

    #[test]
    fn test_clear_drops_tokens_and_user() {
        let session = MemorySession::new();
        session.store(TokenSet::new("a", "r", "s"));
        session.set_user_id(Some(UserId::new(7)));

        session.clear();

        assert!(session.load().is_none());
        assert!(session.user_id().is_none());
    }

    #[test]
    fn test_debug_redacts_refresh_token() {
        let tokens = TokenSet::new("access", "very-secret-refresh", "sess");
        let debug_output = format!("{tokens:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("very-secret-refresh"));
    }
}
