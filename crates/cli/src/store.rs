//! On-disk state: the persisted session and the local cart.
//!
//! The CLI's analogue of the browser's persistent store. Session state
//! lives in `session.json` (keys `access_token`, `refresh_token`,
//! `session_id`, `user_id`) and the anonymous cart in `cart.json`, both
//! under a state directory resolved from `ORBITCART_STATE_DIR` (default
//! `~/.orbitcart`).

use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::warn;

use orbitcart_client::models::LocalCartItem;
use orbitcart_client::session::{SessionStore, TokenSet};
use orbitcart_core::UserId;

use crate::CliError;

/// Resolve the state directory.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ORBITCART_STATE_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".orbitcart")
}

/// JSON shape of the persisted session file.
///
/// Tokens are stored as plain strings on disk; the file lives in the user's
/// own state directory, like a browser profile would.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    access_token: Option<String>,
    refresh_token: Option<String>,
    session_id: Option<String>,
    user_id: Option<UserId>,
}

impl StoredSession {
    fn tokens(&self) -> Option<TokenSet> {
        Some(TokenSet::new(
            self.access_token.clone()?,
            self.refresh_token.clone()?,
            self.session_id.clone()?,
        ))
    }
}

/// File-backed session store.
///
/// Every accessor reads or rewrites the file; there is no in-process cache,
/// so concurrent CLI invocations observe each other's logins and logouts.
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    /// Create a session store rooted at the given state directory.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("session.json"),
        }
    }

    fn read(&self) -> StoredSession {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return StoredSession::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "session file unreadable, treating as anonymous");
            StoredSession::default()
        })
    }

    fn write(&self, session: &StoredSession) {
        if let Some(parent) = self.path.parent()
            && let Err(err) = fs::create_dir_all(parent)
        {
            warn!(error = %err, "could not create state directory");
            return;
        }
        match serde_json::to_string_pretty(session) {
            Ok(raw) => {
                if let Err(err) = fs::write(&self.path, raw) {
                    warn!(path = %self.path.display(), error = %err, "could not persist session");
                }
            }
            Err(err) => warn!(error = %err, "could not serialize session"),
        }
    }
}

impl SessionStore for FileSession {
    fn load(&self) -> Option<TokenSet> {
        self.read().tokens()
    }

    fn store(&self, tokens: TokenSet) {
        let mut session = self.read();
        session.access_token = Some(tokens.access_token.clone());
        session.refresh_token = Some(tokens.refresh_token.expose_secret().to_string());
        session.session_id = Some(tokens.session_id);
        self.write(&session);
    }

    fn clear(&self) {
        self.write(&StoredSession::default());
    }

    fn user_id(&self) -> Option<UserId> {
        self.read().user_id
    }

    fn set_user_id(&self, user_id: Option<UserId>) {
        let mut session = self.read();
        session.user_id = user_id;
        self.write(&session);
    }
}

/// File-backed local cart.
pub struct LocalCartFile {
    path: PathBuf,
}

impl LocalCartFile {
    /// Create a cart file handle rooted at the given state directory.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("cart.json"),
        }
    }

    /// Load the local cart; a missing or unreadable file is an empty cart.
    #[must_use]
    pub fn load(&self) -> Vec<LocalCartItem> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "cart file unreadable, starting empty");
            Vec::new()
        })
    }

    /// Persist the local cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, items: &[LocalCartItem]) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(items)?)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_session_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let session = FileSession::new(dir.path());

        assert!(session.load().is_none());

        session.store(TokenSet::new("access", "refresh", "sess-1"));
        session.set_user_id(Some(UserId::new(4)));

        let tokens = session.load().unwrap();
        assert_eq!(tokens.access_token, "access");
        assert_eq!(tokens.refresh_token(), "refresh");
        assert_eq!(session.user_id(), Some(UserId::new(4)));
    }

    #[test]
    fn test_file_session_clear_removes_all_keys() {
        let dir = tempfile::tempdir().unwrap();
        let session = FileSession::new(dir.path());
        session.store(TokenSet::new("a", "r", "s"));
        session.set_user_id(Some(UserId::new(1)));

        session.clear();

        assert!(session.load().is_none());
        assert!(session.user_id().is_none());
        // The file itself survives with nulled keys.
        let raw = fs::read_to_string(dir.path().join("session.json")).unwrap();
        assert!(raw.contains("access_token"));
        assert!(!raw.contains("\"a\""));
    }

    #[test]
    fn test_local_cart_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cart = LocalCartFile::new(dir.path());

        assert!(cart.load().is_empty());

        cart.save(&[LocalCartItem::new("1", 2)]).unwrap();
        assert_eq!(cart.load(), vec![LocalCartItem::new("1", 2)]);
    }

    #[test]
    fn test_corrupt_cart_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cart.json"), "{not json").unwrap();

        let cart = LocalCartFile::new(dir.path());
        assert!(cart.load().is_empty());
    }
}
