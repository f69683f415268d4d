//! Session context.
//!
//! A [`Session`] is a snapshot of what the store holds after login: the token
//! pair, the user object and the display identity. It is loaded once and
//! passed explicitly to whatever needs it; nothing reads the store behind the
//! caller's back. There is no expiry or refresh handling.

pub mod store;

use std::path::PathBuf;

use serde_json::Value;

pub use store::{FileStore, MemoryStore, SessionStore};

use crate::config::schema::{SessionConfig, expand_tilde};

pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";
pub const USER: &str = "user";
pub const USERNAME: &str = "username";
pub const ROLE: &str = "role";

/// Shown when no username was ever stored.
pub const UNKNOWN_USER: &str = "Unknown User";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<Value>,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl Session {
    /// Read the session keys out of a store. A user entry that is not valid
    /// JSON is treated as absent.
    pub fn load(store: &dyn SessionStore) -> Self {
        Self {
            access_token: store.get(ACCESS_TOKEN),
            refresh_token: store.get(REFRESH_TOKEN),
            user: store
                .get(USER)
                .and_then(|raw| serde_json::from_str(&raw).ok()),
            username: store.get(USERNAME),
            role: store.get(ROLE),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Username for display and for tagging uploads.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(UNKNOWN_USER)
    }

    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("admin"))
    }
}

/// Resolve the session file location from config.
pub fn session_path(config: &SessionConfig) -> Option<PathBuf> {
    expand_tilde(&config.path)
}

/// Open the configured file store, or an empty in-memory fallback when no
/// home directory can be found.
pub fn open_store(config: &SessionConfig) -> Box<dyn SessionStore> {
    match session_path(config) {
        Some(path) => Box::new(FileStore::open(path)),
        None => Box::new(MemoryStore::new()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
