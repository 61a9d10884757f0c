//! Credential store — access/refresh tokens and the signed-in user.
//!
//! DESIGN
//! ======
//! `SessionStore` is the only owner of session credentials. Login writes the
//! whole session, token refresh writes tokens only, logout (or a failed
//! refresh) clears everything. Reads are synchronous snapshots so the client
//! can decorate a request without awaiting.
//!
//! Mutations are announced on a broadcast channel so a front end can route
//! to the sign-in screen after a forced logout.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 16;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Staff,
    Admin,
    #[serde(other)]
    Unknown,
}

/// The signed-in user as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserProfile {
    #[must_use]
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Staff | Role::Admin)
    }
}

/// Point-in-time copy of the session credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    TokensRefreshed,
    /// Logout or forced logout after a failed refresh.
    Cleared,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session file io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// STORE
// =============================================================================

/// Shared handle to the session credentials. Clones share state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.snapshot();
        f.debug_struct("SessionStore")
            .field("authenticated", &session.is_authenticated())
            .field("user", &session.user.as_ref().map(|u| u.id.as_str()))
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_session(Session::default())
    }

    #[must_use]
    pub fn with_session(session: Session) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { inner: Arc::new(RwLock::new(session)), events }
    }

    /// Subscribe to session mutations.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Copy of the current credentials.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access_token
            .clone()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .refresh_token
            .clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).is_authenticated()
    }

    /// Replace the whole session after a successful login.
    pub fn set_session(&self, access_token: String, refresh_token: Option<String>, user: Option<UserProfile>) {
        {
            let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            *session = Session { access_token: Some(access_token), refresh_token, user };
        }
        self.emit(SessionEvent::SignedIn);
    }

    /// Store tokens minted by a refresh. A missing refresh token keeps the old one.
    pub fn update_tokens(&self, access_token: String, refresh_token: Option<String>) {
        {
            let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            session.access_token = Some(access_token);
            if refresh_token.is_some() {
                session.refresh_token = refresh_token;
            }
        }
        self.emit(SessionEvent::TokensRefreshed);
    }

    /// Record a refresh token the server handed out only as a cookie.
    pub fn set_refresh_token(&self, refresh_token: String) {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).refresh_token = Some(refresh_token);
    }

    /// Replace the stored user profile. Tokens are untouched.
    pub fn set_user(&self, user: UserProfile) {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).user = Some(user);
    }

    /// Drop every credential. Emits [`SessionEvent::Cleared`] only if
    /// something was actually cleared.
    pub fn clear_auth(&self) {
        let was_empty = {
            let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            let was_empty = session.is_empty();
            *session = Session::default();
            was_empty
        };
        if !was_empty {
            self.emit(SessionEvent::Cleared);
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Load a session saved by [`SessionStore::save_to`]. A missing file
    /// yields an empty session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, SessionError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let session: Session = serde_json::from_str(&raw)?;
                Ok(Self::with_session(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the current session as JSON. An empty session removes the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or removed.
    pub fn save_to(&self, path: &Path) -> Result<(), SessionError> {
        let session = self.snapshot();
        if session.is_empty() {
            return match std::fs::remove_file(path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&session)?)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
