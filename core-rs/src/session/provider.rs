//! Session Provider trait and session models
//!
//! A session represents "a user is currently authenticated in this
//! client". Providers own the expiry/refresh lifecycle; consumers only
//! observe presence/absence and change notifications.

use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Opaque user identity issued by the session provider.
///
/// Stable for the lifetime of an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// An authenticated session for one browser/CLI client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Provider-issued session id
    pub id: String,
    /// Identity of the signed-in user
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
    /// Expiry is managed by the provider; None means "until revoked"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Kind of change the provider is announcing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Broadcast payload for session-change notifications.
///
/// `session` is None when the change left the client unauthenticated
/// (explicit sign-out or external invalidation).
#[derive(Debug, Clone)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

impl AuthChange {
    /// True when the change left no usable session behind.
    pub fn is_signed_out(&self) -> bool {
        self.session.is_none()
    }
}

/// Session Provider seam.
///
/// Implementations issue and invalidate sessions and announce every
/// change on a process-wide broadcast channel. Multiple subscribers may
/// listen independently; each receives every change.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current session, if any. Errors mean "could not verify" and are
    /// collapsed to "no session" by callers (fail closed).
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Register for session-change notifications.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;

    /// Destroy the current session and broadcast the sign-out.
    async fn sign_out(&self) -> Result<()>;
}
