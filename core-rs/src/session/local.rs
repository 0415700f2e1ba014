//! In-process session provider
//!
//! Backs the CLI and tests. Sign-in issues a session with a random id;
//! sign-out and external invalidation clear it and broadcast the change
//! to every subscriber.

use crate::errors::Result;
use crate::session::provider::{AuthChange, AuthEvent, Session, SessionProvider, UserId};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::sync::Mutex;
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

fn gen_session_id() -> String {
    let mut rng = rand::thread_rng();
    format!("{:032x}", rng.gen::<u128>())
}

/// Process-local SessionProvider.
pub struct LocalSessionProvider {
    current: Mutex<Option<Session>>,
    changes: broadcast::Sender<AuthChange>,
}

impl LocalSessionProvider {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        LocalSessionProvider {
            current: Mutex::new(None),
            changes,
        }
    }

    /// Issue a session for `user_id` and broadcast SignedIn.
    ///
    /// Replaces any existing session (last sign-in wins).
    pub fn sign_in(&self, user_id: UserId) -> Session {
        let session = Session {
            id: gen_session_id(),
            user_id,
            issued_at: Utc::now(),
            expires_at: None,
        };

        {
            let mut current = self.current.lock().expect("session lock poisoned");
            *current = Some(session.clone());
        }

        eprintln!(
            "[SessionProvider] Signed in: user={} sid={}",
            session.user_id, session.id
        );

        self.broadcast(AuthEvent::SignedIn, Some(session.clone()));
        session
    }

    /// External invalidation (expiry, revocation by the backing service).
    ///
    /// Observably identical to sign-out for consumers: the session is
    /// gone and a change with no session is broadcast.
    pub fn invalidate(&self) {
        let had_session = {
            let mut current = self.current.lock().expect("session lock poisoned");
            current.take().is_some()
        };

        if had_session {
            eprintln!("[SessionProvider] Session invalidated externally");
        }
        self.broadcast(AuthEvent::SignedOut, None);
    }

    /// Announce a token refresh for the current session, if any.
    pub fn refresh_token(&self) {
        let session = self
            .current
            .lock()
            .expect("session lock poisoned")
            .clone();
        if session.is_some() {
            self.broadcast(AuthEvent::TokenRefreshed, session);
        }
    }

    fn broadcast(&self, event: AuthEvent, session: Option<Session>) {
        // Send fails only when no subscriber is registered, which is fine
        let _ = self.changes.send(AuthChange { event, session });
    }
}

impl Default for LocalSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.current.lock().expect("session lock poisoned").clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }

    async fn sign_out(&self) -> Result<()> {
        let signed_out = {
            let mut current = self.current.lock().expect("session lock poisoned");
            current.take()
        };

        if let Some(session) = signed_out {
            eprintln!(
                "[SessionProvider] Signed out: user={} sid={}",
                session.user_id, session.id
            );
        }

        self.broadcast(AuthEvent::SignedOut, None);
        Ok(())
    }
}
