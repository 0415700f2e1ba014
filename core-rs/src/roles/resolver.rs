//! Role Resolver
//!
//! Answers "what roles does the active user have?" with a synchronous,
//! locally-cached view refreshed by asynchronous fetches. The cache is
//! owned exclusively by the resolver; all mutation goes through
//! `refresh` / `handle_auth_change`.
//!
//! Overlapping fetches are disciplined by a monotonically increasing
//! generation token: a completion is applied only if its generation is
//! still the latest, so a result computed for a superseded session can
//! never corrupt the cache. Results arriving after teardown fail the
//! same check and are discarded.

use crate::errors::{QrMenuError, Result};
use crate::roles::{Role, RoleAssignment, RoleStore};
use crate::session::{AuthChange, SessionProvider};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Synchronous cached view of the resolved role set.
#[derive(Debug, Clone, Default)]
pub struct RoleSnapshot {
    pub assignments: Vec<RoleAssignment>,
    /// True after the first successful resolution (or a sign-out, which
    /// resolves the set to known-empty)
    pub resolved: bool,
    /// True while a fetch is in flight
    pub loading: bool,
    /// Last fetch error, cleared by the next successful fetch
    pub error: Option<String>,
}

impl RoleSnapshot {
    /// Distinct role labels, multiset collapsed to presence.
    pub fn roles(&self) -> HashSet<Role> {
        self.assignments.iter().map(|a| a.role).collect()
    }

    /// Membership check. Fail-closed: false until the set has resolved.
    pub fn has_role(&self, role: Role) -> bool {
        self.resolved && self.assignments.iter().any(|a| a.role == role)
    }
}

/// Resolver for the active session's role set.
pub struct RoleResolver {
    provider: Arc<dyn SessionProvider>,
    store: Arc<dyn RoleStore>,
    state: Mutex<RoleSnapshot>,
    generation: AtomicU64,
}

impl RoleResolver {
    pub fn new(provider: Arc<dyn SessionProvider>, store: Arc<dyn RoleStore>) -> Self {
        RoleResolver {
            provider,
            store,
            state: Mutex::new(RoleSnapshot::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch all role grants for the current session's user.
    ///
    /// No active session is a normal state, not a failure: returns an
    /// empty list. Store failures surface as `RoleFetch`.
    pub async fn fetch_roles_for_current_session(&self) -> Result<Vec<RoleAssignment>> {
        let session = self.provider.current_session().await?;

        let Some(session) = session else {
            return Ok(Vec::new());
        };

        self.store
            .roles_for_user(&session.user_id)
            .await
            .map_err(|e| QrMenuError::RoleFetch(e.to_string()))
    }

    /// Start a fetch cycle: bumps the generation and marks the cache
    /// loading. The returned token must be passed to `apply_fetch`.
    ///
    /// Split out from `refresh` so callers that schedule their own
    /// tasks can keep the generation discipline.
    pub fn begin_fetch(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.lock().expect("resolver lock poisoned");
        state.loading = true;
        generation
    }

    /// Apply a completed fetch, unless a newer cycle has started.
    ///
    /// On success the cached set is replaced and the error flag
    /// cleared. On failure the cached set is left stale and the error
    /// flag is set, so callers keep prior role knowledge while the
    /// gate stays fail-closed.
    pub fn apply_fetch(&self, generation: u64, result: Result<Vec<RoleAssignment>>) {
        if self.generation.load(Ordering::SeqCst) != generation {
            eprintln!(
                "[RoleResolver] Discarding stale fetch result (generation {})",
                generation
            );
            return;
        }

        let mut state = self.state.lock().expect("resolver lock poisoned");
        state.loading = false;
        match result {
            Ok(assignments) => {
                state.assignments = assignments;
                state.resolved = true;
                state.error = None;
            }
            Err(e) => {
                eprintln!("[RoleResolver] Role fetch failed: {}", e);
                state.error = Some(e.to_string());
            }
        }
    }

    /// Re-resolve the role set for the current session.
    pub async fn refresh(&self) {
        let generation = self.begin_fetch();
        let result = self.fetch_roles_for_current_session().await;
        self.apply_fetch(generation, result);
    }

    /// Respond to a session change.
    ///
    /// A transition to "no session" clears the cached set immediately
    /// (and the generation bump cancels any in-flight fetch); any other
    /// change re-resolves against the store.
    pub async fn handle_auth_change(&self, change: &AuthChange) {
        if change.is_signed_out() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            let mut state = self.state.lock().expect("resolver lock poisoned");
            state.assignments.clear();
            state.resolved = true;
            state.loading = false;
            state.error = None;
        } else {
            self.refresh().await;
        }
    }

    /// Pure lookup against the last resolved set. False before the
    /// first successful fetch completes.
    pub fn has_role(&self, role: Role) -> bool {
        self.state
            .lock()
            .expect("resolver lock poisoned")
            .has_role(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Current cached view.
    pub fn snapshot(&self) -> RoleSnapshot {
        self.state.lock().expect("resolver lock poisoned").clone()
    }
}
