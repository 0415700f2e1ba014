//! Role Store seam and the in-process store
//!
//! The store is the persisted mapping from user identity to role
//! grants. Reads are used by the resolver; inserts/deletes only by
//! administrative flows (never by the gate itself).

use crate::errors::{QrMenuError, Result};
use crate::roles::{Role, RoleAssignment};
use crate::session::UserId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Role Store seam.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// All role grants for one user. A user may hold zero, one, or
    /// duplicate grants; callers collapse to presence/absence.
    async fn roles_for_user(&self, user: &UserId) -> Result<Vec<RoleAssignment>>;

    /// Insert a (user, role) grant. Administrative flows only.
    async fn assign_role(&self, user: &UserId, role: Role) -> Result<RoleAssignment>;

    /// Delete every (user, role) grant matching the pair.
    async fn remove_role(&self, user: &UserId, role: Role) -> Result<()>;
}

/// In-process RoleStore for tests and dry runs.
///
/// `set_failing(true)` makes every call return a store error, to
/// exercise the fail-closed paths.
pub struct MemoryRoleStore {
    assignments: Mutex<Vec<RoleAssignment>>,
    failing: AtomicBool,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        MemoryRoleStore {
            assignments: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Toggle simulated service failure.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(QrMenuError::Store(
                "role store unavailable (simulated)".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryRoleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn roles_for_user(&self, user: &UserId) -> Result<Vec<RoleAssignment>> {
        self.check_available()?;
        let assignments = self.assignments.lock().expect("store lock poisoned");
        Ok(assignments
            .iter()
            .filter(|a| &a.user_id == user)
            .cloned()
            .collect())
    }

    async fn assign_role(&self, user: &UserId, role: Role) -> Result<RoleAssignment> {
        self.check_available()?;
        let assignment = RoleAssignment::new(user.clone(), role);
        self.assignments
            .lock()
            .expect("store lock poisoned")
            .push(assignment.clone());
        Ok(assignment)
    }

    async fn remove_role(&self, user: &UserId, role: Role) -> Result<()> {
        self.check_available()?;
        self.assignments
            .lock()
            .expect("store lock poisoned")
            .retain(|a| !(&a.user_id == user && a.role == role));
        Ok(())
    }
}

/// Grant the default `user` role.
///
/// Called after registration by administrative flows.
pub async fn assign_default_role(store: &dyn RoleStore, user: &UserId) -> Result<RoleAssignment> {
    store.assign_role(user, Role::User).await
}

/// Grant the default role only if the user holds no role at all.
///
/// # Returns
/// true if a default role was assigned, false if the user already had one
pub async fn initialize_user_roles(store: &dyn RoleStore, user: &UserId) -> Result<bool> {
    let existing = store.roles_for_user(user).await?;
    if !existing.is_empty() {
        return Ok(false);
    }

    assign_default_role(store, user).await?;
    eprintln!("[RoleStore] Assigned default role to user {}", user);
    Ok(true)
}
