//! Roles module
//!
//! Role labels, role assignments, the Role Store seam, and the
//! Role Resolver that caches the active user's resolved role set.

pub mod store;
pub mod hosted;
pub mod resolver;

pub use store::{assign_default_role, initialize_user_roles, MemoryRoleStore, RoleStore};
pub use hosted::HostedRoleStore;
pub use resolver::{RoleResolver, RoleSnapshot};

use crate::errors::QrMenuError;
use crate::session::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Role label attached to a user identity.
///
/// Closed set: the product uses exactly these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = QrMenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(QrMenuError::InvalidRole(other.to_string())),
        }
    }
}

/// One role grant for one user.
///
/// No uniqueness is enforced on (user, role): the same role may be
/// assigned twice. Membership queries collapse the multiset to
/// presence/absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: Uuid,
    pub user_id: UserId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl RoleAssignment {
    pub fn new(user_id: UserId, role: Role) -> Self {
        RoleAssignment {
            id: Uuid::new_v4(),
            user_id,
            role,
            created_at: Utc::now(),
        }
    }
}
