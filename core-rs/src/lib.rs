//! # qrmenu-core - QR Menu Access-Control Core
//!
//! Access-control core for the QR digital-menu product: the library
//! that decides whether a client may view a protected admin screen.
//! Menu CRUD, QR rendering, and the UI itself live elsewhere; this
//! crate owns sessions, role resolution, and the route gate.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │ Session Provider │     │    Role Store    │
//! │ (auth service)   │     │ (hosted rows)    │
//! └────────┬─────────┘     └────────┬─────────┘
//!          │ change events          │ fetch by user
//!          ▼                        ▼
//!    ┌─────────────────────────────────┐
//!    │          Role Resolver          │
//!    │  cached role set, generations   │
//!    └───────────────┬─────────────────┘
//!                    ▼
//!            ┌──────────────┐
//!            │  Access Gate │──▶ Checking | Granted | Denied(route)
//!            └──────────────┘
//! ```
//!
//! ## Key behaviors
//!
//! - Fail closed: unresolved or failed role checks never grant access
//! - Generation-token discipline discards stale in-flight fetches
//! - The gate never navigates; Denied decisions carry the fallback route

pub mod errors;
pub mod session;
pub mod roles;
pub mod gate;
pub mod config;

pub use errors::QrMenuError;
pub use session::{AuthChange, AuthEvent, LocalSessionProvider, Session, SessionProvider, UserId};
pub use roles::{
    assign_default_role, initialize_user_roles, HostedRoleStore, MemoryRoleStore, Role,
    RoleAssignment, RoleResolver, RoleSnapshot, RoleStore,
};
pub use gate::{decide, AccessGate, DenyReason, GateDecision, GateRoutes};
pub use config::{GateConfig, ServiceConfig};

/// Crate version
pub const VERSION: &str = "0.4.2";
