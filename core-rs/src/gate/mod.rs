//! Access Gate module
//!
//! Decides whether a protected screen renders or redirects, based on
//! session presence and an optional required role.

pub mod access_gate;

pub use access_gate::{decide, AccessGate, DenyReason, GateDecision, GateRoutes};
