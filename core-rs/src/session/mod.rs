//! Session module
//!
//! Models the authenticated session and the Session Provider seam.
//! The provider is an explicit dependency handed to the resolver and
//! the gate; subscription is an observer registration the caller owns.

pub mod provider;
pub mod local;

pub use provider::{AuthChange, AuthEvent, Session, SessionProvider, UserId};
pub use local::LocalSessionProvider;
