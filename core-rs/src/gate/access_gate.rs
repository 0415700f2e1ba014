//! Access Gate for protected screens
//!
//! The decision itself is a pure function of (session presence,
//! required role, role snapshot, routes); the gate wraps it with the
//! session check, role resolution, and the session-change loop. The
//! caller performs the actual navigation for Denied decisions.
//!
//! Failure policy: a session check that errors is treated as "no
//! session", and a role fetch that errors while a role is required is
//! Denied. Fail closed - a gate that fails open on error is a security
//! defect.

use crate::roles::{Role, RoleResolver, RoleSnapshot};
use crate::session::{AuthChange, Session, SessionProvider};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// Fallback route for "no session".
pub const DEFAULT_LOGIN_ROUTE: &str = "/admin/login";

/// Fallback route for "session exists but lacks the required role".
pub const DEFAULT_UNAUTHORIZED_ROUTE: &str = "/unauthorized";

/// The two fixed fallback routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRoutes {
    pub login_route: String,
    pub unauthorized_route: String,
}

impl Default for GateRoutes {
    fn default() -> Self {
        GateRoutes {
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            unauthorized_route: DEFAULT_UNAUTHORIZED_ROUTE.to_string(),
        }
    }
}

/// Why a Denied decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No session, or the session check could not be completed
    NoSession,
    /// Session valid, required role absent from the resolved set
    MissingRole(Role),
    /// Session valid, but role resolution failed while a role was required
    RoleCheckFailed,
}

/// Outcome of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session and role status unknown; render a loading placeholder
    Checking,
    /// Render the protected content
    Granted,
    /// Redirect to `fallback_route`; content never renders
    Denied {
        reason: DenyReason,
        fallback_route: String,
    },
}

impl GateDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, GateDecision::Granted)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, GateDecision::Denied { .. })
    }

    /// Redirect target for Denied decisions.
    pub fn fallback_route(&self) -> Option<&str> {
        match self {
            GateDecision::Denied { fallback_route, .. } => Some(fallback_route),
            _ => None,
        }
    }
}

/// Pure decision function.
///
/// Side-effect-free and independently testable; `AccessGate` feeds it
/// and the presentation layer navigates on Denied.
pub fn decide(
    session: Option<&Session>,
    required_role: Option<Role>,
    roles: &RoleSnapshot,
    routes: &GateRoutes,
) -> GateDecision {
    if session.is_none() {
        return GateDecision::Denied {
            reason: DenyReason::NoSession,
            fallback_route: routes.login_route.clone(),
        };
    }

    let Some(required) = required_role else {
        return GateDecision::Granted;
    };

    // Role resolution failed while a role is required: deny even if a
    // stale set would have matched
    if roles.error.is_some() {
        return GateDecision::Denied {
            reason: DenyReason::RoleCheckFailed,
            fallback_route: routes.unauthorized_route.clone(),
        };
    }

    if !roles.resolved {
        return GateDecision::Checking;
    }

    if roles.has_role(required) {
        GateDecision::Granted
    } else {
        GateDecision::Denied {
            reason: DenyReason::MissingRole(required),
            fallback_route: routes.unauthorized_route.clone(),
        }
    }
}

/// Gate wrapping one protected screen.
pub struct AccessGate {
    provider: Arc<dyn SessionProvider>,
    resolver: Arc<RoleResolver>,
    required_role: Option<Role>,
    routes: GateRoutes,
    state: Mutex<GateDecision>,
}

impl AccessGate {
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        resolver: Arc<RoleResolver>,
        required_role: Option<Role>,
    ) -> Self {
        AccessGate {
            provider,
            resolver,
            required_role,
            routes: GateRoutes::default(),
            state: Mutex::new(GateDecision::Checking),
        }
    }

    /// Override the fallback routes.
    pub fn with_routes(mut self, routes: GateRoutes) -> Self {
        self.routes = routes;
        self
    }

    /// Last computed decision (Checking until the first `evaluate`).
    pub fn decision(&self) -> GateDecision {
        self.state.lock().expect("gate lock poisoned").clone()
    }

    fn set_decision(&self, decision: GateDecision) {
        *self.state.lock().expect("gate lock poisoned") = decision;
    }

    /// Run the full decision: session check, role resolution if a role
    /// is required, then the pure decision.
    ///
    /// Exactly one decision is produced per cycle; a Denied decision
    /// carries the single redirect target for this cycle.
    pub async fn evaluate(&self) -> GateDecision {
        self.set_decision(GateDecision::Checking);

        let session = match self.provider.current_session().await {
            Ok(session) => session,
            Err(e) => {
                // "Can't verify" collapses to "verified absent"
                eprintln!(
                    "[AccessGate] Session check failed, treating as signed out: {}",
                    e
                );
                None
            }
        };

        if session.is_some() && self.required_role.is_some() {
            self.resolver.refresh().await;
        }

        let snapshot = self.resolver.snapshot();
        let decision = decide(session.as_ref(), self.required_role, &snapshot, &self.routes);
        self.set_decision(decision.clone());
        decision
    }

    /// Re-enter Checking and redo the full decision for a session
    /// change. A stale Granted is never trusted.
    pub async fn on_auth_change(&self, change: &AuthChange) -> GateDecision {
        if change.is_signed_out() {
            self.resolver.handle_auth_change(change).await;
        }
        self.evaluate().await
    }

    /// Subscription loop: evaluates once, then re-evaluates on every
    /// session-change notification until `shutdown` is set. The
    /// callback fires once per completed evaluation.
    pub async fn watch<F>(&self, shutdown: Arc<AtomicBool>, mut on_decision: F)
    where
        F: FnMut(&GateDecision),
    {
        let mut rx = self.provider.subscribe();

        let initial = self.evaluate().await;
        on_decision(&initial);

        loop {
            if shutdown.load(Ordering::SeqCst) {
                eprintln!("[AccessGate] Shutdown signal received, exiting watch loop");
                break;
            }

            match tokio::time::timeout(Duration::from_millis(250), rx.recv()).await {
                Ok(Ok(change)) => {
                    let decision = self.on_auth_change(&change).await;
                    on_decision(&decision);
                }
                Ok(Err(RecvError::Lagged(missed))) => {
                    // Missed notifications: the latest state is what
                    // matters, re-evaluate from scratch
                    eprintln!("[AccessGate] Lagged {} auth changes, re-evaluating", missed);
                    let decision = self.evaluate().await;
                    on_decision(&decision);
                }
                Ok(Err(RecvError::Closed)) => {
                    eprintln!("[AccessGate] Auth channel closed, exiting watch loop");
                    break;
                }
                Err(_) => {
                    // Timeout - loop to re-check shutdown
                }
            }
        }
    }
}
