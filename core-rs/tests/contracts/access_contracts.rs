// Access-control contract tests
//
// These tests pin the safety invariants of the gate and resolver.
// The decision logic must fail closed: an access gate that fails open
// on error is a security defect, and a cache that applies stale fetch
// results can grant access computed for a superseded session.

use qrmenu_core::{
    decide, GateDecision, GateRoutes, LocalSessionProvider, MemoryRoleStore, Role, RoleAssignment,
    RoleResolver, RoleSnapshot, RoleStore, Session, SessionProvider, UserId,
};
use chrono::Utc;
use std::sync::Arc;

fn session() -> Session {
    Session {
        id: "sid-contract".to_string(),
        user_id: UserId::new("user-1"),
        issued_at: Utc::now(),
        expires_at: None,
    }
}

/// WHY: hasRole must be false for every role before the first fetch completes
/// REASON: the loading window must not grant elevated access
/// BREAKS: admin screens flash open to unprivileged users if this fails
#[tokio::test]
async fn has_role_fails_closed_before_first_resolution() {
    let provider = Arc::new(LocalSessionProvider::new());
    let store = Arc::new(MemoryRoleStore::new());
    let user = UserId::new("user-1");
    store.assign_role(&user, Role::Admin).await.unwrap();
    provider.sign_in(user);

    let resolver = RoleResolver::new(provider, store);

    // Roles exist in the store, but nothing has resolved yet
    assert!(!resolver.has_role(Role::Admin));
    assert!(!resolver.has_role(Role::User));
    assert!(!resolver.snapshot().resolved);
}

/// WHY: a role-fetch error with a required role must deny, never grant
/// REASON: safety over availability; "can't verify" is not "verified"
/// BREAKS: a flaky role service would open every admin screen
#[test]
fn fetch_error_denies_even_when_stale_set_matches() {
    let s = session();
    let routes = GateRoutes::default();

    // Stale snapshot says admin, but the last fetch failed
    let snapshot = RoleSnapshot {
        assignments: vec![RoleAssignment::new(UserId::new("user-1"), Role::Admin)],
        resolved: true,
        loading: false,
        error: Some("service unreachable".to_string()),
    };

    let decision = decide(Some(&s), Some(Role::Admin), &snapshot, &routes);
    assert!(decision.is_denied());
    assert_eq!(decision.fallback_route(), Some("/unauthorized"));
}

/// WHY: session-check failure and session absence must be indistinguishable
/// REASON: both collapse to the conservative outcome (login redirect)
/// BREAKS: attackers could probe for "error" vs "absent" responses
#[test]
fn no_session_and_unverifiable_session_share_one_outcome() {
    let routes = GateRoutes::default();

    // The gate maps provider errors to None before deciding; at the
    // decision layer there is exactly one representation
    let decision = decide(None, Some(Role::Admin), &RoleSnapshot::default(), &routes);
    assert_eq!(decision.fallback_route(), Some("/admin/login"));
}

/// WHY: a later-initiated fetch must win regardless of completion order
/// REASON: an authorization decision computed for a superseded session
/// must never be applied
/// BREAKS: a slow fetch from a previous user could leak into the next
/// user's cache
#[tokio::test]
async fn generation_ordering_beats_completion_ordering() {
    let provider = Arc::new(LocalSessionProvider::new());
    let store = Arc::new(MemoryRoleStore::new());
    let resolver = RoleResolver::new(provider.clone(), store.clone());

    // First user is an admin
    let first = UserId::new("admin-user");
    store.assign_role(&first, Role::Admin).await.unwrap();
    provider.sign_in(first);

    let gen_a = resolver.begin_fetch();
    let result_a = resolver.fetch_roles_for_current_session().await;

    // Second user signs in (no roles) before A lands
    provider.sign_in(UserId::new("fresh-user"));
    let gen_b = resolver.begin_fetch();
    let result_b = resolver.fetch_roles_for_current_session().await;

    resolver.apply_fetch(gen_b, result_b);
    resolver.apply_fetch(gen_a, result_a);

    // The first user's admin set must not leak into the cache
    assert!(!resolver.has_role(Role::Admin));
    assert!(resolver.snapshot().assignments.is_empty());
}

/// WHY: duplicate (user, role) grants must collapse to presence/absence
/// REASON: the store enforces no uniqueness; membership is not a count
/// BREAKS: de-duplication bugs would make role removal order-dependent
#[tokio::test]
async fn duplicate_grants_collapse_to_membership() {
    let provider = Arc::new(LocalSessionProvider::new());
    let store = Arc::new(MemoryRoleStore::new());
    let user = UserId::new("user-1");
    store.assign_role(&user, Role::User).await.unwrap();
    store.assign_role(&user, Role::User).await.unwrap();
    provider.sign_in(user);

    let resolver = RoleResolver::new(provider, store);
    resolver.refresh().await;

    let snapshot = resolver.snapshot();
    assert_eq!(snapshot.assignments.len(), 2);
    assert_eq!(snapshot.roles().len(), 1);
    assert!(snapshot.has_role(Role::User));
}

/// WHY: refresh must be idempotent against a stable store and session
/// REASON: UI layers re-trigger refresh freely; repeated calls must not
/// change the answer
#[tokio::test]
async fn refresh_twice_yields_the_same_resolved_set() {
    let provider = Arc::new(LocalSessionProvider::new());
    let store = Arc::new(MemoryRoleStore::new());
    let user = UserId::new("user-1");
    store.assign_role(&user, Role::Admin).await.unwrap();
    provider.sign_in(user);

    let resolver = RoleResolver::new(provider, store);

    resolver.refresh().await;
    let first = resolver.snapshot();
    resolver.refresh().await;
    let second = resolver.snapshot();

    assert_eq!(first.assignments, second.assignments);
    assert_eq!(first.roles(), second.roles());
}

/// WHY: the decision function must be pure
/// REASON: the caller owns navigation; deciding twice over the same
/// inputs must produce the same outcome with no side effects
#[test]
fn decide_is_deterministic_over_identical_inputs() {
    let s = session();
    let routes = GateRoutes::default();
    let snapshot = RoleSnapshot::default();

    let first = decide(Some(&s), Some(Role::Admin), &snapshot, &routes);
    let second = decide(Some(&s), Some(Role::Admin), &snapshot, &routes);

    assert_eq!(first, second);
    assert_eq!(first, GateDecision::Checking);
}

/// WHY: a denied evaluation carries exactly one redirect target
/// REASON: the caller navigates once per Denied decision; one cycle
/// must never emit competing routes
#[test]
fn denied_decisions_carry_exactly_one_fallback_route() {
    let routes = GateRoutes::default();

    let no_session = decide(None, None, &RoleSnapshot::default(), &routes);
    assert_eq!(no_session.fallback_route(), Some("/admin/login"));

    let s = session();
    let mut resolved_empty = RoleSnapshot::default();
    resolved_empty.resolved = true;
    let missing_role = decide(Some(&s), Some(Role::Admin), &resolved_empty, &routes);
    assert_eq!(missing_role.fallback_route(), Some("/unauthorized"));

    // Granted and Checking never carry a route
    let granted = decide(Some(&s), None, &RoleSnapshot::default(), &routes);
    assert!(granted.fallback_route().is_none());
}
