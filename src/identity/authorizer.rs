use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use super::session::{Role, Session};
use super::store::SessionStore;

/// Mutating operations an operator can trigger from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    ToggleProductPopular,
    AddAnnouncement,
    DeleteAnnouncement,
    ChangeOrderStatus,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::CreateProduct,
        Action::UpdateProduct,
        Action::DeleteProduct,
        Action::ToggleProductPopular,
        Action::AddAnnouncement,
        Action::DeleteAnnouncement,
        Action::ChangeOrderStatus,
    ];

    /// Role the action is declared to require. Every mutation is admin-only.
    pub fn required_role(&self) -> Role {
        match self {
            Action::CreateProduct
            | Action::UpdateProduct
            | Action::DeleteProduct
            | Action::ToggleProductPopular
            | Action::AddAnnouncement
            | Action::DeleteAnnouncement
            | Action::ChangeOrderStatus => Role::Admin,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateProduct => "create_product",
            Action::UpdateProduct => "update_product",
            Action::DeleteProduct => "delete_product",
            Action::ToggleProductPopular => "toggle_product_popular",
            Action::AddAnnouncement => "add_announcement",
            Action::DeleteAnnouncement => "delete_announcement",
            Action::ChangeOrderStatus => "change_order_status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    NoSession,
    WrongRole,
    Ok,
}

/// Outcome of one authorization check. Built fresh for every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    pub allowed: bool,
    pub reason: DecisionReason,
}

impl AuthorizationDecision {
    pub fn allow() -> Self { Self { allowed: true, reason: DecisionReason::Ok } }
    pub fn deny(reason: DecisionReason) -> Self { Self { allowed: false, reason } }

    /// `Ok(())` when allowed, otherwise the matching access-denial error.
    pub fn into_result(self, what: &str) -> AppResult<()> {
        match self.reason {
            DecisionReason::Ok => Ok(()),
            DecisionReason::NoSession => Err(AppError::session_absent("no_session", format!("{}: not logged in", what))),
            DecisionReason::WrongRole => Err(AppError::role_denied("wrong_role", format!("{}: admin role required", what))),
        }
    }
}

/// Check a session snapshot against a required role. Shared by the route
/// guard and the action policy.
pub fn check_role(session: Option<&Session>, required: Role) -> AuthorizationDecision {
    match session {
        None => AuthorizationDecision::deny(DecisionReason::NoSession),
        Some(s) if s.role != required => AuthorizationDecision::deny(DecisionReason::WrongRole),
        Some(_) => AuthorizationDecision::allow(),
    }
}

/// Decide whether `action` may run for the given session snapshot.
pub fn authorize(action: Action, session: Option<&Session>) -> AuthorizationDecision {
    let decision = check_role(session, action.required_role());
    debug!(
        target: "storefront_admin::policy",
        "authorize action={} user={:?} allowed={} reason={:?}",
        action.name(), session.map(|s| s.id.as_str()), decision.allowed, decision.reason
    );
    decision
}

/// Load the current session and authorize `action` against it, returning the
/// snapshot the decision was made on.
pub fn authorize_current(action: Action, store: &dyn SessionStore) -> (AuthorizationDecision, Option<Session>) {
    let session = store.load();
    (authorize(action, session.as_ref()), session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemorySessionStore;

    #[test]
    fn every_action_requires_admin() {
        for a in Action::ALL {
            assert_eq!(a.required_role(), Role::Admin, "{}", a.name());
        }
    }

    #[test]
    fn absent_session_is_denied_for_all_actions() {
        for a in Action::ALL {
            assert_eq!(authorize(a, None), AuthorizationDecision::deny(DecisionReason::NoSession));
        }
    }

    #[test]
    fn non_admin_is_denied_and_admin_allowed() {
        let other = Session::new("u2", Role::Other, "t2");
        let admin = Session::new("u1", Role::Admin, "t1");
        for a in Action::ALL {
            assert_eq!(authorize(a, Some(&other)).reason, DecisionReason::WrongRole);
            assert!(authorize(a, Some(&admin)).allowed);
        }
    }

    #[test]
    fn decision_reflects_store_changes_between_calls() {
        let store = MemorySessionStore::new();
        store.save(&Session::new("u1", Role::Admin, "t1")).unwrap();
        let (d1, snap) = authorize_current(Action::DeleteProduct, &store);
        assert!(d1.allowed);
        assert_eq!(snap.map(|s| s.token), Some("t1".to_string()));

        store.clear().unwrap();
        let (d2, snap) = authorize_current(Action::DeleteProduct, &store);
        assert_eq!(d2.reason, DecisionReason::NoSession);
        assert!(snap.is_none());
    }

    #[test]
    fn into_result_maps_reasons() {
        assert!(AuthorizationDecision::allow().into_result("x").is_ok());
        let e = AuthorizationDecision::deny(DecisionReason::NoSession).into_result("delete_product").unwrap_err();
        assert!(matches!(e, AppError::SessionAbsent { .. }));
        let e = AuthorizationDecision::deny(DecisionReason::WrongRole).into_result("delete_product").unwrap_err();
        assert!(matches!(e, AppError::RoleDenied { .. }));
    }
}
