//! Route guard for protected pages.
//!
//! One `RouteGuard` belongs to one page mount. It starts `Pending`, and each
//! call to [`RouteGuard::evaluate`] re-reads the session store and moves to
//! `Authorized` (admin session present) or `Redirecting` (anything else, with a
//! navigation request to the login page). Only `Authorized` renders content,
//! so nothing protected is produced while the decision is pending or while the
//! redirect is in flight.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use super::authorizer::{check_role, DecisionReason};
use super::session::Role;
use super::store::SharedSessionStore;

/// Fixed login entry point. The redirect never carries the original destination.
pub const LOGIN_PATH: &str = "/login";
/// Landing page after a successful login.
pub const HOME_PATH: &str = "/";

/// Navigation boundary: asks the hosting shell to move to another path.
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

/// Navigator that queues requested paths for the shell to process in order.
#[derive(Debug, Default)]
pub struct NavigationQueue {
    pending: Mutex<VecDeque<String>>,
}

impl NavigationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_next(&self) -> Option<String> {
        self.pending.lock().pop_front()
    }

    pub fn pending(&self) -> Vec<String> {
        self.pending.lock().iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl Navigator for NavigationQueue {
    fn push(&self, path: &str) {
        self.pending.lock().push_back(path.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Pending,
    Authorized,
    Redirecting,
}

pub struct RouteGuard {
    store: SharedSessionStore,
    navigator: Arc<dyn Navigator>,
    page: String,
    state: GuardState,
    last_reason: Option<DecisionReason>,
}

impl RouteGuard {
    pub fn new(page: impl Into<String>, store: SharedSessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator, page: page.into(), state: GuardState::Pending, last_reason: None }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Reason behind the most recent evaluation, `None` while still pending.
    pub fn last_reason(&self) -> Option<DecisionReason> {
        self.last_reason
    }

    /// Re-read the session and settle the guard. Issues one login redirect
    /// each time an evaluation ends in `Redirecting`.
    pub fn evaluate(&mut self) -> GuardState {
        let session = self.store.load();
        let decision = check_role(session.as_ref(), Role::Admin);
        self.last_reason = Some(decision.reason);
        if decision.allowed {
            debug!(target: "storefront_admin::guard", "page={} authorized", self.page);
            self.state = GuardState::Authorized;
        } else {
            info!(
                target: "storefront_admin::guard",
                "page={} redirecting to {} reason={:?}", self.page, LOGIN_PATH, decision.reason
            );
            self.state = GuardState::Redirecting;
            self.navigator.push(LOGIN_PATH);
        }
        self.state
    }

    /// Build the guarded content only when authorized.
    pub fn render<T, F>(&self, content: F) -> Option<T>
    where
        F: FnOnce() -> T,
    {
        match self.state {
            GuardState::Authorized => Some(content()),
            GuardState::Pending | GuardState::Redirecting => None,
        }
    }
}
