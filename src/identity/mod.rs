//! Session state and the checks built on it: the persisted session record,
//! the route guard for protected pages, the per-action policy and login.
//! The session store is the only place session state lives; everything else
//! takes a fresh snapshot from it per evaluation.

mod session;
mod store;
mod authorizer;
mod guard;
mod provider;

pub use session::{Role, Session, SessionToken};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, SharedSessionStore, SESSION_RECORD};
pub use authorizer::{authorize, authorize_current, check_role, Action, AuthorizationDecision, DecisionReason};
pub use guard::{GuardState, NavigationQueue, Navigator, RouteGuard, HOME_PATH, LOGIN_PATH};
pub use provider::{logout, AuthProvider, LoginRequest, LoginResponse, RemoteAuthProvider};
