//! Dashboard pages and the shell that mounts them.
//!
//! Pages are plain state holders driven by async actions. Protected pages are
//! only mounted by [`App`] after a [`RouteGuard`](crate::identity::RouteGuard)
//! has authorized them, and every mutation a page performs is checked by the
//! action policy before the API client is called.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::api::ApiError;
use crate::error::AppError;
use crate::identity::{authorize_current, Action, Session, SessionStore};

pub mod table;
mod dashboard;
mod product_form;
mod announcements;
mod login;
mod app;

pub use dashboard::DashboardPage;
pub use product_form::{AddProductPage, EditProductPage};
pub use announcements::AnnouncementsPage;
pub use login::LoginPage;
pub use app::{App, MountedPage, MAX_REDIRECT_HOPS};

/// Route table entry. `requires_auth` pages are mounted behind a route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSpec {
    pub path: &'static str,
    pub requires_auth: bool,
}

pub const PAGES: [PageSpec; 5] = [
    PageSpec { path: "/login", requires_auth: false },
    PageSpec { path: "/", requires_auth: true },
    PageSpec { path: "/add-product", requires_auth: true },
    PageSpec { path: "/edit-product/{id}", requires_auth: true },
    PageSpec { path: "/addAnnouncement", requires_auth: true },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageId {
    Login,
    Dashboard,
    AddProduct,
    EditProduct(String),
    Announcements,
}

impl PageId {
    pub fn spec(&self) -> PageSpec {
        match self {
            PageId::Login => PAGES[0],
            PageId::Dashboard => PAGES[1],
            PageId::AddProduct => PAGES[2],
            PageId::EditProduct(_) => PAGES[3],
            PageId::Announcements => PAGES[4],
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.spec().requires_auth
    }

    /// Concrete path for this page.
    pub fn path(&self) -> String {
        match self {
            PageId::EditProduct(id) => format!("/edit-product/{}", urlencoding::encode(id)),
            other => other.spec().path.to_string(),
        }
    }
}

/// Map a navigation path onto a page. Query strings and a trailing slash are ignored.
pub fn resolve(path: &str) -> Option<PageId> {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim();
    let trimmed = if trimmed.len() > 1 { trimmed.trim_end_matches('/') } else { trimmed };
    match trimmed {
        "" | "/" => Some(PageId::Dashboard),
        "/login" => Some(PageId::Login),
        "/add-product" => Some(PageId::AddProduct),
        "/addAnnouncement" => Some(PageId::Announcements),
        other => {
            let id = other.strip_prefix("/edit-product/")?;
            if id.is_empty() || id.contains('/') {
                return None;
            }
            let id = urlencoding::decode(id).ok()?.into_owned();
            Some(PageId::EditProduct(id))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Error,
}

/// Message shown to the operator after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, text: text.into() }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

impl From<&AppError> for Notice {
    fn from(err: &AppError) -> Self {
        Notice::error(err.notice_text())
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NoticeKind::Info => write!(f, "{}", self.text),
            NoticeKind::Error => write!(f, "error: {}", self.text),
        }
    }
}

/// Result of one page action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The remote confirmed and local state was updated.
    Applied,
    /// Denied locally or failed remotely; local state is unchanged.
    Rejected(Notice),
    /// The page was unmounted before the result arrived.
    Discarded,
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            ActionOutcome::Rejected(n) => Some(n),
            _ => None,
        }
    }
}

/// Hands out page contexts. Deactivating invalidates every context issued so far.
#[derive(Debug, Clone, Default)]
pub struct MountCounter {
    current: Arc<AtomicU64>,
}

impl MountCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new mount, invalidating the previous one.
    pub fn mount(&self) -> PageContext {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        PageContext { current: self.current.clone(), generation }
    }

    pub fn deactivate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

/// Identity of one page mount. Results arriving for an inactive context are dropped.
#[derive(Debug, Clone)]
pub struct PageContext {
    current: Arc<AtomicU64>,
    generation: u64,
}

impl PageContext {
    /// Context that stays active for as long as it exists.
    pub fn detached() -> Self {
        MountCounter::new().mount()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

/// Run the action policy against the current session.
pub(crate) fn gate(action: Action, store: &dyn SessionStore) -> Result<Session, ActionOutcome> {
    let (decision, session) = authorize_current(action, store);
    match (decision.into_result(action.name()), session) {
        (Ok(()), Some(s)) => Ok(s),
        (Ok(()), None) => Err(ActionOutcome::Rejected(Notice::from(&AppError::session_absent(
            "no_session",
            "not logged in",
        )))),
        (Err(e), _) => Err(ActionOutcome::Rejected(Notice::from(&e))),
    }
}

/// Settle an API result against the mount it was issued from.
pub(crate) fn settle<T>(ctx: &PageContext, page: &str, res: Result<T, ApiError>) -> Result<T, ActionOutcome> {
    if !ctx.is_active() {
        debug!(target: "storefront_admin::pages", "page={} discarding result for inactive mount {}", page, ctx.generation());
        return Err(ActionOutcome::Discarded);
    }
    res.map_err(|e| ActionOutcome::Rejected(Notice::from(&AppError::from(e))))
}
