use std::sync::Arc;

use tracing::{debug, error};

use super::{
    resolve, ActionOutcome, AddProductPage, AnnouncementsPage, DashboardPage, EditProductPage, LoginPage, MountCounter,
    PageContext, PageId,
};
use crate::api::ApiClient;
use crate::error::{AppError, AppResult};
use crate::identity::{AuthProvider, GuardState, NavigationQueue, Navigator, RemoteAuthProvider, RouteGuard};

/// Upper bound on navigations processed for one request.
pub const MAX_REDIRECT_HOPS: usize = 4;

pub enum MountedPage {
    Login(LoginPage),
    Dashboard(DashboardPage),
    AddProduct(AddProductPage),
    EditProduct(EditProductPage),
    Announcements(AnnouncementsPage),
}

impl MountedPage {
    pub fn render(&self) -> String {
        match self {
            MountedPage::Login(p) => p.render(),
            MountedPage::Dashboard(p) => p.render(),
            MountedPage::AddProduct(p) => p.render(),
            MountedPage::EditProduct(p) => p.render(),
            MountedPage::Announcements(p) => p.render(),
        }
    }
}

/// Application shell: resolves paths, guards protected pages and owns the
/// currently mounted page.
pub struct App {
    client: ApiClient,
    provider: Arc<dyn AuthProvider>,
    navigation: Arc<NavigationQueue>,
    mounts: MountCounter,
    current: Option<PageId>,
    guard: Option<RouteGuard>,
    page: Option<MountedPage>,
}

impl App {
    pub fn new(client: ApiClient) -> Self {
        let provider = Arc::new(RemoteAuthProvider::new(client.clone()));
        Self::with_provider(client, provider)
    }

    pub fn with_provider(client: ApiClient, provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            client,
            provider,
            navigation: Arc::new(NavigationQueue::new()),
            mounts: MountCounter::new(),
            current: None,
            guard: None,
            page: None,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn navigation(&self) -> &Arc<NavigationQueue> {
        &self.navigation
    }

    pub fn current(&self) -> Option<&PageId> {
        self.current.as_ref()
    }

    /// State of the guard for the current page; `None` for public pages.
    pub fn guard_state(&self) -> Option<GuardState> {
        self.guard.as_ref().map(|g| g.state())
    }

    pub fn page(&self) -> Option<&MountedPage> {
        self.page.as_ref()
    }

    pub fn page_mut(&mut self) -> Option<&mut MountedPage> {
        self.page.as_mut()
    }

    /// Request a navigation and process it together with any redirects it causes.
    pub async fn navigate(&mut self, path: &str) -> AppResult<()> {
        self.navigation.push(path);
        self.process_navigation().await
    }

    /// Drain queued navigations, mounting each target in turn.
    pub async fn process_navigation(&mut self) -> AppResult<()> {
        let mut hops = 0;
        while let Some(next) = self.navigation.take_next() {
            hops += 1;
            if hops > MAX_REDIRECT_HOPS {
                error!(target: "storefront_admin::pages", "navigation loop detected at {}", next);
                while self.navigation.take_next().is_some() {}
                return Err(AppError::user("redirect_loop", format!("too many redirects while opening {}", next)));
            }
            if let Err(e) = self.mount(&next).await {
                while self.navigation.take_next().is_some() {}
                return Err(e);
            }
        }
        Ok(())
    }

    async fn mount(&mut self, path: &str) -> AppResult<()> {
        let id = resolve(path).ok_or_else(|| AppError::user("unknown_page", format!("no page at '{}'", path)))?;
        self.mounts.deactivate();
        self.page = None;
        self.guard = None;
        self.current = Some(id.clone());
        let ctx = self.mounts.mount();
        debug!(target: "storefront_admin::pages", "mount {} generation={}", id.path(), ctx.generation());

        let page = if id.requires_auth() {
            let mut guard = RouteGuard::new(id.path(), self.client.store().clone(), self.navigation.clone());
            guard.evaluate();
            let page = guard.render(|| self.build(&id, ctx));
            self.guard = Some(guard);
            match page {
                Some(p) => p,
                None => return Ok(()),
            }
        } else {
            self.build(&id, ctx)
        };
        self.page = Some(page);
        self.load_current().await;
        Ok(())
    }

    fn build(&self, id: &PageId, ctx: PageContext) -> MountedPage {
        let nav = self.navigation.clone();
        match id {
            PageId::Login => MountedPage::Login(LoginPage::new(self.provider.clone(), nav, ctx)),
            PageId::Dashboard => MountedPage::Dashboard(DashboardPage::new(self.client.clone(), nav, ctx)),
            PageId::AddProduct => MountedPage::AddProduct(AddProductPage::new(self.client.clone(), nav, ctx)),
            PageId::EditProduct(pid) => {
                MountedPage::EditProduct(EditProductPage::new(self.client.clone(), nav, ctx, pid.clone()))
            }
            PageId::Announcements => MountedPage::Announcements(AnnouncementsPage::new(self.client.clone(), ctx)),
        }
    }

    async fn load_current(&mut self) {
        let outcome = match self.page.as_mut() {
            Some(MountedPage::Dashboard(p)) => p.load().await,
            Some(MountedPage::EditProduct(p)) => p.load().await,
            Some(MountedPage::Announcements(p)) => p.load().await,
            _ => return,
        };
        if let ActionOutcome::Rejected(n) = outcome {
            debug!(target: "storefront_admin::pages", "initial load failed: {}", n.text);
        }
    }

    /// Text view of the current page. Empty while a guard is pending or redirecting.
    pub fn render(&self) -> String {
        match &self.page {
            Some(p) => p.render(),
            None => String::new(),
        }
    }
}
