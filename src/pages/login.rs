use std::sync::Arc;

use super::{ActionOutcome, Notice, PageContext};
use crate::identity::{AuthProvider, LoginRequest, Navigator, HOME_PATH};

/// Public login form. A successful login lands on the dashboard.
pub struct LoginPage {
    provider: Arc<dyn AuthProvider>,
    navigator: Arc<dyn Navigator>,
    ctx: PageContext,
    pub email: String,
    pub password: String,
    notice: Option<Notice>,
}

impl LoginPage {
    pub fn new(provider: Arc<dyn AuthProvider>, navigator: Arc<dyn Navigator>, ctx: PageContext) -> Self {
        Self { provider, navigator, ctx, email: String::new(), password: String::new(), notice: None }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub async fn submit(&mut self) -> ActionOutcome {
        let req = LoginRequest::new(self.email.trim(), self.password.clone());
        let res = self.provider.login(&req).await;
        // the session is already stored at this point; only the navigation is skipped
        if !self.ctx.is_active() {
            return ActionOutcome::Discarded;
        }
        self.password.clear();
        match res {
            Ok(_) => {
                self.notice = None;
                self.navigator.push(HOME_PATH);
                ActionOutcome::Applied
            }
            Err(e) => {
                let n = Notice::from(&e);
                self.notice = Some(n.clone());
                ActionOutcome::Rejected(n)
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("Admin Login\n  email: {}\n", self.email);
        if let Some(n) = &self.notice {
            out.push_str(&n.to_string());
            out.push('\n');
        }
        out
    }
}
