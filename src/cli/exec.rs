use crate::error::{AppError, AppResult};
use crate::identity::{logout, LOGIN_PATH};
use crate::pages::table::render_table;
use crate::pages::{ActionOutcome, App, MountedPage, PageId};

use super::{usage, Command};

fn report(outcome: ActionOutcome, done: &str) -> String {
    match outcome {
        ActionOutcome::Applied => done.to_string(),
        ActionOutcome::Rejected(n) => n.to_string(),
        ActionOutcome::Discarded => "result discarded: page was closed".to_string(),
    }
}

/// Open `path` and report whether the guard let us in.
async fn open(app: &mut App, path: &str) -> AppResult<bool> {
    app.navigate(path).await?;
    let landed = app.current().map(PageId::path);
    Ok(landed.as_deref() != Some(LOGIN_PATH) || path == LOGIN_PATH)
}

fn redirected() -> AppError {
    AppError::session_absent("redirected", "redirected to /login: log in with an admin account first")
}

/// Execute one command. Returns the text to print, or `None` for `quit`.
pub async fn execute(app: &mut App, cmd: Command) -> AppResult<Option<String>> {
    let text = match cmd {
        Command::Quit => return Ok(None),
        Command::Help => usage("storefront-admin"),
        Command::Whoami => match app.client().store().load() {
            Some(s) => format!("{} ({})", s.id, s.role.as_str()),
            None => "not logged in".to_string(),
        },
        Command::Logout => {
            logout(app.client().store().as_ref())?;
            app.navigate(LOGIN_PATH).await?;
            "logged out".to_string()
        }
        Command::Login { email, password } => {
            open(app, LOGIN_PATH).await?;
            let outcome = match app.page_mut() {
                Some(MountedPage::Login(page)) => {
                    page.email = email;
                    page.password = password;
                    page.submit().await
                }
                _ => return Err(AppError::user("no_login_page", "login page is not mounted")),
            };
            app.process_navigation().await?;
            if outcome.is_applied() && app.current() == Some(&PageId::Login) {
                return Err(redirected());
            }
            report(outcome, "logged in")
        }
        Command::Open(path) => {
            app.navigate(&path).await?;
            app.render()
        }
        Command::Products => {
            if !open(app, "/").await? {
                return Err(redirected());
            }
            app.render()
        }
        Command::AddProduct(draft) => {
            if !open(app, "/add-product").await? {
                return Err(redirected());
            }
            let outcome = match app.page_mut() {
                Some(MountedPage::AddProduct(page)) => {
                    page.draft = draft;
                    page.submit().await
                }
                _ => return Err(redirected()),
            };
            app.process_navigation().await?;
            report(outcome, "product added")
        }
        Command::EditProduct { id, patch } => {
            if !open(app, &PageId::EditProduct(id).path()).await? {
                return Err(redirected());
            }
            let outcome = match app.page_mut() {
                Some(MountedPage::EditProduct(page)) => {
                    if page.product().is_none() {
                        let msg = page.notice().map(|n| n.text.clone()).unwrap_or_default();
                        return Err(AppError::user("product_unavailable", msg));
                    }
                    page.save(patch).await
                }
                _ => return Err(redirected()),
            };
            app.process_navigation().await?;
            report(outcome, "product updated")
        }
        Command::DeleteProduct(id) => {
            if !open(app, "/").await? {
                return Err(redirected());
            }
            match app.page_mut() {
                Some(MountedPage::Dashboard(page)) => report(page.delete_product(&id).await, "product deleted"),
                _ => return Err(redirected()),
            }
        }
        Command::TogglePopular(id) => {
            if !open(app, "/").await? {
                return Err(redirected());
            }
            match app.page_mut() {
                Some(MountedPage::Dashboard(page)) => {
                    let outcome = page.toggle_popular(&id).await;
                    let now = page.products().iter().find(|p| p.id == id).map(|p| p.popular);
                    match (outcome, now) {
                        (ActionOutcome::Applied, Some(flag)) => format!("product {} popular={}", id, flag),
                        (other, _) => report(other, "popular flag updated"),
                    }
                }
                _ => return Err(redirected()),
            }
        }
        Command::Announcements => {
            if !open(app, "/addAnnouncement").await? {
                return Err(redirected());
            }
            app.render()
        }
        Command::Orders => {
            if !open(app, "/addAnnouncement").await? {
                return Err(redirected());
            }
            match app.page() {
                Some(MountedPage::Announcements(page)) => {
                    let rows: Vec<Vec<String>> = page
                        .orders()
                        .iter()
                        .map(|o| vec![o.id.clone(), o.user_id.clone(), format!("{:.2}", o.total), o.status.clone()])
                        .collect();
                    render_table(&["id", "user", "total", "status"], &rows)
                }
                _ => return Err(redirected()),
            }
        }
        Command::Announce(message) => {
            if !open(app, "/addAnnouncement").await? {
                return Err(redirected());
            }
            match app.page_mut() {
                Some(MountedPage::Announcements(page)) => report(page.add_announcement(&message).await, "announcement added"),
                _ => return Err(redirected()),
            }
        }
        Command::DeleteAnnouncement(id) => {
            if !open(app, "/addAnnouncement").await? {
                return Err(redirected());
            }
            match app.page_mut() {
                Some(MountedPage::Announcements(page)) => {
                    report(page.delete_announcement(&id).await, "announcement deleted")
                }
                _ => return Err(redirected()),
            }
        }
        Command::SetStatus { id, status } => {
            if !open(app, "/addAnnouncement").await? {
                return Err(redirected());
            }
            match app.page_mut() {
                Some(MountedPage::Announcements(page)) => {
                    report(page.change_order_status(&id, &status).await, "order status updated")
                }
                _ => return Err(redirected()),
            }
        }
    };
    Ok(Some(text))
}
