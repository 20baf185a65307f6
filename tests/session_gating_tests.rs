//! End-to-end session gating: guarded navigation, login and logout, and the
//! action policy in front of mutating calls, against a mock storefront API.

mod common;

use std::fs;

use anyhow::Result;
use serde_json::json;
use tempfile::tempdir;

use common::{admin, sample_products, shopper, store_in, MockApi};
use storefront_admin::identity::{FileSessionStore, GuardState, Navigator, SessionStore, LOGIN_PATH};
use storefront_admin::pages::{ActionOutcome, App, MountedPage, PageId};

#[tokio::test]
async fn admin_session_renders_dashboard() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("GET", "/api/products", 200, sample_products());
    let mut app = App::new(api.client(store_in(tmp.path(), Some(admin()))));

    app.navigate("/").await?;

    assert_eq!(app.current(), Some(&PageId::Dashboard));
    assert_eq!(app.guard_state(), Some(GuardState::Authorized));
    assert!(app.navigation().is_empty());
    let view = app.render();
    assert!(view.contains("Classic Tee"), "{}", view);
    assert!(view.contains("Cargo Pants"));
    let reads = api.requests_to("GET", "/api/products");
    assert_eq!(reads.len(), 1);
    assert_eq!(reads[0].authorization.as_deref(), Some("Bearer t1"));
    Ok(())
}

#[tokio::test]
async fn cleared_session_redirects_to_login() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("GET", "/api/products", 200, sample_products());
    let store = store_in(tmp.path(), Some(admin()));
    store.clear()?;
    let mut app = App::new(api.client(store));

    app.navigate("/").await?;

    assert_eq!(app.current(), Some(&PageId::Login));
    assert!(matches!(app.page(), Some(MountedPage::Login(_))));
    assert!(!app.render().contains("Classic Tee"));
    assert!(api.requests().is_empty(), "guarded page must not load data");
    Ok(())
}

#[tokio::test]
async fn non_admin_session_redirects_to_login() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    let mut app = App::new(api.client(store_in(tmp.path(), Some(shopper()))));

    for path in ["/", "/add-product", "/edit-product/p1", "/addAnnouncement"] {
        app.navigate(path).await?;
        assert_eq!(app.current(), Some(&PageId::Login), "{}", path);
    }
    assert!(api.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn role_must_be_exactly_admin() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("GET", "/api/products", 200, sample_products());
    let store = FileSessionStore::new(tmp.path());

    for role in ["Admin", " admin ", "ADMIN", "admin "] {
        fs::write(store.record_path(), json!({"id": "u9", "role": role, "token": "t9"}).to_string())?;
        let mut app = App::new(api.client(FileSessionStore::shared(tmp.path())));
        app.navigate("/").await?;
        assert_eq!(app.current(), Some(&PageId::Login), "role {:?}", role);
    }
    assert!(api.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_mount_drops_queued_navigations() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    let mut app = App::new(api.client(store_in(tmp.path(), None)));
    app.navigation().push("/no-such-page");
    app.navigation().push(LOGIN_PATH);

    let err = app.process_navigation().await.unwrap_err();

    assert!(err.to_string().contains("no-such-page"), "{}", err);
    assert!(app.navigation().is_empty());
    Ok(())
}

#[tokio::test]
async fn malformed_record_is_treated_as_logged_out() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    let store = FileSessionStore::new(tmp.path());
    fs::write(store.record_path(), r#"{"id":"u1","role":"admin"}"#)?;
    assert!(store.load().is_none());

    let mut app = App::new(api.client(FileSessionStore::shared(tmp.path())));
    app.navigate("/").await?;
    assert_eq!(app.current(), Some(&PageId::Login));
    Ok(())
}

#[tokio::test]
async fn delete_without_session_is_denied_before_any_request() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("GET", "/api/products", 200, sample_products());
    api.respond("DELETE", "/api/products/p1", 200, json!({"ok": true}));
    let store = store_in(tmp.path(), Some(admin()));
    let mut app = App::new(api.client(store.clone()));
    app.navigate("/").await?;

    // session disappears while the dashboard is open
    store.clear()?;
    let Some(MountedPage::Dashboard(page)) = app.page_mut() else { panic!("dashboard not mounted") };
    let outcome = page.delete_product("p1").await;

    let notice = outcome.notice().expect("denial notice");
    assert!(notice.is_error());
    assert!(notice.text.contains("not logged in"), "{}", notice.text);
    assert_eq!(page.products().len(), 2);
    assert!(api.requests_to("DELETE", "/api/products/p1").is_empty());
    Ok(())
}

#[tokio::test]
async fn remote_500_leaves_product_list_unchanged() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("GET", "/api/products", 200, sample_products());
    api.respond("DELETE", "/api/products/p1", 500, json!({"message": "database offline"}));
    let mut app = App::new(api.client(store_in(tmp.path(), Some(admin()))));
    app.navigate("/").await?;

    let Some(MountedPage::Dashboard(page)) = app.page_mut() else { panic!("dashboard not mounted") };
    let outcome = page.delete_product("p1").await;

    let notice = outcome.notice().expect("failure notice");
    assert!(notice.text.contains("500"), "{}", notice.text);
    assert!(notice.text.contains("database offline"));
    assert_eq!(page.products().iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["p1", "p2"]);
    let sent = api.requests_to("DELETE", "/api/products/p1");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer t1"));
    Ok(())
}

#[tokio::test]
async fn login_saves_session_and_lands_on_dashboard() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("GET", "/api/products", 200, sample_products());
    api.respond("POST", "/api/auth/login", 200, json!({"user": {"_id": "u1", "role": "admin", "token": "t1"}}));
    let store = store_in(tmp.path(), None);
    let mut app = App::new(api.client(store.clone()));

    app.navigate("/").await?;
    assert_eq!(app.current(), Some(&PageId::Login));

    let outcome = match app.page_mut() {
        Some(MountedPage::Login(page)) => {
            page.email = "admin@shop.test".into();
            page.password = "hunter2".into();
            page.submit().await
        }
        _ => panic!("login page not mounted"),
    };
    assert_eq!(outcome, ActionOutcome::Applied);
    app.process_navigation().await?;

    assert_eq!(app.current(), Some(&PageId::Dashboard));
    assert_eq!(store.load(), Some(admin()));
    let login = api.requests_to("POST", "/api/auth/login");
    assert_eq!(login.len(), 1);
    assert_eq!(login[0].authorization, None);
    assert_eq!(login[0].body, Some(json!({"email": "admin@shop.test", "password": "hunter2"})));
    Ok(())
}

#[tokio::test]
async fn login_without_user_record_saves_nothing() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("POST", "/api/auth/login", 200, json!({"message": "bad password"}));
    let store = store_in(tmp.path(), None);
    let mut app = App::new(api.client(store.clone()));
    app.navigate(LOGIN_PATH).await?;

    let Some(MountedPage::Login(page)) = app.page_mut() else { panic!("login page not mounted") };
    page.email = "admin@shop.test".into();
    page.password = "wrong".into();
    let outcome = page.submit().await;

    assert!(outcome.notice().map(|n| n.text.contains("invalid credentials")).unwrap_or(false));
    assert!(store.load().is_none());
    assert!(app.navigation().is_empty());
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_and_returns_to_login() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("GET", "/api/products", 200, sample_products());
    let store = store_in(tmp.path(), Some(admin()));
    let mut app = App::new(api.client(store.clone()));
    app.navigate("/").await?;

    let Some(MountedPage::Dashboard(page)) = app.page_mut() else { panic!("dashboard not mounted") };
    assert_eq!(page.logout(), ActionOutcome::Applied);
    app.process_navigation().await?;

    assert!(store.load().is_none());
    assert_eq!(app.current(), Some(&PageId::Login));
    Ok(())
}

#[tokio::test]
async fn session_survives_a_new_store_instance() -> Result<()> {
    let tmp = tempdir()?;
    store_in(tmp.path(), Some(admin()));
    let reopened = FileSessionStore::shared(tmp.path());
    assert_eq!(reopened.load(), Some(admin()));
    Ok(())
}
