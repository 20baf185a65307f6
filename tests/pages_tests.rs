//! Page actions: local state changes only after the remote confirms, and
//! results for an unmounted page are dropped.

mod common;

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tempfile::tempdir;

use common::{admin, sample_products, shopper, store_in, MockApi};
use storefront_admin::api::resources::{ProductImage, ProductPatch};
use storefront_admin::identity::{NavigationQueue, HOME_PATH};
use storefront_admin::pages::{
    ActionOutcome, AddProductPage, AnnouncementsPage, App, DashboardPage, EditProductPage, MountCounter, MountedPage,
    PageContext,
};

fn announcements_api(api: &MockApi) {
    api.respond("GET", "/api/announcements", 200, json!([{"_id": "a1", "message": "Welcome"}]));
    api.respond(
        "GET",
        "/api/orders/orders",
        200,
        json!([{"_id": "o1", "userId": "u7", "total": 210.5, "status": "Asteptam Confirmarea Platii"}]),
    );
}

#[tokio::test]
async fn announcements_page_loads_and_mutates() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    announcements_api(&api);
    api.respond("POST", "/api/announcements", 201, json!({"_id": "a2", "message": "Free shipping"}));
    api.respond("DELETE", "/api/announcements/a1", 200, json!({"ok": true}));
    api.respond("PUT", "/api/orders/orders/o1", 200, json!({"ok": true}));
    let mut page = AnnouncementsPage::new(api.client(store_in(tmp.path(), Some(admin()))), PageContext::detached());

    assert_eq!(page.load().await, ActionOutcome::Applied);
    assert_eq!(page.announcements().len(), 1);
    assert_eq!(page.orders()[0].user_id, "u7");

    assert!(page.add_announcement("  Free shipping ").await.is_applied());
    assert_eq!(page.announcements()[0].id, "a2");

    assert!(page.delete_announcement("a1").await.is_applied());
    assert_eq!(page.announcements().iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), vec!["a2"]);

    assert!(page.change_order_status("o1", "Plata Procesata").await.is_applied());
    assert_eq!(page.orders()[0].status, "Plata Procesata");
    Ok(())
}

#[tokio::test]
async fn failed_status_change_keeps_old_status() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    announcements_api(&api);
    api.respond("PUT", "/api/orders/orders/o1", 500, json!({"message": "boom"}));
    let mut page = AnnouncementsPage::new(api.client(store_in(tmp.path(), Some(admin()))), PageContext::detached());
    page.load().await;

    let outcome = page.change_order_status("o1", "Plata Procesata").await;

    assert!(outcome.notice().is_some());
    assert_eq!(page.orders()[0].status, "Asteptam Confirmarea Platii");
    assert_eq!(page.notice(), outcome.notice());
    Ok(())
}

#[tokio::test]
async fn non_admin_actions_are_denied_locally() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    announcements_api(&api);
    let mut page = AnnouncementsPage::new(api.client(store_in(tmp.path(), Some(shopper()))), PageContext::detached());
    page.load().await;
    let before = api.requests().len();

    let outcome = page.add_announcement("hello").await;

    let notice = outcome.notice().expect("denial notice");
    assert!(notice.text.contains("not authorized"), "{}", notice.text);
    assert_eq!(api.requests().len(), before);
    assert_eq!(page.announcements().len(), 1);
    Ok(())
}

#[tokio::test]
async fn results_for_unmounted_page_are_discarded() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    announcements_api(&api);
    api.respond("POST", "/api/announcements", 201, json!({"_id": "a2", "message": "Late"}));
    let mounts = MountCounter::new();
    let mut page = AnnouncementsPage::new(api.client(store_in(tmp.path(), Some(admin()))), mounts.mount());
    page.load().await;

    mounts.deactivate();
    let outcome = page.add_announcement("Late").await;

    assert_eq!(outcome, ActionOutcome::Discarded);
    assert_eq!(page.announcements().len(), 1);
    assert_eq!(api.requests_to("POST", "/api/announcements").len(), 1);
    Ok(())
}

#[tokio::test]
async fn toggle_popular_applies_server_value() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("GET", "/api/products", 200, sample_products());
    // server refuses to change the flag and reports the stored value
    api.respond("PUT", "/api/products/p1", 200, json!({"_id": "p1", "popular": false}));
    api.respond("PUT", "/api/products/p2", 200, json!({"_id": "p2", "popular": false}));
    let nav = Arc::new(NavigationQueue::new());
    let mut page = DashboardPage::new(api.client(store_in(tmp.path(), Some(admin()))), nav, PageContext::detached());
    page.load().await;

    assert!(page.toggle_popular("p1").await.is_applied());
    assert!(!page.products()[0].popular);
    assert!(page.toggle_popular("p2").await.is_applied());
    assert!(!page.products()[1].popular);

    let sent = api.requests_to("PUT", "/api/products/p1");
    assert_eq!(sent[0].body, Some(json!({"popular": true})));
    Ok(())
}

#[tokio::test]
async fn add_product_validates_before_sending() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("POST", "/api/products", 201, json!({"_id": "p3"}));
    let nav = Arc::new(NavigationQueue::new());
    let mut page = AddProductPage::new(api.client(store_in(tmp.path(), Some(admin()))), nav.clone(), PageContext::detached());

    page.draft.name = "Windbreaker".into();
    page.draft.price = "not a price".into();
    let outcome = page.submit().await;
    assert!(outcome.notice().is_some());
    assert!(api.requests().is_empty());

    page.draft.price = "199".into();
    page.draft.description = "light jacket".into();
    page.draft.category = "geci".into();
    page.draft.brand = "Patagonia".into();
    page.draft.weight = "0.4".into();
    page.draft.source_url = "https://src/jacket".into();
    page.draft.images.push(ProductImage { url: "https://img/j.jpg".into(), label: "front".into() });
    assert_eq!(page.submit().await, ActionOutcome::Applied);

    assert_eq!(nav.pending(), vec![HOME_PATH.to_string()]);
    let sent = api.requests_to("POST", "/api/products");
    let body = sent[0].body.clone().expect("json body");
    assert_eq!(body["brand"], "patagonia");
    assert_eq!(body["cnfansurl"], "https://src/jacket");
    assert_eq!(body["sizes"], json!(["XS", "S", "M", "L", "XL", "XXL"]));
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer t1"));
    Ok(())
}

#[tokio::test]
async fn edit_product_applies_patch_after_confirmation() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("GET", "/api/products", 200, sample_products());
    api.respond("PUT", "/api/products/p2", 200, json!({"ok": true}));
    let nav = Arc::new(NavigationQueue::new());
    let client = api.client(store_in(tmp.path(), Some(admin())));
    let mut page = EditProductPage::new(client, nav, PageContext::detached(), "p2");

    assert!(page.load().await.is_applied());
    let patch = ProductPatch { price: Some(99.0), ..Default::default() };
    assert!(page.save(patch).await.is_applied());

    assert_eq!(page.product().map(|p| p.price), Some(99.0));
    assert_eq!(api.requests_to("PUT", "/api/products/p2")[0].body, Some(json!({"price": 99.0})));
    Ok(())
}

#[tokio::test]
async fn edit_unknown_product_reports_not_found() -> Result<()> {
    let tmp = tempdir()?;
    let api = MockApi::start().await;
    api.respond("GET", "/api/products", 200, sample_products());
    let mut app = App::new(api.client(store_in(tmp.path(), Some(admin()))));

    app.navigate("/edit-product/missing").await?;

    let Some(MountedPage::EditProduct(page)) = app.page() else { panic!("edit page not mounted") };
    assert!(page.product().is_none());
    assert!(page.notice().map(|n| n.text.contains("not found")).unwrap_or(false));
    Ok(())
}
