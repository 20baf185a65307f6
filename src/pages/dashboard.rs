use std::sync::Arc;

use tracing::info;

use super::table::render_table;
use super::{gate, settle, ActionOutcome, Notice, PageContext};
use crate::api::resources::{self, Product};
use crate::api::ApiClient;
use crate::identity::{logout, Action, Navigator, LOGIN_PATH};

/// Product list with delete, popularity toggle and logout.
pub struct DashboardPage {
    client: ApiClient,
    navigator: Arc<dyn Navigator>,
    ctx: PageContext,
    products: Vec<Product>,
    loaded: bool,
    notice: Option<Notice>,
}

impl DashboardPage {
    pub fn new(client: ApiClient, navigator: Arc<dyn Navigator>, ctx: PageContext) -> Self {
        Self { client, navigator, ctx, products: Vec::new(), loaded: false, notice: None }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn finish(&mut self, out: ActionOutcome) -> ActionOutcome {
        if let ActionOutcome::Rejected(n) = &out {
            self.notice = Some(n.clone());
        }
        out
    }

    pub async fn load(&mut self) -> ActionOutcome {
        let res = resources::list_products(&self.client).await;
        match settle(&self.ctx, "dashboard", res) {
            Ok(list) => {
                self.products = list;
                self.loaded = true;
                ActionOutcome::Applied
            }
            Err(out) => {
                // a failed load still leaves the page usable
                if out != ActionOutcome::Discarded {
                    self.loaded = true;
                }
                self.finish(out)
            }
        }
    }

    pub async fn delete_product(&mut self, id: &str) -> ActionOutcome {
        if let Err(out) = gate(Action::DeleteProduct, self.client.store().as_ref()) {
            return self.finish(out);
        }
        let res = resources::delete_product(&self.client, id).await;
        match settle(&self.ctx, "dashboard", res) {
            Ok(()) => {
                self.products.retain(|p| p.id != id);
                info!(target: "storefront_admin::pages", "product {} deleted", id);
                self.notice = Some(Notice::info("Product deleted."));
                ActionOutcome::Applied
            }
            Err(out) => self.finish(out),
        }
    }

    /// Flip a product's `popular` flag and keep whatever value the server stored.
    pub async fn toggle_popular(&mut self, id: &str) -> ActionOutcome {
        if let Err(out) = gate(Action::ToggleProductPopular, self.client.store().as_ref()) {
            return self.finish(out);
        }
        let Some(current) = self.products.iter().find(|p| p.id == id).map(|p| p.popular) else {
            return self.finish(ActionOutcome::Rejected(Notice::error(format!("Unknown product '{}'.", id))));
        };
        let res = resources::set_product_popular(&self.client, id, !current).await;
        match settle(&self.ctx, "dashboard", res) {
            Ok(popular) => {
                if let Some(p) = self.products.iter_mut().find(|p| p.id == id) {
                    p.popular = popular;
                }
                ActionOutcome::Applied
            }
            Err(out) => self.finish(out),
        }
    }

    pub fn logout(&mut self) -> ActionOutcome {
        match logout(self.client.store().as_ref()) {
            Ok(()) => {
                self.navigator.push(LOGIN_PATH);
                ActionOutcome::Applied
            }
            Err(e) => self.finish(ActionOutcome::Rejected(Notice::from(&e))),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Admin Dashboard\n");
        if !self.loaded {
            out.push_str("loading...\n");
            return out;
        }
        let rows: Vec<Vec<String>> = self
            .products
            .iter()
            .map(|p| {
                vec![
                    p.id.clone(),
                    p.name.clone(),
                    format!("{:.2}", p.price),
                    p.brand.clone(),
                    if p.popular { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        out.push_str(&render_table(&["id", "name", "price", "brand", "popular"], &rows));
        out.push('\n');
        if let Some(n) = &self.notice {
            out.push_str(&n.to_string());
            out.push('\n');
        }
        out
    }
}
