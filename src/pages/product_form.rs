use std::sync::Arc;

use tracing::info;

use super::{gate, settle, ActionOutcome, Notice, PageContext};
use crate::api::resources::{self, Product, ProductDraft, ProductPatch};
use crate::api::ApiClient;
use crate::identity::{Action, Navigator, HOME_PATH};

pub struct AddProductPage {
    client: ApiClient,
    navigator: Arc<dyn Navigator>,
    ctx: PageContext,
    pub draft: ProductDraft,
    notice: Option<Notice>,
}

impl AddProductPage {
    pub fn new(client: ApiClient, navigator: Arc<dyn Navigator>, ctx: PageContext) -> Self {
        Self { client, navigator, ctx, draft: ProductDraft::default(), notice: None }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Validate the draft, create the product and return to the dashboard.
    pub async fn submit(&mut self) -> ActionOutcome {
        if let Err(out) = gate(Action::CreateProduct, self.client.store().as_ref()) {
            return self.reject(out);
        }
        let payload = match self.draft.validate() {
            Ok(p) => p,
            Err(e) => return self.reject(ActionOutcome::Rejected(Notice::from(&e))),
        };
        let res = resources::create_product(&self.client, &payload).await;
        match settle(&self.ctx, "add-product", res) {
            Ok(()) => {
                info!(target: "storefront_admin::pages", "product '{}' created", payload.name);
                self.draft = ProductDraft::default();
                self.notice = Some(Notice::info("Product added."));
                self.navigator.push(HOME_PATH);
                ActionOutcome::Applied
            }
            Err(out) => self.reject(out),
        }
    }

    fn reject(&mut self, out: ActionOutcome) -> ActionOutcome {
        if let ActionOutcome::Rejected(n) = &out {
            self.notice = Some(n.clone());
        }
        out
    }

    pub fn render(&self) -> String {
        let d = &self.draft;
        let mut out = format!(
            "Add Product\n  name: {}\n  price: {}\n  description: {}\n  category: {}\n  brand: {}\n  weight: {}\n  source url: {}\n  images: {}\n",
            d.name, d.price, d.description, d.category, d.brand, d.weight, d.source_url, d.images.len()
        );
        if let Some(n) = &self.notice {
            out.push_str(&n.to_string());
            out.push('\n');
        }
        out
    }
}

/// Edits one product found in the catalogue listing.
pub struct EditProductPage {
    client: ApiClient,
    navigator: Arc<dyn Navigator>,
    ctx: PageContext,
    product_id: String,
    product: Option<Product>,
    notice: Option<Notice>,
}

impl EditProductPage {
    pub fn new(client: ApiClient, navigator: Arc<dyn Navigator>, ctx: PageContext, product_id: impl Into<String>) -> Self {
        Self { client, navigator, ctx, product_id: product_id.into(), product: None, notice: None }
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub async fn load(&mut self) -> ActionOutcome {
        let res = resources::list_products(&self.client).await;
        match settle(&self.ctx, "edit-product", res) {
            Ok(list) => match list.into_iter().find(|p| p.id == self.product_id) {
                Some(p) => {
                    self.product = Some(p);
                    ActionOutcome::Applied
                }
                None => {
                    let n = Notice::error(format!("Product '{}' not found.", self.product_id));
                    self.notice = Some(n.clone());
                    ActionOutcome::Rejected(n)
                }
            },
            Err(out) => {
                if let ActionOutcome::Rejected(n) = &out {
                    self.notice = Some(n.clone());
                }
                out
            }
        }
    }

    pub async fn save(&mut self, patch: ProductPatch) -> ActionOutcome {
        if let Err(out) = gate(Action::UpdateProduct, self.client.store().as_ref()) {
            if let ActionOutcome::Rejected(n) = &out {
                self.notice = Some(n.clone());
            }
            return out;
        }
        if patch.is_empty() {
            let n = Notice::error("Nothing to update.");
            self.notice = Some(n.clone());
            return ActionOutcome::Rejected(n);
        }
        let res = resources::update_product(&self.client, &self.product_id, &patch).await;
        match settle(&self.ctx, "edit-product", res) {
            Ok(()) => {
                if let Some(p) = self.product.as_mut() {
                    patch.apply_to(p);
                }
                self.notice = Some(Notice::info("Product updated."));
                self.navigator.push(HOME_PATH);
                ActionOutcome::Applied
            }
            Err(out) => {
                if let ActionOutcome::Rejected(n) = &out {
                    self.notice = Some(n.clone());
                }
                out
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("Edit Product {}\n", self.product_id);
        match &self.product {
            Some(p) => out.push_str(&format!(
                "  name: {}\n  price: {:.2}\n  category: {}\n  brand: {}\n  popular: {}\n",
                p.name, p.price, p.category, p.brand, p.popular
            )),
            None => out.push_str("  (not loaded)\n"),
        }
        if let Some(n) = &self.notice {
            out.push_str(&n.to_string());
            out.push('\n');
        }
        out
    }
}
