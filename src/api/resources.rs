//! Storefront records and the endpoints that read and change them.
//!
//! Reads are sent with `AuthRequirement::Optional`: the token goes along when
//! there is one. Every mutation uses `AuthRequirement::Required`.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{ApiClient, ApiError, AuthRequirement};
use super::Method;
use crate::error::{AppError, AppResult};

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const PRODUCTS_ENDPOINT: &str = "/api/products";
pub const ANNOUNCEMENTS_ENDPOINT: &str = "/api/announcements";
pub const ORDERS_ENDPOINT: &str = "/api/orders/orders";

/// Product categories offered by the catalogue.
pub const CATEGORIES: [&str; 6] = ["tricouri", "pantaloni", "hanorace", "geci", "shorts", "incaltaminte"];
/// Sizes every new product is listed with.
pub const DEFAULT_SIZES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ImageRepr")]
pub struct ProductImage {
    pub url: String,
    pub label: String,
}

// Older records store images as bare URL strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImageRepr {
    Bare(String),
    Full {
        url: String,
        #[serde(default)]
        label: String,
    },
}

impl From<ImageRepr> for ProductImage {
    fn from(r: ImageRepr) -> Self {
        match r {
            ImageRepr::Bare(url) => ProductImage { url, label: String::new() },
            ImageRepr::Full { url, label } => ProductImage { url, label },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub purchases: u64,
    #[serde(default, rename = "cnfansurl")]
    pub source_url: String,
}

/// Unvalidated form input for a new product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub weight: String,
    pub source_url: String,
    pub images: Vec<ProductImage>,
}

/// Body sent to `POST /api/products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub weight: f64,
    pub images: Vec<ProductImage>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub popular: bool,
    pub purchases: u64,
    #[serde(rename = "cnfansurl")]
    pub source_url: String,
}

fn parse_amount(field: &str, raw: &str) -> AppResult<f64> {
    let v: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::user(format!("invalid_{}", field), format!("{} must be a number, got '{}'", field, raw)))?;
    if !v.is_finite() || v < 0.0 {
        return Err(AppError::user(format!("invalid_{}", field), format!("{} must be zero or more", field)));
    }
    Ok(v)
}

fn required(field: &str, raw: &str) -> AppResult<String> {
    let t = raw.trim();
    if t.is_empty() {
        return Err(AppError::user(format!("missing_{}", field), format!("{} is required", field)));
    }
    Ok(t.to_string())
}

impl ProductDraft {
    pub fn validate(&self) -> AppResult<NewProduct> {
        let name = required("name", &self.name)?;
        let price = parse_amount("price", &self.price)?;
        let description = required("description", &self.description)?;
        let source_url = required("source_url", &self.source_url)?;
        let weight = parse_amount("weight", &self.weight)?;
        let brand = required("brand", &self.brand)?.to_lowercase();
        let category = required("category", &self.category)?.to_lowercase();
        if !CATEGORIES.contains(&category.as_str()) {
            return Err(AppError::user(
                "invalid_category",
                format!("category must be one of: {}", CATEGORIES.join(", ")),
            ));
        }
        if self.images.is_empty() {
            return Err(AppError::user("missing_images", "at least one image is required"));
        }
        for (i, img) in self.images.iter().enumerate() {
            if img.url.trim().is_empty() || img.label.trim().is_empty() {
                return Err(AppError::user("invalid_image", format!("image {} needs both url and label", i + 1)));
            }
        }
        Ok(NewProduct {
            name,
            price,
            description,
            category,
            brand,
            weight,
            images: self.images.clone(),
            sizes: DEFAULT_SIZES.iter().map(|s| s.to_string()).collect(),
            colors: Vec::new(),
            popular: false,
            purchases: 0,
            source_url,
        })
    }
}

/// Partial update for `PUT /api/products/{id}`; unset fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popular: Option<bool>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self == &ProductPatch::default()
    }

    /// Apply the confirmed patch to a local copy.
    pub fn apply_to(&self, p: &mut Product) {
        if let Some(v) = &self.name { p.name = v.clone(); }
        if let Some(v) = self.price { p.price = v; }
        if let Some(v) = &self.description { p.description = v.clone(); }
        if let Some(v) = &self.category { p.category = v.clone(); }
        if let Some(v) = &self.brand { p.brand = v.clone(); }
        if let Some(v) = self.popular { p.popular = v; }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct PopularAck {
    popular: bool,
}

fn item_path(base: &str, id: &str) -> String {
    format!("{}/{}", base, urlencoding::encode(id))
}

pub async fn list_products(client: &ApiClient) -> Result<Vec<Product>, ApiError> {
    client.get(PRODUCTS_ENDPOINT, AuthRequirement::Optional).await
}

pub async fn create_product(client: &ApiClient, product: &NewProduct) -> Result<(), ApiError> {
    let body = serde_json::to_value(product).map_err(|e| ApiError::Decode(e.to_string()))?;
    client.request(Method::POST, PRODUCTS_ENDPOINT, Some(body), AuthRequirement::Required).await.map(|_| ())
}

pub async fn update_product(client: &ApiClient, id: &str, patch: &ProductPatch) -> Result<(), ApiError> {
    let body = serde_json::to_value(patch).map_err(|e| ApiError::Decode(e.to_string()))?;
    client.request(Method::PUT, &item_path(PRODUCTS_ENDPOINT, id), Some(body), AuthRequirement::Required).await.map(|_| ())
}

/// Flip the `popular` flag; returns the value the server stored.
pub async fn set_product_popular(client: &ApiClient, id: &str, popular: bool) -> Result<bool, ApiError> {
    let ack: PopularAck = client
        .send_json(Method::PUT, &item_path(PRODUCTS_ENDPOINT, id), &json!({ "popular": popular }), AuthRequirement::Required)
        .await?;
    Ok(ack.popular)
}

pub async fn delete_product(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.delete(&item_path(PRODUCTS_ENDPOINT, id), AuthRequirement::Required).await
}

pub async fn list_announcements(client: &ApiClient) -> Result<Vec<Announcement>, ApiError> {
    client.get(ANNOUNCEMENTS_ENDPOINT, AuthRequirement::Optional).await
}

/// Publish an announcement; returns the record as stored by the server.
pub async fn add_announcement(client: &ApiClient, message: &str) -> Result<Announcement, ApiError> {
    client
        .send_json(Method::POST, ANNOUNCEMENTS_ENDPOINT, &json!({ "message": message }), AuthRequirement::Required)
        .await
}

pub async fn delete_announcement(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.delete(&item_path(ANNOUNCEMENTS_ENDPOINT, id), AuthRequirement::Required).await
}

pub async fn list_orders(client: &ApiClient) -> Result<Vec<Order>, ApiError> {
    client.get(ORDERS_ENDPOINT, AuthRequirement::Optional).await
}

pub async fn update_order_status(client: &ApiClient, id: &str, status: &str) -> Result<(), ApiError> {
    client
        .request(Method::PUT, &item_path(ORDERS_ENDPOINT, id), Some(json!({ "status": status })), AuthRequirement::Required)
        .await
        .map(|_| ())
}
