//! Response shapes for a storefront's public `products.json` endpoint.
//!
//! Only the fields a listing needs are modelled; serde ignores the rest.
//! Observed quirks:
//! - `images` may be empty and `image` absent on products that only have
//!   variant-level media.
//! - `price` is a decimal string (`"24.00"`), never a number.
//! - `position` on variants is 1-based; `1` is the storefront default.

use serde::Deserialize;

/// Top-level response from `GET /products.json`.
#[derive(Debug, Deserialize)]
pub struct ProductsPage {
    pub products: Vec<StoreProduct>,
}

#[derive(Debug, Deserialize)]
pub struct StoreProduct {
    pub id: i64,
    pub title: String,
    /// URL slug, e.g. `"ice-roller-for-face"`.
    pub handle: String,
    #[serde(default)]
    pub image: Option<StoreImage>,
    #[serde(default)]
    pub images: Vec<StoreImage>,
    #[serde(default)]
    pub variants: Vec<StoreVariant>,
}

#[derive(Debug, Deserialize)]
pub struct StoreVariant {
    pub id: i64,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct StoreImage {
    pub src: String,
    #[serde(default)]
    pub position: Option<i32>,
}
