pub mod backend;
pub mod cart;
pub mod storefront;

use crate::pricing::DiscountType;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Merchant-configured bundle definition, immutable once fetched.
#[derive(Debug, Clone)]
pub struct BundleSpec {
    pub id: String,
    pub name: String,
    pub heading: Option<String>,
    pub sub_heading: Option<String>,
    pub discount_amount: f64,
    pub discount_type: DiscountType,
    pub products: Vec<BundleProduct>,
}

/// One entry of a bundle. `product_id` is the trailing segment of the
/// platform GID (`gid://shopify/Product/123` -> `123`); `handle` keys the
/// storefront product fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleProduct {
    pub product_id: String,
    pub handle: String,
}

/// Shop-level widget theming, all fields optional with render-time defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettings {
    pub button_text: Option<String>,
    pub theme_color: Option<String>,
    pub text_color: Option<String>,
    pub heading_font_size: Option<Dimension>,
    pub body_font_size: Option<Dimension>,
    pub border_thickness: Option<Dimension>,
    pub border_radius: Option<Dimension>,
}

/// Settings sizes arrive either as bare numbers or as strings that may
/// already carry a `px` suffix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Number(f64),
    Text(String),
}

/// Platform-provided product data, one snapshot per bundle product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub title: String,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
}

/// A purchasable variant. `price` is normalized to major currency units.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductVariant {
    pub id: u64,
    pub title: String,
    pub price: f64,
}

/// A shopper's choice for one bundle product, built at add-to-cart time.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedVariant {
    pub variant_id: u64,
    pub quantity: u32,
}

/// Source of product snapshots, keyed by handle. The storefront client is
/// the real implementation; tests drive the pipeline with a stub.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn fetch_product(&self, handle: &str) -> Result<ProductSnapshot>;
}
