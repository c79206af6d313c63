use super::{BundleProduct, BundleSpec, ProductSnapshot, SelectedVariant};
use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Client for the host platform's cart endpoints (`cart/add.js`,
/// `cart/update.js`).
pub struct CartClient {
    root: String,
    client: reqwest::Client,
}

/// One line item of a `cart/add.js` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub id: u64,
    pub quantity: u32,
    pub properties: LineProperties,
}

/// Per-line side-channel metadata the bundle backend reads back from orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineProperties {
    #[serde(rename = "_bundleDiscount")]
    pub bundle_discount: String,
    #[serde(rename = "bundleName")]
    pub bundle_name: String,
}

/// Serialized into `_bundleDiscount` on each line and on the cart itself.
#[derive(Debug, Clone, Serialize)]
pub struct DiscountMetadata {
    pub ids: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl DiscountMetadata {
    pub fn from_bundle(bundle: &BundleSpec) -> Self {
        Self {
            ids: bundle
                .products
                .iter()
                .map(|product| product.product_id.clone())
                .collect(),
            kind: bundle.discount_type.as_str().to_string(),
            value: bundle.discount_amount.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    items: &'a [CartLine],
}

/// Resolve one variant per loaded product. An explicit choice keyed by
/// handle wins when it names a variant the product actually has; otherwise
/// the first variant is used, matching the selector's default state.
/// Products without variants are skipped. Quantity is shared across all
/// lines and clamped to at least 1.
pub fn resolve_selection(
    products: &[(BundleProduct, ProductSnapshot)],
    choices: &HashMap<String, u64>,
    quantity: u32,
) -> Vec<SelectedVariant> {
    let quantity = quantity.max(1);

    products
        .iter()
        .filter_map(|(product, snapshot)| {
            let chosen = choices
                .get(&product.handle)
                .filter(|id| snapshot.variants.iter().any(|variant| variant.id == **id))
                .copied();
            let variant_id = chosen.or_else(|| snapshot.variants.first().map(|v| v.id))?;
            Some(SelectedVariant {
                variant_id,
                quantity,
            })
        })
        .collect()
}

/// Build the `cart/add.js` line items from a resolved selection.
pub fn build_lines(
    selection: &[SelectedVariant],
    metadata_json: &str,
    bundle_name: &str,
) -> Vec<CartLine> {
    selection
        .iter()
        .map(|selected| CartLine {
            id: selected.variant_id,
            quantity: selected.quantity,
            properties: LineProperties {
                bundle_discount: metadata_json.to_string(),
                bundle_name: bundle_name.to_string(),
            },
        })
        .collect()
}

impl CartClient {
    pub fn new(root: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("bundlefront/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let mut root = root.into();
        if !root.ends_with('/') {
            root.push('/');
        }

        Self { root, client }
    }

    /// Add the bundle's lines to the cart, then record the discount metadata
    /// as a cart-level attribute. Returns the cart page path to redirect to.
    ///
    /// An empty selection aborts before any network call; the caller turns
    /// that error into a user-facing prompt.
    pub async fn add_bundle(
        &self,
        lines: &[CartLine],
        metadata: &DiscountMetadata,
    ) -> Result<String> {
        if lines.is_empty() {
            bail!("no variants selected for the bundle");
        }

        let url = format!("{}cart/add.js", self.root);
        debug!(lines = lines.len(), %url, "adding bundle to cart");

        let response = self
            .client
            .post(&url)
            .json(&AddRequest { items: lines })
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("cart add returned {}", response.status());
        }

        let cart: serde_json::Value = response.json().await?;
        info!(
            items = cart.get("items").and_then(|v| v.as_array()).map(|a| a.len()),
            "cart updated"
        );

        self.update_attributes(metadata).await?;
        Ok(format!("{}cart", self.root))
    }

    async fn update_attributes(&self, metadata: &DiscountMetadata) -> Result<()> {
        let url = format!("{}cart/update.js", self.root);
        let body = serde_json::json!({
            "attributes": { "_bundleDiscount": metadata.to_json()? }
        });

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            bail!("cart attribute update returned {}", response.status());
        }

        debug!("cart attributes updated");
        Ok(())
    }
}
