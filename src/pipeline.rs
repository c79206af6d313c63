//! The page-load sequence: bundle, settings, then products, each step
//! degrading on failure instead of aborting the run.

use crate::api::backend::BackendClient;
use crate::api::cart::{self, CartClient, DiscountMetadata};
use crate::api::storefront::{fetch_bundle_products, StorefrontClient};
use crate::api::{BundleProduct, BundleSpec, ProductSnapshot, WidgetSettings};
use crate::config::PageContext;
use crate::widget;
use anyhow::{bail, Result};
use std::collections::HashMap;
use tracing::warn;

/// Everything the renderer and the cart submitter need, loaded once per run.
#[derive(Debug, Clone)]
pub struct LoadedBundle {
    pub bundle: BundleSpec,
    pub settings: Option<WidgetSettings>,
    pub products: Vec<(BundleProduct, ProductSnapshot)>,
}

/// Run the load sequence. `None` means the widget stays hidden: no bundle,
/// a disabled bundle, an empty bundle, or a backend that could not be
/// reached. Settings failures only cost the theme, never the widget.
pub async fn load_widget_data(ctx: &PageContext) -> Option<LoadedBundle> {
    let backend = BackendClient::new(&ctx.backend_url);

    let bundle = match backend.fetch_bundle(&ctx.product_id, &ctx.shop_domain).await {
        Ok(Some(bundle)) => bundle,
        Ok(None) => return None,
        Err(error) => {
            warn!(error = %error, "bundle fetch failed");
            return None;
        }
    };

    if bundle.products.is_empty() {
        return None;
    }

    let settings = match backend.fetch_settings(&ctx.shop_domain).await {
        Ok(settings) => Some(settings),
        Err(error) => {
            warn!(error = %error, "settings fetch failed, using defaults");
            None
        }
    };

    let storefront = StorefrontClient::new(&ctx.platform_root);
    let products = fetch_bundle_products(&storefront, &bundle.products).await;

    Some(LoadedBundle {
        bundle,
        settings,
        products,
    })
}

/// Load and render the widget markup, or `None` when nothing should show.
pub async fn render(ctx: &PageContext) -> Option<String> {
    let loaded = load_widget_data(ctx).await?;
    widget::render_widget(
        &loaded.bundle,
        &loaded.products,
        loaded.settings.as_ref(),
        &ctx.currency,
    )
}

/// The add-to-cart gesture: resolve the selection, post the lines, record
/// the cart attribute, and return the cart path to redirect to.
pub async fn add_to_cart(
    ctx: &PageContext,
    choices: &HashMap<String, u64>,
    quantity: u32,
) -> Result<String> {
    let Some(loaded) = load_widget_data(ctx).await else {
        bail!("no active bundle for product {}", ctx.product_id);
    };

    let selection = cart::resolve_selection(&loaded.products, choices, quantity);
    if selection.is_empty() {
        // Surfaced to the shopper; nothing has gone over the wire yet.
        bail!("Please select variants for all bundle items.");
    }

    let metadata = DiscountMetadata::from_bundle(&loaded.bundle);
    let lines = cart::build_lines(&selection, &metadata.to_json()?, &loaded.bundle.name);

    let client = CartClient::new(&ctx.platform_root);
    client.add_bundle(&lines, &metadata).await
}
