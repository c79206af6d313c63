use super::{BundleProduct, BundleSpec, WidgetSettings};
use crate::pricing::DiscountType;
use anyhow::{anyhow, bail, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Client for the bundle backend (`/api/fetchBundle`, `/api/settings`).
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct BundleResponse {
    success: bool,
    bundle: Option<ApiBundle>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiBundle {
    #[serde(default)]
    id: String,
    status: bool,
    name: String,
    heading: Option<String>,
    #[serde(rename = "subHeading")]
    sub_heading: Option<String>,
    #[serde(rename = "discountAmount")]
    discount_amount: f64,
    #[serde(rename = "discountType")]
    discount_type: DiscountType,
    bundle_products: Vec<ApiBundleProduct>,
}

#[derive(Debug, Deserialize)]
struct ApiBundleProduct {
    product_id: String,
    handle: String,
}

#[derive(Debug, Deserialize)]
struct SettingsResponse {
    error: Option<String>,
    #[serde(flatten)]
    settings: WidgetSettings,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("bundlefront/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Fetch the bundle configured for a product. Returns `Ok(None)` when the
    /// backend reports no bundle or the bundle is disabled; the widget stays
    /// hidden in that case.
    pub async fn fetch_bundle(&self, product_id: &str, shop: &str) -> Result<Option<BundleSpec>> {
        let url = format!(
            "{}/api/fetchBundle/{}?shop={}",
            self.base_url,
            product_id,
            urlencoding::encode(shop)
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("bundle endpoint returned {}", response.status()));
        }

        let body: BundleResponse = response.json().await?;
        Ok(resolve_bundle(body))
    }

    /// Fetch shop-level widget settings. Any failure here is local: the
    /// caller falls back to defaults and skips the theme variables.
    pub async fn fetch_settings(&self, shop: &str) -> Result<WidgetSettings> {
        let url = format!("{}/api/settings", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "shop": shop }))
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("settings endpoint returned {}", response.status());
        }

        let body: SettingsResponse = response.json().await?;
        if let Some(error) = body.error {
            bail!("settings endpoint error: {}", error);
        }

        Ok(body.settings)
    }
}

/// Map the backend response to a domain bundle, dropping inactive bundles.
fn resolve_bundle(response: BundleResponse) -> Option<BundleSpec> {
    let bundle = match response.bundle {
        Some(bundle) if response.success && bundle.status => bundle,
        _ => {
            warn!(
                reason = response.message.as_deref().unwrap_or("no bundle"),
                "no active bundle for product"
            );
            return None;
        }
    };

    Some(BundleSpec {
        id: bundle.id,
        name: bundle.name,
        heading: bundle.heading,
        sub_heading: bundle.sub_heading,
        discount_amount: bundle.discount_amount,
        discount_type: bundle.discount_type,
        products: bundle
            .bundle_products
            .into_iter()
            .map(|product| BundleProduct {
                product_id: gid_tail(&product.product_id).to_string(),
                handle: product.handle,
            })
            .collect(),
    })
}

/// Trailing path segment of a platform GID (`gid://shopify/Product/42` -> `42`).
fn gid_tail(gid: &str) -> &str {
    gid.rsplit('/').next().unwrap_or(gid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle_json(success: bool, status: bool) -> String {
        format!(
            r#"{{
                "success": {success},
                "bundle": {{
                    "id": "b-1",
                    "status": {status},
                    "name": "Starter Kit",
                    "heading": "Bundle & Save",
                    "subHeading": "Three picks, one price",
                    "discountAmount": 25,
                    "discountType": "percent",
                    "bundle_products": [
                        {{ "product_id": "gid://shopify/Product/111", "handle": "alpha" }},
                        {{ "product_id": "gid://shopify/Product/222", "handle": "beta" }}
                    ]
                }}
            }}"#
        )
    }

    #[test]
    fn test_resolve_active_bundle() {
        let response: BundleResponse = serde_json::from_str(&bundle_json(true, true)).unwrap();
        let bundle = resolve_bundle(response).unwrap();
        assert_eq!(bundle.name, "Starter Kit");
        assert_eq!(bundle.discount_type, DiscountType::Percent);
        assert_eq!(bundle.discount_amount, 25.0);
        assert_eq!(bundle.products.len(), 2);
        assert_eq!(bundle.products[0].product_id, "111");
        assert_eq!(bundle.products[0].handle, "alpha");
    }

    #[test]
    fn test_resolve_rejects_unsuccessful_response() {
        let response: BundleResponse = serde_json::from_str(&bundle_json(false, true)).unwrap();
        assert!(resolve_bundle(response).is_none());
    }

    #[test]
    fn test_resolve_rejects_disabled_bundle() {
        let response: BundleResponse = serde_json::from_str(&bundle_json(true, false)).unwrap();
        assert!(resolve_bundle(response).is_none());
    }

    #[test]
    fn test_resolve_missing_bundle() {
        let response: BundleResponse =
            serde_json::from_str(r#"{"success": false, "message": "No bundle found"}"#).unwrap();
        assert!(resolve_bundle(response).is_none());
    }

    #[test]
    fn test_gid_tail() {
        assert_eq!(gid_tail("gid://shopify/Product/12345"), "12345");
        assert_eq!(gid_tail("12345"), "12345");
    }

    #[test]
    fn test_settings_response_plain() {
        let body: SettingsResponse = serde_json::from_str(
            r##"{"buttonText": "Grab the set", "themeColor": "#112233", "headingFontSize": 18}"##,
        )
        .unwrap();
        assert!(body.error.is_none());
        assert_eq!(body.settings.button_text.as_deref(), Some("Grab the set"));
        assert_eq!(
            body.settings.heading_font_size,
            Some(crate::api::Dimension::Number(18.0))
        );
    }

    #[test]
    fn test_settings_response_error() {
        let body: SettingsResponse =
            serde_json::from_str(r#"{"error": "shop not found"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("shop not found"));
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = BackendClient::new("https://bundles.example.com/");
        assert_eq!(client.base_url, "https://bundles.example.com");
    }
}
