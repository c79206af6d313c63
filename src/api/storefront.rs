use super::{BundleProduct, ProductSnapshot, ProductSource, ProductVariant};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Product fetches run as a bounded concurrent batch.
const FETCH_CONCURRENCY: usize = 4;

/// Client for the host platform's public product JSON
/// (`{root}products/{handle}.js`).
pub struct StorefrontClient {
    root: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiProduct {
    title: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    variants: Vec<ApiVariant>,
}

#[derive(Debug, Deserialize)]
struct ApiVariant {
    id: u64,
    title: String,
    price: RawPrice,
}

/// Platform prices arrive either as integer minor units (cents) or as a
/// decimal string in major units.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Minor(i64),
    Fraction(f64),
    Text(String),
}

impl RawPrice {
    fn to_major(&self) -> Result<f64> {
        match self {
            RawPrice::Minor(cents) => Ok(*cents as f64 / 100.0),
            RawPrice::Fraction(cents) => Ok(cents / 100.0),
            RawPrice::Text(text) => text
                .trim()
                .parse::<f64>()
                .with_context(|| format!("unparseable price {text:?}")),
        }
    }
}

impl StorefrontClient {
    /// `root` is the platform's routes root, e.g. `/` or
    /// `https://shop.example.com/en/`.
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
}

#[async_trait]
impl ProductSource for StorefrontClient {
    async fn fetch_product(&self, handle: &str) -> Result<ProductSnapshot> {
        let url = format!("{}products/{}.js", self.root, handle);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "product {} returned {}",
                handle,
                response.status()
            ));
        }

        let product: ApiProduct = response.json().await?;
        into_snapshot(product)
    }
}

fn into_snapshot(product: ApiProduct) -> Result<ProductSnapshot> {
    let variants = product
        .variants
        .into_iter()
        .map(|variant| {
            Ok(ProductVariant {
                id: variant.id,
                title: variant.title,
                price: variant.price.to_major()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ProductSnapshot {
        title: product.title,
        images: product.images,
        variants,
    })
}

/// Fetch every bundle product concurrently and join the results back in
/// bundle order, keyed by handle. A failed handle is logged and omitted so
/// pricing and rendering stay aligned with what was actually loaded.
pub async fn fetch_bundle_products(
    source: &dyn ProductSource,
    products: &[BundleProduct],
) -> Vec<(BundleProduct, ProductSnapshot)> {
    let fetched: Vec<(String, Result<ProductSnapshot>)> =
        stream::iter(products.iter().map(|product| async move {
            (
                product.handle.clone(),
                source.fetch_product(&product.handle).await,
            )
        }))
        .buffer_unordered(FETCH_CONCURRENCY)
        .collect()
        .await;

    let mut by_handle: HashMap<String, ProductSnapshot> = HashMap::new();
    for (handle, result) in fetched {
        match result {
            Ok(snapshot) => {
                by_handle.insert(handle, snapshot);
            }
            Err(error) => warn!(%handle, error = %error, "product fetch failed, omitting"),
        }
    }

    products
        .iter()
        .filter_map(|product| {
            by_handle
                .remove(&product.handle)
                .map(|snapshot| (product.clone(), snapshot))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct StubSource {
        failing: Vec<&'static str>,
    }

    #[async_trait]
    impl ProductSource for StubSource {
        async fn fetch_product(&self, handle: &str) -> Result<ProductSnapshot> {
            if self.failing.contains(&handle) {
                bail!("stub failure for {handle}");
            }
            Ok(ProductSnapshot {
                title: handle.to_uppercase(),
                images: vec![],
                variants: vec![ProductVariant {
                    id: 1,
                    title: "Default".into(),
                    price: 10.0,
                }],
            })
        }
    }

    fn bundle_product(handle: &str) -> BundleProduct {
        BundleProduct {
            product_id: handle.len().to_string(),
            handle: handle.to_string(),
        }
    }

    #[test]
    fn test_price_from_minor_units() {
        assert_eq!(RawPrice::Minor(1000).to_major().unwrap(), 10.0);
        assert_eq!(RawPrice::Minor(999).to_major().unwrap(), 9.99);
    }

    #[test]
    fn test_price_from_decimal_string() {
        assert_eq!(RawPrice::Text("10.00".into()).to_major().unwrap(), 10.0);
        assert_eq!(RawPrice::Text(" 19.99 ".into()).to_major().unwrap(), 19.99);
    }

    #[test]
    fn test_price_from_garbage_string_fails() {
        assert!(RawPrice::Text("free".into()).to_major().is_err());
    }

    #[test]
    fn test_api_product_parse() {
        let json = r#"{
            "title": "Alpha Tee",
            "images": ["https://cdn.example.com/a.png"],
            "variants": [
                { "id": 101, "title": "Small", "price": "12.50" },
                { "id": 102, "title": "Large", "price": 1399 }
            ]
        }"#;
        let snapshot = into_snapshot(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(snapshot.title, "Alpha Tee");
        assert_eq!(snapshot.variants[0].price, 12.5);
        assert_eq!(snapshot.variants[1].price, 13.99);
    }

    #[tokio::test]
    async fn test_batch_preserves_bundle_order() {
        let source = StubSource { failing: vec![] };
        let products = vec![
            bundle_product("zulu"),
            bundle_product("alpha"),
            bundle_product("mike"),
        ];
        let loaded = fetch_bundle_products(&source, &products).await;
        let handles: Vec<&str> = loaded
            .iter()
            .map(|(product, _)| product.handle.as_str())
            .collect();
        assert_eq!(handles, vec!["zulu", "alpha", "mike"]);
    }

    #[tokio::test]
    async fn test_batch_omits_failed_handle() {
        let source = StubSource {
            failing: vec!["alpha"],
        };
        let products = vec![
            bundle_product("zulu"),
            bundle_product("alpha"),
            bundle_product("mike"),
        ];
        let loaded = fetch_bundle_products(&source, &products).await;
        let handles: Vec<&str> = loaded
            .iter()
            .map(|(product, _)| product.handle.as_str())
            .collect();
        assert_eq!(handles, vec!["zulu", "mike"]);
        assert_eq!(loaded[0].1.title, "ZULU");
    }
}
