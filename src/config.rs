use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Fallback backend used when neither config nor flags name one, matching
/// the hosted bundler deployment.
pub const DEFAULT_BACKEND_URL: &str = "https://startbit-product-bundler.onrender.com";

/// On-disk configuration, all fields optional so flags can fill the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub product_id: Option<String>,
    pub shop_domain: Option<String>,
    pub backend_url: Option<String>,
    pub platform_root: Option<String>,
    pub currency: Option<String>,
}

/// Everything the page bootstrap would normally supply, resolved and
/// validated. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub product_id: String,
    pub shop_domain: String,
    pub backend_url: String,
    pub platform_root: String,
    pub currency: String,
}

impl Config {
    /// Load from an explicit path, or from the default location when one
    /// exists. A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bundlefront").join("config.toml"))
    }

    /// Merge CLI overrides on top of the file and validate the result.
    pub fn into_context(self, overrides: Overrides) -> Result<PageContext> {
        let product_id = match overrides.product_id.or(self.product_id) {
            Some(id) if !id.is_empty() => id,
            _ => bail!("product id is required (flag --product-id or config product_id)"),
        };
        let shop_domain = match overrides.shop_domain.or(self.shop_domain) {
            Some(shop) if !shop.is_empty() => shop,
            _ => bail!("shop domain is required (flag --shop or config shop_domain)"),
        };

        Ok(PageContext {
            product_id,
            shop_domain,
            backend_url: overrides
                .backend_url
                .or(self.backend_url)
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            platform_root: overrides
                .platform_root
                .or(self.platform_root)
                .unwrap_or_else(|| "/".to_string()),
            currency: overrides
                .currency
                .or(self.currency)
                .unwrap_or_else(|| "USD".to_string()),
        })
    }
}

/// CLI-provided values that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub product_id: Option<String>,
    pub shop_domain: Option<String>,
    pub backend_url: Option<String>,
    pub platform_root: Option<String>,
    pub currency: Option<String>,
}
