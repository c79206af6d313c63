use anyhow::{anyhow, Context, Result};
use bundlefront::config::{Config, Overrides};
use bundlefront::pipeline;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bundlefront", version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Product the page is showing
    #[arg(long, global = true)]
    product_id: Option<String>,

    /// Shop domain, e.g. demo.myshopify.com
    #[arg(long, global = true)]
    shop: Option<String>,

    /// Bundle backend base URL
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Platform routes root for product and cart endpoints
    #[arg(long, global = true)]
    platform_root: Option<String>,

    /// Active currency code for price display
    #[arg(long, global = true)]
    currency: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the bundle and print the widget markup
    Render {
        /// Write the markup here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Add the bundle's selected variants to the cart
    AddToCart {
        /// Variant choice per product, as handle=variant_id; unspecified
        /// products fall back to their first variant
        #[arg(long = "variant", value_parser = parse_choice)]
        variants: Vec<(String, u64)>,

        /// Quantity applied to every line
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
}

fn parse_choice(raw: &str) -> Result<(String, u64)> {
    let (handle, id) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected handle=variant_id, got {raw:?}"))?;
    let id = id
        .parse::<u64>()
        .with_context(|| format!("invalid variant id {id:?}"))?;
    Ok((handle.to_string(), id))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let ctx = config.into_context(Overrides {
        product_id: cli.product_id,
        shop_domain: cli.shop,
        backend_url: cli.backend_url,
        platform_root: cli.platform_root,
        currency: cli.currency,
    })?;

    match cli.command {
        Command::Render { output } => {
            match pipeline::render(&ctx).await {
                Some(html) => match output {
                    Some(path) => std::fs::write(&path, html)
                        .with_context(|| format!("failed to write {}", path.display()))?,
                    None => print!("{html}"),
                },
                // No active bundle: the widget simply stays hidden.
                None => tracing::info!(product_id = %ctx.product_id, "no widget to render"),
            }
        }
        Command::AddToCart { variants, quantity } => {
            let choices: HashMap<String, u64> = variants.into_iter().collect();
            let cart_path = pipeline::add_to_cart(&ctx, &choices, quantity).await?;
            println!("{cart_path}");
        }
    }

    Ok(())
}
