pub mod markup;
pub mod theme;

use crate::api::{BundleProduct, BundleSpec, ProductSnapshot, WidgetSettings};
use crate::pricing::{
    currency_symbol, format_amount, price_bundle, Discount, DiscountType, ItemPricing,
};
use markup::escape;
use std::fmt::Write;

/// Hard-coded layout switch: a three-product bundle renders wide, anything
/// else narrow.
const WIDE_WIDTH_PX: u32 = 720;
const NARROW_WIDTH_PX: u32 = 500;

/// Render the complete widget markup, or `None` when there is nothing to
/// show (no loadable products). Theme variables are emitted only when shop
/// settings were actually fetched.
pub fn render_widget(
    bundle: &BundleSpec,
    products: &[(BundleProduct, ProductSnapshot)],
    settings: Option<&WidgetSettings>,
    currency_code: &str,
) -> Option<String> {
    // A product without variants has no price and nothing to select.
    let products: Vec<&(BundleProduct, ProductSnapshot)> = products
        .iter()
        .filter(|(_, snapshot)| !snapshot.variants.is_empty())
        .collect();

    if products.is_empty() {
        return None;
    }

    let prices: Vec<f64> = products
        .iter()
        .map(|(_, snapshot)| snapshot.variants[0].price)
        .collect();
    let discount = Discount {
        kind: bundle.discount_type,
        amount: bundle.discount_amount,
    };
    let pricing = price_bundle(&prices, discount);
    let currency = currency_symbol(currency_code);

    let mut html = String::new();

    if let Some(settings) = settings {
        html.push_str(&theme::css_variables(settings));
        html.push('\n');
    }

    let _ = writeln!(
        html,
        r#"<div id="sbpbBundle" style="display: block; width: {}px">"#,
        widget_width(products.len())
    );

    if let Some(heading) = &bundle.heading {
        let _ = writeln!(html, r#"  <h2 class="sbpb-heading">{}</h2>"#, escape(heading));
    }
    if let Some(sub_heading) = &bundle.sub_heading {
        let _ = writeln!(
            html,
            r#"  <p class="sbpb-sub-heading">{}</p>"#,
            escape(sub_heading)
        );
    }

    html.push_str("  <div id=\"bundle-widget-container\">\n");
    for ((product, snapshot), item) in products.iter().zip(&pricing.items) {
        html.push_str(&product_block(
            product,
            snapshot,
            item,
            bundle.discount_type,
            currency,
        ));
    }
    html.push_str("  </div>\n");

    html.push_str(&totals_line(
        pricing.total_original,
        pricing.total_discounted,
        currency,
    ));

    html.push_str(&quantity_stepper());
    html.push_str(&submit_button(bundle, &products, settings));
    html.push_str("</div>\n");

    Some(html)
}

pub fn widget_width(product_count: usize) -> u32 {
    if product_count == 3 {
        WIDE_WIDTH_PX
    } else {
        NARROW_WIDTH_PX
    }
}

/// Configured label wins; otherwise the wording scales with bundle size.
pub fn button_label(configured: Option<&str>, product_count: usize) -> String {
    match configured {
        Some(text) => text.to_string(),
        None if product_count > 2 => "Add all to cart".to_string(),
        None => "Add to cart".to_string(),
    }
}

fn product_block(
    product: &BundleProduct,
    snapshot: &ProductSnapshot,
    item: &ItemPricing,
    discount_type: DiscountType,
    currency: &str,
) -> String {
    let image = snapshot.images.first().map(String::as_str).unwrap_or("");
    let title = escape(&snapshot.title);

    // Strikethrough original plus sale price only for percent discounts;
    // fixed discounts show the plain per-item price and take the cut on the
    // total line.
    let price_line = match discount_type {
        DiscountType::Percent => format!(
            r#"<span class="sbpb-original-price">{currency} {}</span> <span class="sbpb-sale-price">{currency} {}</span>"#,
            format_amount(item.original),
            format_amount(item.discounted),
        ),
        DiscountType::Fixed => format!(
            r#"<span class="sbpb-sale-price">{currency} {}</span>"#,
            format_amount(item.original),
        ),
    };

    let options: String = snapshot
        .variants
        .iter()
        .map(|variant| {
            format!(
                r#"<option value="{}">{}</option>"#,
                variant.id,
                escape(&variant.title)
            )
        })
        .collect();

    format!(
        r#"    <div class="sbpb-bundle-product-block" data-handle="{handle}">
      <div class="sbpb-image-section"><img src="{image}" alt="{title}" /></div>
      <div class="sbpb-product-title">{title}</div>
      <div class="sbpb-product-price">{price_line}</div>
      <div class="sbpb-product-variant"><select name="product_variant">{options}</select></div>
    </div>
"#,
        handle = escape(&product.handle),
        image = escape(image),
    )
}

fn totals_line(total_original: f64, total_discounted: f64, currency: &str) -> String {
    format!(
        r#"  <div id="sbpb-total">
    <div class="sbpb-product-price">
      Total: <span class="sbpb-original-price">{currency} {}</span> <span class="sbpb-sale-price">{currency} {}</span>
    </div>
  </div>
"#,
        format_amount(total_original),
        format_amount(total_discounted),
    )
}

fn quantity_stepper() -> String {
    concat!(
        "  <div class=\"sbpb-quantity\">\n",
        "    <button type=\"button\" class=\"sbpb-quantity-down\">-</button>\n",
        "    <input class=\"sbpb-input-quantity\" type=\"number\" value=\"1\" min=\"1\" />\n",
        "    <button type=\"button\" class=\"sbpb-quantity-up\">+</button>\n",
        "  </div>\n",
    )
    .to_string()
}

fn submit_button(
    bundle: &BundleSpec,
    products: &[&(BundleProduct, ProductSnapshot)],
    settings: Option<&WidgetSettings>,
) -> String {
    let product_ids: Vec<&str> = products
        .iter()
        .map(|(product, _)| product.product_id.as_str())
        .collect();
    let label = button_label(
        settings.and_then(|s| s.button_text.as_deref()),
        products.len(),
    );

    format!(
        r#"  <button type="button" class="sbpb-bundle-button"
    data-product-ids="{ids}" data-discount="{amount}"
    data-discount-type="{kind}" data-bundle-name="{name}">
    <span class="button-text">{label}</span><span class="spinner" style="display: none"></span>
  </button>
"#,
        ids = escape(&product_ids.join(",")),
        amount = bundle.discount_amount,
        kind = bundle.discount_type.as_str(),
        name = escape(&bundle.name),
        label = escape(&label),
    )
}
