use serde::Deserialize;

/// How a bundle's discount is applied across its products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Each product is reduced by the same percentage.
    Percent,
    /// A flat amount is split evenly across the bundle's products.
    #[serde(alias = "fix")]
    Fixed,
}

impl DiscountType {
    /// Wire spelling used by the backend and carried into cart metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percent => "percent",
            DiscountType::Fixed => "fix",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discount {
    pub kind: DiscountType,
    pub amount: f64,
}

/// Original and discounted price of a single bundle item, in major units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPricing {
    pub original: f64,
    pub discounted: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BundlePricing {
    pub items: Vec<ItemPricing>,
    pub total_original: f64,
    pub total_discounted: f64,
}

/// Price a bundle: per-item discounted prices plus the aggregate totals.
///
/// For a percent discount the total is the sum of the per-item discounted
/// prices. For a fixed discount the total is `sum(original) - amount` and the
/// per-item split (`amount / n`) is presentation only; the two agree by
/// construction.
pub fn price_bundle(prices: &[f64], discount: Discount) -> BundlePricing {
    if prices.is_empty() {
        return BundlePricing {
            items: Vec::new(),
            total_original: 0.0,
            total_discounted: 0.0,
        };
    }

    let per_item_cut = |price: f64| match discount.kind {
        DiscountType::Percent => price * discount.amount / 100.0,
        DiscountType::Fixed => discount.amount / prices.len() as f64,
    };

    let items: Vec<ItemPricing> = prices
        .iter()
        .map(|&price| ItemPricing {
            original: price,
            discounted: price - per_item_cut(price),
        })
        .collect();

    let total_original: f64 = prices.iter().sum();
    let total_discounted = match discount.kind {
        DiscountType::Percent => items.iter().map(|item| item.discounted).sum(),
        DiscountType::Fixed => total_original - discount.amount,
    };

    BundlePricing {
        items,
        total_original,
        total_discounted,
    }
}

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Display formatting applied only at render time.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", round2(value))
}

/// Map an ISO currency code to its display symbol, falling back to the code.
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" | "CAD" | "AUD" | "NZD" | "SGD" | "HKD" | "MXN" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "INR" => "₹",
        "KRW" => "₩",
        "BRL" => "R$",
        "CHF" => "CHF",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent(amount: f64) -> Discount {
        Discount {
            kind: DiscountType::Percent,
            amount,
        }
    }

    fn fixed(amount: f64) -> Discount {
        Discount {
            kind: DiscountType::Fixed,
            amount,
        }
    }

    #[test]
    fn test_percent_discount_per_item() {
        let pricing = price_bundle(&[10.0, 20.0], percent(25.0));
        assert_eq!(pricing.items[0].discounted, 7.5);
        assert_eq!(pricing.items[1].discounted, 15.0);
        assert_eq!(pricing.total_original, 30.0);
        assert_eq!(pricing.total_discounted, 22.5);
    }

    #[test]
    fn test_percent_total_matches_scaled_sum() {
        let prices = [3.33, 7.77, 12.5, 0.99];
        let pricing = price_bundle(&prices, percent(15.0));
        let expected: f64 = prices.iter().sum::<f64>() * 0.85;
        assert!((pricing.total_discounted - expected).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_discount_end_to_end() {
        let pricing = price_bundle(&[9.99, 19.99, 5.0], fixed(5.0));
        assert!((pricing.total_original - 34.98).abs() < 1e-9);
        assert!((pricing.total_discounted - 29.98).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_per_item_cuts_sum_to_amount() {
        let pricing = price_bundle(&[9.99, 19.99, 5.0], fixed(5.0));
        let total_cut: f64 = pricing
            .items
            .iter()
            .map(|item| item.original - item.discounted)
            .sum();
        assert!((total_cut - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_totals_reconcile_with_items() {
        let pricing = price_bundle(&[12.34, 56.78], fixed(7.0));
        let item_sum: f64 = pricing.items.iter().map(|item| item.discounted).sum();
        assert!((pricing.total_discounted - item_sum).abs() < 1e-9);
    }

    #[test]
    fn test_empty_bundle_prices_to_zero() {
        let pricing = price_bundle(&[], fixed(5.0));
        assert!(pricing.items.is_empty());
        assert_eq!(pricing.total_original, 0.0);
        assert_eq!(pricing.total_discounted, 0.0);
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        // .125 is exact in binary, so the half-way case is genuine
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(7.494), 7.49);
    }

    #[test]
    fn test_format_amount_two_places() {
        assert_eq!(format_amount(7.5), "7.50");
        assert_eq!(format_amount(10.0), "10.00");
        assert_eq!(format_amount(22.499999999), "22.50");
    }

    #[test]
    fn test_discount_type_wire_spellings() {
        assert_eq!(
            serde_json::from_str::<DiscountType>("\"percent\"").unwrap(),
            DiscountType::Percent
        );
        assert_eq!(
            serde_json::from_str::<DiscountType>("\"fix\"").unwrap(),
            DiscountType::Fixed
        );
        assert_eq!(
            serde_json::from_str::<DiscountType>("\"fixed\"").unwrap(),
            DiscountType::Fixed
        );
    }

    #[test]
    fn test_currency_symbol_known_and_fallback() {
        assert_eq!(currency_symbol("USD"), "$");
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("SEK"), "SEK");
    }
}
