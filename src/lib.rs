pub mod api;
pub mod config;
pub mod pipeline;
pub mod pricing;
pub mod widget;

pub use api::{BundleProduct, BundleSpec, ProductSnapshot, ProductSource, WidgetSettings};
pub use config::{Config, Overrides, PageContext};
pub use pricing::{Discount, DiscountType};
