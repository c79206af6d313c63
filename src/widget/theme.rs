use crate::api::{Dimension, WidgetSettings};
use std::fmt::Write;

const DEFAULT_BORDER_COLOR: &str = "#4667A7";
const LIGHT_BORDER_COLOR: &str = "#464f68";

/// Render the widget's CSS custom properties from shop settings. Only
/// fields the merchant actually configured become variables; the border
/// colors always get a value so the stylesheet has something to resolve.
pub fn css_variables(settings: &WidgetSettings) -> String {
    let mut vars = String::new();

    if let Some(color) = &settings.theme_color {
        push_var(&mut vars, "--bundle-theme-color", color);
        push_var(&mut vars, "--bundle-theme-color-hover", color);
    }
    if let Some(color) = &settings.text_color {
        push_var(&mut vars, "--bundle-text-color", color);
    }
    if let Some(size) = &settings.heading_font_size {
        push_var(&mut vars, "--bundle-heading-font-size", &px(size));
    }
    if let Some(size) = &settings.body_font_size {
        push_var(&mut vars, "--bundle-body-font-size", &px(size));
    }
    if let Some(size) = &settings.border_thickness {
        push_var(&mut vars, "--bundle-border-thickness", &px(size));
    }
    if let Some(size) = &settings.border_radius {
        push_var(&mut vars, "--bundle-border-radius", &px(size));
    }

    push_var(
        &mut vars,
        "--bundle-border-color",
        settings.theme_color.as_deref().unwrap_or(DEFAULT_BORDER_COLOR),
    );
    push_var(&mut vars, "--bundle-border-color-light", LIGHT_BORDER_COLOR);

    format!("<style>:root {{\n{vars}}}</style>")
}

fn push_var(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "  {name}: {value};");
}

/// A bare number or a string without a unit gets a `px` suffix; strings
/// that already mention `px` pass through untouched.
fn px(dimension: &Dimension) -> String {
    match dimension {
        Dimension::Number(value) => format!("{value}px"),
        Dimension::Text(text) if text.contains("px") => text.clone(),
        Dimension::Text(text) => format!("{text}px"),
    }
}
