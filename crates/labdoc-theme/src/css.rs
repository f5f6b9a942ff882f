//! CSS generation for class-based highlight output.
//!
//! Class-based spans (`<span class="hl-keyword">`) carry no color of their
//! own; the rules generated here color them per theme. Each palette is
//! scoped to `[data-theme="..."]` on the root element, and `auto` follows
//! the browser's `prefers-color-scheme` media query.

use std::fmt::Write;

use crate::categories::CATEGORIES;
use crate::palette::{Palette, ThemeName};

/// Class name for a category with the given prefix (`hl-at-rule`).
pub fn class_name(prefix: &str, category: crate::Category) -> String {
    if prefix.is_empty() {
        category.class_suffix().to_string()
    } else {
        format!("{prefix}-{}", category.class_suffix())
    }
}

/// Write the rules of one palette under `scope`.
fn write_palette(css: &mut String, scope: &str, prefix: &str, palette: &Palette) {
    for &category in CATEGORIES {
        // Writing to a String cannot fail
        let _ = writeln!(
            css,
            "{scope} .{} {{ color: {}; }}",
            class_name(prefix, category),
            palette.color(category)
        );
    }
}

/// Generate theme CSS for class-based highlight output.
///
/// `light` is also the fallback when no `data-theme` is set.
pub fn generate_theme_css(prefix: &str) -> String {
    let mut css = String::from("/* labdoc syntax highlighting */\n");

    let light = ThemeName::Light.palette();
    let dark = ThemeName::Dark.palette();

    write_palette(&mut css, ":root", prefix, light);
    write_palette(&mut css, "[data-theme=\"light\"]", prefix, light);
    write_palette(&mut css, "[data-theme=\"dark\"]", prefix, dark);

    css.push_str("@media (prefers-color-scheme: dark) {\n");
    write_palette(&mut css, "  [data-theme=\"auto\"]", prefix, dark);
    css.push_str("}\n");

    css
}
