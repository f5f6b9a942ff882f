//! Theme support for labdoc syntax highlighting.
//!
//! This crate provides:
//! - Token category definitions (the canonical list of coloring categories)
//! - The built-in `light` and `dark` palettes
//! - Theme preferences (`light`, `dark`, `auto`) and their resolution
//!   against the host's dark-mode signal
//! - Persistence of the preference under a fixed key
//! - CSS generation for class-based highlight output

pub mod categories;
pub mod css;
pub mod palette;
pub mod preference;
pub mod store;

pub use categories::{CATEGORIES, COUNT, Category, UnknownCategory};
pub use css::{class_name, generate_theme_css};
pub use palette::{Palette, ThemeName, UnknownTheme, builtin};
pub use preference::{
    ColorSchemeSignal, EnvScheme, FixedScheme, ThemePreference, UnknownPreference,
    effective_theme,
};
pub use store::{
    FileStore, MemoryStore, PREFERENCE_KEY, PreferenceStore, ThemeError, load_or_default,
};
