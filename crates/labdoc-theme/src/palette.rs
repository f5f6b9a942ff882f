//! Theme palettes: one `Category -> color` table per theme.

use std::fmt;
use std::str::FromStr;

use crate::categories::Category;

/// A concrete visual theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
}

impl ThemeName {
    /// All themes with a palette.
    pub const ALL: [ThemeName; 2] = [ThemeName::Light, ThemeName::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Light => "light",
            ThemeName::Dark => "dark",
        }
    }

    /// Resolve a theme name, falling back to [`ThemeName::Light`] for
    /// anything that is not a known theme.
    pub fn resolve(name: &str) -> ThemeName {
        name.parse().unwrap_or_else(|_| {
            tracing::debug!(theme = name, "unknown theme, using light");
            ThemeName::Light
        })
    }

    /// The palette for this theme.
    pub fn palette(self) -> &'static Palette {
        match self {
            ThemeName::Light => &builtin::LIGHT,
            ThemeName::Dark => &builtin::DARK,
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown theme name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme: {}", self.0)
    }
}

impl std::error::Error for UnknownTheme {}

impl FromStr for ThemeName {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeName::Light),
            "dark" => Ok(ThemeName::Dark),
            _ => Err(UnknownTheme(s.to_string())),
        }
    }
}

/// A mapping from token category to display color for one theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub is_dark: bool,
    colors: &'static [(Category, &'static str)],
}

impl Palette {
    pub const fn new(
        name: &'static str,
        is_dark: bool,
        colors: &'static [(Category, &'static str)],
    ) -> Self {
        Self {
            name,
            is_dark,
            colors,
        }
    }

    /// The explicit color for `category`, if this palette defines one.
    pub fn get(&self, category: Category) -> Option<&'static str> {
        self.colors
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, color)| *color)
    }

    /// The color for `category`, falling back to the keyword color.
    pub fn color(&self, category: Category) -> &'static str {
        self.get(category)
            .or_else(|| self.get(Category::Keyword))
            .unwrap_or("inherit")
    }

    /// Explicit entries, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (Category, &'static str)> + '_ {
        self.colors.iter().copied()
    }
}

/// Built-in palettes.
pub mod builtin {
    use super::Palette;
    use crate::categories::Category;

    pub static LIGHT: Palette = Palette::new(
        "light",
        false,
        &[
            (Category::Keyword, "#d73a49"),
            (Category::String, "#032f62"),
            (Category::Comment, "#6a737d"),
            (Category::Number, "#005cc5"),
            (Category::Function, "#6f42c1"),
            (Category::Variable, "#e36209"),
            (Category::Operator, "#d73a49"),
            (Category::Preprocessor, "#735c0f"),
            (Category::Selector, "#6f42c1"),
            (Category::Property, "#005cc5"),
            (Category::Value, "#e36209"),
            (Category::Unit, "#005cc5"),
            (Category::Important, "#d73a49"),
            (Category::Pseudo, "#6f42c1"),
            (Category::AtRule, "#d73a49"),
        ],
    );

    pub static DARK: Palette = Palette::new(
        "dark",
        true,
        &[
            (Category::Keyword, "#f97583"),
            (Category::String, "#9ecbff"),
            (Category::Comment, "#6a737d"),
            (Category::Number, "#79b8ff"),
            (Category::Function, "#b392f0"),
            (Category::Variable, "#ffab70"),
            (Category::Operator, "#f97583"),
            (Category::Preprocessor, "#e1e4e8"),
            (Category::Selector, "#b392f0"),
            (Category::Property, "#79b8ff"),
            (Category::Value, "#ffab70"),
            (Category::Unit, "#79b8ff"),
            (Category::Important, "#f97583"),
            (Category::Pseudo, "#b392f0"),
            (Category::AtRule, "#f97583"),
        ],
    );

    pub fn light() -> &'static Palette {
        &LIGHT
    }

    pub fn dark() -> &'static Palette {
        &DARK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::CATEGORIES;

    #[test]
    fn test_resolve_falls_back_to_light() {
        assert_eq!(ThemeName::resolve("dark"), ThemeName::Dark);
        assert_eq!(ThemeName::resolve(" Dark "), ThemeName::Dark);
        assert_eq!(ThemeName::resolve("solarized"), ThemeName::Light);
        assert_eq!(ThemeName::resolve(""), ThemeName::Light);
    }

    #[test]
    fn test_keyword_fallback() {
        let light = builtin::light();
        assert_eq!(light.get(Category::Register), None);
        assert_eq!(light.color(Category::Register), "#d73a49");
        assert_eq!(builtin::dark().color(Category::Command), "#f97583");
    }

    #[test]
    fn test_every_category_has_a_color() {
        for theme in ThemeName::ALL {
            let palette = theme.palette();
            for &category in CATEGORIES {
                let color = palette.color(category);
                assert!(color.starts_with('#'), "{theme}/{category}: {color}");
                assert_eq!(color.len(), 7);
            }
        }
    }

    #[test]
    fn test_palettes_cover_the_same_categories() {
        let light: Vec<_> = builtin::LIGHT.entries().map(|(c, _)| c).collect();
        let dark: Vec<_> = builtin::DARK.entries().map(|(c, _)| c).collect();
        assert_eq!(light, dark);
    }
}
