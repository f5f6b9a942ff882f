//! Theme preference and effective-theme resolution.
//!
//! A [`ThemePreference`] may be symbolic (`auto`). It only becomes a
//! concrete [`ThemeName`] through [`effective_theme`], which asks a
//! [`ColorSchemeSignal`] every time it is called. Nothing here caches the
//! answer, so re-resolving after the host switches color scheme picks up
//! the new value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::palette::ThemeName;

/// The user's theme choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    Auto,
}

impl ThemePreference {
    /// Toggle order: `light -> dark -> auto -> light`.
    pub const CYCLE: [ThemePreference; 3] = [
        ThemePreference::Light,
        ThemePreference::Dark,
        ThemePreference::Auto,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::Auto => "auto",
        }
    }

    /// The preference that follows this one in the toggle cycle.
    pub fn next(self) -> ThemePreference {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Auto,
            ThemePreference::Auto => ThemePreference::Light,
        }
    }

    /// Icon shown on a theme toggle for this preference.
    pub fn icon(self) -> &'static str {
        match self {
            ThemePreference::Light => "☀️",
            ThemePreference::Dark => "🌙",
            ThemePreference::Auto => "🔄",
        }
    }
}

impl From<ThemeName> for ThemePreference {
    fn from(theme: ThemeName) -> Self {
        match theme {
            ThemeName::Light => ThemePreference::Light,
            ThemeName::Dark => ThemePreference::Dark,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPreference(pub String);

impl fmt::Display for UnknownPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown theme preference '{}' (expected light, dark or auto)",
            self.0
        )
    }
}

impl std::error::Error for UnknownPreference {}

impl FromStr for ThemePreference {
    type Err = UnknownPreference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "auto" => Ok(ThemePreference::Auto),
            _ => Err(UnknownPreference(s.to_string())),
        }
    }
}

/// The host environment's dark-mode signal.
///
/// Queried on every resolution of an `auto` preference.
pub trait ColorSchemeSignal {
    /// Whether the host currently prefers a dark color scheme.
    fn prefers_dark(&self) -> bool;
}

impl<F> ColorSchemeSignal for F
where
    F: Fn() -> bool,
{
    fn prefers_dark(&self) -> bool {
        self()
    }
}

/// A signal with a fixed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedScheme(pub bool);

impl ColorSchemeSignal for FixedScheme {
    fn prefers_dark(&self) -> bool {
        self.0
    }
}

/// Reads `LABDOC_COLOR_SCHEME` (`dark` or `light`) on every query.
///
/// An unset or unrecognised value means "light".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvScheme;

impl EnvScheme {
    pub const VAR: &'static str = "LABDOC_COLOR_SCHEME";
}

impl ColorSchemeSignal for EnvScheme {
    fn prefers_dark(&self) -> bool {
        std::env::var(Self::VAR).is_ok_and(|v| v.trim().eq_ignore_ascii_case("dark"))
    }
}

/// Resolve a preference to the theme that should be rendered now.
pub fn effective_theme(preference: ThemePreference, signal: &dyn ColorSchemeSignal) -> ThemeName {
    match preference {
        ThemePreference::Light => ThemeName::Light,
        ThemePreference::Dark => ThemeName::Dark,
        ThemePreference::Auto => {
            if signal.prefers_dark() {
                ThemeName::Dark
            } else {
                ThemeName::Light
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_cycle() {
        assert_eq!(ThemePreference::Light.next(), ThemePreference::Dark);
        assert_eq!(ThemePreference::Dark.next(), ThemePreference::Auto);
        assert_eq!(ThemePreference::Auto.next(), ThemePreference::Light);

        for pref in ThemePreference::CYCLE {
            assert_eq!(pref.next().next().next(), pref);
        }
    }

    #[test]
    fn test_explicit_preferences_ignore_signal() {
        let dark = FixedScheme(true);
        assert_eq!(effective_theme(ThemePreference::Light, &dark), ThemeName::Light);
        assert_eq!(
            effective_theme(ThemePreference::Dark, &FixedScheme(false)),
            ThemeName::Dark
        );
    }

    #[test]
    fn test_auto_samples_signal_each_call() {
        let prefers_dark = Cell::new(false);
        let calls = Cell::new(0);
        let signal = || {
            calls.set(calls.get() + 1);
            prefers_dark.get()
        };

        assert_eq!(effective_theme(ThemePreference::Auto, &signal), ThemeName::Light);
        prefers_dark.set(true);
        assert_eq!(effective_theme(ThemePreference::Auto, &signal), ThemeName::Dark);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_parse() {
        assert_eq!("AUTO".parse::<ThemePreference>(), Ok(ThemePreference::Auto));
        assert_eq!(" dark".parse::<ThemePreference>(), Ok(ThemePreference::Dark));
        assert!("sepia".parse::<ThemePreference>().is_err());
        assert_eq!(ThemePreference::default(), ThemePreference::Auto);
    }
}
