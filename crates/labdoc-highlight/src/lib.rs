//! Regex-based syntax highlighting for lab documentation.
//!
//! The highlighter knows four languages (`c`, `css`, `assembly`, `shell`).
//! Each has a fixed, ordered table of `(category, pattern)` rules; the
//! colors come from the `light` or `dark` palette in [`labdoc_theme`].
//! Anything else degrades to HTML-escaped text.
//!
//! # Modes
//!
//! - [`HighlightMode::Legacy`] (default): each rule is a global substitution
//!   over the output of the previous rule. A later rule may match inside
//!   markup inserted by an earlier one and the resulting (sometimes
//!   malformed) nesting is part of the output contract.
//! - [`HighlightMode::Strict`]: all rules run over the escaped text once,
//!   overlapping matches are resolved, and every kept match is wrapped
//!   exactly once. Markup is never re-matched.
//!
//! # Quick Start
//!
//! ```rust
//! use labdoc_highlight::{Highlighter, ThemeName};
//!
//! let hl = Highlighter::new();
//! let html = hl.highlight("int main() { return 0; }", None, ThemeName::Light);
//! assert!(html.contains(">int</span>"));
//! ```
//!
//! Highlighting never fails. Unknown language tags give escaped text and
//! unknown theme names (see [`highlight`]) give the light palette.

mod detect;
mod language;
mod render;
pub mod rules;
mod types;

pub use detect::detect;
pub use labdoc_theme::{ColorSchemeSignal, ThemeName, ThemePreference, effective_theme};
pub use language::{Language, display_name_for_tag};
pub use render::{html_escape, render_sequential, resolve_spans, spans_to_html};
pub use types::{HighlightError, Span};

use std::str::FromStr;

/// HTML output format for highlighted spans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HtmlFormat {
    /// Spans carry their color inline: `<span style="color: #d73a49;">`.
    ///
    /// The color depends on the theme, so a theme change means
    /// highlighting again.
    #[default]
    InlineStyle,

    /// Class-based spans: `<span class="keyword">`.
    ClassNames,

    /// Class-based spans with a prefix: `<span class="hl-keyword">`.
    ///
    /// Pair with [`labdoc_theme::generate_theme_css`] using the same prefix.
    ClassNamesWithPrefix(String),
}

/// How rules are applied to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightMode {
    /// Sequential substitution over the growing string.
    #[default]
    Legacy,
    /// Single pass with non-overlapping spans.
    Strict,
}

impl HighlightMode {
    pub fn as_str(self) -> &'static str {
        match self {
            HighlightMode::Legacy => "legacy",
            HighlightMode::Strict => "strict",
        }
    }
}

impl FromStr for HighlightMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(HighlightMode::Legacy),
            "strict" => Ok(HighlightMode::Strict),
            other => Err(format!("unknown highlight mode: {other}")),
        }
    }
}

/// Configuration for highlighting.
#[derive(Debug, Clone, Default)]
pub struct HighlightConfig {
    pub mode: HighlightMode,

    /// HTML output format (inline colors vs class-based spans).
    pub html_format: HtmlFormat,
}

/// Highlighter with a fixed configuration.
///
/// Cheap to construct and to share; the compiled rule tables are global.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    config: HighlightConfig,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HighlightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Resolve an optional tag to a language.
    ///
    /// An absent or blank tag runs [`detect`]; a tag with no known language
    /// is treated as [`Language::Text`].
    pub fn resolve_language(&self, text: &str, tag: Option<&str>) -> Language {
        match tag.map(str::trim).filter(|t| !t.is_empty()) {
            None => detect(text),
            Some(tag) => Language::from_tag(tag).unwrap_or_else(|| {
                tracing::debug!(tag, "no rules for language tag");
                Language::Text
            }),
        }
    }

    /// Highlight `text` as HTML.
    pub fn highlight(&self, text: &str, tag: Option<&str>, theme: ThemeName) -> String {
        let language = self.resolve_language(text, tag);
        self.highlight_language(text, language, theme)
    }

    /// Highlight `text` with an explicit language.
    pub fn highlight_language(&self, text: &str, language: Language, theme: ThemeName) -> String {
        let escaped = html_escape(text);
        let Some(rules) = rules::rule_set(language) else {
            return escaped;
        };

        let palette = theme.palette();
        match self.config.mode {
            HighlightMode::Legacy => {
                render_sequential(&escaped, rules, &self.config.html_format, palette)
            }
            HighlightMode::Strict => {
                let spans = resolve_spans(&escaped, rules);
                spans_to_html(&escaped, &spans, &self.config.html_format, palette)
            }
        }
    }

    /// Highlight against a preference, sampling `signal` now when the
    /// preference is `auto`.
    pub fn highlight_with_preference(
        &self,
        text: &str,
        tag: Option<&str>,
        preference: ThemePreference,
        signal: &dyn ColorSchemeSignal,
    ) -> String {
        self.highlight(text, tag, effective_theme(preference, signal))
    }

    /// The escaped text and its strict-mode spans.
    ///
    /// Span offsets index into the returned string.
    pub fn spans(&self, text: &str, language: Language) -> (String, Vec<Span>) {
        let escaped = html_escape(text);
        let spans = rules::rule_set(language)
            .map(|rules| resolve_spans(&escaped, rules))
            .unwrap_or_default();
        (escaped, spans)
    }
}

/// Highlight with the default configuration.
///
/// `theme` is a theme name; anything other than `light` or `dark` falls
/// back to `light`.
pub fn highlight(text: &str, tag: Option<&str>, theme: &str) -> String {
    Highlighter::new().highlight(text, tag, ThemeName::resolve(theme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use labdoc_theme::FixedScheme;

    #[test]
    fn test_unknown_language_is_escaped() {
        let html = highlight("a < b && c", Some("haskell"), "light");
        assert_eq!(html, "a &lt; b &amp;&amp; c");
    }

    #[test]
    fn test_text_language_is_escaped() {
        let html = highlight("int x;", Some("text"), "dark");
        assert_eq!(html, "int x;");
    }

    #[test]
    fn test_blank_tag_detects() {
        let hl = Highlighter::new();
        assert_eq!(hl.resolve_language("int main() {}", Some("  ")), Language::C);
        assert_eq!(hl.resolve_language("int main() {}", None), Language::C);
        assert_eq!(hl.resolve_language("int main() {}", Some("rust")), Language::Text);
    }

    #[test]
    fn test_unknown_theme_is_light() {
        let text = "int x;";
        assert_eq!(
            highlight(text, Some("c"), "solarized"),
            highlight(text, Some("c"), "light")
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(highlight("", None, "light"), "");
        assert_eq!(highlight("", Some("c"), "dark"), "");
    }

    #[test]
    fn test_c_keywords_and_function() {
        let html = highlight("int main() { return 0; }", None, "light");
        assert!(html.contains("<span style=\"color: #d73a49;\">int</span>"));
        assert!(html.contains("<span style=\"color: #d73a49;\">return</span>"));
        assert!(html.contains("<span style=\"color: #6f42c1;\">main</span>"));
    }

    #[test]
    fn test_preference_samples_signal() {
        let hl = Highlighter::new();
        let text = "int x;";
        let dark = hl.highlight_with_preference(
            text,
            Some("c"),
            ThemePreference::Auto,
            &FixedScheme(true),
        );
        let light = hl.highlight_with_preference(
            text,
            Some("c"),
            ThemePreference::Auto,
            &FixedScheme(false),
        );
        assert!(dark.contains("#f97583"));
        assert!(light.contains("#d73a49"));
    }

    #[test]
    fn test_strict_mode_never_rematches_markup() {
        let hl = Highlighter::with_config(HighlightConfig {
            mode: HighlightMode::Strict,
            html_format: HtmlFormat::ClassNamesWithPrefix("hl".into()),
        });
        let html = hl.highlight(".foo { color: red; }", Some("css"), ThemeName::Dark);
        assert_eq!(
            html,
            "<span class=\"hl-selector\">.foo </span>{ \
             <span class=\"hl-property\">color</span>: \
             <span class=\"hl-value\">red</span>; }"
        );
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Strict".parse::<HighlightMode>(), Ok(HighlightMode::Strict));
        assert!("fast".parse::<HighlightMode>().is_err());
    }
}
