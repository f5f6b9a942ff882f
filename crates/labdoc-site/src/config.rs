//! Site configuration (`labdoc.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use labdoc_highlight::{HighlightConfig, HighlightMode, Highlighter, HtmlFormat};
use labdoc_theme::ThemePreference;
use serde::Deserialize;

use crate::processor::ProcessError;

/// File name looked up in the input directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "labdoc.toml";

/// How rules are applied (`mode = "legacy" | "strict"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSetting {
    #[default]
    Legacy,
    Strict,
}

impl From<ModeSetting> for HighlightMode {
    fn from(mode: ModeSetting) -> Self {
        match mode {
            ModeSetting::Legacy => HighlightMode::Legacy,
            ModeSetting::Strict => HighlightMode::Strict,
        }
    }
}

/// Span markup (`format = "class-names" | "inline-style"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatSetting {
    #[default]
    ClassNames,
    InlineStyle,
}

/// Options for enhancing a documentation site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub syntax_highlight: bool,
    pub copy_button: bool,
    pub line_numbers: bool,
    /// Detect the language of blocks without an explicit one; otherwise
    /// they are treated as plain text.
    pub auto_detect_language: bool,
    pub accessibility: bool,
    pub skip_link: bool,
    /// Floating button that cycles the page theme.
    pub theme_toggle: bool,
    pub mode: ModeSetting,
    pub format: FormatSetting,
    pub class_prefix: String,
    /// Theme written to `<html data-theme>`. `None` uses the stored
    /// preference.
    pub theme: Option<ThemePreference>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            syntax_highlight: true,
            copy_button: true,
            line_numbers: true,
            auto_detect_language: true,
            accessibility: true,
            skip_link: true,
            theme_toggle: true,
            mode: ModeSetting::default(),
            format: FormatSetting::default(),
            class_prefix: "hl".to_string(),
            theme: None,
        }
    }
}

impl SiteConfig {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self, ProcessError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text).map_err(|message| ProcessError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Load the explicit config, or `labdoc.toml` from `input_dir` when it
    /// exists, or the defaults.
    pub fn discover(input_dir: &Path, explicit: Option<&Path>) -> Result<Self, ProcessError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate: PathBuf = input_dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading site config");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// The span format implied by `format` and `class_prefix`.
    pub fn html_format(&self) -> HtmlFormat {
        match self.format {
            FormatSetting::InlineStyle => HtmlFormat::InlineStyle,
            FormatSetting::ClassNames if self.class_prefix.is_empty() => HtmlFormat::ClassNames,
            FormatSetting::ClassNames => HtmlFormat::ClassNamesWithPrefix(self.class_prefix.clone()),
        }
    }

    pub fn highlighter(&self) -> Highlighter {
        Highlighter::with_config(HighlightConfig {
            mode: self.mode.into(),
            html_format: self.html_format(),
        })
    }
}
