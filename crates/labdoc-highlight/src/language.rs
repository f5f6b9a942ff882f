//! Language identification.

use std::fmt;

/// Language tags understood by the highlighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    C,
    Css,
    Assembly,
    Shell,
    /// No rule set; output is the escaped input.
    #[default]
    Text,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::C,
        Language::Css,
        Language::Assembly,
        Language::Shell,
        Language::Text,
    ];

    /// Canonical tag (`c`, `css`, `assembly`, `shell`, `text`).
    pub fn tag(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Css => "css",
            Language::Assembly => "assembly",
            Language::Shell => "shell",
            Language::Text => "text",
        }
    }

    /// Name shown in code block headers.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::C => "C",
            Language::Css => "CSS",
            Language::Assembly => "Assembly",
            Language::Shell => "Shell",
            Language::Text => "Text",
        }
    }

    /// Look up a language by tag or common alias, case-insensitively.
    ///
    /// Returns `None` for tags without a known language.
    pub fn from_tag(tag: &str) -> Option<Language> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "c" | "h" => Some(Language::C),
            "css" => Some(Language::Css),
            "assembly" | "asm" | "x86asm" | "nasm" | "gas" | "s" => Some(Language::Assembly),
            "shell" | "sh" | "bash" | "console" | "shell-session" | "zsh" => Some(Language::Shell),
            "text" | "plain" | "plaintext" | "txt" => Some(Language::Text),
            _ => None,
        }
    }

    /// Whether this language has a rule set.
    pub fn has_rules(self) -> bool {
        !matches!(self, Language::Text)
    }
}

/// Header label for an arbitrary tag; unknown tags are shown as "Code".
pub fn display_name_for_tag(tag: &str) -> &'static str {
    Language::from_tag(tag).map_or("Code", Language::display_name)
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
