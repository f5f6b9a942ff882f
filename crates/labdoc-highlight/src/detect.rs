//! Heuristic language detection.
//!
//! The probes are deliberately cheap and run against the raw (unescaped)
//! text. They are checked in a fixed order and the first language with a
//! matching probe wins, so a shell transcript that happens to contain an
//! `#include` line is classified as C.

use std::sync::LazyLock;

use fancy_regex::Regex;

use crate::Language;
use crate::rules::ascii_pattern;
use crate::types::HighlightError;

/// Ordered `(language, probes)` table.
pub const PROBES: &[(Language, &[&str])] = &[
    (
        Language::C,
        &[
            r"(?m)^\s*#include",
            r"void\s+\w+\s*\(",
            r"int\s+main\s*\(",
        ],
    ),
    (
        Language::Assembly,
        &[r"(?m)^\s*[a-zA-Z_]\w*:", r"(?i)\b(mov|push|pop|call|ret)\b"],
    ),
    (
        Language::Shell,
        &[r"(?m)^\s*[a-zA-Z_]\w*\s*%|\$\s*|athena%"],
    ),
    (
        Language::Css,
        &[
            r"(?m)^\s*/\*[\s\S]*?\*/",
            r"[.#]?[a-zA-Z_-][\w-]*\s*\{",
            r"@[a-zA-Z-]+",
            r"\b(background|color|font|margin|padding|width|height|display)\s*:",
        ],
    ),
];

struct Probe {
    language: Language,
    patterns: Vec<Regex>,
}

fn compile_probes() -> Result<Vec<Probe>, HighlightError> {
    PROBES
        .iter()
        .map(|&(language, patterns)| {
            let patterns = patterns
                .iter()
                .map(|p| {
                    Regex::new(&ascii_pattern(p)).map_err(|e| HighlightError::InvalidProbe {
                        language,
                        message: e.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Probe { language, patterns })
        })
        .collect()
}

static COMPILED: LazyLock<Vec<Probe>> = LazyLock::new(|| {
    compile_probes().unwrap_or_else(|e| {
        tracing::error!("language detection disabled: {e}");
        Vec::new()
    })
});

impl Probe {
    fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| match re.is_match(text) {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(language = %self.language, "detection probe failed: {e}");
                false
            }
        })
    }
}

/// Guess the language of `text`.
///
/// Never fails; text that matches no probe is [`Language::Text`].
pub fn detect(text: &str) -> Language {
    let language = COMPILED
        .iter()
        .find(|probe| probe.matches(text))
        .map_or(Language::Text, |probe| probe.language);
    tracing::debug!(%language, len = text.len(), "detected language");
    language
}
