use std::fmt;

use labdoc_theme::Category;

use crate::Language;

/// A colored range of the escaped text.
///
/// Offsets are byte offsets into the HTML-escaped source, not the raw
/// source, because every rule runs against the escaped text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset where the span starts (inclusive).
    pub start: usize,
    /// Byte offset where the span ends (exclusive).
    pub end: usize,
    pub category: Category,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Errors raised while building rule tables.
///
/// Highlighting itself never fails; these only surface when a rule or
/// detection pattern is compiled.
#[derive(Debug, Clone)]
pub enum HighlightError {
    InvalidPattern {
        language: Language,
        category: Category,
        message: String,
    },
    InvalidProbe {
        language: Language,
        message: String,
    },
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::InvalidPattern {
                language,
                category,
                message,
            } => write!(f, "invalid {language} pattern for {category}: {message}"),
            HighlightError::InvalidProbe { language, message } => {
                write!(f, "invalid {language} detection pattern: {message}")
            }
        }
    }
}

impl std::error::Error for HighlightError {}
