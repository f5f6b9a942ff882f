//! Token category definitions - single source of truth.
//!
//! Every rule table in `labdoc-highlight` classifies matches into one of
//! these categories, and every palette maps a category to a color. The
//! canonical names double as the lookup keys of the palettes, so they keep
//! the spelling the rule tables were written with (`atRule` included).
//!
//! # Architecture
//!
//! 1. **Rule tables** - one ordered list of `(Category, pattern)` per language
//! 2. **Palettes** - one `Category -> color` mapping per theme
//! 3. **HTML** - either an inline `style="color: ..."` or a class name
//!    derived from [`Category::class_suffix`]

use std::fmt;
use std::str::FromStr;

/// A named class of lexical construct, used purely for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Keyword,
    String,
    Comment,
    Number,
    Function,
    Variable,
    Operator,
    Preprocessor,
    /// CSS selectors
    Selector,
    /// CSS property names
    Property,
    /// CSS keyword values
    Value,
    /// CSS dimensions (`12px`, `1.5em`)
    Unit,
    /// CSS `!important`
    Important,
    /// CSS pseudo-classes and pseudo-elements
    Pseudo,
    /// CSS at-rules (`@media`)
    AtRule,
    /// Assembly mnemonics
    Instruction,
    /// Assembly registers
    Register,
    /// Assembly labels
    Label,
    /// Shell commands
    Command,
    /// Shell flags
    Flag,
    /// Filesystem paths
    Path,
}

/// All categories, in declaration order.
pub const CATEGORIES: &[Category] = &[
    Category::Keyword,
    Category::String,
    Category::Comment,
    Category::Number,
    Category::Function,
    Category::Variable,
    Category::Operator,
    Category::Preprocessor,
    Category::Selector,
    Category::Property,
    Category::Value,
    Category::Unit,
    Category::Important,
    Category::Pseudo,
    Category::AtRule,
    Category::Instruction,
    Category::Register,
    Category::Label,
    Category::Command,
    Category::Flag,
    Category::Path,
];

/// Number of token categories.
pub const COUNT: usize = CATEGORIES.len();

impl Category {
    /// Canonical name, as used by palettes.
    pub fn name(self) -> &'static str {
        match self {
            Category::Keyword => "keyword",
            Category::String => "string",
            Category::Comment => "comment",
            Category::Number => "number",
            Category::Function => "function",
            Category::Variable => "variable",
            Category::Operator => "operator",
            Category::Preprocessor => "preprocessor",
            Category::Selector => "selector",
            Category::Property => "property",
            Category::Value => "value",
            Category::Unit => "unit",
            Category::Important => "important",
            Category::Pseudo => "pseudo",
            Category::AtRule => "atRule",
            Category::Instruction => "instruction",
            Category::Register => "register",
            Category::Label => "label",
            Category::Command => "command",
            Category::Flag => "flag",
            Category::Path => "path",
        }
    }

    /// Suffix used for class-based HTML output (`hl-at-rule`).
    pub fn class_suffix(self) -> &'static str {
        match self {
            Category::AtRule => "at-rule",
            other => other.name(),
        }
    }

    /// Look up a category by canonical name or class suffix.
    ///
    /// Plural spellings (`keywords`, `atRules`) are accepted as well.
    pub fn from_name(name: &str) -> Option<Category> {
        let find = |n: &str| {
            CATEGORIES
                .iter()
                .copied()
                .find(|c| c.name() == n || c.class_suffix() == n)
        };
        find(name).or_else(|| name.strip_suffix('s').and_then(find))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown token category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_name(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        for (i, a) in CATEGORIES.iter().enumerate() {
            for b in &CATEGORIES[i + 1..] {
                assert_ne!(a.name(), b.name());
                assert_ne!(a.class_suffix(), b.class_suffix());
            }
        }
    }

    #[test]
    fn test_from_name_round_trip() {
        for &category in CATEGORIES {
            assert_eq!(Category::from_name(category.name()), Some(category));
            assert_eq!(Category::from_name(category.class_suffix()), Some(category));
        }
    }

    #[test]
    fn test_plural_names() {
        assert_eq!(Category::from_name("keywords"), Some(Category::Keyword));
        assert_eq!(Category::from_name("atRules"), Some(Category::AtRule));
        assert_eq!(Category::from_name("pseudos"), Some(Category::Pseudo));
        assert_eq!(Category::from_name("s"), None);
        assert!("bogus".parse::<Category>().is_err());
    }
}
