//! Per-language rule tables.
//!
//! Each table is an ordered list of `(Category, pattern)` pairs. The order
//! is part of the output contract: in legacy mode the rules are applied one
//! after another to the same growing string, so reordering a table changes
//! what later rules can see.
//!
//! All patterns run against HTML-escaped text. That is why the string rules
//! look for `&quot;` and `&#x27;` rather than literal quote characters.
//!
//! Word characters are ASCII only: `\w`, `\d` and `\b` are rewritten by
//! `ascii_pattern` before compiling, so `返回return` still has a keyword
//! boundary before `return` and `٣` is not a digit.

use std::sync::LazyLock;

use fancy_regex::Regex;
use labdoc_theme::Category;

use crate::Language;
use crate::types::HighlightError;

/// An uncompiled rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleDef {
    pub category: Category,
    pub pattern: &'static str,
}

const fn rule(category: Category, pattern: &'static str) -> RuleDef {
    RuleDef { category, pattern }
}

const WORD_CLASS: &str = "A-Za-z0-9_";
const WORD_BOUNDARY: &str =
    "(?:(?<=[A-Za-z0-9_])(?![A-Za-z0-9_])|(?<![A-Za-z0-9_])(?=[A-Za-z0-9_]))";

/// Rewrite the `\w`, `\d` and `\b` escapes of `pattern` to their ASCII
/// forms. Other escapes are copied unchanged.
pub(crate) fn ascii_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut chars = pattern.chars();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('w') if in_class => out.push_str(WORD_CLASS),
                Some('w') => {
                    out.push('[');
                    out.push_str(WORD_CLASS);
                    out.push(']');
                }
                Some('d') if in_class => out.push_str("0-9"),
                Some('d') => out.push_str("[0-9]"),
                Some('b') if !in_class => out.push_str(WORD_BOUNDARY),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            '[' if !in_class => {
                in_class = true;
                out.push(c);
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Quoted strings, with backslash escapes, on a single line.
const STRING: &str = r"(&quot;|&#x27;)(?:\\.|[^\\\n])*?\1";

pub const C_RULES: &[RuleDef] = &[
    rule(
        Category::Keyword,
        r"\b(auto|break|case|char|const|continue|default|do|double|else|enum|extern|float|for|goto|if|inline|int|long|register|restrict|return|short|signed|sizeof|static|struct|switch|typedef|union|unsigned|void|volatile|while|_Bool|_Complex|_Imaginary)\b",
    ),
    rule(Category::String, STRING),
    rule(Category::Comment, r"(?m)(/\*[\s\S]*?\*/|//.*$)"),
    rule(
        Category::Number,
        r"\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?[fFlL]?\b",
    ),
    rule(Category::Preprocessor, r"(?m)^\s*#\s*\w+.*$"),
    rule(Category::Function, r"\b([a-zA-Z_]\w*)\s*(?=\()"),
];

pub const CSS_RULES: &[RuleDef] = &[
    rule(
        Category::Selector,
        r"[.#]?[a-zA-Z_-][\w-]*(?:(?:\s*[>+~]\s*[.#]?|[.#])[a-zA-Z_-][\w-]*)*(?:\s*[>+~]\s*)?\s*(?=\{)",
    ),
    rule(
        Category::Property,
        r"\b(background|border|color|display|font|margin|padding|width|height|position|top|left|right|bottom|z-index|opacity|transform|transition|animation|flex|grid|text-align|text-decoration|line-height|letter-spacing|word-spacing|text-transform|white-space|overflow|visibility|float|clear|cursor|box-shadow|border-radius|background-color|background-image|background-size|background-position|background-repeat|font-family|font-size|font-weight|font-style|text-shadow|list-style|outline|resize|user-select|pointer-events|box-sizing|vertical-align|text-indent|min-width|max-width|min-height|max-height)\b",
    ),
    rule(
        Category::Value,
        r"\b(none|auto|inherit|initial|unset|block|inline|inline-block|flex|grid|absolute|relative|fixed|static|sticky|center|left|right|top|bottom|middle|baseline|bold|normal|italic|underline|overline|line-through|uppercase|lowercase|capitalize|nowrap|pre|pre-wrap|pre-line|hidden|visible|scroll|rgba?|hsla?|transparent|solid|dashed|dotted|double|groove|ridge|inset|outset|black|white|red|green|blue|yellow|orange|purple|gray|grey)\b",
    ),
    rule(
        Category::Unit,
        r"\b\d+(?:\.\d+)?(px|em|rem|%|vh|vw|vmin|vmax|pt|pc|in|cm|mm|ex|ch|fr|deg|rad|turn|s|ms)\b",
    ),
    rule(Category::Number, r"#[0-9a-fA-F]{3,8}|\b\d+(?:\.\d+)?\b"),
    rule(Category::String, STRING),
    rule(Category::Comment, r"(/\*[\s\S]*?\*/)"),
    rule(Category::Important, r"!important"),
    rule(Category::Pseudo, r":+[a-zA-Z-]+(?:\([^)]*\))?"),
    rule(Category::AtRule, r"@[a-zA-Z-]+"),
];

pub const ASSEMBLY_RULES: &[RuleDef] = &[
    rule(
        Category::Instruction,
        r"(?i)\b(mov|add|sub|mul|div|push|pop|call|ret|jmp|je|jne|jz|jnz|cmp|test|lea|int|nop|hlt)\b",
    ),
    rule(
        Category::Register,
        r"(?i)\b([er]?[abcd]x|[er]?[sb]p|[er]?[sd]i|r[8-9]|r1[0-5]|[abcd][lh]|[ds]il|[ds]pl|cs|ds|es|fs|gs|ss)\b",
    ),
    rule(Category::Number, r"\b0x[0-9a-fA-F]+\b|\b\d+\b"),
    rule(Category::Label, r"(?m)^\s*\w+:"),
    rule(Category::Comment, r"(?m)(;.*$|/\*[\s\S]*?\*/|//.*$)"),
];

pub const SHELL_RULES: &[RuleDef] = &[
    rule(
        Category::Command,
        r"\b(ls|cd|mkdir|rm|cp|mv|grep|find|cat|echo|pwd|chmod|chown|sudo|ssh|git|make|gcc|gdb|objdump|readelf|hexdump|qemu)\b",
    ),
    rule(Category::Flag, r"\s-+[a-zA-Z0-9-]+"),
    rule(Category::Variable, r"\$\w+|\$\{[^}]+\}"),
    rule(Category::String, STRING),
    rule(Category::Path, r"(?:/[^\s]*|\./[^\s]*|~/[^\s]*)"),
];

/// The rule definitions for a language, empty for [`Language::Text`].
pub fn definitions(language: Language) -> &'static [RuleDef] {
    match language {
        Language::C => C_RULES,
        Language::Css => CSS_RULES,
        Language::Assembly => ASSEMBLY_RULES,
        Language::Shell => SHELL_RULES,
        Language::Text => &[],
    }
}

impl RuleDef {
    pub fn compile(&self, language: Language) -> Result<Rule, HighlightError> {
        let regex =
            Regex::new(&ascii_pattern(self.pattern)).map_err(|e| HighlightError::InvalidPattern {
                language,
                category: self.category,
                message: e.to_string(),
            })?;
        Ok(Rule {
            category: self.category,
            regex,
        })
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub category: Category,
    regex: Regex,
}

impl Rule {
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Byte ranges of every match in `text`, left to right.
    ///
    /// Matching stops at the first runtime failure (e.g. the backtracking
    /// limit); the ranges found up to that point are kept.
    pub fn find_ranges(&self, text: &str) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        for found in self.regex.find_iter(text) {
            match found {
                Ok(m) => ranges.push((m.start(), m.end())),
                Err(e) => {
                    tracing::warn!(
                        category = %self.category,
                        "stopping {} rule early: {e}",
                        self.category
                    );
                    break;
                }
            }
        }
        ranges
    }
}

/// The compiled, ordered rules of one language.
#[derive(Debug, Clone)]
pub struct RuleSet {
    language: Language,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile a table, failing on the first invalid pattern.
    pub fn compile(language: Language, defs: &[RuleDef]) -> Result<RuleSet, HighlightError> {
        let rules = defs
            .iter()
            .map(|def| def.compile(language))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleSet { language, rules })
    }

    /// Compile a table, dropping (and logging) invalid patterns.
    fn compile_lenient(language: Language, defs: &[RuleDef]) -> RuleSet {
        let rules = defs
            .iter()
            .filter_map(|def| match def.compile(language) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    tracing::error!("{e}");
                    None
                }
            })
            .collect();
        RuleSet { language, rules }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Rules in declared order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

static C: LazyLock<RuleSet> = LazyLock::new(|| RuleSet::compile_lenient(Language::C, C_RULES));
static CSS: LazyLock<RuleSet> =
    LazyLock::new(|| RuleSet::compile_lenient(Language::Css, CSS_RULES));
static ASSEMBLY: LazyLock<RuleSet> =
    LazyLock::new(|| RuleSet::compile_lenient(Language::Assembly, ASSEMBLY_RULES));
static SHELL: LazyLock<RuleSet> =
    LazyLock::new(|| RuleSet::compile_lenient(Language::Shell, SHELL_RULES));

/// The shared compiled rule set for a language, if it has one.
pub fn rule_set(language: Language) -> Option<&'static RuleSet> {
    match language {
        Language::C => Some(&*C),
        Language::Css => Some(&*CSS),
        Language::Assembly => Some(&*ASSEMBLY),
        Language::Shell => Some(&*SHELL),
        Language::Text => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tables_compile() {
        for language in Language::ALL {
            let defs = definitions(language);
            let set = RuleSet::compile(language, defs).unwrap();
            assert_eq!(set.len(), defs.len());
        }
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(C_RULES.len(), 6);
        assert_eq!(CSS_RULES.len(), 10);
        assert_eq!(ASSEMBLY_RULES.len(), 5);
        assert_eq!(SHELL_RULES.len(), 5);
        assert!(rule_set(Language::Text).is_none());
    }

    #[test]
    fn test_declared_order_is_kept() {
        let set = rule_set(Language::Shell).unwrap();
        let order: Vec<_> = set.iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            [
                Category::Command,
                Category::Flag,
                Category::Variable,
                Category::String,
                Category::Path,
            ]
        );
    }

    #[test]
    fn test_string_rule_matches_escaped_quotes() {
        let rule = rule(Category::String, STRING).compile(Language::C).unwrap();
        let text = r"x = &quot;a \&quot; b&quot; + &#x27;c&#x27;";
        let found: Vec<_> = rule
            .find_ranges(text)
            .into_iter()
            .map(|(s, e)| &text[s..e])
            .collect();
        assert_eq!(found, [r"&quot;a \&quot; b&quot;", "&#x27;c&#x27;"]);
    }

    #[test]
    fn test_selector_rule() {
        let rule = CSS_RULES[0].compile(Language::Css).unwrap();
        let text = "nav.main &gt; li a:hover, .foo { x }";
        let found: Vec<_> = rule
            .find_ranges(text)
            .into_iter()
            .map(|(s, e)| &text[s..e])
            .collect();
        assert_eq!(found, [".foo "]);

        // Combinators only ever reach the rule escaped, so the span starts
        // after the `&gt;` rather than covering the whole selector.
        let text = "ul.menu &gt; li.item {";
        let found: Vec<_> = rule
            .find_ranges(text)
            .into_iter()
            .map(|(s, e)| &text[s..e])
            .collect();
        assert_eq!(found, ["li.item "]);
    }

    #[test]
    fn test_ascii_pattern() {
        assert_eq!(ascii_pattern(r"\d+"), "[0-9]+");
        assert_eq!(ascii_pattern(r"[\w-]*"), "[A-Za-z0-9_-]*");
        assert_eq!(ascii_pattern(r"\$\w+"), r"\$[A-Za-z0-9_]+");
        assert_eq!(ascii_pattern(r"(a|b)\1\s\\."), r"(a|b)\1\s\\.");
        assert_eq!(ascii_pattern(r"\bint\b"), format!("{WORD_BOUNDARY}int{WORD_BOUNDARY}"));
    }

    #[test]
    fn test_word_rules_are_ascii() {
        let keyword = C_RULES[0].compile(Language::C).unwrap();
        let text = "返回return 0;";
        let found: Vec<_> = keyword
            .find_ranges(text)
            .into_iter()
            .map(|(s, e)| &text[s..e])
            .collect();
        assert_eq!(found, ["return"]);

        let number = C_RULES[3].compile(Language::C).unwrap();
        assert!(number.find_ranges("x = ٣;").is_empty());
        assert_eq!(number.find_ranges("x = 3;"), [(4, 5)]);

        let variable = SHELL_RULES[2].compile(Language::Shell).unwrap();
        assert!(variable.find_ranges("$名前").is_empty());
    }

    #[test]
    fn test_selector_rule_without_brace_terminates() {
        let rule = CSS_RULES[0].compile(Language::Css).unwrap();
        let text = "a".repeat(64) + "-b-c-d-e-f-g-h-i-j-k-l-m-n-o-p";
        assert!(rule.find_ranges(&text).is_empty());
    }
}
