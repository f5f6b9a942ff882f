//! HTML rendering.
//!
//! Two renderers share the same rule tables:
//!
//! - [`render_sequential`] runs every rule, in declared order, as a global
//!   substitution over the string produced by the previous rule. Later
//!   rules can see (and match inside) the markup injected by earlier ones.
//! - [`resolve_spans`] + [`spans_to_html`] run every rule once over the
//!   escaped text, keep a non-overlapping subset of the matches and wrap
//!   each of them exactly once.

use labdoc_theme::{Category, Palette, class_name};

use crate::HtmlFormat;
use crate::rules::RuleSet;
use crate::types::Span;

const CLOSE: &str = "</span>";

/// Escape HTML special characters.
///
/// The apostrophe is written as `&#x27;` so that numeric rules never see a
/// bare digit run inside an entity.
pub fn html_escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Opening tag for a category in the given format.
fn open_tag(category: Category, format: &HtmlFormat, palette: &Palette) -> String {
    match format {
        HtmlFormat::InlineStyle => {
            format!("<span style=\"color: {};\">", palette.color(category))
        }
        HtmlFormat::ClassNames => format!("<span class=\"{}\">", category.class_suffix()),
        HtmlFormat::ClassNamesWithPrefix(prefix) => {
            format!("<span class=\"{}\">", class_name(prefix, category))
        }
    }
}

/// Legacy renderer: sequential substitution over the growing string.
///
/// `escaped` must already be HTML-escaped.
pub fn render_sequential(
    escaped: &str,
    rules: &RuleSet,
    format: &HtmlFormat,
    palette: &Palette,
) -> String {
    let mut current = escaped.to_string();

    for rule in rules {
        let ranges = rule.find_ranges(&current);
        if ranges.is_empty() {
            continue;
        }

        let open = open_tag(rule.category, format, palette);
        let mut next =
            String::with_capacity(current.len() + ranges.len() * (open.len() + CLOSE.len()));
        let mut last = 0;
        for (start, end) in ranges {
            next.push_str(&current[last..start]);
            next.push_str(&open);
            next.push_str(&current[start..end]);
            next.push_str(CLOSE);
            last = end;
        }
        next.push_str(&current[last..]);
        current = next;
    }

    current
}

/// Strict mode: collect the matches of every rule over `escaped` and keep a
/// non-overlapping subset.
///
/// Candidates are ordered by start offset, then by the rule's position in
/// the table, then longest first. A candidate is kept when it starts at or
/// after the end of the previously kept one. Empty matches are ignored.
pub fn resolve_spans(escaped: &str, rules: &RuleSet) -> Vec<Span> {
    let mut candidates: Vec<(usize, usize, Span)> = Vec::new();
    for (order, rule) in rules.iter().enumerate() {
        for (start, end) in rule.find_ranges(escaped) {
            if start == end {
                continue;
            }
            candidates.push((
                order,
                end - start,
                Span {
                    start,
                    end,
                    category: rule.category,
                },
            ));
        }
    }

    candidates.sort_by(|(order_a, len_a, a), (order_b, len_b, b)| {
        a.start
            .cmp(&b.start)
            .then_with(|| order_a.cmp(order_b))
            .then_with(|| len_b.cmp(len_a))
    });

    let mut accepted = Vec::new();
    let mut last_end = 0;
    for (_, _, span) in candidates {
        if span.start >= last_end {
            last_end = span.end;
            accepted.push(span);
        }
    }
    accepted
}

/// Wrap non-overlapping, sorted spans of `escaped`.
pub fn spans_to_html(
    escaped: &str,
    spans: &[Span],
    format: &HtmlFormat,
    palette: &Palette,
) -> String {
    let mut html = String::with_capacity(escaped.len() + spans.len() * 32);
    let mut last = 0;

    for span in spans {
        if span.start < last || span.end > escaped.len() {
            // Overlapping or out of range; leave as plain text.
            continue;
        }
        html.push_str(&escaped[last..span.start]);
        html.push_str(&open_tag(span.category, format, palette));
        html.push_str(&escaped[span.start..span.end]);
        html.push_str(CLOSE);
        last = span.end;
    }

    html.push_str(&escaped[last..]);
    html
}
