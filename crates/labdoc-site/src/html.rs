//! HTML page transformation.
//!
//! Each page goes through `lol_html` twice. The first pass only collects
//! what the rewrite needs to know up front: the text and explicit language
//! of every `<pre>`, whether it holds a `<kbd>` or a `<code>`, and which
//! exercise blocks contain a `.header`. The second pass wraps, highlights
//! and labels using that scan.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use labdoc_highlight::{Highlighter, Language, ThemeName, detect, display_name_for_tag};
use labdoc_theme::ThemePreference;
use lol_html::errors::RewritingError;
use lol_html::html_content::{ContentType, Element, EndTag};
use lol_html::{
    EndTagHandler, HandlerResult, RewriteStrSettings, element, rewrite_str, text,
};

use crate::config::SiteConfig;
use crate::css::STYLE_ID;
use crate::script::{script_element, theme_toggle_button};

/// Everything a page rewrite needs besides the page itself.
#[derive(Debug, Clone, Copy)]
pub struct TransformOptions<'a> {
    pub config: &'a SiteConfig,
    pub highlighter: &'a Highlighter,
    /// Written to `<html data-theme>`.
    pub preference: ThemePreference,
    /// Palette used when spans carry inline colors.
    pub theme: ThemeName,
    /// The complete `<style>` element appended to `<head>`.
    pub style_element: &'a str,
}

/// What happened to one page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransformResult {
    /// Blocks whose content was replaced by highlighted HTML.
    pub blocks_highlighted: usize,
    /// Blocks that were wrapped but not highlighted.
    pub blocks_wrapped: usize,
    /// Blocks already marked `data-enhanced`.
    pub blocks_skipped: usize,
    /// Explicit language tags without rules, in order of appearance.
    pub unknown_languages: Vec<String>,
    /// The page already carried the labdoc stylesheet and was left alone.
    pub already_enhanced: bool,
}

/// Error from the HTML rewriter.
#[derive(Debug)]
pub struct TransformError(RewritingError);

impl From<RewritingError> for TransformError {
    fn from(e: RewritingError) -> Self {
        TransformError(e)
    }
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTML rewriting failed: {}", self.0)
    }
}

impl std::error::Error for TransformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

#[derive(Debug, Default)]
struct BlockScan {
    enhanced: bool,
    has_kbd: bool,
    has_code: bool,
    language: Option<String>,
    pre_text: String,
    code_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExerciseKind {
    Required,
    Challenge,
    Question,
}

impl ExerciseKind {
    fn from_class(class: &str) -> ExerciseKind {
        let has = |name: &str| class.split_ascii_whitespace().any(|c| c == name);
        if has("required") {
            ExerciseKind::Required
        } else if has("challenge") {
            ExerciseKind::Challenge
        } else {
            ExerciseKind::Question
        }
    }

    fn label(self) -> &'static str {
        match self {
            ExerciseKind::Required => "Required exercise",
            ExerciseKind::Challenge => "Challenge exercise",
            ExerciseKind::Question => "Question",
        }
    }
}

#[derive(Debug)]
struct ExerciseScan {
    kind: ExerciseKind,
    has_header: bool,
}

#[derive(Debug, Default)]
struct PageScan {
    blocks: Vec<BlockScan>,
    exercises: Vec<ExerciseScan>,
    has_styles: bool,
}

const EXERCISE_SELECTOR: &str = ".required, .challenge, .question";

/// Explicit language of an element: `data-language`, else a
/// `language-*` class.
fn explicit_language(el: &Element<'_, '_>) -> Option<String> {
    if let Some(lang) = el.get_attribute("data-language") {
        let lang = lang.trim();
        if !lang.is_empty() {
            return Some(lang.to_string());
        }
    }
    el.get_attribute("class").and_then(|class| {
        class
            .split_ascii_whitespace()
            .find_map(|c| c.strip_prefix("language-"))
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
    })
}

fn scan_page(html: &str) -> Result<PageScan, TransformError> {
    let scan = RefCell::new(PageScan::default());
    let open_exercises: Rc<RefCell<Vec<usize>>> = Rc::default();
    let style_selector = format!("style#{STYLE_ID}");

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(style_selector, |_el| {
                    scan.borrow_mut().has_styles = true;
                    Ok(())
                }),
                element!("pre", |el| {
                    scan.borrow_mut().blocks.push(BlockScan {
                        enhanced: el.has_attribute("data-enhanced"),
                        language: explicit_language(el),
                        ..BlockScan::default()
                    });
                    Ok(())
                }),
                element!("pre code", |el| {
                    if let Some(block) = scan.borrow_mut().blocks.last_mut() {
                        if !block.has_code {
                            block.has_code = true;
                            if block.language.is_none() {
                                block.language = explicit_language(el);
                            }
                        }
                    }
                    Ok(())
                }),
                element!("pre kbd", |_el| {
                    if let Some(block) = scan.borrow_mut().blocks.last_mut() {
                        block.has_kbd = true;
                    }
                    Ok(())
                }),
                text!("pre", |t| {
                    if let Some(block) = scan.borrow_mut().blocks.last_mut() {
                        block.pre_text.push_str(t.as_str());
                    }
                    Ok(())
                }),
                text!("pre code", |t| {
                    if let Some(block) = scan.borrow_mut().blocks.last_mut() {
                        block.code_text.push_str(t.as_str());
                    }
                    Ok(())
                }),
                element!(EXERCISE_SELECTOR, |el: &mut Element| {
                    let kind = ExerciseKind::from_class(&el.get_attribute("class").unwrap_or_default());
                    let index = {
                        let mut scan = scan.borrow_mut();
                        scan.exercises.push(ExerciseScan {
                            kind,
                            has_header: false,
                        });
                        scan.exercises.len() - 1
                    };
                    if let Some(handlers) = el.end_tag_handlers() {
                        open_exercises.borrow_mut().push(index);
                        let open = Rc::clone(&open_exercises);
                        let on_close: EndTagHandler<'static> =
                            Box::new(move |_end: &mut EndTag<'_>| -> HandlerResult {
                                open.borrow_mut().retain(|&i| i != index);
                                Ok(())
                            });
                        handlers.push(on_close);
                    }
                    Ok(())
                }),
                element!(".header", |_el| {
                    let mut scan = scan.borrow_mut();
                    for &index in open_exercises.borrow().iter() {
                        scan.exercises[index].has_header = true;
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )?;

    Ok(scan.into_inner())
}

/// Decode the character references that can appear in `<pre>` text.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match decode_reference(rest) {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decode one reference at the start of `s` (which begins with `&`),
/// returning the character and the number of bytes consumed.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    let end = s.bytes().take(12).position(|b| b == b';')?;
    let name = &s[1..end];
    let c = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(|c| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((c, end + 1))
}

/// How one `<pre>` is rewritten.
#[derive(Debug, Default)]
struct BlockPlan {
    open: String,
    close: String,
    attributes: Vec<(&'static str, String)>,
    content: Option<String>,
    content_in_code: bool,
}

fn code_header(label: &str, config: &SiteConfig) -> String {
    let mut header = format!("<div class=\"code-header\"><span class=\"code-language\">{label}</span>");
    if config.copy_button {
        let tabindex = if config.accessibility { " tabindex=\"0\"" } else { "" };
        header.push_str(&format!(
            "<button class=\"code-copy-btn\" type=\"button\" data-tooltip=\"Copy code\"{tabindex}>Copy</button>"
        ));
    }
    header.push_str("</div>");
    header
}

fn line_numbers(text: &str) -> String {
    let mut gutter = String::from("<div class=\"line-numbers\">");
    for n in 1..=text.split('\n').count() {
        gutter.push_str(&format!("<span class=\"line-number\">{n}</span>"));
    }
    gutter.push_str("</div>");
    gutter
}

fn plan_blocks(
    blocks: &[BlockScan],
    options: &TransformOptions<'_>,
    result: &mut TransformResult,
) -> Vec<BlockPlan> {
    let config = options.config;

    blocks
        .iter()
        .map(|block| {
            if block.enhanced {
                result.blocks_skipped += 1;
                return BlockPlan::default();
            }

            if block.has_kbd {
                result.blocks_wrapped += 1;
                return BlockPlan {
                    open: format!(
                        "<div class=\"code-block-wrapper\">{}",
                        code_header(Language::Shell.display_name(), config)
                    ),
                    close: "</div>".to_string(),
                    attributes: vec![("data-enhanced", "true".to_string())],
                    ..BlockPlan::default()
                };
            }

            let raw = if block.has_code {
                &block.code_text
            } else {
                &block.pre_text
            };
            let text = decode_entities(raw);

            let tag = match &block.language {
                Some(tag) => {
                    let tag = tag.to_ascii_lowercase();
                    match Language::from_tag(&tag) {
                        Some(language) => language.tag().to_string(),
                        None => {
                            if !result.unknown_languages.contains(&tag) {
                                result.unknown_languages.push(tag.clone());
                            }
                            tag
                        }
                    }
                }
                None if config.auto_detect_language => detect(&text).tag().to_string(),
                None => Language::Text.tag().to_string(),
            };

            let mut open = format!(
                "<div class=\"code-block-wrapper\">{}<div class=\"code-content\">",
                code_header(display_name_for_tag(&tag), config)
            );
            if config.line_numbers {
                open.push_str(&line_numbers(&text));
            }
            open.push_str("<div class=\"code-wrapper\">");

            let mut attributes = vec![
                ("data-language", tag.clone()),
                ("data-enhanced", "true".to_string()),
            ];
            let content = if config.syntax_highlight {
                attributes.push(("data-highlighted", "true".to_string()));
                result.blocks_highlighted += 1;
                Some(options.highlighter.highlight(&text, Some(&tag), options.theme))
            } else {
                result.blocks_wrapped += 1;
                None
            };

            BlockPlan {
                open,
                close: "</div></div></div>".to_string(),
                attributes,
                content,
                content_in_code: block.has_code,
            }
        })
        .collect()
}

/// Rewrite `charset=windows-1252` to `charset=UTF-8`, case-insensitively.
fn fix_charset(content: &str) -> Option<String> {
    const NEEDLE: &str = "charset=windows-1252";
    let pos = content.to_ascii_lowercase().find(NEEDLE)?;
    Some(format!(
        "{}charset=UTF-8{}",
        &content[..pos],
        &content[pos + NEEDLE.len()..]
    ))
}

/// Enhance one HTML page.
///
/// Pages that already carry the labdoc stylesheet are returned unchanged.
pub fn transform_html(
    html: &str,
    options: &TransformOptions<'_>,
) -> Result<(String, TransformResult), TransformError> {
    let scan = scan_page(html)?;
    let mut result = TransformResult::default();

    if scan.has_styles {
        result.already_enhanced = true;
        return Ok((html.to_string(), result));
    }

    let plans = plan_blocks(&scan.blocks, options, &mut result);
    let config = options.config;
    let a11y = config.accessibility;

    let script = script_element();
    let pre_index = Cell::new(0usize);
    let code_done: Cell<Option<usize>> = Cell::new(None);
    let exercise_index = Cell::new(0usize);

    let mut handlers = vec![
        element!("html", |el| {
            el.set_attribute("data-theme", options.preference.as_str())?;
            Ok(())
        }),
        element!("head", |el| {
            el.append(options.style_element, ContentType::Html);
            el.append(&script, ContentType::Html);
            Ok(())
        }),
        element!("meta[charset]", |el| {
            if el
                .get_attribute("charset")
                .is_some_and(|c| c.trim().eq_ignore_ascii_case("windows-1252"))
            {
                el.set_attribute("charset", "UTF-8")?;
            }
            Ok(())
        }),
        element!("meta[content]", |el| {
            if let Some(fixed) = el.get_attribute("content").as_deref().and_then(fix_charset) {
                el.set_attribute("content", &fixed)?;
            }
            Ok(())
        }),
        element!("pre", |el| {
            let index = pre_index.get();
            pre_index.set(index + 1);

            if a11y {
                el.set_attribute("role", "region")?;
                el.set_attribute("aria-label", &format!("Code block {}", index + 1))?;
            }

            let Some(plan) = plans.get(index) else {
                return Ok(());
            };
            for (name, value) in &plan.attributes {
                el.set_attribute(name, value)?;
            }
            if !plan.open.is_empty() {
                el.before(&plan.open, ContentType::Html);
                el.after(&plan.close, ContentType::Html);
            }
            if !plan.content_in_code {
                if let Some(content) = &plan.content {
                    el.set_inner_content(content, ContentType::Html);
                }
            }
            Ok(())
        }),
        element!("pre code", |el| {
            let Some(index) = pre_index.get().checked_sub(1) else {
                return Ok(());
            };
            if code_done.get() == Some(index) {
                return Ok(());
            }
            code_done.set(Some(index));

            if let Some(plan) = plans.get(index) {
                if plan.content_in_code {
                    if let Some(content) = &plan.content {
                        el.set_inner_content(content, ContentType::Html);
                    }
                }
            }
            Ok(())
        }),
    ];

    if config.theme_toggle {
        let toggle = theme_toggle_button(options.preference, a11y);
        handlers.push(element!("body", move |el| {
            el.append(&toggle, ContentType::Html);
            Ok(())
        }));
    }

    if a11y {
        handlers.push(element!("a, button", |el| {
            if !el.has_attribute("tabindex") {
                el.set_attribute("tabindex", "0")?;
            }
            Ok(())
        }));
        handlers.push(element!(EXERCISE_SELECTOR, |el| {
            let index = exercise_index.get();
            exercise_index.set(index + 1);
            if let Some(exercise) = scan.exercises.get(index).filter(|e| e.has_header) {
                el.set_attribute("role", "region")?;
                el.set_attribute("aria-label", exercise.kind.label())?;
            }
            Ok(())
        }));
        if config.skip_link {
            handlers.push(element!("body", |el| {
                el.prepend(
                    "<a class=\"skip-link\" href=\"#main-content\" tabindex=\"0\">Skip to main content</a>",
                    ContentType::Html,
                );
                Ok(())
            }));
        }
    }

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    )?;

    tracing::debug!(
        highlighted = result.blocks_highlighted,
        wrapped = result.blocks_wrapped,
        skipped = result.blocks_skipped,
        "transformed page"
    );

    Ok((output, result))
}
