use labdoc_highlight::ThemeName;
use labdoc_site::{
    FormatSetting, SiteConfig, TransformOptions, generate_site_css, style_element, transform_html,
};
use labdoc_theme::ThemePreference;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="windows-1252"><title>Lab 1</title></head>
<body>
<div class="required"><span class="header">Exercise 1.</span> Read the code.</div>
<div class="question">No header here.</div>
<pre>int main() { return 0; }</pre>
<pre><kbd>make qemu</kbd></pre>
<pre class="language-css"><code>.a { color: red; }</code></pre>
<a href="next.html">Next</a>
</body>
</html>
"#;

fn run(html: &str, config: &SiteConfig) -> (String, labdoc_site::TransformResult) {
    let highlighter = config.highlighter();
    let style = style_element(&generate_site_css(Some(&config.class_prefix)));
    let options = TransformOptions {
        config,
        highlighter: &highlighter,
        preference: ThemePreference::Auto,
        theme: ThemeName::Light,
        style_element: &style,
    };
    transform_html(html, &options).unwrap()
}

#[test]
fn counts_blocks() {
    let (_, result) = run(PAGE, &SiteConfig::default());
    assert_eq!(result.blocks_highlighted, 2);
    assert_eq!(result.blocks_wrapped, 1);
    assert_eq!(result.blocks_skipped, 0);
    assert!(!result.already_enhanced);
    assert!(result.unknown_languages.is_empty());
}

#[test]
fn highlights_and_wraps_blocks() {
    let (html, _) = run(PAGE, &SiteConfig::default());

    assert!(html.contains(r#"<span class="code-language">C</span>"#), "{html}");
    assert!(html.contains(r#"<span class="hl-keyword">int</span>"#), "{html}");
    assert!(html.contains(r#"data-language="c""#), "{html}");
    assert!(html.contains(r#"data-highlighted="true""#), "{html}");
    assert!(html.contains(r#"<span class="line-number">1</span>"#), "{html}");
    assert!(html.contains(r#"class="code-copy-btn""#), "{html}");

    // Explicit language, highlighted inside the original <code>.
    assert!(html.contains(r#"<span class="code-language">CSS</span>"#), "{html}");
    assert!(
        html.contains(r#"<code><span class="hl-selector">.a </span>"#),
        "{html}"
    );

    // <kbd> blocks are wrapped with a Shell header and left as they are.
    assert!(html.contains(r#"<span class="code-language">Shell</span>"#), "{html}");
    assert!(html.contains("<kbd>make qemu</kbd>"), "{html}");
}

#[test]
fn adds_page_level_markup() {
    let (html, _) = run(PAGE, &SiteConfig::default());

    assert!(html.contains(r#"<html data-theme="auto">"#), "{html}");
    assert!(html.contains(r#"<style id="labdoc-styles">"#), "{html}");
    assert!(html.contains(r#"<meta charset="UTF-8">"#), "{html}");
    assert!(html.contains(r##"<a class="skip-link" href="#main-content""##), "{html}");
    assert!(html.contains(r#"<a href="next.html" tabindex="0">"#), "{html}");
}

#[test]
fn injects_page_script_and_theme_toggle() {
    let (html, _) = run(PAGE, &SiteConfig::default());

    assert!(html.contains("</style>\n<script id=\"labdoc-script\">"), "{html}");
    assert_eq!(html.matches("<script").count(), 1);
    // Copy feedback, theme cycling and the scroll-spy.
    assert!(html.contains("navigator.clipboard.writeText(pre.textContent)"));
    assert!(html.contains("'Copied!'") && html.contains("'Error'"));
    assert!(html.contains("var THEMES = ['light', 'dark', 'auto'];"));
    assert!(html.contains("localStorage.setItem(STORAGE_KEY, next)"));
    assert!(html.contains("rootMargin: '-20% 0px -80% 0px'"));
    assert!(html.contains(".jump-drop a.active"));

    assert!(
        html.contains(concat!(
            r#"<button class="theme-toggle" type="button" data-tooltip="Toggle theme" "#,
            r#"aria-label="Toggle theme" tabindex="0">🔄</button></body>"#,
        )),
        "{html}"
    );

    let config = SiteConfig {
        theme_toggle: false,
        ..SiteConfig::default()
    };
    let (html, _) = run(PAGE, &config);
    assert!(!html.contains(r#"<button class="theme-toggle""#), "{html}");
    assert!(html.contains(r#"<script id="labdoc-script">"#), "{html}");
}

#[test]
fn labels_blocks_for_screen_readers() {
    let (html, _) = run(PAGE, &SiteConfig::default());

    assert!(html.contains(r#"aria-label="Code block 1""#), "{html}");
    assert!(html.contains(r#"aria-label="Code block 3""#), "{html}");
    assert!(
        html.contains(r#"<div class="required" role="region" aria-label="Required exercise">"#),
        "{html}"
    );
    // Exercise blocks without a .header are left alone.
    assert!(html.contains(r#"<div class="question">No header here.</div>"#), "{html}");
}

#[test]
fn labels_nested_exercises() {
    let page = concat!(
        "<html><head></head><body>",
        r#"<div class="required"><div class="question">Inner.</div>"#,
        r#"<span class="header">Exercise 2.</span></div>"#,
        r#"<div class="challenge"><div class="question"><span class="header">Q.</span></div></div>"#,
        r#"<div class="question">After.</div>"#,
        "</body></html>",
    );
    let (html, _) = run(page, &SiteConfig::default());

    // A header after a closed inner block still belongs to the outer one.
    assert!(
        html.contains(r#"<div class="required" role="region" aria-label="Required exercise">"#),
        "{html}"
    );
    assert!(html.contains(r#"<div class="question">Inner.</div>"#), "{html}");
    // A header inside a nested block counts for every open block.
    assert!(
        html.contains(r#"<div class="challenge" role="region" aria-label="Challenge exercise">"#),
        "{html}"
    );
    assert!(
        html.contains(r#"<div class="question" role="region" aria-label="Question"><span"#),
        "{html}"
    );
    assert!(html.contains(r#"<div class="question">After.</div>"#), "{html}");
}

#[test]
fn second_run_is_a_no_op() {
    let config = SiteConfig::default();
    let (once, _) = run(PAGE, &config);
    let (twice, result) = run(&once, &config);

    assert!(result.already_enhanced);
    assert_eq!(once, twice);
}

#[test]
fn enhanced_blocks_are_skipped() {
    let page = r#"<html><head></head><body><pre data-enhanced="true">x</pre></body></html>"#;
    let (html, result) = run(page, &SiteConfig::default());
    assert_eq!(result.blocks_skipped, 1);
    assert!(!html.contains(r#"<div class="code-block-wrapper">"#));
}

#[test]
fn options_can_be_turned_off() {
    let config = SiteConfig {
        syntax_highlight: false,
        copy_button: false,
        line_numbers: false,
        accessibility: false,
        ..SiteConfig::default()
    };
    let (html, result) = run(PAGE, &config);

    assert_eq!(result.blocks_highlighted, 0);
    assert_eq!(result.blocks_wrapped, 3);
    assert!(
        html.contains(r#"data-enhanced="true">int main() { return 0; }</pre>"#),
        "{html}"
    );
    assert!(!html.contains(r#"class="code-copy-btn""#));
    assert!(!html.contains("line-numbers\">"));
    assert!(!html.contains("aria-label"));
    assert!(!html.contains("skip-link\" href"));
}

#[test]
fn entities_are_decoded_before_highlighting() {
    let page = "<html><head></head><body><pre>if (a &lt; b &amp;&amp; c) { return 1; }</pre></body></html>";
    let config = SiteConfig {
        format: FormatSetting::ClassNames,
        class_prefix: String::new(),
        ..SiteConfig::default()
    };
    let (html, _) = run(page, &config);

    assert!(html.contains("a &lt; b &amp;&amp; c"), "{html}");
    assert!(!html.contains("&amp;lt;"), "{html}");
}

#[test]
fn detection_can_be_disabled() {
    let config = SiteConfig {
        auto_detect_language: false,
        ..SiteConfig::default()
    };
    let (html, _) = run(PAGE, &config);
    assert!(html.contains(r#"<span class="code-language">Text</span>"#), "{html}");
    assert!(html.contains(r#"data-language="text""#), "{html}");
}

#[test]
fn unknown_explicit_language_is_reported() {
    let page = r#"<html><head></head><body><pre data-language="Haskell">main = pure ()</pre></body></html>"#;
    let (html, result) = run(page, &SiteConfig::default());
    assert_eq!(result.unknown_languages, ["haskell"]);
    assert!(html.contains(r#"<span class="code-language">Code</span>"#), "{html}");
}
