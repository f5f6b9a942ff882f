//! Stylesheet injected into every enhanced page.

use labdoc_theme::generate_theme_css;

/// `id` of the injected `<style>` element. Pages carrying it are treated as
/// already enhanced.
pub const STYLE_ID: &str = "labdoc-styles";

/// Layout for the code block wrapper, header, gutter, skip link and theme
/// toggle.
pub const ENHANCEMENT_CSS: &str = r#"/* labdoc code blocks */
.code-block-wrapper {
    margin: 1.5rem 0;
    border-radius: var(--border-radius-lg, 8px);
    overflow: hidden;
    box-shadow: var(--shadow-lg, 0 10px 15px -3px rgba(0, 0, 0, 0.1));
    background: var(--bg-code, #f6f8fa);
}

.code-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 0.75rem 1rem;
    background: linear-gradient(135deg, #374151 0%, #4b5563 100%);
    border-bottom: 1px solid #6b7280;
}

.code-language {
    font-size: 0.8rem;
    font-weight: 500;
    color: var(--text-inverse, #ffffff);
    text-transform: uppercase;
    letter-spacing: 0.5px;
}

.code-copy-btn {
    background: rgba(255, 255, 255, 0.1);
    border: 1px solid #6b7280;
    color: var(--text-inverse, #ffffff);
    padding: 0.25rem 0.5rem;
    border-radius: var(--border-radius-sm, 4px);
    cursor: pointer;
    font-size: 0.7rem;
    font-weight: 500;
    text-transform: uppercase;
    letter-spacing: 0.5px;
}

.code-copy-btn:hover {
    background: rgba(255, 255, 255, 0.2);
    border-color: #9ca3af;
}

.code-content {
    display: flex;
    background: var(--bg-code, #f6f8fa);
}

.line-numbers {
    padding: 1.5rem 0.5rem;
    background: rgba(0, 0, 0, 0.2);
    color: #6b7280;
    font-family: var(--font-mono, monospace);
    font-size: 0.8rem;
    line-height: 1.5;
    text-align: right;
    user-select: none;
    min-width: 3rem;
}

.line-number {
    display: block;
    padding: 0 0.5rem;
}

.code-wrapper {
    flex: 1;
    overflow-x: auto;
}

.code-wrapper pre {
    margin: 0;
    padding: 1.5rem;
    background: transparent;
    border: none;
    box-shadow: none;
}

.skip-link {
    position: absolute;
    top: -40px;
    left: 6px;
    background: var(--primary-color, #2563eb);
    color: white;
    padding: 8px;
    text-decoration: none;
    border-radius: 4px;
    z-index: 1000;
    transition: top 0.2s;
}

.skip-link:focus {
    top: 6px;
}

.theme-toggle {
    position: fixed;
    bottom: 1.5rem;
    right: 1.5rem;
    width: 2.75rem;
    height: 2.75rem;
    border-radius: 50%;
    border: 1px solid #6b7280;
    background: var(--bg-code, #f6f8fa);
    font-size: 1.25rem;
    cursor: pointer;
    box-shadow: var(--shadow-lg, 0 10px 15px -3px rgba(0, 0, 0, 0.1));
    z-index: 1000;
}

.jump-drop a.active {
    background: var(--primary-color, #2563eb) !important;
    color: var(--text-inverse, #ffffff) !important;
    font-weight: 600;
}

.focus-visible {
    outline: 2px solid var(--primary-color, #2563eb);
    outline-offset: 2px;
}

@media (max-width: 768px) {
    .code-content {
        flex-direction: column;
    }

    .line-numbers {
        display: none;
    }

    .code-header {
        padding: 0.5rem;
    }
}

@media print {
    .code-header,
    .line-numbers,
    .theme-toggle {
        display: none !important;
    }

    .code-block-wrapper {
        background: white !important;
        box-shadow: none !important;
        border: 1px solid #ccc !important;
    }
}
"#;

/// CSS for a page: the enhancement rules, plus the palette rules when spans
/// are class-based (`class_prefix` is `Some`).
pub fn generate_site_css(class_prefix: Option<&str>) -> String {
    let mut css = String::from(ENHANCEMENT_CSS);
    if let Some(prefix) = class_prefix {
        css.push('\n');
        css.push_str(&generate_theme_css(prefix));
    }
    css
}

/// The `<style>` element that carries [`generate_site_css`].
pub fn style_element(css: &str) -> String {
    format!("<style id=\"{STYLE_ID}\">\n{css}</style>\n")
}
