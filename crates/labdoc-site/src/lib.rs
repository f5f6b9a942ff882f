//! Post-process static lab documentation.
//!
//! This crate rewrites the HTML pages of a documentation directory so that
//! they carry, as static markup, what a page script would otherwise add at
//! load time: highlighted code blocks, a header with the language and a
//! copy button, a line-number gutter, theme CSS, and accessibility
//! attributes.
//!
//! # Usage
//!
//! ```bash
//! labdoc-site ./labs ./labs-enhanced
//! ```
//!
//! # How it works
//!
//! 1. **Stylesheet**: one `<style id="labdoc-styles">` is appended to each
//!    page's `<head>`. With class-based spans it includes the light and
//!    dark palettes scoped to `[data-theme="..."]`; `auto` follows
//!    `prefers-color-scheme`.
//!
//! 2. **HTML Transformation**: uses lol_html to stream through each page,
//!    finding `<pre>` elements, detecting their language when none is
//!    given, and replacing their content with highlighted HTML inside the
//!    code block wrapper.
//!
//! 3. **Page script**: a `<script id="labdoc-script">` follows the
//!    stylesheet. It makes the copy buttons and the theme toggle work and
//!    highlights the `.jump-drop` link of the section in view.
//!
//! Pages that already carry the stylesheet are left untouched, so running
//! the tool twice is harmless.

mod config;
mod css;
mod html;
mod processor;
mod script;

pub use config::{CONFIG_FILE_NAME, FormatSetting, ModeSetting, SiteConfig};
pub use css::{ENHANCEMENT_CSS, STYLE_ID, generate_site_css, style_element};
pub use html::{TransformError, TransformOptions, TransformResult, decode_entities, transform_html};
pub use processor::{
    BACKUP_DIR, PageStatus, ProcessError, ProcessOptions, Processor, ProcessorStats,
};
pub use script::{
    COPY_FEEDBACK_MS, ENHANCEMENT_JS, SCRIPT_ID, THEME_STORAGE_KEY, script_element,
    theme_toggle_button,
};
