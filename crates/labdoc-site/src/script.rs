//! Page script injected next to the stylesheet.
//!
//! The static rewrite produces the markup. The script only wires up the
//! parts that need a browser: the copy buttons, the theme toggle and the
//! scroll-spy that marks the `.jump-drop` link of the section in view.

use labdoc_theme::ThemePreference;

/// `id` of the injected `<script>` element.
pub const SCRIPT_ID: &str = "labdoc-script";

/// localStorage key holding the reader's theme choice.
pub const THEME_STORAGE_KEY: &str = "lab-theme";

/// Milliseconds before a copy button goes back to `Copy`.
pub const COPY_FEEDBACK_MS: u32 = 2000;

pub const ENHANCEMENT_JS: &str = r##"(function () {
    'use strict';

    var THEMES = ['light', 'dark', 'auto'];
    var ICONS = { light: '☀️', dark: '🌙', auto: '🔄' };
    var STORAGE_KEY = 'lab-theme';
    var FEEDBACK_MS = 2000;

    function applyTheme(theme) {
        document.documentElement.setAttribute('data-theme', theme);
        document.querySelectorAll('.theme-toggle').forEach(function (button) {
            button.textContent = ICONS[theme] || ICONS.auto;
        });
    }

    function storedTheme() {
        try {
            return localStorage.getItem(STORAGE_KEY);
        } catch (e) {
            return null;
        }
    }

    function toggleTheme() {
        var current = document.documentElement.getAttribute('data-theme');
        var next = THEMES[(THEMES.indexOf(current) + 1) % THEMES.length];
        try {
            localStorage.setItem(STORAGE_KEY, next);
        } catch (e) {}
        applyTheme(next);
    }

    function copyCode(button) {
        var wrapper = button.closest('.code-block-wrapper');
        var pre = wrapper && wrapper.querySelector('pre');
        if (!pre) {
            return;
        }
        var reset = function () {
            button.textContent = 'Copy';
            button.setAttribute('data-tooltip', 'Copy code');
        };
        navigator.clipboard.writeText(pre.textContent).then(function () {
            button.textContent = 'Copied!';
            button.setAttribute('data-tooltip', 'Copied!');
            setTimeout(reset, FEEDBACK_MS);
        }, function () {
            button.textContent = 'Error';
            setTimeout(reset, FEEDBACK_MS);
        });
    }

    function scrollSpy() {
        var links = document.querySelectorAll('.jump-drop a');
        var headings = document.querySelectorAll('h1[id], h2[id], h3[id], h4[id], h5[id], h6[id]');
        if (!links.length || !headings.length || !('IntersectionObserver' in window)) {
            return;
        }
        var observer = new IntersectionObserver(function (entries) {
            entries.forEach(function (entry) {
                if (!entry.isIntersecting) {
                    return;
                }
                links.forEach(function (link) {
                    var href = link.getAttribute('href') || '';
                    link.classList.toggle('active', href.indexOf('#' + entry.target.id) !== -1);
                });
            });
        }, { rootMargin: '-20% 0px -80% 0px' });
        headings.forEach(function (heading) {
            observer.observe(heading);
        });
    }

    function init() {
        var saved = storedTheme();
        if (THEMES.indexOf(saved) !== -1) {
            applyTheme(saved);
        }
        document.addEventListener('click', function (event) {
            var target = event.target;
            if (!(target instanceof Element)) {
                return;
            }
            var copy = target.closest('.code-copy-btn');
            if (copy) {
                copyCode(copy);
            } else if (target.closest('.theme-toggle')) {
                toggleTheme();
            }
        });
        scrollSpy();
    }

    if (document.readyState === 'loading') {
        document.addEventListener('DOMContentLoaded', init);
    } else {
        init();
    }
})();
"##;

/// The `<script>` element carrying [`ENHANCEMENT_JS`].
pub fn script_element() -> String {
    format!("<script id=\"{SCRIPT_ID}\">\n{ENHANCEMENT_JS}</script>\n")
}

/// The theme toggle button, showing the icon of `preference`.
pub fn theme_toggle_button(preference: ThemePreference, accessibility: bool) -> String {
    let a11y = if accessibility {
        " aria-label=\"Toggle theme\" tabindex=\"0\""
    } else {
        ""
    };
    format!(
        "<button class=\"theme-toggle\" type=\"button\" data-tooltip=\"Toggle theme\"{a11y}>{}</button>",
        preference.icon()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_matches_rust_constants() {
        assert!(ENHANCEMENT_JS.contains(&format!("'{THEME_STORAGE_KEY}'")));
        assert!(ENHANCEMENT_JS.contains(&format!("FEEDBACK_MS = {COPY_FEEDBACK_MS};")));
        for preference in [
            ThemePreference::Light,
            ThemePreference::Dark,
            ThemePreference::Auto,
        ] {
            assert!(ENHANCEMENT_JS.contains(&format!(
                "{}: '{}'",
                preference.as_str(),
                preference.icon()
            )));
        }
    }

    #[test]
    fn test_script_element_has_no_early_close() {
        let el = script_element();
        assert!(el.starts_with("<script id=\"labdoc-script\">"));
        assert_eq!(el.matches("</").count(), 1);
    }

    #[test]
    fn test_theme_toggle_button() {
        assert_eq!(
            theme_toggle_button(ThemePreference::Dark, false),
            "<button class=\"theme-toggle\" type=\"button\" data-tooltip=\"Toggle theme\">🌙</button>"
        );
        assert!(theme_toggle_button(ThemePreference::Auto, true).contains("aria-label"));
    }
}
