//! labdoc-site CLI - Enhance a static lab documentation directory.

use anyhow::{Context, Result, bail};
use clap::Parser;
use labdoc_highlight::HighlightMode;
use labdoc_site::{FormatSetting, ModeSetting, ProcessOptions, Processor, SiteConfig};
use labdoc_theme::{FileStore, ThemePreference, load_or_default};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Enhance static lab documentation: highlight code blocks, add copy
/// buttons, line numbers, theme CSS and accessibility attributes.
#[derive(Debug, Parser)]
#[command(name = "labdoc-site", version)]
struct Args {
    /// Input directory containing the HTML pages
    input: PathBuf,

    /// Output directory (defaults to modifying input in place)
    output: Option<PathBuf>,

    /// Config file (defaults to labdoc.toml in the input directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Theme written to the pages (light, dark or auto)
    #[arg(long)]
    theme: Option<ThemePreference>,

    /// Rule application mode (legacy or strict)
    #[arg(long)]
    mode: Option<HighlightMode>,

    /// Emit inline colors instead of class names
    #[arg(long)]
    inline_style: bool,

    /// Prefix for class-based spans
    #[arg(long, value_name = "PREFIX")]
    class_prefix: Option<String>,

    /// Wrap code blocks without highlighting them
    #[arg(long)]
    no_highlight: bool,

    /// Do not add copy buttons
    #[arg(long)]
    no_copy_button: bool,

    /// Do not add line numbers
    #[arg(long)]
    no_line_numbers: bool,

    /// Treat blocks without an explicit language as plain text
    #[arg(long)]
    no_detect: bool,

    /// Do not add accessibility attributes or the skip link
    #[arg(long)]
    no_accessibility: bool,

    /// Do not add the skip link
    #[arg(long)]
    no_skip_link: bool,

    /// Do not add the theme toggle button
    #[arg(long)]
    no_theme_toggle: bool,

    /// Back up pages before modifying them in place
    #[arg(long)]
    backup: bool,

    /// Restore pages from the backup directory and exit
    #[arg(long, conflicts_with_all = ["backup", "status"])]
    restore: bool,

    /// Show which pages are enhanced and exit
    #[arg(long)]
    status: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,labdoc_site=debug,labdoc_highlight=debug,labdoc_theme=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

impl Args {
    /// Apply command-line overrides on top of the file configuration.
    fn apply(&self, config: &mut SiteConfig) {
        if let Some(theme) = self.theme {
            config.theme = Some(theme);
        }
        if let Some(mode) = self.mode {
            config.mode = match mode {
                HighlightMode::Legacy => ModeSetting::Legacy,
                HighlightMode::Strict => ModeSetting::Strict,
            };
        }
        if self.inline_style {
            config.format = FormatSetting::InlineStyle;
        }
        if let Some(prefix) = &self.class_prefix {
            config.class_prefix = prefix.clone();
        }
        config.syntax_highlight &= !self.no_highlight;
        config.copy_button &= !self.no_copy_button;
        config.line_numbers &= !self.no_line_numbers;
        config.auto_detect_language &= !self.no_detect;
        config.accessibility &= !self.no_accessibility;
        config.skip_link &= !self.no_skip_link;
        config.theme_toggle &= !self.no_theme_toggle;
    }
}

/// The stored preference, or `auto` when there is nowhere to store one.
fn stored_preference() -> ThemePreference {
    match FileStore::default_location() {
        Ok(store) => load_or_default(&store),
        Err(e) => {
            tracing::debug!("no preference store: {e}");
            ThemePreference::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Validate input directory
    if !args.input.exists() {
        bail!("Input directory does not exist: {}", args.input.display());
    }

    if !args.input.is_dir() {
        bail!("Input path is not a directory: {}", args.input.display());
    }

    let mut config = SiteConfig::discover(&args.input, args.config.as_deref())
        .context("failed to load site configuration")?;
    args.apply(&mut config);
    let preference = config.theme.unwrap_or_else(stored_preference);

    let options = ProcessOptions {
        input_dir: args.input.clone(),
        output_dir: args.output.clone(),
        config,
        preference,
        backup: args.backup,
        verbose: args.verbose,
    };

    let mut processor = Processor::new(options);

    if args.status {
        let pages = processor.status()?;
        eprintln!("{}", "Pages:".bold());
        for page in &pages {
            let mark = if page.enhanced {
                "✓ enhanced".green().to_string()
            } else {
                "○ not enhanced".yellow().to_string()
            };
            let backup = if page.backed_up { " (backed up)" } else { "" };
            eprintln!("  {}: {mark}{backup}", page.path.display());
        }
        let backed_up = pages.iter().filter(|p| p.backed_up).count();
        eprintln!(
            "\n  {} pages, {} enhanced, {} backups",
            pages.len().to_string().cyan(),
            pages.iter().filter(|p| p.enhanced).count().to_string().green(),
            backed_up.to_string().cyan()
        );
        return Ok(());
    }

    if args.restore {
        let restored = processor.restore()?;
        eprintln!(
            "{} Restored {} pages from backup",
            "labdoc-site".green().bold(),
            restored.to_string().cyan()
        );
        return Ok(());
    }

    // Print header
    eprintln!(
        "{} Enhancing documentation: {}",
        "labdoc-site".green().bold(),
        args.input.display()
    );

    if let Some(out) = &args.output {
        eprintln!("  Output: {}", out.display());
    } else {
        eprintln!("  {} Modifying in place", "Note:".yellow());
    }
    eprintln!("  Theme: {}", preference.as_str().cyan());

    eprintln!();

    // Process
    let start = Instant::now();
    let stats = processor.process()?;
    let elapsed = start.elapsed();

    // Print results
    eprintln!("{}", "Results:".bold());
    eprintln!(
        "  {} HTML files processed ({} already enhanced)",
        stats.files_processed.to_string().cyan(),
        stats.files_already_enhanced.to_string().cyan()
    );
    eprintln!(
        "  {} code blocks highlighted",
        stats.blocks_highlighted.to_string().green()
    );
    eprintln!(
        "  {} code blocks wrapped only",
        stats.blocks_wrapped.to_string().green()
    );
    eprintln!(
        "  {} code blocks skipped (already enhanced)",
        stats.blocks_skipped.to_string().yellow()
    );
    if stats.files_backed_up > 0 {
        eprintln!(
            "  {} pages backed up",
            stats.files_backed_up.to_string().cyan()
        );
    }
    eprintln!(
        "  {:+.1}% HTML size",
        stats.html_inflation_percent()
    );

    if !stats.unknown_languages.is_empty() {
        eprintln!(
            "\n  {} Languages without highlighting: {}",
            "Note:".yellow(),
            stats.unknown_languages.join(", ")
        );
    }

    if !stats.failures.is_empty() {
        eprintln!("\n  {} {} pages failed:", "Warning:".red(), stats.failures.len());
        for (path, error) in &stats.failures {
            eprintln!("    {}: {}", path.display(), error);
        }
    }

    eprintln!("\n  Completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_turn_options_off() {
        let args = Args::try_parse_from(["labdoc-site", "labs", "--no-skip-link"]).unwrap();
        let mut config = SiteConfig::default();
        args.apply(&mut config);
        assert!(!config.skip_link);
        assert!(config.accessibility);
        assert!(config.theme_toggle);

        let args = Args::try_parse_from([
            "labdoc-site",
            "labs",
            "out",
            "--no-theme-toggle",
            "--no-copy-button",
            "--mode",
            "strict",
        ])
        .unwrap();
        let mut config = SiteConfig::default();
        args.apply(&mut config);
        assert!(!config.theme_toggle);
        assert!(!config.copy_button);
        assert!(config.skip_link);
        assert_eq!(config.mode, ModeSetting::Strict);
    }

    #[test]
    fn test_flags_do_not_turn_options_on() {
        let args = Args::try_parse_from(["labdoc-site", "labs"]).unwrap();
        let mut config = SiteConfig {
            skip_link: false,
            ..SiteConfig::default()
        };
        args.apply(&mut config);
        assert!(!config.skip_link);
    }
}
