//! labdoc CLI - highlight snippets, detect languages and manage the theme
//! preference from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use labdoc_highlight::{
    HighlightConfig, HighlightMode, Highlighter, HtmlFormat, ThemeName, detect,
};
use labdoc_theme::{
    EnvScheme, FileStore, PreferenceStore, ThemePreference, effective_theme, load_or_default,
};
use owo_colors::OwoColorize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// labdoc - syntax coloring for lab documentation
#[derive(Debug, Parser)]
#[command(name = "labdoc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Preference file (defaults to the user configuration directory)
    #[arg(long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Highlight code and print the HTML fragment
    Highlight {
        /// Input: code string, filename, or '-' for stdin
        input: Option<String>,

        /// Language tag (c, css, assembly, shell, ...); detected when omitted
        #[arg(short, long)]
        lang: Option<String>,

        /// Theme for inline colors (light or dark); defaults to the
        /// effective theme of the stored preference
        #[arg(long)]
        theme: Option<String>,

        /// Rule application mode
        #[arg(long, default_value = "legacy")]
        mode: HighlightMode,

        /// Span format
        #[arg(long, value_enum, default_value_t = Format::Inline)]
        format: Format,

        /// Prefix for class-based spans
        #[arg(long, value_name = "PREFIX")]
        prefix: Option<String>,
    },

    /// Print the detected language of some code
    Detect {
        /// Input: code string, filename, or '-' for stdin
        input: Option<String>,
    },

    /// Show or change the theme preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Debug, Subcommand)]
enum ThemeAction {
    /// Print the stored preference and the theme it resolves to
    Show,
    /// Store a preference
    Set { preference: ThemePreference },
    /// Advance the preference: light, dark, auto, light, ...
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `<span style="color: ...">`
    Inline,
    /// `<span class="...">`
    Classes,
}

fn html_format(format: Format, prefix: Option<String>) -> HtmlFormat {
    match (format, prefix) {
        (Format::Inline, _) => HtmlFormat::InlineStyle,
        (Format::Classes, Some(prefix)) if !prefix.is_empty() => {
            HtmlFormat::ClassNamesWithPrefix(prefix)
        }
        (Format::Classes, _) => HtmlFormat::ClassNames,
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,labdoc=debug,labdoc_highlight=debug,labdoc_theme=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

/// Read the input: stdin for `None` or `-`, a file when the argument names
/// one, otherwise the argument itself.
fn read_input(input: Option<&str>) -> Result<String> {
    match input {
        None | Some("-") => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
        Some(input) => {
            let path = Path::new(input);
            if path.is_file() {
                std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read file '{input}'"))
            } else {
                Ok(input.to_string())
            }
        }
    }
}

fn open_store(path: Option<PathBuf>) -> Result<FileStore> {
    match path {
        Some(path) => Ok(FileStore::new(path)),
        None => FileStore::default_location().context("cannot locate the preference file"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Highlight {
            input,
            lang,
            theme,
            mode,
            format,
            prefix,
        } => {
            let code = read_input(input.as_deref())?;
            tracing::debug!(lang = lang.as_deref().unwrap_or("auto"), ?mode, "highlighting");
            let theme = match theme {
                Some(name) => ThemeName::resolve(&name),
                None => {
                    let preference = match cli.store {
                        Some(path) => load_or_default(&FileStore::new(path)),
                        None => FileStore::default_location()
                            .map(|store| load_or_default(&store))
                            .unwrap_or_default(),
                    };
                    effective_theme(preference, &EnvScheme)
                }
            };
            let highlighter = Highlighter::with_config(HighlightConfig {
                mode,
                html_format: html_format(format, prefix),
            });
            tracing::debug!(theme = theme.as_str(), "resolved theme");
            println!("{}", highlighter.highlight(&code, lang.as_deref(), theme));
        }

        Commands::Detect { input } => {
            let code = read_input(input.as_deref())?;
            let language = detect(&code);
            tracing::debug!(%language, bytes = code.len(), "detected");
            println!("{}", language.tag());
        }

        Commands::Theme { action } => {
            let store = open_store(cli.store)?;
            tracing::debug!(path = %store.path().display(), "using preference store");
            match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => {
                    let preference = load_or_default(&store);
                    let theme = effective_theme(preference, &EnvScheme);
                    println!(
                        "{} {} ({} {})",
                        preference.icon(),
                        preference.as_str().bold(),
                        "effective:".dimmed(),
                        theme.as_str().cyan()
                    );
                }
                ThemeAction::Set { preference } => {
                    store
                        .save(preference)
                        .with_context(|| format!("failed to save to {}", store.path().display()))?;
                    println!("{} {}", preference.icon(), preference.as_str().bold());
                }
                ThemeAction::Toggle => {
                    let next = load_or_default(&store).next();
                    store
                        .save(next)
                        .with_context(|| format!("failed to save to {}", store.path().display()))?;
                    println!("{} {}", next.icon(), next.as_str().bold());
                }
            }
        }
    }

    Ok(())
}
