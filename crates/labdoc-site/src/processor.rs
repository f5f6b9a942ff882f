//! Main processor that enhances a documentation directory.

use crate::config::SiteConfig;
use crate::css::{STYLE_ID, generate_site_css, style_element};
use crate::html::{TransformError, TransformOptions, TransformResult, transform_html};
use indicatif::{ProgressBar, ProgressStyle};
use labdoc_highlight::{HtmlFormat, ThemeName};
use labdoc_theme::{ColorSchemeSignal, EnvScheme, ThemePreference, effective_theme};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Directory (under the input directory) holding page backups.
pub const BACKUP_DIR: &str = "backups";

/// Options for the processor.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Input directory containing the documentation pages.
    pub input_dir: PathBuf,
    /// Output directory (if None, modifies in place).
    pub output_dir: Option<PathBuf>,
    pub config: SiteConfig,
    /// Preference written to `data-theme`.
    pub preference: ThemePreference,
    /// Back up pages before modifying them in place.
    pub backup: bool,
    /// Whether to show verbose output.
    pub verbose: bool,
}

/// Statistics from processing.
#[derive(Debug, Default)]
pub struct ProcessorStats {
    /// Number of HTML files processed.
    pub files_processed: usize,
    /// Files that already carried the labdoc stylesheet.
    pub files_already_enhanced: usize,
    pub blocks_highlighted: usize,
    pub blocks_wrapped: usize,
    pub blocks_skipped: usize,
    /// Pages copied into the backup directory.
    pub files_backed_up: usize,
    /// Files that could not be processed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
    /// Explicit language tags without highlighting rules.
    pub unknown_languages: Vec<String>,
    /// Total bytes read from input HTML files.
    pub bytes_input: u64,
    /// Total bytes written to output HTML files.
    pub bytes_output: u64,
    /// Time spent processing HTML files (excludes copy time).
    pub process_duration: Duration,
}

impl ProcessorStats {
    /// Calculate HTML inflation percentage ((output - input) / input * 100).
    pub fn html_inflation_percent(&self) -> f64 {
        if self.bytes_input == 0 {
            0.0
        } else {
            (self.bytes_output as f64 - self.bytes_input as f64) / self.bytes_input as f64 * 100.0
        }
    }
}

/// Enhancement state of one page, as reported by [`Processor::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStatus {
    pub path: PathBuf,
    pub enhanced: bool,
    pub backed_up: bool,
}

/// Processor for a documentation directory.
pub struct Processor {
    options: ProcessOptions,
}

impl Processor {
    /// Create a new processor with the given options.
    pub fn new(options: ProcessOptions) -> Self {
        Self { options }
    }

    fn in_place(&self) -> bool {
        self.options
            .output_dir
            .as_ref()
            .is_none_or(|out| same_dir(out, &self.options.input_dir))
    }

    fn backup_root(&self) -> PathBuf {
        self.options.input_dir.join(BACKUP_DIR)
    }

    /// Process the documentation directory.
    pub fn process(&mut self) -> Result<ProcessorStats, ProcessError> {
        self.process_with_signal(&EnvScheme)
    }

    /// Process, resolving an `auto` preference against `signal` (only
    /// relevant for inline-style output).
    pub fn process_with_signal(
        &mut self,
        signal: &dyn ColorSchemeSignal,
    ) -> Result<ProcessorStats, ProcessError> {
        let output_dir = match &self.options.output_dir {
            Some(out) if !self.in_place() => out.clone(),
            _ => self.options.input_dir.clone(),
        };

        // If output_dir is different from input_dir, copy everything first
        if !self.in_place() {
            if output_dir.exists() {
                let input = self.options.input_dir.canonicalize()?;
                if input.starts_with(output_dir.canonicalize()?) {
                    return Err(ProcessError::OutputContainsInput {
                        input: self.options.input_dir.clone(),
                        output: output_dir,
                    });
                }
                fs::remove_dir_all(&output_dir)?;
            }

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .expect("static progress template"),
            );
            spinner.set_message("Copying directory tree...");
            spinner.enable_steady_tick(Duration::from_millis(80));

            copy_tree(&self.options.input_dir, &output_dir)?;

            spinner.finish_and_clear();
        }

        let html_files = collect_html_files(&output_dir);
        tracing::debug!(count = html_files.len(), dir = %output_dir.display(), "collected pages");

        let config = &self.options.config;
        let class_prefix = match config.html_format() {
            HtmlFormat::InlineStyle => None,
            HtmlFormat::ClassNames => Some(String::new()),
            HtmlFormat::ClassNamesWithPrefix(prefix) => Some(prefix),
        };
        let style = style_element(&generate_site_css(class_prefix.as_deref()));
        let theme: ThemeName = effective_theme(self.options.preference, signal);
        let preference = self.options.preference;
        let backup_root = (self.options.backup && self.in_place()).then(|| self.backup_root());
        let input_dir = self.options.input_dir.clone();

        let progress = ProgressBar::new(html_files.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
                .expect("static progress template")
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );

        let process_start = Instant::now();

        // Atomic counters for parallel aggregation
        let files_processed = AtomicUsize::new(0);
        let files_already_enhanced = AtomicUsize::new(0);
        let files_backed_up = AtomicUsize::new(0);
        let blocks_highlighted = AtomicUsize::new(0);
        let blocks_wrapped = AtomicUsize::new(0);
        let blocks_skipped = AtomicUsize::new(0);
        let bytes_input = AtomicUsize::new(0);
        let bytes_output = AtomicUsize::new(0);
        let unknown_languages = Mutex::new(Vec::<String>::new());
        let failures = Mutex::new(Vec::<(PathBuf, String)>::new());

        let verbose = self.options.verbose;

        // One highlighter per worker thread
        html_files.par_iter().for_each_init(
            || config.highlighter(),
            |highlighter, path| {
                if verbose {
                    progress.println(format!("Processing: {}", path.display()));
                }

                let options = TransformOptions {
                    config,
                    highlighter,
                    preference,
                    theme,
                    style_element: &style,
                };
                let backup = backup_root
                    .as_deref()
                    .map(|root| (input_dir.as_path(), root));

                match Self::process_html_file(path, &options, backup) {
                    Ok(outcome) => {
                        let result = outcome.result;
                        files_processed.fetch_add(1, Ordering::Relaxed);
                        if result.already_enhanced {
                            files_already_enhanced.fetch_add(1, Ordering::Relaxed);
                        }
                        if outcome.backed_up {
                            files_backed_up.fetch_add(1, Ordering::Relaxed);
                        }
                        blocks_highlighted.fetch_add(result.blocks_highlighted, Ordering::Relaxed);
                        blocks_wrapped.fetch_add(result.blocks_wrapped, Ordering::Relaxed);
                        blocks_skipped.fetch_add(result.blocks_skipped, Ordering::Relaxed);
                        bytes_input.fetch_add(outcome.input_size, Ordering::Relaxed);
                        bytes_output.fetch_add(outcome.output_size, Ordering::Relaxed);

                        if !result.unknown_languages.is_empty() {
                            let mut langs = lock(&unknown_languages);
                            for lang in result.unknown_languages {
                                if !langs.contains(&lang) {
                                    langs.push(lang);
                                }
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "failed to process page: {e}");
                        lock(&failures).push((path.clone(), e.to_string()));
                    }
                }
                progress.inc(1);
            },
        );

        let process_duration = process_start.elapsed();
        progress.finish_and_clear();

        let mut unknown_languages = into_inner(unknown_languages);
        unknown_languages.sort();
        let mut failures = into_inner(failures);
        failures.sort();

        Ok(ProcessorStats {
            files_processed: files_processed.load(Ordering::Relaxed),
            files_already_enhanced: files_already_enhanced.load(Ordering::Relaxed),
            blocks_highlighted: blocks_highlighted.load(Ordering::Relaxed),
            blocks_wrapped: blocks_wrapped.load(Ordering::Relaxed),
            blocks_skipped: blocks_skipped.load(Ordering::Relaxed),
            files_backed_up: files_backed_up.load(Ordering::Relaxed),
            failures,
            unknown_languages,
            bytes_input: bytes_input.load(Ordering::Relaxed) as u64,
            bytes_output: bytes_output.load(Ordering::Relaxed) as u64,
            process_duration,
        })
    }

    /// Process a single HTML file.
    ///
    /// `backup` is `(input_dir, backup_root)` when pages are modified in
    /// place and should be saved first.
    fn process_html_file(
        path: &Path,
        options: &TransformOptions<'_>,
        backup: Option<(&Path, &Path)>,
    ) -> Result<FileOutcome, ProcessError> {
        let bytes = fs::read(path)?;
        let input_size = bytes.len();
        let html = decode_page(&bytes);

        let (transformed, result) = transform_html(&html, options)?;
        let output_size = transformed.len();

        // Only write if we actually changed something
        let mut backed_up = false;
        if transformed.as_bytes() != bytes.as_slice() {
            if let Some((input_dir, root)) = backup {
                backed_up = backup_page(path, input_dir, root)?;
            }
            fs::write(path, &transformed)?;
        }

        Ok(FileOutcome {
            result,
            input_size,
            output_size,
            backed_up,
        })
    }

    /// Copy every backed-up page back over the original. Returns the number
    /// of pages restored.
    pub fn restore(&self) -> Result<usize, ProcessError> {
        let root = self.backup_root();
        if !root.is_dir() {
            return Err(ProcessError::NoBackups(root));
        }

        let mut restored = 0;
        for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let target = self.options.input_dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            tracing::debug!(page = %target.display(), "restored");
            restored += 1;
        }
        Ok(restored)
    }

    /// Report the enhancement state of every page without modifying
    /// anything.
    pub fn status(&self) -> Result<Vec<PageStatus>, ProcessError> {
        let root = self.backup_root();
        let mut pages = Vec::new();
        for path in collect_html_files(&self.options.input_dir) {
            let html = decode_page(&fs::read(&path)?).into_owned();
            let relative = path
                .strip_prefix(&self.options.input_dir)
                .unwrap_or(&path)
                .to_path_buf();
            pages.push(PageStatus {
                enhanced: html.contains(&format!("id=\"{STYLE_ID}\"")),
                backed_up: root.join(&relative).is_file(),
                path: relative,
            });
        }
        pages.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(pages)
    }
}

struct FileOutcome {
    result: TransformResult,
    input_size: usize,
    output_size: usize,
    backed_up: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn into_inner<T>(mutex: Mutex<T>) -> T {
    mutex
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// All `.html` files under `dir`, excluding the backup directory.
fn collect_html_files(dir: &Path) -> Vec<PathBuf> {
    let backups = dir.join(BACKUP_DIR);
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.path() != backups)
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Decode page bytes: UTF-8 when valid, otherwise Latin-1.
fn decode_page(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => std::borrow::Cow::Borrowed(text),
        Err(_) => {
            tracing::debug!("page is not UTF-8, decoding as Latin-1");
            std::borrow::Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Copy `page` to the same relative location under `root` unless a backup
/// already exists. Returns whether a copy was made.
fn backup_page(page: &Path, input_dir: &Path, root: &Path) -> Result<bool, ProcessError> {
    let relative = page.strip_prefix(input_dir).unwrap_or(page);
    let target = root.join(relative);
    if target.exists() {
        return Ok(false);
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(page, &target)?;
    Ok(true)
}

/// Recursively copy `from` into `to`.
/// Whether two paths name the same directory, comparing canonical forms
/// when both exist.
fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), ProcessError> {
    for entry in WalkDir::new(from).into_iter().filter_entry(|e| e.path() != to) {
        let entry = entry.map_err(|e| ProcessError::Io(e.into()))?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Errors that can occur during processing.
#[derive(Debug)]
pub enum ProcessError {
    /// IO error.
    Io(std::io::Error),
    /// HTML transformation error.
    Transform(TransformError),
    /// Invalid `labdoc.toml`.
    Config { path: PathBuf, message: String },
    /// `--restore` without a backup directory.
    NoBackups(PathBuf),
    /// The output directory is the input directory or one of its parents,
    /// so clearing it would delete the pages.
    OutputContainsInput { input: PathBuf, output: PathBuf },
}

impl From<std::io::Error> for ProcessError {
    fn from(e: std::io::Error) -> Self {
        ProcessError::Io(e)
    }
}

impl From<TransformError> for ProcessError {
    fn from(e: TransformError) -> Self {
        ProcessError::Transform(e)
    }
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessError::Io(e) => write!(f, "IO error: {}", e),
            ProcessError::Transform(e) => write!(f, "Transform error: {}", e),
            ProcessError::Config { path, message } => {
                write!(f, "Invalid config {}: {}", path.display(), message)
            }
            ProcessError::NoBackups(path) => {
                write!(f, "No backup directory found at {}", path.display())
            }
            ProcessError::OutputContainsInput { input, output } => write!(
                f,
                "Output directory {} contains the input directory {}",
                output.display(),
                input.display()
            ),
        }
    }
}

impl std::error::Error for ProcessError {}
