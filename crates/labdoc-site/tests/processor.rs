use std::fs;
use std::path::Path;

use labdoc_site::{BACKUP_DIR, FormatSetting, ProcessError, ProcessOptions, Processor, SiteConfig};
use labdoc_theme::{Category, FixedScheme, ThemeName, ThemePreference};

const PAGE: &str = "<html><head><title>Lab</title></head><body>\
<pre>#include &lt;stdio.h&gt;\nint main() { return 0; }</pre>\
</body></html>";

fn options(input: &Path) -> ProcessOptions {
    ProcessOptions {
        input_dir: input.to_path_buf(),
        output_dir: None,
        config: SiteConfig::default(),
        preference: ThemePreference::Dark,
        backup: false,
        verbose: false,
    }
}

fn write_site(dir: &Path) {
    fs::create_dir_all(dir.join("labs")).unwrap();
    fs::write(dir.join("index.html"), PAGE).unwrap();
    fs::write(dir.join("labs/lab1.html"), PAGE).unwrap();
    fs::write(dir.join("style.css"), "body {}").unwrap();
}

#[test]
fn writes_to_output_directory() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_site(input.path());

    let mut processor = Processor::new(ProcessOptions {
        output_dir: Some(output.path().join("site")),
        ..options(input.path())
    });
    let stats = processor.process().unwrap();

    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.blocks_highlighted, 2);
    assert!(stats.failures.is_empty());
    assert!(stats.bytes_output > stats.bytes_input);

    // Input untouched, non-HTML files copied along.
    assert_eq!(fs::read_to_string(input.path().join("index.html")).unwrap(), PAGE);
    assert!(output.path().join("site/style.css").is_file());

    let page = fs::read_to_string(output.path().join("site/labs/lab1.html")).unwrap();
    assert!(page.contains(r#"data-theme="dark""#), "{page}");
    assert!(page.contains(r#"<span class="code-language">C</span>"#), "{page}");
    assert!(page.contains("hl-preprocessor"), "{page}");
}

#[test]
fn refuses_to_clear_a_parent_of_the_input() {
    let root = tempfile::tempdir().unwrap();
    let input = root.path().join("docs/labs");
    write_site(&input);

    for output in [root.path().join("docs"), root.path().to_path_buf()] {
        let err = Processor::new(ProcessOptions {
            output_dir: Some(output),
            ..options(&input)
        })
        .process()
        .unwrap_err();
        assert!(matches!(err, ProcessError::OutputContainsInput { .. }), "{err}");
    }

    assert_eq!(fs::read_to_string(input.join("index.html")).unwrap(), PAGE);
    assert!(input.join("labs/lab1.html").is_file());
}

#[test]
fn output_spelled_differently_is_in_place() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());

    let stats = Processor::new(ProcessOptions {
        output_dir: Some(dir.path().join(".")),
        ..options(dir.path())
    })
    .process()
    .unwrap();

    assert_eq!(stats.files_processed, 2);
    assert!(dir.path().join("style.css").is_file());
    let page = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(page.contains(r#"<style id="labdoc-styles">"#), "{page}");
}

#[test]
fn second_pass_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());

    Processor::new(options(dir.path())).process().unwrap();
    let first = fs::read_to_string(dir.path().join("index.html")).unwrap();

    let stats = Processor::new(options(dir.path())).process().unwrap();
    assert_eq!(stats.files_already_enhanced, 2);
    assert_eq!(stats.blocks_highlighted, 0);
    assert_eq!(fs::read_to_string(dir.path().join("index.html")).unwrap(), first);
}

#[test]
fn inline_colors_follow_the_signal() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());

    let config = SiteConfig {
        format: FormatSetting::InlineStyle,
        ..SiteConfig::default()
    };
    let mut processor = Processor::new(ProcessOptions {
        config,
        preference: ThemePreference::Auto,
        ..options(dir.path())
    });
    processor
        .process_with_signal(&FixedScheme(true))
        .unwrap();

    let page = fs::read_to_string(dir.path().join("index.html")).unwrap();
    let keyword = ThemeName::Dark.palette().color(Category::Keyword);
    assert!(page.contains(r#"data-theme="auto""#), "{page}");
    assert!(
        page.contains(&format!(r#"<span style="color: {keyword};">int</span>"#)),
        "{page}"
    );
}

#[test]
fn backup_and_restore() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());

    let stats = Processor::new(ProcessOptions {
        backup: true,
        ..options(dir.path())
    })
    .process()
    .unwrap();
    assert_eq!(stats.files_backed_up, 2);

    let backup = dir.path().join(BACKUP_DIR).join("labs/lab1.html");
    assert_eq!(fs::read_to_string(&backup).unwrap(), PAGE);

    let processor = Processor::new(options(dir.path()));
    let status = processor.status().unwrap();
    assert_eq!(status.len(), 2);
    assert!(status.iter().all(|page| page.enhanced && page.backed_up));

    assert_eq!(processor.restore().unwrap(), 2);
    assert_eq!(
        fs::read_to_string(dir.path().join("labs/lab1.html")).unwrap(),
        PAGE
    );
    assert!(processor.status().unwrap().iter().all(|page| !page.enhanced));
}

#[test]
fn existing_backups_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());
    let backups = dir.path().join(BACKUP_DIR);
    fs::create_dir_all(&backups).unwrap();
    fs::write(backups.join("index.html"), "original").unwrap();

    let stats = Processor::new(ProcessOptions {
        backup: true,
        ..options(dir.path())
    })
    .process()
    .unwrap();

    assert_eq!(stats.files_backed_up, 1);
    assert_eq!(fs::read_to_string(backups.join("index.html")).unwrap(), "original");
}

#[test]
fn restore_without_backups_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());

    let err = Processor::new(options(dir.path())).restore().unwrap_err();
    assert!(matches!(err, ProcessError::NoBackups(_)));
}

#[test]
fn latin1_pages_are_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let page = b"<html><head><meta charset=\"windows-1252\"></head><body><p>caf\xe9</p></body></html>";
    fs::write(dir.path().join("index.html"), page).unwrap();

    Processor::new(options(dir.path())).process().unwrap();

    let out = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(out.contains("café"), "{out}");
    assert!(out.contains(r#"<meta charset="UTF-8">"#), "{out}");
}
