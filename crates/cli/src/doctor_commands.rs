//! `argus doctor`: config validation and environment audit.
//!
//! Runs a series of checks against the local setup and prints a structured
//! report with `[ok]`, `[warn]`, `[fail]`, `[skip]`, or `[info]` status
//! indicators per item.

use std::path::Path;

use {
    anyhow::Result,
    argus_browser::detect,
    argus_config::{
        SuiteConfig,
        validate::{self, Severity},
    },
    argus_runner::{SnapshotSet, SnapshotStore},
};

// ── ANSI helpers ────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Per-check result used to build the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Skip,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Info => "info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Skip => DIM,
            Self::Info => CYAN,
        }
    }
}

struct CheckItem {
    status: Status,
    message: String,
}

struct Section {
    title: String,
    items: Vec<CheckItem>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, status: Status, message: impl Into<String>) {
        self.items.push(CheckItem {
            status,
            message: message.into(),
        });
    }
}

// ── Printing ────────────────────────────────────────────────────────────────

fn print_report(sections: &[Section]) -> (usize, usize) {
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for section in sections {
        eprintln!("{BOLD}{}{RESET}", section.title);
        for item in &section.items {
            let color = item.status.color();
            let label = item.status.label();
            eprintln!("  [{color}{label}{RESET}]  {}", item.message);
            match item.status {
                Status::Fail => errors += 1,
                Status::Warn => warnings += 1,
                _ => {},
            }
        }
        eprintln!();
    }

    (errors, warnings)
}

// ── Entry point ─────────────────────────────────────────────────────────────

pub async fn handle_doctor(explicit_config: Option<&Path>) -> Result<()> {
    eprintln!("{BOLD}argus doctor{RESET}");
    eprintln!("{BOLD}============{RESET}\n");

    let config_path = explicit_config
        .map(Path::to_path_buf)
        .or_else(argus_config::find_config_file);

    let mut sections = Vec::new();

    // 1. Config validation
    sections.push(check_config(config_path.as_deref()));

    // Load config for subsequent checks (best-effort).
    let config = match explicit_config {
        Some(p) => argus_config::load_config(p).unwrap_or_default(),
        None => argus_config::discover_and_load(),
    };

    // 2. Browser readiness
    let browser = detect::find_browser(config.render.chrome_path.as_deref());
    sections.push(check_browser(&config, browser.as_deref()));

    // 3. Snapshot store health
    sections.push(check_snapshots(&config).await);

    let (errors, warnings) = print_report(&sections);

    eprintln!("{BOLD}Summary:{RESET} {errors} error(s), {warnings} warning(s)");

    if browser.is_none() {
        eprintln!("\n{}", detect::install_instructions());
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

// ── 1. Config validation ────────────────────────────────────────────────────

fn check_config(config_path: Option<&Path>) -> Section {
    let Some(config_path) = config_path else {
        let mut section = Section::new("Config (no config file)");
        section.push(
            Status::Fail,
            "no config file found; `baseline` and `compare` need a page catalog",
        );
        return section;
    };

    let mut section = Section::new(format!("Config ({})", config_path.display()));

    let result = validate::validate(Some(config_path));

    let has_syntax_error = result
        .diagnostics
        .iter()
        .any(|d| d.category == "syntax" && d.severity == Severity::Error);

    if has_syntax_error {
        for d in &result.diagnostics {
            if d.category == "syntax" {
                section.push(Status::Fail, format!("syntax: {}", d.message));
            }
        }
        // Can't do further checks with broken syntax.
        return section;
    }

    section.push(Status::Ok, "syntax valid");

    let unknown_fields: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.category == "unknown-field")
        .collect();
    if unknown_fields.is_empty() {
        section.push(Status::Ok, "all fields recognized");
    } else {
        for d in &unknown_fields {
            section.push(Status::Fail, format!("{}: {}", d.path, d.message));
        }
    }

    let type_errors: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.category == "type-error")
        .collect();
    if type_errors.is_empty() {
        section.push(Status::Ok, "no type errors");
    } else {
        for d in &type_errors {
            section.push(Status::Fail, d.message.clone());
        }
    }

    // Catalog and render semantics
    for d in &result.diagnostics {
        if d.category == "catalog" || d.category == "render" {
            let status = match d.severity {
                Severity::Error => Status::Fail,
                Severity::Warning => Status::Warn,
                Severity::Info => Status::Info,
            };
            section.push(status, format!("{}: {}", d.path, d.message));
        }
    }

    // File-ref warnings (missing chrome_path and friends)
    for d in &result.diagnostics {
        if d.category == "file-ref" && d.severity != Severity::Info {
            section.push(Status::Warn, format!("{}: {}", d.path, d.message));
        }
    }

    section
}

// ── 2. Browser readiness ────────────────────────────────────────────────────

fn check_browser(config: &SuiteConfig, found: Option<&Path>) -> Section {
    let mut section = Section::new("Browser");

    if let Some(ref configured) = config.render.chrome_path
        && !Path::new(configured).exists()
    {
        section.push(
            Status::Warn,
            format!("configured chrome_path not found: {configured} (falling back to detection)"),
        );
    }

    match found {
        Some(path) => {
            section.push(Status::Ok, format!("Chrome/Chromium: {}", path.display()));
        },
        None => {
            section.push(Status::Fail, "no Chrome/Chromium executable found");
        },
    }

    section.push(
        Status::Info,
        format!(
            "viewport {}x{}, device scale {}",
            config.render.viewport_width,
            config.render.viewport_height,
            config.render.device_scale_factor
        ),
    );
    if !config.render.headless {
        section.push(
            Status::Info,
            "headless disabled: a browser window will open per page",
        );
    }

    section
}

// ── 3. Snapshot store health ────────────────────────────────────────────────

async fn check_snapshots(config: &SuiteConfig) -> Section {
    let mut section = Section::new("Snapshots");
    let store = SnapshotStore::new(&config.snapshots);

    let root = store.root();
    if root.is_dir() {
        section.push(Status::Ok, format!("snapshot root: {}", root.display()));
        check_writable(&mut section, root, "snapshot root");
    } else {
        section.push(
            Status::Info,
            format!(
                "snapshot root not created yet: {} (created on first run)",
                root.display()
            ),
        );
    }

    if config.pages.is_empty() {
        section.push(Status::Skip, "no pages cataloged (skipping baseline coverage)");
        return section;
    }

    let mut covered = 0usize;
    let mut missing = Vec::new();
    for page in &config.pages {
        if store.exists(SnapshotSet::Baseline, &page.id).await {
            covered += 1;
        } else {
            missing.push(page.id.as_str());
        }
    }

    if missing.is_empty() {
        section.push(
            Status::Ok,
            format!("baseline coverage: {covered}/{} page(s)", config.pages.len()),
        );
    } else {
        section.push(
            Status::Warn,
            format!(
                "baseline coverage: {covered}/{} page(s); missing: {} (run `argus baseline`)",
                config.pages.len(),
                missing.join(", ")
            ),
        );
    }

    section
}

fn check_writable(section: &mut Section, dir: &Path, label: &str) {
    let probe = dir.join(".argus-doctor-probe");
    match std::fs::write(&probe, b"probe") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
        },
        Err(e) => {
            section.push(Status::Fail, format!("{label} is not writable: {e}"));
        },
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, argus_config::PageSpec};

    #[test]
    fn status_labels() {
        assert_eq!(Status::Ok.label(), "ok");
        assert_eq!(Status::Warn.label(), "warn");
        assert_eq!(Status::Fail.label(), "fail");
        assert_eq!(Status::Skip.label(), "skip");
        assert_eq!(Status::Info.label(), "info");
    }

    #[test]
    fn section_push_counts() {
        let mut section = Section::new("test");
        section.push(Status::Ok, "good");
        section.push(Status::Warn, "attention");
        section.push(Status::Fail, "bad");
        assert_eq!(section.items.len(), 3);
        assert_eq!(section.items[0].status, Status::Ok);
        assert_eq!(section.items[1].status, Status::Warn);
        assert_eq!(section.items[2].status, Status::Fail);
    }

    #[test]
    fn print_report_counts_errors_and_warnings() {
        let mut section = Section::new("test");
        section.push(Status::Ok, "fine");
        section.push(Status::Warn, "caution");
        section.push(Status::Warn, "caution2");
        section.push(Status::Fail, "broken");
        section.push(Status::Info, "note");

        let (errors, warnings) = print_report(&[section]);
        assert_eq!(errors, 1);
        assert_eq!(warnings, 2);
    }

    #[test]
    fn check_config_accepts_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("argus.toml");
        std::fs::write(
            &path,
            r#"
[[pages]]
id = "home"
url = "https://example.test/"
"#,
        )
        .unwrap();

        let section = check_config(Some(&path));
        assert!(section.items.iter().any(|i| i.message == "syntax valid"));
        assert!(section.items.iter().all(|i| i.status != Status::Fail));
    }

    #[test]
    fn check_config_flags_broken_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("argus.toml");
        std::fs::write(&path, "this is not [ valid toml").unwrap();

        let section = check_config(Some(&path));
        assert!(
            section
                .items
                .iter()
                .any(|i| i.status == Status::Fail && i.message.contains("syntax"))
        );
    }

    #[test]
    fn check_config_flags_unknown_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("argus.toml");
        std::fs::write(
            &path,
            r#"
[rendor]
viewport_width = 1280

[[pages]]
id = "home"
url = "https://example.test/"
"#,
        )
        .unwrap();

        let section = check_config(Some(&path));
        assert!(
            section
                .items
                .iter()
                .any(|i| i.status == Status::Fail && i.message.contains("unknown field"))
        );
    }

    #[test]
    fn check_config_without_file_fails() {
        let section = check_config(None);
        assert!(
            section
                .items
                .iter()
                .any(|i| i.status == Status::Fail && i.message.contains("no config file"))
        );
    }

    #[test]
    fn check_browser_missing_fails() {
        let config = SuiteConfig::default();
        let section = check_browser(&config, None);
        assert!(
            section
                .items
                .iter()
                .any(|i| i.status == Status::Fail && i.message.contains("no Chrome"))
        );
    }

    #[test]
    fn check_browser_found_ok() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("chrome");
        std::fs::write(&fake, b"").unwrap();

        let config = SuiteConfig::default();
        let section = check_browser(&config, Some(&fake));
        assert!(
            section
                .items
                .iter()
                .any(|i| i.status == Status::Ok && i.message.contains("Chrome/Chromium"))
        );
    }

    #[test]
    fn check_browser_warns_on_missing_configured_path() {
        let mut config = SuiteConfig::default();
        config.render.chrome_path = Some("/definitely/not/here/chrome".into());
        let section = check_browser(&config, None);
        assert!(
            section
                .items
                .iter()
                .any(|i| i.status == Status::Warn && i.message.contains("chrome_path"))
        );
    }

    #[tokio::test]
    async fn check_snapshots_empty_catalog_skips_coverage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SuiteConfig::default();
        config.snapshots.root = dir.path().to_path_buf();

        let section = check_snapshots(&config).await;
        assert!(section.items.iter().any(|i| i.status == Status::Skip));
    }

    #[tokio::test]
    async fn check_snapshots_reports_partial_coverage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SuiteConfig::default();
        config.snapshots.root = dir.path().to_path_buf();
        config.pages = vec![
            PageSpec::new("covered", "https://example.test/"),
            PageSpec::new("uncovered", "https://example.test/other"),
        ];

        let store = SnapshotStore::new(&config.snapshots);
        store
            .write(SnapshotSet::Baseline, "covered", b"png bytes")
            .await
            .unwrap();

        let section = check_snapshots(&config).await;
        let coverage = section
            .items
            .iter()
            .find(|i| i.message.contains("baseline coverage"))
            .unwrap();
        assert_eq!(coverage.status, Status::Warn);
        assert!(coverage.message.contains("1/2"));
        assert!(coverage.message.contains("uncovered"));
    }

    #[tokio::test]
    async fn check_snapshots_full_coverage_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SuiteConfig::default();
        config.snapshots.root = dir.path().to_path_buf();
        config.pages = vec![PageSpec::new("home", "https://example.test/")];

        let store = SnapshotStore::new(&config.snapshots);
        store
            .write(SnapshotSet::Baseline, "home", b"png bytes")
            .await
            .unwrap();

        let section = check_snapshots(&config).await;
        let coverage = section
            .items
            .iter()
            .find(|i| i.message.contains("baseline coverage"))
            .unwrap();
        assert_eq!(coverage.status, Status::Ok);
        assert!(coverage.message.contains("1/1"));
    }
}
