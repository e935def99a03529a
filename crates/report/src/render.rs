//! Report rendering: template structs and row mapping for the summary page
//! produced at the end of every comparison run.

use std::{fs, path::Path};

use {askama::Template, chrono::Local};

use crate::error::{ReportError, Result};

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// One page outcome, as the orchestrator hands it over.
///
/// `diff_src` must already be relative to the directory the report file is
/// written into (e.g. `diff/home.png`), or `None` when no diff image exists
/// for the page.
pub struct ReportEntry<'a> {
    pub name: &'a str,
    pub mismatch_percent: f64,
    pub diff_src: Option<&'a str>,
}

/// Render the report HTML for a finished run.
pub fn render_report(title: &str, entries: &[ReportEntry<'_>]) -> Result<String> {
    let rows = build_row_views(entries);
    let changed = rows.iter().filter(|row| row.flagged).count();
    let template = ReportTemplate {
        title,
        generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        total: rows.len(),
        changed,
        rows: &rows,
    };
    template
        .render()
        .map_err(|e| ReportError::Render(e.to_string()))
}

/// Render the report and write it to `path` in one step.
pub fn write_report(path: &Path, title: &str, entries: &[ReportEntry<'_>]) -> Result<()> {
    let html = render_report(title, entries)?;
    fs::write(path, html)
        .map_err(|e| ReportError::Write(format!("{}: {e}", path.display())))
}

// ---------------------------------------------------------------------------
// Askama template structs
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "report.html", escape = "html")]
struct ReportTemplate<'a> {
    title: &'a str,
    generated_at: String,
    total: usize,
    changed: usize,
    rows: &'a [RowView],
}

/// Precomputed display state for one table row.
struct RowView {
    name: String,
    mismatch_label: String,
    flagged: bool,
    has_diff: bool,
    diff_src: String,
}

fn build_row_views(entries: &[ReportEntry<'_>]) -> Vec<RowView> {
    entries
        .iter()
        .map(|entry| RowView {
            name: entry.name.to_owned(),
            mismatch_label: format!("{:.2}%", entry.mismatch_percent),
            // Flagging uses the raw value: 0.004% rounds to a "0.00%" label
            // but the row is still marked as changed.
            flagged: entry.mismatch_percent > 0.0,
            has_diff: entry.diff_src.is_some(),
            diff_src: entry.diff_src.unwrap_or_default().to_owned(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn entry<'a>(name: &'a str, mismatch: f64, diff: Option<&'a str>) -> ReportEntry<'a> {
        ReportEntry {
            name,
            mismatch_percent: mismatch,
            diff_src: diff,
        }
    }

    #[test]
    fn report_lists_every_page_with_formatted_mismatch() {
        let entries = [
            entry("home", 0.0, None),
            entry("pricing", 12.345, Some("diff/pricing.png")),
        ];
        let html = render_report("Visual Regression Test Report", &entries).unwrap();

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Visual Regression Test Report"));
        assert!(html.contains("home"));
        assert!(html.contains("pricing"));
        assert!(html.contains("0.00%"));
        assert!(html.contains("12.35%"));
    }

    #[test]
    fn nonzero_mismatch_flags_exactly_the_changed_rows() {
        let entries = [
            entry("home", 0.0, None),
            entry("about", 3.2, Some("diff/about.png")),
            entry("contact", 0.0, None),
        ];
        let html = render_report("report", &entries).unwrap();

        assert_eq!(html.matches("class=\"different\"").count(), 1);
        assert!(html.contains("1 of 3 page(s) changed"));
    }

    #[test]
    fn zero_mismatch_run_has_no_flagged_rows() {
        let entries = [entry("home", 0.0, None), entry("about", 0.0, None)];
        let html = render_report("report", &entries).unwrap();

        assert!(!html.contains("class=\"different\""));
        assert!(html.contains("0 of 2 page(s) changed"));
    }

    #[test]
    fn tiny_nonzero_mismatch_is_flagged_despite_rounded_label() {
        let entries = [entry("home", 0.004, Some("diff/home.png"))];
        let html = render_report("report", &entries).unwrap();

        assert!(html.contains("0.00"));
        assert!(html.contains("class=\"different\""));
    }

    #[test]
    fn diff_image_rendered_only_when_present() {
        let entries = [
            entry("home", 4.1, Some("diff/home.png")),
            entry("broken", 100.0, None),
        ];
        let html = render_report("report", &entries).unwrap();

        assert!(html.contains("src=\"diff/home.png\""));
        assert!(html.contains("alt=\"Diff for home\""));
        assert!(html.contains("no diff image"));
    }

    #[test]
    fn page_names_are_html_escaped() {
        let entries = [entry("<script>alert(1)</script>", 0.0, None)];
        let html = render_report("report", &entries).unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn report_includes_generation_timestamp() {
        let html = render_report("report", &[]).unwrap();
        assert!(html.contains("Generated "));
        assert!(html.contains("0 of 0 page(s) changed"));
    }

    #[test]
    fn write_report_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visual_regression_report.html");
        let entries = [entry("home", 0.0, None)];

        write_report(&path, "Visual Regression Test Report", &entries).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("Visual Regression Test Report"));
    }

    #[test]
    fn write_report_surfaces_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.html");

        let err = write_report(&path, "report", &[]).unwrap_err();
        assert!(matches!(err, ReportError::Write(_)));
    }
}
