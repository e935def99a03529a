/// Suite configuration schema: rendering parameters, snapshot set layout,
/// report output, and the page catalog.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A cataloged page: stable identifier plus the URL to render.
///
/// The id keys every derived artifact (`baseline/<id>.png`,
/// `current/<id>.png`, `diff/<id>.png`, the report row), so it must stay
/// stable across runs or baselines stop matching up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    /// Unique, filename-safe identifier.
    pub id: String,
    /// Absolute http(s) URL to capture.
    pub url: String,
}

impl PageSpec {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    pub render: RenderConfig,
    pub snapshots: SnapshotConfig,
    pub report: ReportConfig,
    /// The page catalog, in capture/report order.
    pub pages: Vec<PageSpec>,
}

impl SuiteConfig {
    /// Look up a cataloged page by id.
    #[must_use]
    pub fn page(&self, id: &str) -> Option<&PageSpec> {
        self.pages.iter().find(|p| p.id == id)
    }
}

/// Rendering and stabilization parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Run the browser headless. Defaults to true.
    pub headless: bool,
    /// Viewport width in CSS pixels. Defaults to 1920.
    pub viewport_width: u32,
    /// Viewport height in CSS pixels. Defaults to 1080.
    pub viewport_height: u32,
    /// Device scale factor. Defaults to 1.0 so captures map 1:1 to CSS pixels
    /// and stay comparable across machines with different displays.
    pub device_scale_factor: f64,
    /// Deadline for navigation plus network quiescence, in milliseconds.
    /// Defaults to 30000.
    pub navigation_timeout_ms: u64,
    /// Extra settle pause after navigation quiesces, in milliseconds. Gives
    /// late lazy-load triggers a window to fire. Defaults to 500.
    pub settle_ms: u64,
    /// Scroll sweep increment in pixels. Defaults to 100.
    pub scroll_step_px: u32,
    /// Pause between scroll steps, in milliseconds. Defaults to 100.
    pub scroll_pause_ms: u64,
    /// Upper bound on scroll sweep iterations, so a page whose scrollable
    /// height keeps growing cannot hang the run. Defaults to 600.
    pub max_scroll_steps: u32,
    /// Explicit Chrome/Chromium executable path. Auto-detected when unset.
    pub chrome_path: Option<String>,
    /// Extra Chrome command-line flags.
    pub chrome_args: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            device_scale_factor: 1.0,
            navigation_timeout_ms: 30_000,
            settle_ms: 500,
            scroll_step_px: 100,
            scroll_pause_ms: 100,
            max_scroll_steps: 600,
            chrome_path: None,
            chrome_args: Vec::new(),
        }
    }
}

/// Where the snapshot sets live on disk.
///
/// Each set is a flat directory of `<page id>.png` files under `root`;
/// membership is inferred from filenames, there is no manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Parent directory of the snapshot set directories. Defaults to ".".
    pub root: PathBuf,
    /// Baseline set directory name. Defaults to "baseline".
    pub baseline_dir: String,
    /// Current set directory name. Defaults to "current".
    pub current_dir: String,
    /// Diff image directory name. Defaults to "diff".
    pub diff_dir: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            baseline_dir: "baseline".into(),
            current_dir: "current".into(),
            diff_dir: "diff".into(),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output path for the HTML report, overwritten each run. Resolved
    /// against the snapshot root; diff image references inside the report are
    /// relative to that root, so keep the report file there.
    /// Defaults to "visual_regression_report.html".
    pub path: PathBuf,
    /// Report heading. Defaults to "Visual Regression Test Report".
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("visual_regression_report.html"),
            title: "Visual Regression Test Report".into(),
        }
    }
}
