//! Per-page result records.

use std::path::PathBuf;

/// Outcome of one page's comparison, in report shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub page_id: String,
    /// Mismatch percentage in [0, 100]; 0 means pixel-identical structure.
    pub mismatch_percent: f64,
    /// Stored diff image, present exactly when the comparison itself ran.
    pub diff_image: Option<PathBuf>,
}

impl PageRecord {
    /// Degraded record for a page whose render, capture, or comparison
    /// failed: maximal mismatch and no diff image, so the failure is
    /// impossible to mistake for a clean pass.
    #[must_use]
    pub fn failed(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            mismatch_percent: 100.0,
            diff_image: None,
        }
    }

    /// Whether this page should be flagged in the report. Any nonzero
    /// mismatch counts; there is no tolerance threshold.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.mismatch_percent > 0.0
    }
}
