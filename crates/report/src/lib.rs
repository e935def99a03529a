//! HTML report generation for visual regression runs.
//!
//! The report is a single static page: one table row per catalog page with
//! its mismatch percentage and a link to the diff image when one exists.
//! Rows with any nonzero mismatch are visually flagged.

pub mod error;
pub mod render;

pub use {
    error::{ReportError, Result},
    render::{ReportEntry, render_report, write_report},
};
