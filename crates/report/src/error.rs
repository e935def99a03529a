/// Errors from report rendering and writing.
///
/// Unlike per-page capture or diff failures, nothing here is recoverable: a
/// run that cannot produce its report has nothing to show, so callers abort.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report template render failed: {0}")]
    Render(String),
    #[error("failed to write report: {0}")]
    Write(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
