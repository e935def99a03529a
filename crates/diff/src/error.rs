/// Errors from the diff engine.
///
/// All variants are terminal for the page being compared; the caller decides
/// whether to degrade (comparison run) or abort (nothing here aborts a run on
/// its own).
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("diff image encode failed: {0}")]
    Encode(String),
    #[error("similarity computation failed: {0}")]
    Compare(String),
}

pub type Result<T> = std::result::Result<T, DiffError>;
