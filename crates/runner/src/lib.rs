//! Orchestration for visual regression runs.
//!
//! Ties the other crates together: loads page specs from
//! [`argus_config`], renders them with [`argus_browser`], compares
//! captures with [`argus_diff`], persists snapshots through
//! [`SnapshotStore`], and emits the HTML report via [`argus_report`].

pub mod pipeline;
pub mod store;
pub mod types;

pub use {
    pipeline::Pipeline,
    store::{SnapshotSet, SnapshotStore},
    types::PageRecord,
};
