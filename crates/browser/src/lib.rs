//! Headless-browser page rendering for visual regression capture.
//!
//! One Chrome/Chromium process is launched per page. The [`Renderer`]
//! navigates, waits for network idle, sweeps the full scroll height so
//! lazy-loaded content renders, then hands back a [`StabilizedPage`] that
//! produces full-page PNG captures. Dropping the page releases the process.

pub mod detect;
pub mod error;
pub mod session;
pub mod sweep;
pub mod types;

pub use {
    error::{BrowserError, Result},
    session::{Renderer, StabilizedPage},
    sweep::{ScrollSweep, SweepStep},
    types::RendererConfig,
};
