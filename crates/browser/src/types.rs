//! Renderer configuration.

use argus_config::RenderConfig;

/// Runtime configuration for the page renderer.
///
/// Mirrors [`argus_config::RenderConfig`] so the browser layer has no view of
/// config loading; the orchestrator converts once at startup.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Whether to run the browser headless.
    pub headless: bool,
    /// Viewport width in CSS pixels.
    pub viewport_width: u32,
    /// Viewport height in CSS pixels.
    pub viewport_height: u32,
    /// Device scale factor for HiDPI captures.
    pub device_scale_factor: f64,
    /// Bound on navigation plus network-quiescence wait.
    pub navigation_timeout_ms: u64,
    /// Extra pause after network idle before the scroll sweep starts.
    pub settle_ms: u64,
    /// Pixels scrolled per sweep step.
    pub scroll_step_px: u32,
    /// Pause between sweep steps, giving lazy content time to render.
    pub scroll_pause_ms: u64,
    /// Hard cap on sweep steps per page.
    pub max_scroll_steps: u32,
    /// Explicit browser executable (auto-detected if unset).
    pub chrome_path: Option<String>,
    /// Additional Chrome arguments.
    pub chrome_args: Vec<String>,
}

impl From<&RenderConfig> for RendererConfig {
    fn from(cfg: &RenderConfig) -> Self {
        Self {
            headless: cfg.headless,
            viewport_width: cfg.viewport_width,
            viewport_height: cfg.viewport_height,
            device_scale_factor: cfg.device_scale_factor,
            navigation_timeout_ms: cfg.navigation_timeout_ms,
            settle_ms: cfg.settle_ms,
            scroll_step_px: cfg.scroll_step_px,
            scroll_pause_ms: cfg.scroll_pause_ms,
            max_scroll_steps: cfg.max_scroll_steps,
            chrome_path: cfg.chrome_path.clone(),
            chrome_args: cfg.chrome_args.clone(),
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}
