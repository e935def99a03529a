//! Per-page browser sessions: launch, navigate, stabilize, capture.
//!
//! Every page gets its own browser process. [`Renderer::stabilize`] launches
//! it, navigates, waits for network idle, runs the scroll sweep, and returns
//! a [`StabilizedPage`]. The process is released when the page is dropped (or
//! explicitly via [`StabilizedPage::release`]), so a failure anywhere in the
//! pipeline cannot leak a browser into the next page's run.

use {
    chromiumoxide::{
        Browser, BrowserConfig, Page,
        cdp::browser_protocol::{
            emulation::SetDeviceMetricsOverrideParams, page::CaptureScreenshotFormat,
        },
        handler::viewport::Viewport,
        page::ScreenshotParams,
    },
    futures::StreamExt,
    tokio::time::{Duration, sleep, timeout},
    tracing::{debug, info, warn},
};

use crate::{
    detect,
    error::{BrowserError, Result},
    sweep::{ScrollSweep, SweepStep},
    types::RendererConfig,
};

/// Launches one browser per page and drives it to a stable, capturable state.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Navigate to `url` and bring the page to a capturable state: wait for
    /// network idle, pause for late rendering, then sweep the full scroll
    /// height so lazy-loaded content is forced in, and snap back to the top.
    pub async fn stabilize(&self, url: &str) -> Result<StabilizedPage> {
        validate_url(url)?;

        let browser = self.launch().await?;
        let page = self.navigate(&browser, url).await?;

        sleep(Duration::from_millis(self.config.settle_ms)).await;
        self.sweep(&page, url).await?;

        info!(url, "page stabilized");
        Ok(StabilizedPage {
            browser,
            page,
            url: url.to_owned(),
        })
    }

    async fn launch(&self) -> Result<Browser> {
        let Some(executable) = detect::find_browser(self.config.chrome_path.as_deref()) else {
            return Err(BrowserError::LaunchFailed(format!(
                "Chrome/Chromium not found. {}",
                detect::install_instructions()
            )));
        };

        let mut builder = BrowserConfig::builder();

        // chromiumoxide runs headless by default; with_head() opts out.
        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .viewport(Viewport {
                width: self.config.viewport_width,
                height: self.config.viewport_height,
                device_scale_factor: Some(self.config.device_scale_factor),
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            })
            .request_timeout(Duration::from_millis(self.config.navigation_timeout_ms))
            .chrome_executable(&executable);

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        builder = builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer")
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox");

        let config = builder.build().map_err(|e| {
            BrowserError::LaunchFailed(format!("failed to build browser config: {e}"))
        })?;

        debug!(
            executable = %executable.display(),
            viewport_width = self.config.viewport_width,
            viewport_height = self.config.viewport_height,
            device_scale_factor = self.config.device_scale_factor,
            headless = self.config.headless,
            "launching browser"
        );

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            let install_hint = detect::install_instructions();
            BrowserError::LaunchFailed(format!("browser launch failed: {e}\n\n{install_hint}"))
        })?;

        // Drive browser events until the connection closes (on drop).
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!(?event, "browser event");
            }
        });

        Ok(browser)
    }

    async fn navigate(&self, browser: &Browser, url: &str) -> Result<Page> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Browser-level viewport is not always applied to new pages, so set
        // it explicitly on the page as well.
        let viewport_cmd = SetDeviceMetricsOverrideParams::builder()
            .width(self.config.viewport_width)
            .height(self.config.viewport_height)
            .device_scale_factor(self.config.device_scale_factor)
            .mobile(false)
            .build()
            .map_err(BrowserError::Cdp)?;

        if let Err(e) = page.execute(viewport_cmd).await {
            warn!(url, error = %e, "failed to set page viewport");
        }

        page.goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        // Wait for network idle, bounded so a never-quiet page fails the
        // page rather than hanging the whole run.
        let bound = Duration::from_millis(self.config.navigation_timeout_ms);
        match timeout(bound, page.wait_for_navigation()).await {
            Ok(Ok(_)) => {},
            Ok(Err(e)) => {
                return Err(BrowserError::NavigationFailed(format!(
                    "{url} did not reach network idle: {e}"
                )));
            },
            Err(_) => {
                return Err(BrowserError::Timeout(format!(
                    "navigation to {url} did not settle within {}ms",
                    self.config.navigation_timeout_ms
                )));
            },
        }

        debug!(url, "navigation reached network idle");
        Ok(page)
    }

    /// Walk the page top to bottom in fixed steps, re-reading the scroll
    /// height each step, then scroll back to the top.
    async fn sweep(&self, page: &Page, url: &str) -> Result<()> {
        let mut sweep = ScrollSweep::new(self.config.scroll_step_px, self.config.max_scroll_steps);
        let pause = Duration::from_millis(self.config.scroll_pause_ms);

        loop {
            let height = scroll_height(page).await?;
            match sweep.advance(height) {
                SweepStep::Scroll { by } => {
                    let js = format!("window.scrollBy(0, {by}); true");
                    page.evaluate(js.as_str())
                        .await
                        .map_err(|e| BrowserError::JsEvalFailed(e.to_string()))?;
                    sleep(pause).await;
                },
                SweepStep::Done => break,
                SweepStep::Exhausted => {
                    warn!(
                        url,
                        steps = sweep.steps_taken(),
                        last_height = height,
                        "scroll sweep hit its step cap before covering the page"
                    );
                    break;
                },
            }
        }

        page.evaluate("window.scrollTo(0, 0); true")
            .await
            .map_err(|e| BrowserError::JsEvalFailed(e.to_string()))?;

        debug!(url, steps = sweep.steps_taken(), "scroll sweep complete");
        Ok(())
    }
}

/// A page that has been navigated and stabilized, ready for capture.
///
/// Owns the browser process; dropping this releases it.
pub struct StabilizedPage {
    browser: Browser,
    page: Page,
    url: String,
}

impl StabilizedPage {
    /// Capture a full-page PNG of the stabilized page.
    pub async fn capture_full_page(&self) -> Result<Vec<u8>> {
        let shot = self
            .page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))?;

        debug!(
            url = self.url.as_str(),
            bytes = shot.len(),
            "captured full-page screenshot"
        );
        Ok(shot)
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Release the browser process now instead of waiting for drop.
    pub fn release(self) {
        debug!(url = self.url.as_str(), "releasing browser");
        drop(self.page);
        drop(self.browser);
    }
}

async fn scroll_height(page: &Page) -> Result<u64> {
    let height: f64 = page
        .evaluate("document.documentElement.scrollHeight")
        .await
        .map_err(|e| BrowserError::JsEvalFailed(e.to_string()))?
        .into_value()
        .map_err(|e| BrowserError::JsEvalFailed(format!("failed to read scroll height: {e}")))?;
    Ok(height.max(0.0) as u64)
}

/// Validate a catalog URL before attempting navigation.
fn validate_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(BrowserError::InvalidUrl("URL cannot be empty".to_owned()));
    }

    let parsed = url::Url::parse(url)
        .map_err(|e| BrowserError::InvalidUrl(format!("invalid URL '{url}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(BrowserError::InvalidUrl(format!(
            "unsupported URL scheme '{scheme}', only http/https allowed"
        ))),
    }
}
