//! Sequential per-page pipeline: render, capture, compare, record, report.

use {
    anyhow::{Context, Result, bail},
    tracing::{debug, error, info},
};

use {
    argus_browser::{Renderer, RendererConfig},
    argus_config::{PageSpec, ReportConfig, SuiteConfig},
    argus_diff::compare_images,
    argus_report::{ReportEntry, write_report},
};

use crate::{
    store::{SnapshotSet, SnapshotStore},
    types::PageRecord,
};

/// Drives the full run: pages are processed strictly one at a time in
/// catalog order, each with its own browser process. A page failing at any
/// stage is recorded as maximal mismatch and the run moves on; only setup
/// and report writing abort the run.
pub struct Pipeline {
    renderer: Renderer,
    store: SnapshotStore,
    report: ReportConfig,
    pages: Vec<PageSpec>,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: &SuiteConfig) -> Self {
        Self {
            renderer: Renderer::new(RendererConfig::from(&config.render)),
            store: SnapshotStore::new(&config.snapshots),
            report: config.report.clone(),
            pages: config.pages.clone(),
        }
    }

    #[must_use]
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Capture the baseline snapshot set.
    ///
    /// Unlike a comparison run there is no degraded fallback here: a page
    /// that cannot be captured leaves the suite without a reference, so the
    /// first failure aborts the whole capture.
    pub async fn capture_baseline(&self, only: Option<&str>) -> Result<()> {
        let pages = self.selected_pages(only)?;
        self.store.ensure_layout().await?;

        for page in pages {
            info!(id = %page.id, url = %page.url, "capturing baseline");
            let bytes = self.render_and_capture(page).await?;
            self.store
                .write(SnapshotSet::Baseline, &page.id, &bytes)
                .await?;
        }

        info!("baseline capture complete");
        Ok(())
    }

    /// Run the comparison suite and write the report.
    ///
    /// Returns the per-page records in catalog order. Pages that fail to
    /// render, capture, or compare appear as 100% mismatch with no diff
    /// image; a report-write failure is fatal.
    pub async fn run_compare(&self, only: Option<&str>) -> Result<Vec<PageRecord>> {
        let pages = self.selected_pages(only)?;
        self.store.ensure_layout().await?;

        let mut records = Vec::with_capacity(pages.len());
        for page in pages {
            let record = match self.compare_page(page).await {
                Ok(record) => {
                    info!(
                        id = %page.id,
                        mismatch_percent = record.mismatch_percent,
                        "page compared"
                    );
                    record
                },
                Err(e) => {
                    error!(id = %page.id, error = %e, "page failed; recording maximal mismatch");
                    PageRecord::failed(&page.id)
                },
            };
            records.push(record);
        }

        self.write_report(&records).await?;
        Ok(records)
    }

    /// Diff the stored current snapshot against the stored baseline for one
    /// page, writing the diff image. Does not touch the browser; useful for
    /// re-running comparisons over existing captures.
    pub async fn compare_snapshots(&self, page_id: &str) -> Result<PageRecord> {
        let baseline = self
            .store
            .read(SnapshotSet::Baseline, page_id)
            .await
            .with_context(|| {
                format!("no baseline snapshot for page '{page_id}'; capture a baseline first")
            })?;
        let current = self.store.read(SnapshotSet::Current, page_id).await?;

        let comparison = compare_images(&baseline, &current)?;
        let diff_path = self
            .store
            .write(SnapshotSet::Diff, page_id, &comparison.diff_png)
            .await?;

        Ok(PageRecord {
            page_id: page_id.to_owned(),
            mismatch_percent: comparison.mismatch_percent,
            diff_image: Some(diff_path),
        })
    }

    async fn compare_page(&self, page: &PageSpec) -> Result<PageRecord> {
        debug!(id = %page.id, url = %page.url, "rendering page");
        let current = self.render_and_capture(page).await?;
        self.store
            .write(SnapshotSet::Current, &page.id, &current)
            .await?;
        self.compare_snapshots(&page.id).await
    }

    /// Stabilize the page in a fresh browser and capture it. The browser is
    /// released as soon as the capture bytes are in hand; on error it is
    /// released when the session drops.
    async fn render_and_capture(&self, page: &PageSpec) -> Result<Vec<u8>> {
        let stabilized = self.renderer.stabilize(&page.url).await?;
        let bytes = stabilized.capture_full_page().await?;
        stabilized.release();
        Ok(bytes)
    }

    async fn write_report(&self, records: &[PageRecord]) -> Result<()> {
        // Relative to the report file, which sits at the snapshot root.
        let diff_srcs: Vec<Option<String>> = records
            .iter()
            .map(|r| {
                r.diff_image
                    .as_ref()
                    .map(|_| self.store.href(SnapshotSet::Diff, &r.page_id))
            })
            .collect();
        let entries: Vec<ReportEntry<'_>> = records
            .iter()
            .zip(&diff_srcs)
            .map(|(r, src)| ReportEntry {
                name: &r.page_id,
                mismatch_percent: r.mismatch_percent,
                diff_src: src.as_deref(),
            })
            .collect();

        let path = self.store.report_path(&self.report.path);
        write_report(&path, &self.report.title, &entries)
            .with_context(|| format!("failed to write report to {}", path.display()))?;

        info!(
            path = %path.display(),
            pages = records.len(),
            changed = records.iter().filter(|r| r.changed()).count(),
            "report written"
        );
        Ok(())
    }

    fn selected_pages(&self, only: Option<&str>) -> Result<Vec<&PageSpec>> {
        match only {
            None => {
                if self.pages.is_empty() {
                    bail!("page catalog is empty; nothing to do");
                }
                Ok(self.pages.iter().collect())
            },
            Some(id) => {
                let page = self
                    .pages
                    .iter()
                    .find(|p| p.id == id)
                    .with_context(|| format!("no page '{id}' in the catalog"))?;
                Ok(vec![page])
            },
        }
    }
}
