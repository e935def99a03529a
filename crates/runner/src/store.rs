//! Snapshot storage: flat directories of `<page id>.png` files.

use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result},
    tokio::fs,
};

use argus_config::SnapshotConfig;

/// The three snapshot sets a run works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSet {
    /// Reference captures, written only by the baseline command.
    Baseline,
    /// Captures from the comparison run in progress.
    Current,
    /// Rendered diff images.
    Diff,
}

/// Disk layout for snapshots: one directory per set under a common root,
/// one PNG per page inside each. Membership is inferred from filenames;
/// there is no manifest. Writes overwrite, so re-running a capture for the
/// same page is idempotent.
pub struct SnapshotStore {
    root: PathBuf,
    baseline_dir: String,
    current_dir: String,
    diff_dir: String,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(cfg: &SnapshotConfig) -> Self {
        Self {
            root: cfg.root.clone(),
            baseline_dir: cfg.baseline_dir.clone(),
            current_dir: cfg.current_dir.clone(),
            diff_dir: cfg.diff_dir.clone(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir_name(&self, set: SnapshotSet) -> &str {
        match set {
            SnapshotSet::Baseline => &self.baseline_dir,
            SnapshotSet::Current => &self.current_dir,
            SnapshotSet::Diff => &self.diff_dir,
        }
    }

    /// Absolute-ish path of one page's snapshot in a set.
    #[must_use]
    pub fn path(&self, set: SnapshotSet, page_id: &str) -> PathBuf {
        self.root
            .join(self.dir_name(set))
            .join(format!("{page_id}.png"))
    }

    /// Snapshot location relative to the store root, for report links.
    #[must_use]
    pub fn href(&self, set: SnapshotSet, page_id: &str) -> String {
        format!("{}/{page_id}.png", self.dir_name(set))
    }

    /// Where a report file configured as `file_name` lands.
    #[must_use]
    pub fn report_path(&self, file_name: &Path) -> PathBuf {
        self.root.join(file_name)
    }

    /// Create the set directories. Safe to call repeatedly.
    pub async fn ensure_layout(&self) -> Result<()> {
        for set in [SnapshotSet::Baseline, SnapshotSet::Current, SnapshotSet::Diff] {
            let dir = self.root.join(self.dir_name(set));
            fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("failed to create snapshot dir {}", dir.display()))?;
        }
        Ok(())
    }

    /// Store one page's snapshot, replacing any previous capture.
    pub async fn write(&self, set: SnapshotSet, page_id: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(set, page_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        Ok(path)
    }

    pub async fn read(&self, set: SnapshotSet, page_id: &str) -> Result<Vec<u8>> {
        let path = self.path(set, page_id);
        fs::read(&path)
            .await
            .with_context(|| format!("failed to read snapshot {}", path.display()))
    }

    pub async fn exists(&self, set: SnapshotSet, page_id: &str) -> bool {
        fs::try_exists(self.path(set, page_id)).await.unwrap_or(false)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, tempfile::TempDir};

    fn make_store(root: &Path) -> SnapshotStore {
        SnapshotStore::new(&SnapshotConfig {
            root: root.to_path_buf(),
            ..SnapshotConfig::default()
        })
    }

    #[tokio::test]
    async fn write_then_read_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(tmp.path());

        store
            .write(SnapshotSet::Baseline, "home", b"png-bytes")
            .await
            .unwrap();
        let bytes = store.read(SnapshotSet::Baseline, "home").await.unwrap();
        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn repeated_write_overwrites_without_error() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(tmp.path());

        store
            .write(SnapshotSet::Current, "home", b"first")
            .await
            .unwrap();
        store
            .write(SnapshotSet::Current, "home", b"second")
            .await
            .unwrap();
        let bytes = store.read(SnapshotSet::Current, "home").await.unwrap();
        assert_eq!(bytes, b"second");
    }

    #[tokio::test]
    async fn sets_are_kept_apart() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(tmp.path());

        store
            .write(SnapshotSet::Baseline, "home", b"old")
            .await
            .unwrap();
        store
            .write(SnapshotSet::Current, "home", b"new")
            .await
            .unwrap();

        assert_eq!(
            store.read(SnapshotSet::Baseline, "home").await.unwrap(),
            b"old"
        );
        assert_eq!(
            store.read(SnapshotSet::Current, "home").await.unwrap(),
            b"new"
        );
    }

    #[tokio::test]
    async fn exists_reflects_writes() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(tmp.path());

        assert!(!store.exists(SnapshotSet::Baseline, "home").await);
        store
            .write(SnapshotSet::Baseline, "home", b"png")
            .await
            .unwrap();
        assert!(store.exists(SnapshotSet::Baseline, "home").await);
    }

    #[tokio::test]
    async fn ensure_layout_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(tmp.path());

        store.ensure_layout().await.unwrap();
        store.ensure_layout().await.unwrap();

        assert!(tmp.path().join("baseline").is_dir());
        assert!(tmp.path().join("current").is_dir());
        assert!(tmp.path().join("diff").is_dir());
    }

    #[test]
    fn paths_and_hrefs_follow_the_layout() {
        let store = make_store(Path::new("/snapshots"));
        assert_eq!(
            store.path(SnapshotSet::Diff, "pricing"),
            PathBuf::from("/snapshots/diff/pricing.png")
        );
        assert_eq!(store.href(SnapshotSet::Diff, "pricing"), "diff/pricing.png");
        assert_eq!(
            store.report_path(Path::new("report.html")),
            PathBuf::from("/snapshots/report.html")
        );
    }
}
