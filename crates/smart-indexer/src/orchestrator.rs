//! The File Watcher / Orchestrator (§4.6): the single owner of the three
//! input streams (editor buffer changes, editor saves, filesystem events)
//! that keeps the Dynamic and Background tiers coherent with the editor
//! and the filesystem.
//!
//! Per-URI debounce state lives entirely here, in two `tokio::task`-handle
//! maps (one per debounced stream) guarded by a `tokio::sync::Mutex`.
//! Resetting a debounce timer is "abort the previous task for this URI,
//! spawn a new one" — cheap, and it gives us supersession for free: an
//! aborted sleep never calls back into the index, so a burst of edits to
//! the same URI collapses to exactly one fire of the last event.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::background_index::path_to_uri;
use crate::merged_index::MergedIndex;

/// Owns the debounce bookkeeping for one workspace. Cheap to clone (an
/// `Arc` internally).
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    index: Arc<MergedIndex>,
    debounce: Duration,
    buffer_timers: Mutex<std::collections::HashMap<String, JoinHandle<()>>>,
    fs_timers: Mutex<std::collections::HashMap<String, JoinHandle<()>>>,
}

impl Orchestrator {
    pub fn new(index: Arc<MergedIndex>, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                index,
                debounce,
                buffer_timers: Mutex::new(std::collections::HashMap::new()),
                fs_timers: Mutex::new(std::collections::HashMap::new()),
            }),
        }
    }

    fn is_excluded_uri(&self, uri: &str) -> bool {
        match uri.strip_prefix("file://") {
            Some(path) => self.inner.index.background().is_excluded(Path::new(path)),
            None => false,
        }
    }

    /// Stream 1: editor buffer text changed. Debounced per-URI; on fire,
    /// only the Dynamic Index is updated — a buffer change never implies
    /// the file on disk changed, so the Background Index is untouched.
    pub async fn buffer_changed(&self, uri: &str, text: &str) {
        if self.is_excluded_uri(uri) {
            return;
        }
        let this = self.clone();
        let uri = uri.to_string();
        let text = text.to_string();
        let debounce = self.inner.debounce;

        let mut timers = self.inner.buffer_timers.lock().await;
        if let Some(old) = timers.insert(
            uri.clone(),
            tokio::spawn(async move {
                tokio::time::sleep(debounce).await;
                this.inner.index.dynamic().update(&uri, &text);
            }),
        ) {
            old.abort();
        }
    }

    /// Stream 2: editor save. Immediate, no debounce: the Dynamic Index is
    /// refreshed and the Background Index is force-reindexed for this URI
    /// right away, superseding any pending buffer-change debounce.
    pub async fn buffer_saved(&self, uri: &str, text: &str) {
        if self.is_excluded_uri(uri) {
            return;
        }
        if let Some(old) = self.inner.buffer_timers.lock().await.remove(uri) {
            old.abort();
        }
        self.inner.index.dynamic().update(uri, text);
        if let Err(e) = self.inner.index.background().update_file(uri).await {
            tracing::warn!("background reindex on save failed for {uri}: {e}");
        }
    }

    /// Editor buffer closed. Immediate: only the Dynamic Index entry is
    /// dropped, the background shard (if any) is left exactly as is.
    pub async fn buffer_closed(&self, uri: &str) {
        if let Some(old) = self.inner.buffer_timers.lock().await.remove(uri) {
            old.abort();
        }
        self.inner.index.dynamic().close(uri);
    }

    /// Stream 3: a filesystem event for `path` (a file outside the editor's
    /// current attention, or any creation/modification/deletion observed on
    /// disk). Debounced per-URI; on fire, the Background Index is either
    /// force-reindexed (create/modify) or purged (delete).
    pub async fn filesystem_event(&self, path: &Path, kind: crate::watch::FsChangeKind) {
        if self.inner.index.background().is_excluded(path) {
            return;
        }
        let uri = path_to_uri(path);
        let this = self.clone();
        let debounce = self.inner.debounce;
        let fire_uri = uri.clone();

        let mut timers = self.inner.fs_timers.lock().await;
        if let Some(old) = timers.insert(
            uri,
            tokio::spawn(async move {
                tokio::time::sleep(debounce).await;
                let result = match kind {
                    crate::watch::FsChangeKind::CreatedOrModified => {
                        this.inner.index.background().update_file(&fire_uri).await
                    }
                    crate::watch::FsChangeKind::Removed => {
                        this.inner.index.background().remove_file(&fire_uri).await
                    }
                };
                if let Err(e) = result {
                    tracing::warn!("background update from filesystem event failed for {fire_uri}: {e}");
                }
            }),
        ) {
            old.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background_index::BackgroundIndex;
    use crate::dynamic_index::DynamicIndex;
    use tempfile::TempDir;
    use tokio::time::advance;

    fn make_orchestrator(root: &Path, debounce: Duration) -> Orchestrator {
        let config = crate::config::Config::default();
        let exclusion = config.build_exclusion(root);
        let background = BackgroundIndex::init(
            root,
            root.join(".smart-index"),
            crate::SHARD_VERSION,
            4,
            config.max_indexed_file_size,
            exclusion,
        )
        .unwrap();
        let merged = Arc::new(MergedIndex::new(DynamicIndex::new(), background));
        Orchestrator::new(merged, debounce)
    }

    #[tokio::test(start_paused = true)]
    async fn buffer_change_debounces_and_only_touches_dynamic() {
        let dir = TempDir::new().unwrap();
        let orchestrator = make_orchestrator(dir.path(), Duration::from_millis(600));
        let uri = "file:///a.ts";

        orchestrator.buffer_changed(uri, "const x = 1;\n").await;
        orchestrator.buffer_changed(uri, "const x = 2;\n").await;
        advance(Duration::from_millis(650)).await;
        tokio::task::yield_now().await;

        assert!(orchestrator.inner.index.dynamic().is_open(uri));
        assert!(orchestrator.inner.index.background().find_definitions("x").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_buffer_changes_fire_only_last_one() {
        let dir = TempDir::new().unwrap();
        let orchestrator = make_orchestrator(dir.path(), Duration::from_millis(600));
        let uri = "file:///a.ts";

        orchestrator.buffer_changed(uri, "export function first() {}\n").await;
        advance(Duration::from_millis(100)).await;
        orchestrator.buffer_changed(uri, "export function second() {}\n").await;
        advance(Duration::from_millis(650)).await;
        tokio::task::yield_now().await;

        let symbols = orchestrator.inner.index.dynamic().get_file_symbols(uri);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "second");
    }

    #[tokio::test]
    async fn save_is_immediate_not_debounced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "export function saved() {}\n").unwrap();
        let uri = path_to_uri(&path);
        let orchestrator = make_orchestrator(dir.path(), Duration::from_secs(600));

        orchestrator.buffer_saved(&uri, "export function saved() {}\n").await;

        use crate::merged_index::QueryableIndex;
        assert_eq!(orchestrator.inner.index.background().find_definitions("saved").len(), 1);
    }

    #[tokio::test]
    async fn buffer_closed_drops_dynamic_entry_only() {
        let dir = TempDir::new().unwrap();
        let orchestrator = make_orchestrator(dir.path(), Duration::from_millis(10));
        let uri = "file:///a.ts";
        orchestrator.inner.index.dynamic().update(uri, "export function f() {}\n");
        orchestrator.buffer_closed(uri).await;
        assert!(!orchestrator.inner.index.dynamic().is_open(uri));
    }

    #[tokio::test(start_paused = true)]
    async fn filesystem_removal_purges_background_shard() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "export function gone() {}\n").unwrap();
        let uri = path_to_uri(&path);
        let orchestrator = make_orchestrator(dir.path(), Duration::from_millis(50));

        orchestrator.inner.index.background().update_file(&uri).await.unwrap();
        use crate::merged_index::QueryableIndex;
        assert_eq!(orchestrator.inner.index.background().find_definitions("gone").len(), 1);

        std::fs::remove_file(&path).unwrap();
        orchestrator
            .filesystem_event(&path, crate::watch::FsChangeKind::Removed)
            .await;
        advance(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;

        assert!(orchestrator.inner.index.background().find_definitions("gone").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn filesystem_modification_reindexes_and_exposes_new_symbol() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "export function before() {}\n").unwrap();
        let uri = path_to_uri(&path);
        let orchestrator = make_orchestrator(dir.path(), Duration::from_millis(50));

        orchestrator.inner.index.background().update_file(&uri).await.unwrap();
        use crate::merged_index::QueryableIndex;
        assert_eq!(orchestrator.inner.index.background().find_definitions("before").len(), 1);

        // mtime alone can be unreliable at sub-second resolution in CI
        // filesystems; bump it explicitly so the fast path doesn't mask the
        // content change this test means to exercise.
        std::thread::sleep(std::time::Duration::from_millis(5));
        std::fs::write(&path, "export function after() {}\n").unwrap();

        orchestrator
            .filesystem_event(&path, crate::watch::FsChangeKind::CreatedOrModified)
            .await;
        advance(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;

        assert!(orchestrator.inner.index.background().find_definitions("before").is_empty());
        assert_eq!(orchestrator.inner.index.background().find_definitions("after").len(), 1);
    }

    #[tokio::test]
    async fn excluded_path_never_enqueues_a_timer() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        let path = dir.path().join("node_modules/lib.js");
        std::fs::write(&path, "export function x() {}\n").unwrap();
        let orchestrator = make_orchestrator(dir.path(), Duration::from_millis(10));

        orchestrator
            .filesystem_event(&path, crate::watch::FsChangeKind::CreatedOrModified)
            .await;
        assert!(orchestrator.inner.fs_timers.lock().await.is_empty());
    }
}
