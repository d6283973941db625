//! The Background Index: shard store + in-memory metadata maps covering the
//! whole workspace, refreshed by a bounded worker pool.
//!
//! Indexing work (stat, hash, parse, shard write) is CPU/IO-bound and
//! synchronous; `ensure_up_to_date`/`update_file` dispatch it onto
//! `tokio::task::spawn_blocking`, bounded by a `Semaphore` sized to
//! `maxConcurrentIndexJobs`, so the cooperative runtime driving the LSP
//! server and file watcher is never blocked by a slow parse (§5). Queries
//! (`find_definitions` and friends) stay synchronous: the only suspension
//! point they'd ever need is a single shard read per matched URI, which is
//! cheap enough to do inline rather than round-trip through the runtime.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::Exclusion;
use crate::merged_index::QueryableIndex;
use crate::parse::{extract_symbols, DiagnosticSeverity};
use crate::search::rank_names;
use crate::shard::{hash_content, FileShard, ShardStore};
use crate::stats::Stats;
use crate::{Reference, Symbol};

/// Persisted alongside the shard tree: `<cacheRoot>/metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub shard_version: u32,
    pub last_full_index_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_git_head_hint: Option<String>,
}

impl IndexMetadata {
    fn new(shard_version: u32) -> Self {
        Self {
            shard_version,
            last_full_index_at: 0,
            last_git_head_hint: None,
        }
    }
}

/// What the Background Index remembers about a URI without touching disk.
#[derive(Debug, Clone)]
struct FileMetadata {
    content_hash: String,
    mtime: u64,
    last_indexed_at: u64,
}

struct Inner {
    workspace_root: PathBuf,
    store: ShardStore,
    metadata_path: PathBuf,
    shard_version: u32,
    max_file_size: u64,
    semaphore: tokio::sync::Semaphore,
    exclusion: RwLock<Exclusion>,
    file_metadata: RwLock<HashMap<String, FileMetadata>>,
    symbol_name_index: RwLock<HashMap<String, HashSet<String>>>,
    reference_name_index: RwLock<HashMap<String, HashSet<String>>>,
    shard_cache: RwLock<HashMap<String, Arc<FileShard>>>,
    /// Monotonic per-URI submission counter implementing the ordering
    /// guarantee in §5: "a later update's result supersedes earlier ones
    /// even if the earlier task completes second." Bumped when a task is
    /// submitted, not when it finishes; a completing task only installs its
    /// shard if its captured generation is still the latest.
    generations: Mutex<HashMap<String, u64>>,
    stats: Stats,
}

/// Owns the shard store plus the always-resident `fileMetadata` /
/// `symbolNameIndex` / `referenceNameIndex` maps for one workspace.
/// Cheap to clone: internally an `Arc`, so the orchestrator and every
/// spawned indexing task share one instance.
#[derive(Clone)]
pub struct BackgroundIndex {
    inner: Arc<Inner>,
}

/// `file://<path>`, the same scheme every URI in this crate uses.
pub fn path_to_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn uri_to_path(uri: &str) -> Option<PathBuf> {
    uri.strip_prefix("file://").map(PathBuf::from).or_else(|| {
        if uri.starts_with('/') {
            Some(PathBuf::from(uri))
        } else {
            None
        }
    })
}

fn file_mtime_ms(path: &Path) -> std::io::Result<u64> {
    let metadata = std::fs::metadata(path)?;
    let modified = metadata.modified()?;
    Ok(modified
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0))
}

impl BackgroundIndex {
    /// Load `<cacheRoot>/metadata.json` (or create it), sweep `list_all()`
    /// to repopulate the in-memory maps, and drop any shard whose version
    /// doesn't match `shard_version` or whose URI now matches `exclusion`.
    pub fn init(
        workspace_root: impl Into<PathBuf>,
        cache_root: impl Into<PathBuf>,
        shard_version: u32,
        max_concurrent_index_jobs: u32,
        max_file_size: u64,
        exclusion: Exclusion,
    ) -> crate::Result<Self> {
        let workspace_root = workspace_root.into();
        let cache_root = cache_root.into();
        std::fs::create_dir_all(&cache_root)?;
        let metadata_path = cache_root.join("metadata.json");
        let store = ShardStore::new(cache_root.join("index"));

        let _metadata = load_or_init_metadata(&metadata_path, shard_version);

        let index = Self {
            inner: Arc::new(Inner {
                workspace_root,
                store,
                metadata_path,
                shard_version,
                max_file_size,
                semaphore: tokio::sync::Semaphore::new(max_concurrent_index_jobs.max(1) as usize),
                exclusion: RwLock::new(exclusion),
                file_metadata: RwLock::new(HashMap::new()),
                symbol_name_index: RwLock::new(HashMap::new()),
                reference_name_index: RwLock::new(HashMap::new()),
                shard_cache: RwLock::new(HashMap::new()),
                generations: Mutex::new(HashMap::new()),
                stats: Stats::new(),
            }),
        };

        index.sweep_existing_shards()?;
        Ok(index)
    }

    pub fn stats(&self) -> &Stats {
        &self.inner.stats
    }

    pub fn workspace_root(&self) -> &Path {
        &self.inner.workspace_root
    }

    /// Every URI currently holding a shard. Used by ambient tooling (the
    /// CLI's `stats` output, the LSP's `findDeadCode` sweep) that needs to
    /// enumerate the whole workspace rather than look up one name at a time.
    pub fn known_uris(&self) -> Vec<String> {
        self.inner.file_metadata.read().unwrap().keys().cloned().collect()
    }

    /// True if `path` matches the compiled exclusion matcher. Exposed so
    /// the orchestrator can apply exclusion at the earliest stage of a
    /// filesystem/buffer event, before ever calling back into this index.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.inner.exclusion.read().unwrap().is_excluded(path)
    }

    /// Startup traversal: load every shard, discard stale-version or
    /// now-excluded ones, and repopulate the in-memory maps from the rest.
    fn sweep_existing_shards(&self) -> crate::Result<()> {
        let paths = self.inner.store.list_all()?;
        for path in paths {
            let shard = match self.inner.store.get_at_path(&path) {
                Ok(shard) => shard,
                Err(_) => {
                    let _ = std::fs::remove_file(&path);
                    continue;
                }
            };
            if shard.shard_version != self.inner.shard_version {
                let _ = std::fs::remove_file(&path);
                continue;
            }
            let source_path = uri_to_path(&shard.uri);
            let excluded = source_path
                .as_ref()
                .map(|p| self.is_excluded(p))
                .unwrap_or(false);
            if excluded {
                let _ = self.inner.store.delete(&shard.uri);
                continue;
            }
            self.install_shard(&shard.uri.clone(), shard);
        }
        Ok(())
    }

    /// Merge `shard` into the in-memory maps and the small hydration cache.
    fn install_shard(&self, uri: &str, shard: FileShard) {
        {
            let mut metadata = self.inner.file_metadata.write().unwrap();
            metadata.insert(
                uri.to_string(),
                FileMetadata {
                    content_hash: shard.content_hash.clone(),
                    mtime: shard.mtime,
                    last_indexed_at: shard.last_indexed_at,
                },
            );
        }
        {
            let mut name_index = self.inner.symbol_name_index.write().unwrap();
            for symbol in &shard.symbols {
                name_index
                    .entry(symbol.name.clone())
                    .or_default()
                    .insert(uri.to_string());
            }
        }
        {
            let mut ref_index = self.inner.reference_name_index.write().unwrap();
            for reference in &shard.references {
                ref_index
                    .entry(reference.name.clone())
                    .or_default()
                    .insert(uri.to_string());
            }
        }
        self.inner
            .shard_cache
            .write()
            .unwrap()
            .insert(uri.to_string(), Arc::new(shard));
    }

    /// Drop every in-memory trace of `uri` (used by `remove_file` and
    /// exclusion purges). Does not touch disk.
    fn evict(&self, uri: &str) {
        self.inner.file_metadata.write().unwrap().remove(uri);
        self.inner.shard_cache.write().unwrap().remove(uri);
        let mut name_index = self.inner.symbol_name_index.write().unwrap();
        name_index.retain(|_, uris| {
            uris.remove(uri);
            !uris.is_empty()
        });
        let mut ref_index = self.inner.reference_name_index.write().unwrap();
        ref_index.retain(|_, uris| {
            uris.remove(uri);
            !uris.is_empty()
        });
    }

    fn hydrate(&self, uri: &str) -> Option<Arc<FileShard>> {
        if let Some(shard) = self.inner.shard_cache.read().unwrap().get(uri) {
            self.inner.stats.record_shard_cache_hit();
            return Some(shard.clone());
        }
        self.inner.stats.record_shard_cache_miss();
        match self.inner.store.get(uri, self.inner.shard_version) {
            Ok(Some(shard)) => {
                let shard = Arc::new(shard);
                self.inner
                    .shard_cache
                    .write()
                    .unwrap()
                    .insert(uri.to_string(), shard.clone());
                Some(shard)
            }
            Ok(None) => None,
            Err(_) => {
                // Corrupt or version-mismatched shard: unlink so the next
                // `ensure_up_to_date`/`update_file` re-indexes it.
                let _ = self.inner.store.delete(uri);
                self.evict(uri);
                None
            }
        }
    }

    /// Force a re-parse and shard rewrite for `uri`, regardless of
    /// mtime/hash state. Used by save events and filesystem-change events.
    pub async fn update_file(&self, uri: &str) -> crate::Result<()> {
        if let Some(path) = uri_to_path(uri) {
            if self.is_excluded(&path) {
                self.remove_file(uri).await?;
                return Ok(());
            }
        }
        self.index_one(uri.to_string()).await
    }

    /// Delete the shard (if any) and drop `uri` from every in-memory map.
    pub async fn remove_file(&self, uri: &str) -> crate::Result<()> {
        let uri = uri.to_string();
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || inner.store.delete(&uri))
            .await
            .map_err(|e| crate::IndexError::InternalAssertFailed(e.to_string()))??;
        self.evict(&uri);
        self.inner.stats.record_purged();
        Ok(())
    }

    /// Walk `candidate_uris`, classify each by a four-branch decision
    /// (excluded / absent / mtime-match / hash-match), and run the worker
    /// pool over whichever subset actually needs a re-parse.
    pub async fn ensure_up_to_date(
        &self,
        candidate_uris: Vec<String>,
        on_progress: Option<Arc<dyn Fn(usize, usize) + Send + Sync>>,
    ) -> crate::Result<()> {
        let mut to_index = Vec::new();
        for uri in &candidate_uris {
            let path = match uri_to_path(uri) {
                Some(p) => p,
                None => continue,
            };

            if self.is_excluded(&path) {
                if self.inner.file_metadata.read().unwrap().contains_key(uri) {
                    self.remove_file(uri).await?;
                }
                continue;
            }

            let disk_mtime = match file_mtime_ms(&path) {
                Ok(m) => m,
                Err(_) => {
                    // File vanished between enumeration and stat; treat like
                    // a deletion rather than scheduling a doomed parse.
                    if self.inner.file_metadata.read().unwrap().contains_key(uri) {
                        self.remove_file(uri).await?;
                    }
                    continue;
                }
            };

            let existing = self.inner.file_metadata.read().unwrap().get(uri).cloned();
            match existing {
                None => to_index.push(uri.clone()),
                Some(meta) if meta.mtime == disk_mtime => {
                    self.inner.stats.record_skipped();
                }
                Some(meta) => {
                    let content = std::fs::read(&path).unwrap_or_default();
                    let content_hash = hash_content(&content);
                    if content_hash == meta.content_hash {
                        self.inner.file_metadata.write().unwrap().insert(
                            uri.clone(),
                            FileMetadata {
                                content_hash: meta.content_hash,
                                mtime: disk_mtime,
                                last_indexed_at: meta.last_indexed_at,
                            },
                        );
                        self.inner.stats.record_skipped();
                    } else {
                        to_index.push(uri.clone());
                    }
                }
            }
        }

        let total = to_index.len();
        let mut tasks = tokio::task::JoinSet::new();
        for (done, uri) in to_index.into_iter().enumerate() {
            let this = self.clone();
            let progress = on_progress.clone();
            tasks.spawn(async move {
                let result = this.index_one(uri).await;
                if let Some(cb) = progress {
                    cb(done + 1, total);
                }
                result
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.map_err(|e| crate::IndexError::InternalAssertFailed(e.to_string()))??;
        }
        self.inner.stats.record_full_index_complete();
        self.persist_metadata_best_effort();
        Ok(())
    }

    /// Parse one file end to end and persist its shard, bounded by the
    /// worker-pool semaphore. If a newer call for the same URI was
    /// submitted before this one finished, the result is discarded rather
    /// than written, per the §5 ordering guarantee.
    async fn index_one(&self, uri: String) -> crate::Result<()> {
        let generation = {
            let mut generations = self.inner.generations.lock().unwrap();
            let next = generations.get(&uri).copied().unwrap_or(0) + 1;
            generations.insert(uri.clone(), next);
            next
        };

        let _permit = self.inner.semaphore.acquire().await;
        let inner = self.inner.clone();
        let uri_for_task = uri.clone();
        let result = tokio::task::spawn_blocking(move || index_one_blocking(&inner, &uri_for_task))
            .await
            .map_err(|e| crate::IndexError::InternalAssertFailed(e.to_string()))?;

        let is_latest = self.inner.generations.lock().unwrap().get(&uri).copied() == Some(generation);
        if !is_latest {
            // Superseded: a newer update for this URI was enqueued before
            // this parse completed. Its eventual completion is what counts.
            return Ok(());
        }

        match result {
            Ok(Some(shard)) => {
                self.install_shard(&uri, shard);
                self.inner.stats.record_indexed();
                Ok(())
            }
            Ok(None) => {
                // File vanished mid-index.
                self.evict(&uri);
                Ok(())
            }
            Err(e) => {
                self.inner.stats.record_error(e.to_string());
                tracing::warn!("failed to index {uri}: {e}");
                Ok(())
            }
        }
    }

    fn persist_metadata_best_effort(&self) {
        let metadata = IndexMetadata {
            shard_version: self.inner.shard_version,
            last_full_index_at: crate::stats::now_ms(),
            last_git_head_hint: crate::git::head_hint(&self.inner.workspace_root),
        };
        if let Ok(bytes) = serde_json::to_vec_pretty(&metadata) {
            let tmp = self.inner.metadata_path.with_extension("json.tmp");
            if std::fs::write(&tmp, bytes).and_then(|_| std::fs::rename(&tmp, &self.inner.metadata_path)).is_err() {
                tracing::warn!("failed to persist {:?}", self.inner.metadata_path);
            }
        }
    }

    /// Recursive purge: clears every shard plus every in-memory map.
    pub async fn clear(&self) -> crate::Result<()> {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || inner.store.clear())
            .await
            .map_err(|e| crate::IndexError::InternalAssertFailed(e.to_string()))??;
        self.inner.file_metadata.write().unwrap().clear();
        self.inner.symbol_name_index.write().unwrap().clear();
        self.inner.reference_name_index.write().unwrap().clear();
        self.inner.shard_cache.write().unwrap().clear();
        Ok(())
    }
}

fn index_one_blocking(inner: &Inner, uri: &str) -> std::io::Result<Option<FileShard>> {
    let path = match uri_to_path(uri) {
        Some(p) => p,
        None => return Ok(None),
    };
    let metadata = match std::fs::metadata(&path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    if metadata.len() > inner.max_file_size {
        tracing::debug!("skipping {uri}: exceeds maxIndexedFileSize");
        return Ok(None);
    }
    let content = std::fs::read(&path)?;
    let source = String::from_utf8_lossy(&content).into_owned();
    let mtime = file_mtime_ms(&path)?;
    let content_hash = hash_content(&content);

    let result = extract_symbols(uri, &source, 500);
    if result.diagnostics.iter().any(|d| d.severity == DiagnosticSeverity::Error) {
        inner.stats.record_parse_error();
    }
    let shard = FileShard {
        uri: uri.to_string(),
        content_hash,
        mtime,
        shard_version: inner.shard_version,
        symbols: result.symbols,
        references: result.references,
        imports: result.imports,
        re_exports: result.re_exports,
        last_indexed_at: crate::stats::now_ms(),
    };
    inner.store.put(uri, &shard)?;
    Ok(Some(shard))
}

fn load_or_init_metadata(path: &Path, shard_version: u32) -> IndexMetadata {
    match std::fs::read(path) {
        Ok(bytes) => match serde_json::from_slice::<IndexMetadata>(&bytes) {
            Ok(metadata) => metadata,
            Err(_) => IndexMetadata::new(shard_version),
        },
        Err(_) => {
            let metadata = IndexMetadata::new(shard_version);
            if let Ok(bytes) = serde_json::to_vec_pretty(&metadata) {
                let _ = std::fs::write(path, bytes);
            }
            metadata
        }
    }
}

impl QueryableIndex for BackgroundIndex {
    fn find_definitions(&self, name: &str) -> Vec<Symbol> {
        let uris: Vec<String> = match self.inner.symbol_name_index.read().unwrap().get(name) {
            Some(set) => set.iter().cloned().collect(),
            None => return Vec::new(),
        };
        let mut out = Vec::new();
        for uri in uris {
            if let Some(shard) = self.hydrate(&uri) {
                out.extend(shard.symbols.iter().filter(|s| s.name == name).cloned());
            }
        }
        out
    }

    fn find_references_by_name(
        &self,
        name: &str,
        scope_filter: Option<&HashSet<String>>,
    ) -> Vec<Reference> {
        let uris: Vec<String> = match self.inner.reference_name_index.read().unwrap().get(name) {
            Some(set) => set.iter().cloned().collect(),
            None => return Vec::new(),
        };
        let mut out = Vec::new();
        for uri in uris {
            if let Some(shard) = self.hydrate(&uri) {
                out.extend(shard.references.iter().filter(|r| r.name == name).filter(|r| {
                    match scope_filter {
                        Some(filter) if r.is_local => {
                            r.scope_id.as_deref().map(|s| filter.contains(s)).unwrap_or(false)
                        }
                        _ => true,
                    }
                }).cloned());
            }
        }
        out
    }

    fn search_symbols(&self, prefix: &str, limit: usize) -> Vec<Symbol> {
        let names: Vec<String> = {
            let name_index = self.inner.symbol_name_index.read().unwrap();
            name_index.keys().cloned().collect()
        };
        let ranked = rank_names(prefix, names, limit);
        let mut out = Vec::new();
        for name in ranked {
            out.extend(self.find_definitions(&name));
        }
        out
    }

    fn get_file_symbols(&self, uri: &str) -> Vec<Symbol> {
        self.hydrate(uri)
            .map(|shard| shard.symbols.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_index(root: &Path) -> BackgroundIndex {
        let config = crate::config::Config::default();
        let exclusion = config.build_exclusion(root);
        BackgroundIndex::init(root, root.join(".smart-index"), crate::SHARD_VERSION, 4, config.max_indexed_file_size, exclusion).unwrap()
    }

    fn write_file(root: &Path, rel: &str, content: &str) -> String {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        format!("file://{}", path.display())
    }

    #[tokio::test]
    async fn indexes_a_new_file_and_finds_its_definition() {
        let dir = TempDir::new().unwrap();
        let index = make_index(dir.path());
        let uri = write_file(dir.path(), "a.ts", "export function hello() {}\n");
        index.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();
        let defs = index.find_definitions("hello");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].uri, uri);
    }

    #[tokio::test]
    async fn unchanged_mtime_skips_reparse() {
        let dir = TempDir::new().unwrap();
        let index = make_index(dir.path());
        let uri = write_file(dir.path(), "a.ts", "const x = 1;\n");
        index.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();
        let before = index.stats().snapshot().files_indexed;
        index.ensure_up_to_date(vec![uri], None).await.unwrap();
        assert_eq!(index.stats().snapshot().files_indexed, before);
    }

    #[tokio::test]
    async fn excluded_file_with_existing_shard_is_purged() {
        let dir = TempDir::new().unwrap();
        let index = make_index(dir.path());
        let uri = write_file(dir.path(), "dist/old.ts", "export function old() {}\n");
        index.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();

        let mut config = crate::config::Config::default();
        config.exclude_patterns.push("**/dist/**".to_string());
        let exclusion = config.build_exclusion(dir.path());
        index.inner.exclusion.write().unwrap().clone_from(&exclusion);

        index.ensure_up_to_date(vec![uri], None).await.unwrap();
        assert!(index.find_definitions("old").is_empty());
    }

    #[tokio::test]
    async fn update_file_force_reindexes_even_with_unchanged_mtime() {
        let dir = TempDir::new().unwrap();
        let index = make_index(dir.path());
        let uri = write_file(dir.path(), "a.ts", "export function v1() {}\n");
        index.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();
        index.update_file(&uri).await.unwrap();
        assert_eq!(index.find_definitions("v1").len(), 1);
    }

    #[tokio::test]
    async fn remove_file_drops_symbol_from_index() {
        let dir = TempDir::new().unwrap();
        let index = make_index(dir.path());
        let uri = write_file(dir.path(), "a.ts", "export function gone() {}\n");
        index.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();
        index.remove_file(&uri).await.unwrap();
        assert!(index.find_definitions("gone").is_empty());
    }

    #[tokio::test]
    async fn cold_start_sweeps_existing_shards_without_reparsing() {
        let dir = TempDir::new().unwrap();
        let uri = write_file(dir.path(), "a.ts", "export function foo() {}\n");
        {
            let index = make_index(dir.path());
            index.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();
        }
        let index = make_index(dir.path());
        assert_eq!(index.find_definitions("foo").len(), 1);
        index.ensure_up_to_date(vec![uri], None).await.unwrap();
        assert_eq!(index.stats().snapshot().files_indexed, 0);
    }

    #[tokio::test]
    async fn corrupt_shard_is_unlinked_and_reindexed_on_query() {
        let dir = TempDir::new().unwrap();
        let index = make_index(dir.path());
        let uri = write_file(dir.path(), "a.ts", "export function recov() {}\n");
        index.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();

        let shard_path = index.inner.store.path_for(&uri);
        std::fs::write(&shard_path, b"").unwrap();
        index.inner.shard_cache.write().unwrap().remove(&uri);

        assert!(index.hydrate(&uri).is_none());
        index.update_file(&uri).await.unwrap();
        assert_eq!(index.find_definitions("recov").len(), 1);
    }

    #[tokio::test]
    async fn syntax_error_still_writes_a_partial_shard_and_counts_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let index = make_index(dir.path());
        let uri = write_file(dir.path(), "a.ts", "export function broken( {\n");
        index.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();
        assert_eq!(index.stats().snapshot().parse_errors, 1);
        // A parse error is non-fatal: the shard is still written, even if
        // symbol-empty, and future queries don't re-index on every call.
        assert!(index.inner.shard_cache.read().unwrap().contains_key(&uri));
    }

    #[test]
    fn search_symbols_ranks_exact_prefix_first() {
        let dir = TempDir::new().unwrap();
        let index = make_index(dir.path());
        {
            let mut names = index.inner.symbol_name_index.write().unwrap();
            names.entry("userService".to_string()).or_default().insert("file:///a.ts".to_string());
            names.entry("fuseBox".to_string()).or_default().insert("file:///b.ts".to_string());
        }
        let ranked = rank_names("use", ["userService".to_string(), "fuseBox".to_string()], 10);
        assert_eq!(ranked[0], "userService");
    }
}
