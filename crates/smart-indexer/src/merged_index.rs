//! The Merged Index: the query façade every LSP request goes through.
//!
//! Composes the Dynamic and Background tiers with two rules: results are
//! deduplicated by `(uri, line, character)` preserving first occurrence,
//! and an open buffer wins outright over the background shard for the same
//! URI — not just on a position collision, but for the whole URI, since a
//! stale background shard for an open-and-edited file is never more
//! trustworthy than the buffer itself (§4.5, scenario 5 in §8).

use std::collections::HashSet;

use crate::{Reference, Symbol};

/// The capability set both tiers implement (§9: "polymorphic over this
/// capability, not over a class hierarchy"). `BackgroundIndex` and
/// `DynamicIndex` both implement it; the Merged Index is generic only over
/// `get_file_symbols`/ranking helpers that don't need the open-buffer
/// override below.
pub trait QueryableIndex {
    fn find_definitions(&self, name: &str) -> Vec<Symbol>;
    fn find_references_by_name(
        &self,
        name: &str,
        scope_filter: Option<&HashSet<String>>,
    ) -> Vec<Reference>;
    fn search_symbols(&self, prefix: &str, limit: usize) -> Vec<Symbol>;
    fn get_file_symbols(&self, uri: &str) -> Vec<Symbol>;
}

use crate::background_index::BackgroundIndex;
use crate::dynamic_index::DynamicIndex;

pub struct MergedIndex {
    dynamic: DynamicIndex,
    background: BackgroundIndex,
}

fn dedupe_symbols(items: impl IntoIterator<Item = Symbol>) -> Vec<Symbol> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for symbol in items {
        // Any future "location link" producer would be flattened to
        // (uri, line, character) right here, before the key is computed;
        // both current tiers already emit that flat shape.
        let key = (symbol.uri.clone(), symbol.line, symbol.character);
        if seen.insert(key) {
            out.push(symbol);
        }
    }
    out
}

fn dedupe_references(items: impl IntoIterator<Item = Reference>) -> Vec<Reference> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for reference in items {
        let key = (reference.uri.clone(), reference.line, reference.character);
        if seen.insert(key) {
            out.push(reference);
        }
    }
    out
}

impl MergedIndex {
    pub fn new(dynamic: DynamicIndex, background: BackgroundIndex) -> Self {
        Self { dynamic, background }
    }

    pub fn dynamic(&self) -> &DynamicIndex {
        &self.dynamic
    }

    pub fn background(&self) -> &BackgroundIndex {
        &self.background
    }

    /// Drop background results for any URI currently open as a dynamic
    /// buffer, regardless of whether the dynamic tier itself matched this
    /// particular query — an open buffer supersedes its background shard
    /// wholesale, not just at colliding positions.
    fn superseded_background_symbols(&self, background_results: Vec<Symbol>) -> Vec<Symbol> {
        let open = self.dynamic.open_uris();
        background_results
            .into_iter()
            .filter(|s| !open.contains(&s.uri))
            .collect()
    }

    fn superseded_background_references(&self, background_results: Vec<Reference>) -> Vec<Reference> {
        let open = self.dynamic.open_uris();
        background_results
            .into_iter()
            .filter(|r| !open.contains(&r.uri))
            .collect()
    }

    pub fn find_definitions(&self, name: &str) -> Vec<Symbol> {
        let dynamic_results = self.dynamic.find_definitions(name);
        let background_results = self.superseded_background_symbols(self.background.find_definitions(name));
        dedupe_symbols(dynamic_results.into_iter().chain(background_results))
    }

    pub fn find_references_by_name(
        &self,
        name: &str,
        scope_filter: Option<&HashSet<String>>,
    ) -> Vec<Reference> {
        let dynamic_results = self.dynamic.find_references_by_name(name, scope_filter);
        let background_results = self
            .superseded_background_references(self.background.find_references_by_name(name, scope_filter));
        dedupe_references(dynamic_results.into_iter().chain(background_results))
    }

    /// Merged workspace-symbol search: each tier ranks its own name universe
    /// first (bounding the work on very large tiers), the open-buffer
    /// override and position dedupe are applied, then the combined set is
    /// re-ranked by the same ordering and capped at `limit`.
    pub fn search_symbols(&self, prefix: &str, limit: usize) -> Vec<Symbol> {
        let dynamic_results = self.dynamic.search_symbols(prefix, limit);
        let background_results = self.superseded_background_symbols(self.background.search_symbols(prefix, limit));
        let merged = dedupe_symbols(dynamic_results.into_iter().chain(background_results));
        crate::search::rank_items(prefix, merged, limit, |s| s.name.as_str())
    }

    /// If `uri` is an open buffer, dynamic wins outright; otherwise fall
    /// back to whatever the background shard holds.
    pub fn get_file_symbols(&self, uri: &str) -> Vec<Symbol> {
        if self.dynamic.is_open(uri) {
            self.dynamic.get_file_symbols(uri)
        } else {
            self.background.get_file_symbols(uri)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_merged(root: &std::path::Path) -> MergedIndex {
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
        MergedIndex::new(DynamicIndex::new(), background)
    }

    #[tokio::test]
    async fn dedupes_identical_locations_across_tiers() {
        let dir = TempDir::new().unwrap();
        let merged = make_merged(dir.path());
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "export function hello() {}\n").unwrap();
        let uri = format!("file://{}", path.display());
        merged.background.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();

        let defs = merged.find_definitions("hello");
        assert_eq!(defs.len(), 1);
    }

    #[tokio::test]
    async fn dynamic_buffer_supersedes_stale_background_shard_for_whole_uri() {
        let dir = TempDir::new().unwrap();
        let merged = make_merged(dir.path());
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "export function foo() {}\n").unwrap();
        let uri = format!("file://{}", path.display());
        merged.background.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();

        // Unsaved edit renames foo -> bar in the open buffer.
        merged.dynamic.update(&uri, "export function bar() {}\n");

        assert!(merged.find_definitions("foo").is_empty());
        let bar = merged.find_definitions("bar");
        assert_eq!(bar.len(), 1);
        assert_eq!(bar[0].uri, uri);
    }

    #[tokio::test]
    async fn get_file_symbols_prefers_dynamic_when_open() {
        let dir = TempDir::new().unwrap();
        let merged = make_merged(dir.path());
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "export function fromDisk() {}\n").unwrap();
        let uri = format!("file://{}", path.display());
        merged.background.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();

        merged.dynamic.update(&uri, "export function fromBuffer() {}\n");
        let symbols = merged.get_file_symbols(&uri);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "fromBuffer");
    }

    #[tokio::test]
    async fn get_file_symbols_falls_back_to_background_when_closed() {
        let dir = TempDir::new().unwrap();
        let merged = make_merged(dir.path());
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "export function fromDisk() {}\n").unwrap();
        let uri = format!("file://{}", path.display());
        merged.background.ensure_up_to_date(vec![uri.clone()], None).await.unwrap();

        let symbols = merged.get_file_symbols(&uri);
        assert_eq!(symbols[0].name, "fromDisk");
    }
}
