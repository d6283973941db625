//! The Dynamic Index: a pure in-memory mirror of the Background Index's
//! query surface, scoped to currently open editor buffers.
//!
//! `update` replaces a buffer's entire prior entry atomically under one
//! write-lock acquisition, so a concurrent query never observes a torn mix
//! of old and new symbols for the same URI. Nothing here ever touches disk.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::merged_index::QueryableIndex;
use crate::parse::{extract_symbols, IndexedFileResult};
use crate::search::rank_names;
use crate::{Reference, Symbol};

#[derive(Default)]
pub struct DynamicIndex {
    buffers: RwLock<HashMap<String, IndexedFileResult>>,
}

impl DynamicIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` via the Worker and atomically replace whatever was
    /// previously held for `uri`. Called on every "document opened/changed"
    /// editor event.
    pub fn update(&self, uri: &str, text: &str) {
        let result = extract_symbols(uri, text, 500);
        self.buffers.write().unwrap().insert(uri.to_string(), result);
    }

    /// "Document closed": drop the buffer's entries. Background shard data,
    /// if any, is untouched and continues to serve queries for this URI.
    pub fn close(&self, uri: &str) {
        self.buffers.write().unwrap().remove(uri);
    }

    /// True iff `uri` currently has an open-buffer entry.
    pub fn is_open(&self, uri: &str) -> bool {
        self.buffers.read().unwrap().contains_key(uri)
    }

    /// Every URI currently mirrored here. Used by the Merged Index to
    /// decide which background entries a fresher open buffer supersedes.
    pub fn open_uris(&self) -> HashSet<String> {
        self.buffers.read().unwrap().keys().cloned().collect()
    }
}

impl QueryableIndex for DynamicIndex {
    fn find_definitions(&self, name: &str) -> Vec<Symbol> {
        self.buffers
            .read()
            .unwrap()
            .values()
            .flat_map(|result| result.symbols.iter())
            .filter(|s| s.name == name)
            .cloned()
            .collect()
    }

    fn find_references_by_name(
        &self,
        name: &str,
        scope_filter: Option<&HashSet<String>>,
    ) -> Vec<Reference> {
        self.buffers
            .read()
            .unwrap()
            .values()
            .flat_map(|result| result.references.iter())
            .filter(|r| r.name == name)
            .filter(|r| match scope_filter {
                Some(filter) if r.is_local => {
                    r.scope_id.as_deref().map(|s| filter.contains(s)).unwrap_or(false)
                }
                _ => true,
            })
            .cloned()
            .collect()
    }

    fn search_symbols(&self, prefix: &str, limit: usize) -> Vec<Symbol> {
        let buffers = self.buffers.read().unwrap();
        let names: Vec<String> = buffers
            .values()
            .flat_map(|result| result.symbols.iter().map(|s| s.name.clone()))
            .collect();
        let ranked = rank_names(prefix, names, limit);
        let mut out = Vec::new();
        for name in ranked {
            out.extend(
                buffers
                    .values()
                    .flat_map(|result| result.symbols.iter())
                    .filter(|s| s.name == name)
                    .cloned(),
            );
        }
        out
    }

    fn get_file_symbols(&self, uri: &str) -> Vec<Symbol> {
        self.buffers
            .read()
            .unwrap()
            .get(uri)
            .map(|result| result.symbols.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_then_find_definitions() {
        let index = DynamicIndex::new();
        index.update("file:///a.ts", "export function hello() {}\n");
        let defs = index.find_definitions("hello");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].uri, "file:///a.ts");
    }

    #[test]
    fn update_replaces_prior_entry_atomically() {
        let index = DynamicIndex::new();
        index.update("file:///a.ts", "export function foo() {}\n");
        index.update("file:///a.ts", "export function bar() {}\n");
        assert!(index.find_definitions("foo").is_empty());
        assert_eq!(index.find_definitions("bar").len(), 1);
    }

    #[test]
    fn close_removes_buffer_entries() {
        let index = DynamicIndex::new();
        index.update("file:///a.ts", "export function hello() {}\n");
        index.close("file:///a.ts");
        assert!(index.find_definitions("hello").is_empty());
        assert!(!index.is_open("file:///a.ts"));
    }

    #[test]
    fn open_uris_tracks_currently_open_buffers() {
        let index = DynamicIndex::new();
        index.update("file:///a.ts", "const x = 1;\n");
        index.update("file:///b.ts", "const y = 2;\n");
        let open = index.open_uris();
        assert!(open.contains("file:///a.ts"));
        assert!(open.contains("file:///b.ts"));
    }

    #[test]
    fn get_file_symbols_scoped_to_one_uri() {
        let index = DynamicIndex::new();
        index.update("file:///a.ts", "export function foo() {}\n");
        index.update("file:///b.ts", "export function bar() {}\n");
        let symbols = index.get_file_symbols("file:///a.ts");
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "foo");
    }
}
