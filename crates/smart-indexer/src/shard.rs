//! Durable per-file JSON shards under a two-level hex-prefixed directory.
//!
//! Path scheme: `<cacheRoot>/index/<h[0:2]>/<h[2:4]>/<h>.json`, where
//! `h = sha256(uri).hex()`. Writes are tmp-file-then-rename so a crash
//! mid-write never corrupts a shard that was previously readable.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ImportInfo, ReExportInfo, Reference, Symbol};

/// One persisted record per source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileShard {
    pub uri: String,
    pub content_hash: String,
    /// Millisecond-resolution mtime, as read from the filesystem at index time.
    pub mtime: u64,
    pub shard_version: u32,
    pub symbols: Vec<Symbol>,
    pub references: Vec<Reference>,
    pub imports: Vec<ImportInfo>,
    pub re_exports: Vec<ReExportInfo>,
    /// Milliseconds since epoch. Excluded from the idempotence contract in
    /// §8 ("byte-identical modulo `last_indexed_at`") — callers that need to
    /// compare two shards for content equality should zero this field first.
    pub last_indexed_at: u64,
}

/// sha256(uri) as a lowercase hex string, used both as the shard filename
/// and the source of its two-level directory prefix.
pub fn hash_uri(uri: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(uri.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// A sha256-based content hash, used to detect real content changes once
/// the cheap mtime check is inconclusive.
pub fn hash_content(content: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(content);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// On-disk shard store rooted at `<cacheRoot>/index`.
#[derive(Debug, Clone)]
pub struct ShardStore {
    root: PathBuf,
}

impl ShardStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a shard for `uri` would live at, whether or not it exists yet.
    pub fn path_for(&self, uri: &str) -> PathBuf {
        let hash = hash_uri(uri);
        self.root
            .join(&hash[0..2])
            .join(&hash[2..4])
            .join(format!("{hash}.json"))
    }

    /// Serialize `shard` and write it atomically (write to a sibling tmp
    /// file, then rename over the final path).
    pub fn put(&self, uri: &str, shard: &FileShard) -> std::io::Result<()> {
        let path = self.path_for(uri);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(shard)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &payload)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Read and parse the shard for `uri`. Returns `Ok(None)` for a missing
    /// file; a shard whose `shard_version` doesn't match `expected_version`
    /// is treated the same as a parse failure (`Err`) so the caller can
    /// unlink and re-index it.
    pub fn get(&self, uri: &str, expected_version: u32) -> std::io::Result<Option<FileShard>> {
        let path = self.path_for(uri);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let shard: FileShard = serde_json::from_slice(&bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        if shard.shard_version != expected_version {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "shard version mismatch for {uri}: found {}, expected {expected_version}",
                    shard.shard_version
                ),
            ));
        }
        Ok(Some(shard))
    }

    /// Load a shard directly from a known path (used by `list_all` callers
    /// doing a startup sweep, where the URI isn't known until the shard is
    /// read).
    pub fn get_at_path(&self, path: &Path) -> std::io::Result<FileShard> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Unlink the shard for `uri`. Leaf/intermediate directories are left
    /// behind rather than pruned.
    pub fn delete(&self, uri: &str) -> std::io::Result<()> {
        let path = self.path_for(uri);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Recursively enumerate every shard path under the two-level tree.
    pub fn list_all(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        if !self.root.is_dir() {
            return Ok(out);
        }
        for level1 in std::fs::read_dir(&self.root)? {
            let level1 = level1?;
            if !level1.path().is_dir() {
                continue;
            }
            for level2 in std::fs::read_dir(level1.path())? {
                let level2 = level2?;
                if !level2.path().is_dir() {
                    continue;
                }
                for entry in std::fs::read_dir(level2.path())? {
                    let entry = entry?;
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) == Some("json") {
                        out.push(path);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Recursively remove every shard under the root. The root directory
    /// itself is preserved (recreated if removal took it out).
    pub fn clear(&self) -> std::io::Result<()> {
        if self.root.is_dir() {
            std::fs::remove_dir_all(&self.root)?;
        }
        std::fs::create_dir_all(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_shard(uri: &str) -> FileShard {
        FileShard {
            uri: uri.to_string(),
            content_hash: hash_content(b"hello"),
            mtime: 1,
            shard_version: 1,
            symbols: Vec::new(),
            references: Vec::new(),
            imports: Vec::new(),
            re_exports: Vec::new(),
            last_indexed_at: 1,
        }
    }

    #[test]
    fn path_for_uses_two_level_hex_prefix() {
        let store = ShardStore::new("/cache/index");
        let path = store.path_for("file:///a.ts");
        let hash = hash_uri("file:///a.ts");
        assert_eq!(
            path,
            PathBuf::from("/cache/index")
                .join(&hash[0..2])
                .join(&hash[2..4])
                .join(format!("{hash}.json"))
        );
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = ShardStore::new(dir.path().join("index"));
        let shard = sample_shard("file:///a.ts");
        store.put("file:///a.ts", &shard).unwrap();
        let loaded = store.get("file:///a.ts", 1).unwrap().unwrap();
        assert_eq!(loaded.uri, shard.uri);
        assert_eq!(loaded.content_hash, shard.content_hash);
    }

    #[test]
    fn get_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = ShardStore::new(dir.path().join("index"));
        assert!(store.get("file:///missing.ts", 1).unwrap().is_none());
    }

    #[test]
    fn get_rejects_version_mismatch() {
        let dir = TempDir::new().unwrap();
        let store = ShardStore::new(dir.path().join("index"));
        store.put("file:///a.ts", &sample_shard("file:///a.ts")).unwrap();
        assert!(store.get("file:///a.ts", 2).is_err());
    }

    #[test]
    fn delete_is_idempotent_on_missing() {
        let dir = TempDir::new().unwrap();
        let store = ShardStore::new(dir.path().join("index"));
        assert!(store.delete("file:///never-existed.ts").is_ok());
    }

    #[test]
    fn list_all_finds_shards_across_prefixes() {
        let dir = TempDir::new().unwrap();
        let store = ShardStore::new(dir.path().join("index"));
        for uri in ["file:///a.ts", "file:///b.ts", "file:///c.ts"] {
            store.put(uri, &sample_shard(uri)).unwrap();
        }
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn clear_removes_shards_but_keeps_root() {
        let dir = TempDir::new().unwrap();
        let store = ShardStore::new(dir.path().join("index"));
        store.put("file:///a.ts", &sample_shard("file:///a.ts")).unwrap();
        store.clear().unwrap();
        assert!(store.list_all().unwrap().is_empty());
        assert!(store.root().is_dir());
    }

    #[test]
    fn put_survives_interrupted_previous_tmp_file() {
        let dir = TempDir::new().unwrap();
        let store = ShardStore::new(dir.path().join("index"));
        let path = store.path_for("file:///a.ts");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path.with_extension("json.tmp"), b"garbage").unwrap();
        store.put("file:///a.ts", &sample_shard("file:///a.ts")).unwrap();
        assert!(store.get("file:///a.ts", 1).unwrap().is_some());
    }
}
