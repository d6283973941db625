//! Git is an optional hint source, not a dependency of correctness: the
//! current commit is used only to prioritize which URIs `ensureUpToDate`
//! checks first after a restart. The mtime/content-hash comparison remains
//! authoritative regardless of whether a hint is available or stale.

use std::path::Path;
use std::process::Command;

/// The repository's current commit hash, or `None` if `workspace_root`
/// isn't a git repository (or `git` isn't on `PATH`). Never an error:
/// absence of a hint just means `ensureUpToDate` falls back to scanning
/// every candidate URI in its given order.
pub fn head_hint(workspace_root: &Path) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(workspace_root)
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    if hash.is_empty() {
        None
    } else {
        Some(hash.to_string())
    }
}

/// Idempotently append `entry` to `<workspace_root>/.gitignore` if it isn't
/// already present (as a whole line, ignoring surrounding whitespace). Never
/// fails the caller on I/O trouble; a missing ignore entry just means the
/// cache directory may show up in `git status`, it still won't be indexed
/// since exclusion is enforced by the indexer's own `Exclusion` matcher, not
/// `.gitignore`.
pub fn ensure_ignored(workspace_root: &Path, entry: &str) {
    let path = workspace_root.join(".gitignore");
    let existing = std::fs::read_to_string(&path).unwrap_or_default();
    if existing.lines().any(|line| line.trim() == entry) {
        return;
    }
    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(entry);
    updated.push('\n');
    if let Err(e) = std::fs::write(&path, updated) {
        tracing::warn!("failed to append {entry:?} to {:?}: {e}", path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn head_hint_is_none_outside_a_repo() {
        let dir = TempDir::new().unwrap();
        assert!(head_hint(dir.path()).is_none());
    }

    #[test]
    fn ensure_ignored_creates_file_when_missing() {
        let dir = TempDir::new().unwrap();
        ensure_ignored(dir.path(), ".smart-index/");
        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(content.lines().any(|l| l == ".smart-index/"));
    }

    #[test]
    fn ensure_ignored_is_idempotent() {
        let dir = TempDir::new().unwrap();
        ensure_ignored(dir.path(), ".smart-index/");
        ensure_ignored(dir.path(), ".smart-index/");
        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content.matches(".smart-index/").count(), 1);
    }

    #[test]
    fn ensure_ignored_preserves_existing_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();
        ensure_ignored(dir.path(), ".smart-index/");
        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(content.contains("target/"));
        assert!(content.contains(".smart-index/"));
    }
}
