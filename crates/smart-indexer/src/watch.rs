//! Low-level filesystem watching: wraps `notify` + `notify-debouncer-full`
//! into a stream of coalesced, classified change events. The per-URI
//! debounce *reset* and supersession semantics required by §4.6 live one
//! layer up, in `orchestrator` — this module only deals with turning raw OS
//! events into `(PathBuf, FsChangeKind)` pairs for source files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};

use crate::parse::is_supported_source_file;

/// What happened to a file, collapsed from `notify::EventKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsChangeKind {
    CreatedOrModified,
    Removed,
}

/// Start watching `root` recursively, sending one `(path, kind)` pair per
/// relevant filesystem event to `tx`. Events for paths that aren't
/// supported source files are dropped before they ever reach the channel.
pub fn watch_workspace(
    root: &Path,
    debounce: Duration,
    tx: std::sync::mpsc::Sender<(PathBuf, FsChangeKind)>,
) -> notify::Result<Debouncer<RecommendedWatcher, RecommendedCache>> {
    let mut debouncer: Debouncer<RecommendedWatcher, RecommendedCache> = new_debouncer(
        debounce,
        None,
        move |result: DebounceEventResult| match result {
            Ok(events) => {
                for event in events {
                    for path in &event.event.paths {
                        if !is_supported_source_file(path) {
                            continue;
                        }
                        let kind = classify(&event.event.kind);
                        if let Some(kind) = kind {
                            let _ = tx.send((path.clone(), kind));
                        }
                    }
                }
            }
            Err(errors) => {
                for error in errors {
                    tracing::warn!("filesystem watch error: {error}");
                }
            }
        },
    )?;
    debouncer.watch(root, RecursiveMode::Recursive)?;
    Ok(debouncer)
}

fn classify(kind: &notify::EventKind) -> Option<FsChangeKind> {
    use notify::EventKind;
    match kind {
        EventKind::Create(_) | EventKind::Modify(_) => Some(FsChangeKind::CreatedOrModified),
        EventKind::Remove(_) => Some(FsChangeKind::Removed),
        _ => None,
    }
}
