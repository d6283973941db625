//! Aggregates indexing counts and cache hit/miss rates for UI readout.
//!
//! Every counter is a relaxed `AtomicU64`: stats are read-mostly diagnostic
//! output, not a correctness-bearing part of the index, so there is no need
//! for a stronger ordering than "eventually visible".

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Live counters for one index (typically the Background Index).
#[derive(Debug, Default)]
pub struct Stats {
    files_indexed: AtomicU64,
    files_skipped: AtomicU64,
    files_purged: AtomicU64,
    parse_errors: AtomicU64,
    shard_cache_hits: AtomicU64,
    shard_cache_misses: AtomicU64,
    last_index_at_ms: AtomicU64,
    last_full_index_at_ms: AtomicU64,
    /// Last error message observed (I/O or corrupt-shard), for display only.
    last_error: RwLock<Option<String>>,
}

/// Point-in-time snapshot, safe to serialize and hand to a UI or LSP client.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatsSnapshot {
    pub files_indexed: u64,
    pub files_skipped: u64,
    pub files_purged: u64,
    pub parse_errors: u64,
    pub shard_cache_hits: u64,
    pub shard_cache_misses: u64,
    pub last_index_at_ms: u64,
    pub last_full_index_at_ms: u64,
    pub last_error: Option<String>,
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_indexed(&self) {
        self.files_indexed.fetch_add(1, Ordering::Relaxed);
        self.last_index_at_ms.store(now_ms(), Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_purged(&self) {
        self.files_purged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shard_cache_hit(&self) {
        self.shard_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shard_cache_miss(&self) {
        self.shard_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_full_index_complete(&self) {
        self.last_full_index_at_ms.store(now_ms(), Ordering::Relaxed);
    }

    pub fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().unwrap() = Some(message.into());
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            files_indexed: self.files_indexed.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            files_purged: self.files_purged.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            shard_cache_hits: self.shard_cache_hits.load(Ordering::Relaxed),
            shard_cache_misses: self.shard_cache_misses.load(Ordering::Relaxed),
            last_index_at_ms: self.last_index_at_ms.load(Ordering::Relaxed),
            last_full_index_at_ms: self.last_full_index_at_ms.load(Ordering::Relaxed),
            last_error: self.last_error.read().unwrap().clone(),
        }
    }
}
