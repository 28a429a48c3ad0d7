use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::models::report::{Report, ReportKind};

#[derive(Clone)]
struct CachedListing {
    reports: Vec<Report>,
    cached_at: DateTime<Utc>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<ReportKind, CachedListing>,
    /// Bumped by every invalidation of the kind.
    generations: HashMap<ReportKind, u64>,
}

impl CacheState {
    fn generation(&self, kind: ReportKind) -> u64 {
        self.generations.get(&kind).copied().unwrap_or_default()
    }
}

/// Per-kind listing views, dropped whenever a report of that kind changes.
///
/// A listing is only stored under the generation it was read at, so a read
/// that raced with a commit never repopulates the cache with stale rows.
pub struct ListingCache {
    state: RwLock<CacheState>,
    ttl: Duration,
}

impl ListingCache {
    pub fn new(ttl_seconds: u64) -> Self {
        let ttl_seconds = i64::try_from(ttl_seconds).unwrap_or(i64::MAX / 1_000);
        Self {
            state: RwLock::new(CacheState::default()),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl > Duration::zero()
    }

    pub fn get(&self, kind: ReportKind) -> Option<Vec<Report>> {
        if !self.is_enabled() {
            return None;
        }

        let now = Utc::now();
        let hit = self
            .state
            .read()
            .ok()
            .and_then(|guard| guard.entries.get(&kind).cloned())
            .and_then(|entry| {
                if now - entry.cached_at <= self.ttl {
                    Some(entry.reports)
                } else {
                    None
                }
            });

        if hit.is_some() {
            debug!(target: "app::reports", kind = %kind, "listing cache hit");
        }
        hit
    }

    /// Current generation of `kind`; read it before loading a listing for `put`.
    pub fn generation(&self, kind: ReportKind) -> u64 {
        self.state
            .read()
            .map(|guard| guard.generation(kind))
            .unwrap_or_default()
    }

    /// Stores `reports` unless `kind` was invalidated since `generation` was taken.
    pub fn put(&self, kind: ReportKind, generation: u64, reports: Vec<Report>) {
        if !self.is_enabled() {
            return;
        }
        if let Ok(mut guard) = self.state.write() {
            if guard.generation(kind) != generation {
                debug!(target: "app::reports", kind = %kind, "stale listing not cached");
                return;
            }
            guard.entries.insert(
                kind,
                CachedListing {
                    reports,
                    cached_at: Utc::now(),
                },
            );
        }
    }

    pub fn invalidate(&self, kind: ReportKind) {
        if let Ok(mut guard) = self.state.write() {
            *guard.generations.entry(kind).or_default() += 1;
            if guard.entries.remove(&kind).is_some() {
                debug!(target: "app::reports", kind = %kind, "listing cache invalidated");
            }
        }
    }
}
