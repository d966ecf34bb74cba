//! The tag cache: current mapping, background refresh loop, point lookup.
//!
//! One background task owns the remote sessions and periodically rebuilds
//! the mapping; any number of concurrent callers perform point lookups. The
//! mapping is the only shared mutable state and is guarded by a single
//! read/write lock — refresh frequency is minutes, so contention is a
//! non-issue and correctness wins over lock-free cleverness.

use crate::refresh::refresh_label_map;
use crate::sessions::SessionManager;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use vtags_core::{LabelMap, LabelSet, QueryError, VtagsResult};
use vtags_vsphere::SessionFactory;

// ============================================================================
// METRICS
// ============================================================================

/// Counters tracking refresh activity since startup.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
    /// Refresh cycles that completed and swapped a new mapping in.
    pub cycles_completed: AtomicU64,
    /// Refresh cycles aborted by a session or query failure.
    pub cycles_failed: AtomicU64,
    /// Objects in the currently visible mapping.
    pub objects_cached: AtomicU64,
}

impl RefreshMetrics {
    /// Get a point-in-time view of all counters.
    pub fn snapshot(&self) -> RefreshSnapshot {
        RefreshSnapshot {
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            objects_cached: self.objects_cached.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of refresh metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSnapshot {
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub objects_cached: u64,
}

// ============================================================================
// TAG CACHE
// ============================================================================

/// Periodically-refreshed object-id -> label-set mapping.
///
/// Construct, apply [`TagCache::set_category_filter`], wrap in an [`Arc`],
/// then hand one clone to a spawned [`TagCache::run`] task while the
/// enrichment path keeps another for [`TagCache::get`] lookups.
pub struct TagCache {
    map: RwLock<LabelMap>,
    sessions: tokio::sync::Mutex<SessionManager>,
    allowlist: Vec<String>,
    cycle_budget: Duration,
    metrics: RefreshMetrics,
}

impl TagCache {
    /// Create an empty cache against the given session factory.
    ///
    /// `cycle_budget` bounds one whole refresh cycle, session renewal
    /// included.
    pub fn new(factory: Arc<dyn SessionFactory>, cycle_budget: Duration) -> Self {
        Self {
            map: RwLock::new(LabelMap::new()),
            sessions: tokio::sync::Mutex::new(SessionManager::new(factory)),
            allowlist: Vec::new(),
            cycle_budget,
            metrics: RefreshMetrics::default(),
        }
    }

    /// Restrict refreshes to the named categories. Empty means all.
    ///
    /// Single-assignment-before-start: takes `&mut self`, so it cannot race
    /// a running loop.
    pub fn set_category_filter(&mut self, names: Vec<String>) {
        self.allowlist = names;
    }

    /// Point lookup of the labels for one object id.
    ///
    /// Cheap and non-blocking apart from the shared read lock; called once
    /// per processed sample, potentially from a different thread than the
    /// refresh loop. `None` covers: never populated, key absent, loop never
    /// started or already stopped.
    pub fn get(&self, object_id: &str) -> Option<LabelSet> {
        self.map.read().ok()?.get(object_id).cloned()
    }

    /// Number of objects in the currently visible mapping.
    pub fn len(&self) -> usize {
        self.map.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time refresh counters.
    pub fn metrics(&self) -> RefreshSnapshot {
        self.metrics.snapshot()
    }

    /// One refresh cycle under the configured budget: fetch and build the
    /// replacement mapping entirely off-lock, then swap it in while holding
    /// the write lock so lookups never see a torn state.
    pub async fn refresh_now(&self) -> VtagsResult<()> {
        let mut sessions = self.sessions.lock().await;
        let refreshed = tokio::time::timeout(
            self.cycle_budget,
            refresh_label_map(&mut sessions, &self.allowlist),
        )
        .await
        .map_err(|_| QueryError::DeadlineExceeded {
            budget: self.cycle_budget,
        })?;
        drop(sessions);
        let new_map = refreshed?;

        let count = new_map.len() as u64;
        if let Ok(mut map) = self.map.write() {
            map.clear();
            map.extend(new_map);
        }
        self.metrics.cycles_completed.fetch_add(1, Ordering::Relaxed);
        self.metrics.objects_cached.store(count, Ordering::Relaxed);
        Ok(())
    }

    async fn refresh_and_report(&self) {
        match self.refresh_now().await {
            Ok(()) => {
                tracing::debug!(objects = self.len(), "tag cache refreshed");
            }
            Err(err) => {
                self.metrics.cycles_failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(error = %err, "tag refresh cycle failed");
            }
        }
    }

    /// Run the refresh loop until the shutdown signal fires.
    ///
    /// An empty mapping triggers one synchronous refresh before the timer is
    /// armed, so the first samples after startup have a chance of being
    /// enriched. A failed cycle is reported and the previous mapping stays
    /// authoritative until the next tick. On shutdown the sessions are
    /// logged out best-effort and the mapping is cleared.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>, poll_interval: Duration) {
        if self.is_empty() {
            self.refresh_and_report().await;
        }

        let mut tick = interval(poll_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; the cold-start refresh above
        // already covered it.
        tick.tick().await;

        tracing::info!(
            interval_secs = poll_interval.as_secs(),
            budget_secs = self.cycle_budget.as_secs(),
            "tag cache refresh loop started"
        );

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    // A dropped sender counts as shutdown.
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = tick.tick() => {
                    self.refresh_and_report().await;
                }
            }
        }

        self.sessions.lock().await.close().await;
        if let Ok(mut map) = self.map.write() {
            map.clear();
        }
        self.metrics.objects_cached.store(0, Ordering::Relaxed);
        tracing::info!("tag cache refresh loop stopped");
    }
}

impl std::fmt::Debug for TagCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagCache")
            .field("objects", &self.len())
            .field("allowlist", &self.allowlist)
            .field("cycle_budget", &self.cycle_budget)
            .finish()
    }
}
