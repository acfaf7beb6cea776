//! TTL cache over window fetches, with per-key coalescing so concurrent
//! requests for the same window share one upstream fetch.

use crf_wsc::error::Result;
use crf_wsc::model::Timeline;
use crf_wsc::window::TimeWindow;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Time-to-live policy plus the capacity bound.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// TTL for windows touching the realtime feeds.
    pub realtime_ttl: Duration,
    /// TTL for archive-only calendar-year windows.
    pub archive_ttl: Duration,
    pub max_entries: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            realtime_ttl: Duration::from_secs(60),
            archive_ttl: Duration::from_secs(60 * 60),
            max_entries: 64,
        }
    }
}

impl CachePolicy {
    fn ttl_for(&self, window: &TimeWindow) -> Duration {
        if window.is_archive_year() {
            self.archive_ttl
        } else {
            self.realtime_ttl
        }
    }
}

struct CacheEntry {
    timeline: Timeline,
    stored_at: Instant,
}

/// Keyed by [`TimeWindow`]; one fetch per key at a time.
pub struct TimelineCache {
    policy: CachePolicy,
    entries: Mutex<HashMap<TimeWindow, CacheEntry>>,
    inflight: Mutex<HashMap<TimeWindow, Arc<Mutex<()>>>>,
}

impl TimelineCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached timeline for `window`, or run `fetch` and store its
    /// result.
    ///
    /// Concurrent callers for the same window queue behind one fetch and
    /// read its stored result. Failed fetches store nothing, so the next
    /// caller in the queue tries again.
    pub async fn get_or_fetch<F, Fut>(&self, window: &TimeWindow, fetch: F) -> Result<Timeline>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Timeline>>,
    {
        if let Some(timeline) = self.lookup(window).await {
            return Ok(timeline);
        }

        let gate = self.gate_for(window).await;
        let _held = gate.lock().await;

        // a fetch that finished while we queued already stored its result
        if let Some(timeline) = self.lookup(window).await {
            return Ok(timeline);
        }

        let timeline = fetch().await?;
        self.store(window.clone(), timeline.clone()).await;
        Ok(timeline)
    }

    async fn lookup(&self, window: &TimeWindow) -> Option<Timeline> {
        let mut entries = self.entries.lock().await;
        entries.retain(|w, e| e.stored_at.elapsed() <= self.policy.ttl_for(w));
        entries.get(window).map(|e| e.timeline.clone())
    }

    async fn store(&self, window: TimeWindow, timeline: Timeline) {
        let mut entries = self.entries.lock().await;
        if entries.len() >= self.policy.max_entries && !entries.contains_key(&window) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(w, _)| w.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            window,
            CacheEntry {
                timeline,
                stored_at: Instant::now(),
            },
        );
    }

    async fn gate_for(&self, window: &TimeWindow) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        inflight
            .entry(window.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
