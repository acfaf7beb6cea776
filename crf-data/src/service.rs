//! The snapshot pipeline: one request in, one immutable snapshot out, and
//! a watch channel that always holds the freshest published snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use crf_wsc::error::{ErrorKind, Result, WscError};
use crf_wsc::model::{Sample, Timeline};
use crf_wsc::source::HydrometricSource;
use crf_wsc::station::StationId;
use crf_wsc::window::TimeWindow;
use futures::future::join_all;
use log::warn;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::cache::{CachePolicy, TimelineCache};
use crate::merge::{detect_gap, filter_calendar_year, merge_timelines, truncate_latest, DataGap};
use crate::planner::plan_fetch;
use crate::statistics::{compute_statistics, FlowStatistics};
use crate::trend::{compute_trend, FlowTrend, DEFAULT_BASELINE_DAYS, DEFAULT_RECENT_DAYS};

/// A section failure, cloneable into every consumer of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&WscError> for SectionError {
    fn from(e: &WscError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl fmt::Display for SectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

type Section<T> = std::result::Result<T, SectionError>;

/// Everything one window request produced. Sections fail independently;
/// a dead live feed never blanks the chart.
#[derive(Debug, Clone)]
pub struct FlowSnapshot {
    pub window: TimeWindow,
    pub fetched_at: DateTime<Utc>,
    pub live: Section<Sample>,
    pub chart: Section<Timeline>,
    pub statistics: Section<FlowStatistics>,
    pub trend: Section<FlowTrend>,
    pub gap: Option<DataGap>,
}

/// Drives the fetch-merge-derive pipeline over any [`HydrometricSource`]
/// and publishes snapshots last-request-wins.
pub struct FlowService<S: HydrometricSource> {
    source: Arc<S>,
    cache: TimelineCache,
    publisher: watch::Sender<Option<FlowSnapshot>>,
    seq: AtomicU64,
}

impl<S: HydrometricSource> FlowService<S> {
    pub fn new(source: S) -> Self {
        Self::with_policy(source, CachePolicy::default())
    }

    pub fn with_policy(source: S, policy: CachePolicy) -> Self {
        let (publisher, _) = watch::channel(None);
        Self {
            source: Arc::new(source),
            cache: TimelineCache::new(policy),
            publisher,
            seq: AtomicU64::new(0),
        }
    }

    /// Watch the published snapshot slot.
    pub fn subscribe(&self) -> watch::Receiver<Option<FlowSnapshot>> {
        self.publisher.subscribe()
    }

    /// Build a snapshot for a window: current conditions and the chart
    /// window fetch run concurrently, statistics and trend derive from
    /// whatever chart arrived.
    pub async fn fetch_snapshot(&self, window: &TimeWindow) -> FlowSnapshot {
        let today = Utc::now().date_naive();
        let (live, chart) = tokio::join!(
            self.source.latest(&window.station),
            self.fetch_window(window, today),
        );

        let live = live.map_err(|e| SectionError::from(&e));
        let chart = chart.map_err(|e| SectionError::from(&e));

        let (statistics, trend, gap) = match &chart {
            Ok(timeline) => (
                compute_statistics(timeline).map_err(|e| SectionError::from(&e)),
                compute_trend(timeline, DEFAULT_RECENT_DAYS, DEFAULT_BASELINE_DAYS)
                    .map_err(|e| SectionError::from(&e)),
                detect_gap(timeline),
            ),
            Err(e) => (Err(e.clone()), Err(e.clone()), None),
        };

        FlowSnapshot {
            window: window.clone(),
            fetched_at: Utc::now(),
            live,
            chart,
            statistics,
            trend,
            gap,
        }
    }

    /// Run the pipeline and publish the snapshot, unless a newer refresh
    /// started while this one ran. The stale snapshot is still returned to
    /// its caller, just never published.
    pub async fn refresh(&self, window: &TimeWindow) -> FlowSnapshot {
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = self.fetch_snapshot(window).await;
        if self.seq.load(Ordering::SeqCst) == ticket {
            self.publisher.send_replace(Some(snapshot.clone()));
        }
        snapshot
    }

    async fn fetch_window(&self, window: &TimeWindow, today: NaiveDate) -> Result<Timeline> {
        let source = Arc::clone(&self.source);
        let station = window.station.clone();
        let win = window.clone();
        self.cache
            .get_or_fetch(window, || async move {
                run_plan(source.as_ref(), &station, &win, today).await
            })
            .await
    }
}

/// Fetch every planned feed and merge what arrived.
///
/// A failed feed is logged and skipped as long as another one delivered;
/// when every feed fails, the first failure in plan order propagates.
async fn run_plan<S: HydrometricSource>(
    source: &S,
    station: &StationId,
    window: &TimeWindow,
    today: NaiveDate,
) -> Result<Timeline> {
    let plan = plan_fetch(window, today);
    let fetches = plan
        .requests
        .iter()
        .map(|request| source.fetch(station, *request));
    let outcomes = join_all(fetches).await;

    let mut collected = Vec::new();
    let mut first_err = None;
    for (request, outcome) in plan.requests.iter().zip(outcomes) {
        match outcome {
            Ok(timeline) => collected.push(timeline),
            Err(e) => {
                warn!("{} fetch failed for {}: {}", request.source, station, e);
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
    }
    if collected.is_empty() {
        if let Some(e) = first_err {
            return Err(e);
        }
        return Ok(Timeline::default());
    }

    let mut merged = merge_timelines(collected);
    if let Some(n) = plan.truncate_to {
        merged = truncate_latest(merged, n);
    }
    if let Some(year) = plan.year {
        merged = filter_calendar_year(merged, year);
    }
    Ok(merged)
}
