//! Range selection: which feeds to query for a window, over which spans.
//!
//! Short windows come straight from the 5-minute feed. Wider windows pair
//! realtime daily averages with the archive so the chart covers both the
//! archive's processing lag and the realtime feed's short retention.

use chrono::NaiveDate;
use crf_wsc::model::DataSource;
use crf_wsc::source::SourceRequest;
use crf_wsc::window::{DateSpan, TimeWindow};

/// Widest window served directly from the 5-minute feed.
pub const HIGH_RES_MAX_DAYS: u32 = 14;

/// Rolling retention of the realtime collection, in days.
pub const REALTIME_RETENTION_DAYS: u32 = 30;

/// The feeds to query for one window, in order, plus any post-merge shaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub requests: Vec<SourceRequest>,
    /// Keep only this many of the most recent merged samples.
    pub truncate_to: Option<u32>,
    /// Keep only samples from this calendar year.
    pub year: Option<i32>,
}

/// Decide which sources serve a window. `today` is injected so plans are
/// reproducible.
pub fn plan_fetch(window: &TimeWindow, today: NaiveDate) -> FetchPlan {
    if let Some(year) = window.year {
        return FetchPlan {
            requests: vec![SourceRequest {
                source: DataSource::Historical,
                span: DateSpan::calendar_year(year),
            }],
            truncate_to: None,
            year: Some(year),
        };
    }

    let days = window.days;
    let span = DateSpan::recent(today, days);
    if days <= HIGH_RES_MAX_DAYS {
        return FetchPlan {
            requests: vec![SourceRequest {
                source: DataSource::RealtimeHighRes,
                span,
            }],
            truncate_to: None,
            year: None,
        };
    }

    // the realtime collection only retains about a month
    let realtime_span = DateSpan::recent(today, days.min(REALTIME_RETENTION_DAYS));
    FetchPlan {
        requests: vec![
            SourceRequest {
                source: DataSource::RealtimeDaily,
                span: realtime_span,
            },
            SourceRequest {
                source: DataSource::Historical,
                span,
            },
        ],
        truncate_to: (days > REALTIME_RETENTION_DAYS).then_some(days),
        year: None,
    }
}
