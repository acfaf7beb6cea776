//! Merging per-feed timelines into one chart series, plus detection of the
//! archive's processing-lag gap.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use crf_wsc::model::{DataSource, Sample, Timeline};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Whole days with no data between the archive's last sample and the first
/// realtime sample after it. Surfaced to users as the processing lag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataGap {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

/// Merge feed timelines into one, ascending and duplicate-free.
///
/// On an exact-timestamp collision the sample from the higher-priority
/// source survives; at equal priority the later-merged sample wins.
pub fn merge_timelines(timelines: Vec<Timeline>) -> Timeline {
    let mut by_instant: BTreeMap<DateTime<Utc>, Sample> = BTreeMap::new();
    for timeline in timelines {
        for sample in timeline.samples {
            match by_instant.entry(sample.timestamp) {
                Entry::Vacant(slot) => {
                    slot.insert(sample);
                }
                Entry::Occupied(mut slot) => {
                    if sample.source.priority() >= slot.get().source.priority() {
                        slot.insert(sample);
                    }
                }
            }
        }
    }
    Timeline {
        samples: by_instant.into_values().collect(),
    }
}

/// Keep the `n` most recent samples.
pub fn truncate_latest(timeline: Timeline, n: u32) -> Timeline {
    let mut samples = timeline.samples;
    let keep = n as usize;
    if samples.len() > keep {
        samples.drain(..samples.len() - keep);
    }
    Timeline { samples }
}

/// Keep samples whose UTC year matches.
pub fn filter_calendar_year(timeline: Timeline, year: i32) -> Timeline {
    let mut samples = timeline.samples;
    samples.retain(|s| s.timestamp.year() == year);
    Timeline { samples }
}

/// Find the archive lag in a merged timeline.
///
/// `None` when either side is absent or the feeds abut.
pub fn detect_gap(timeline: &Timeline) -> Option<DataGap> {
    let last_archived = timeline
        .iter()
        .filter(|s| s.source == DataSource::Historical)
        .last()?;
    let first_realtime = timeline
        .iter()
        .find(|s| s.source != DataSource::Historical && s.timestamp > last_archived.timestamp)?;

    let archive_day = last_archived.timestamp.date_naive();
    let realtime_day = first_realtime.timestamp.date_naive();
    let days = (realtime_day - archive_day).num_days() - 1;
    if days < 1 {
        return None;
    }
    Some(DataGap {
        start: archive_day.succ_opt()?,
        end: realtime_day.pred_opt()?,
        days,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use crf_wsc::model::day_start_utc;

    fn sample(day: u32, hour: u32, source: DataSource, discharge: f64) -> Sample {
        Sample {
            timestamp: Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap(),
            discharge: Some(discharge),
            level: None,
            source,
        }
    }

    fn daily(days: std::ops::RangeInclusive<u32>, source: DataSource) -> Timeline {
        Timeline::from_samples(
            days.map(|d| sample(d, 0, source, d as f64))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_merge_orders_and_resolves_by_priority() {
        let historical = daily(1..=10, DataSource::Historical);
        let realtime = daily(8..=12, DataSource::RealtimeDaily);
        let merged = merge_timelines(vec![historical, realtime]);

        assert_eq!(merged.len(), 12);
        let timestamps: Vec<_> = merged.iter().map(|s| s.timestamp).collect();
        let mut sorted = timestamps.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(timestamps, sorted);

        // overlap days carry the realtime sample whichever order merged
        for s in merged.iter().filter(|s| s.timestamp.day() >= 8) {
            assert_eq!(s.source, DataSource::RealtimeDaily);
        }
        let swapped = merge_timelines(vec![
            daily(8..=12, DataSource::RealtimeDaily),
            daily(1..=10, DataSource::Historical),
        ]);
        for s in swapped.iter().filter(|s| s.timestamp.day() >= 8) {
            assert_eq!(s.source, DataSource::RealtimeDaily);
        }
    }

    #[test]
    fn test_merge_equal_priority_last_wins() {
        let first = Timeline::from_samples(vec![sample(1, 0, DataSource::Historical, 5.0)]);
        let second = Timeline::from_samples(vec![sample(1, 0, DataSource::Historical, 6.0)]);
        let merged = merge_timelines(vec![first, second]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.samples[0].discharge, Some(6.0));
    }

    #[test]
    fn test_merge_empty_input() {
        let merged = merge_timelines(Vec::new());
        assert!(merged.is_empty());
    }

    #[test]
    fn test_truncate_latest() {
        let timeline = daily(1..=5, DataSource::Historical);
        let truncated = truncate_latest(timeline.clone(), 3);
        assert_eq!(truncated.len(), 3);
        assert_eq!(
            truncated.samples[0].timestamp,
            Utc.with_ymd_and_hms(2025, 6, 3, 0, 0, 0).unwrap()
        );
        assert_eq!(truncate_latest(timeline.clone(), 10).len(), 5);
        assert!(truncate_latest(timeline, 0).is_empty());
    }

    #[test]
    fn test_filter_calendar_year() {
        let mut samples = vec![
            Sample {
                timestamp: day_start_utc(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()),
                discharge: Some(1.0),
                level: None,
                source: DataSource::Historical,
            },
            Sample {
                timestamp: day_start_utc(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                discharge: Some(2.0),
                level: None,
                source: DataSource::Historical,
            },
            Sample {
                timestamp: day_start_utc(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()),
                discharge: Some(3.0),
                level: None,
                source: DataSource::Historical,
            },
        ];
        samples.rotate_left(1);
        let filtered = filter_calendar_year(Timeline::from_samples(samples), 2024);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|s| s.timestamp.year() == 2024));
    }

    #[test]
    fn test_detect_gap() {
        let merged = merge_timelines(vec![
            daily(1..=5, DataSource::Historical),
            daily(12..=14, DataSource::RealtimeDaily),
        ]);
        let gap = detect_gap(&merged).unwrap();
        assert_eq!(gap.start, NaiveDate::from_ymd_opt(2025, 6, 6).unwrap());
        assert_eq!(gap.end, NaiveDate::from_ymd_opt(2025, 6, 11).unwrap());
        assert_eq!(gap.days, 6);
    }

    #[test]
    fn test_detect_gap_abutting_feeds() {
        let merged = merge_timelines(vec![
            daily(1..=5, DataSource::Historical),
            daily(6..=8, DataSource::RealtimeDaily),
        ]);
        assert_eq!(detect_gap(&merged), None);
    }

    #[test]
    fn test_detect_gap_needs_both_sides() {
        assert_eq!(detect_gap(&daily(1..=5, DataSource::Historical)), None);
        assert_eq!(detect_gap(&daily(1..=5, DataSource::RealtimeDaily)), None);
        // realtime entirely before the archive's end is not a lag
        let merged = merge_timelines(vec![
            daily(10..=12, DataSource::Historical),
            daily(1..=3, DataSource::RealtimeHighRes),
        ]);
        assert_eq!(detect_gap(&merged), None);
    }
}
