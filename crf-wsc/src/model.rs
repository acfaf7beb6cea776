use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which upstream feed a sample came from.
///
/// When two samples land on the same instant during a merge, the one from
/// the higher-priority source survives.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Raw 5-minute readings from the realtime collection or Datamart CSV
    RealtimeHighRes,
    /// Realtime readings bucketed into daily averages
    RealtimeDaily,
    /// Published daily means from the multi-year archive
    Historical,
}

impl DataSource {
    /// Merge precedence: higher wins on a timestamp collision.
    pub fn priority(self) -> u8 {
        match self {
            DataSource::RealtimeHighRes => 2,
            DataSource::RealtimeDaily => 1,
            DataSource::Historical => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::RealtimeHighRes => "realtime",
            DataSource::RealtimeDaily => "realtime-daily",
            DataSource::Historical => "historical",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single reading for one station at one instant.
///
/// At least one of `discharge`/`level` is present; parsers drop rows where
/// both are missing rather than erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    /// Flow in m³/s
    pub discharge: Option<f64>,
    /// Water level in m
    pub level: Option<f64>,
    pub source: DataSource,
}

/// Chronologically ordered samples for one station.
///
/// Ascending by timestamp with no duplicate instants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub samples: Vec<Sample>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a timeline from unordered samples: sorts ascending and keeps
    /// the first sample seen for any repeated instant.
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        samples.dedup_by(|a, b| a.timestamp == b.timestamp);
        Timeline { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// The most recent sample, if any.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// All discharge readings in chronological order, gaps skipped.
    pub fn discharge_values(&self) -> Vec<f64> {
        self.samples.iter().filter_map(|s| s.discharge).collect()
    }

    /// First and last instants covered by this timeline.
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }
}

/// Midnight UTC at the start of the given calendar day.
pub fn day_start_utc(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(day: u32, discharge: f64, source: DataSource) -> Sample {
        let date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        Sample {
            timestamp: day_start_utc(date),
            discharge: Some(discharge),
            level: None,
            source,
        }
    }

    #[test]
    fn test_from_samples_sorts_and_dedups() {
        let timeline = Timeline::from_samples(vec![
            sample(3, 30.0, DataSource::Historical),
            sample(1, 10.0, DataSource::Historical),
            sample(2, 20.0, DataSource::Historical),
            sample(1, 99.0, DataSource::Historical),
        ]);
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.first().unwrap().discharge, Some(10.0));
        assert_eq!(timeline.last().unwrap().discharge, Some(30.0));
    }

    #[test]
    fn test_discharge_values_skips_gaps() {
        let mut samples = vec![
            sample(1, 10.0, DataSource::Historical),
            sample(2, 20.0, DataSource::Historical),
        ];
        samples.push(Sample {
            timestamp: day_start_utc(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()),
            discharge: None,
            level: Some(1.2),
            source: DataSource::Historical,
        });
        let timeline = Timeline::from_samples(samples);
        assert_eq!(timeline.discharge_values(), vec![10.0, 20.0]);
    }

    #[test]
    fn test_span_and_latest() {
        assert!(Timeline::new().span().is_none());
        assert!(Timeline::new().latest().is_none());

        let timeline = Timeline::from_samples(vec![
            sample(2, 20.0, DataSource::Historical),
            sample(5, 50.0, DataSource::RealtimeDaily),
        ]);
        let (start, end) = timeline.span().unwrap();
        assert_eq!(start, day_start_utc(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()));
        assert_eq!(end, day_start_utc(NaiveDate::from_ymd_opt(2025, 6, 5).unwrap()));
        assert_eq!(timeline.latest().unwrap().discharge, Some(50.0));
    }

    #[test]
    fn test_source_priority_order() {
        assert!(DataSource::RealtimeHighRes.priority() > DataSource::RealtimeDaily.priority());
        assert!(DataSource::RealtimeDaily.priority() > DataSource::Historical.priority());
    }
}
