//! Descriptive statistics over a window's discharge series.

use chrono::{DateTime, Utc};
use crf_wsc::error::{Result, WscError};
use crf_wsc::model::Timeline;
use serde::{Deserialize, Serialize};

/// Summary of the discharge readings over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStatistics {
    pub count: usize,
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
    /// First instant of the summarized timeline.
    pub start: DateTime<Utc>,
    /// Last instant of the summarized timeline.
    pub end: DateTime<Utc>,
}

/// Summarize the discharge readings in a timeline.
///
/// Median and quartiles take the element at the floored fractional index of
/// the sorted values, no interpolation. All values rounded to 2 decimals.
pub fn compute_statistics(timeline: &Timeline) -> Result<FlowStatistics> {
    let mut values = timeline.discharge_values();
    if values.is_empty() {
        return Err(WscError::InsufficientData(
            "no discharge readings in window".to_string(),
        ));
    }
    let (start, end) = timeline
        .span()
        .ok_or_else(|| WscError::InsufficientData("empty timeline".to_string()))?;

    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let count = values.len();
    let sum: f64 = values.iter().sum();

    Ok(FlowStatistics {
        count,
        average: round2(sum / count as f64),
        minimum: round2(values[0]),
        maximum: round2(values[count - 1]),
        median: round2(values[(count as f64 * 0.5).floor() as usize]),
        p25: round2(values[(count as f64 * 0.25).floor() as usize]),
        p75: round2(values[(count as f64 * 0.75).floor() as usize]),
        start,
        end,
    })
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Days, NaiveDate};
    use crf_wsc::model::{day_start_utc, DataSource, Sample};

    fn daily_series(values: &[f64]) -> Timeline {
        let base = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        Timeline::from_samples(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| Sample {
                    timestamp: day_start_utc(base + Days::new(i as u64)),
                    discharge: Some(v),
                    level: None,
                    source: DataSource::Historical,
                })
                .collect(),
        )
    }

    #[test]
    fn test_compute_statistics() {
        // values arrive in time order, not value order
        let timeline = daily_series(&[40.0, 10.0, 30.0, 20.0]);
        let stats = compute_statistics(&timeline).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.average, 25.0);
        assert_eq!(stats.minimum, 10.0);
        assert_eq!(stats.maximum, 40.0);
        assert_eq!(stats.median, 30.0);
        assert_eq!(stats.p25, 20.0);
        assert_eq!(stats.p75, 40.0);
        assert_eq!(stats.start, timeline.first().unwrap().timestamp);
        assert_eq!(stats.end, timeline.last().unwrap().timestamp);
    }

    #[test]
    fn test_compute_statistics_rounds_to_two_decimals() {
        let timeline = daily_series(&[1.0, 2.0, 2.0]);
        let stats = compute_statistics(&timeline).unwrap();
        assert_eq!(stats.average, 1.67);
        assert_eq!(stats.median, 2.0);
    }

    #[test]
    fn test_compute_statistics_single_value() {
        let stats = compute_statistics(&daily_series(&[7.5])).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.minimum, 7.5);
        assert_eq!(stats.maximum, 7.5);
        assert_eq!(stats.median, 7.5);
        assert_eq!(stats.p25, 7.5);
        assert_eq!(stats.p75, 7.5);
    }

    #[test]
    fn test_compute_statistics_empty_timeline() {
        let result = compute_statistics(&Timeline::default());
        assert!(matches!(result, Err(WscError::InsufficientData(_))));
    }

    #[test]
    fn test_compute_statistics_without_discharge() {
        let base = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let timeline = Timeline::from_samples(vec![Sample {
            timestamp: day_start_utc(base),
            discharge: None,
            level: Some(1.5),
            source: DataSource::Historical,
        }]);
        let result = compute_statistics(&timeline);
        assert!(matches!(result, Err(WscError::InsufficientData(_))));
    }
}
