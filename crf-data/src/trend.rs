//! Discharge trend: the trailing window's mean against the preceding
//! baseline, anchored at the timeline's last sample.

use chrono::Duration;
use crf_wsc::error::{Result, WscError};
use crf_wsc::model::Timeline;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::statistics::round2;

/// Percent change above which a trend reads as rising.
pub const RISING_THRESHOLD_PCT: f64 = 5.0;

/// Percent change below which a trend reads as falling.
pub const FALLING_THRESHOLD_PCT: f64 = -5.0;

/// Trailing window the pipeline compares, in days.
pub const DEFAULT_RECENT_DAYS: u32 = 7;

/// Baseline window preceding it, in days.
pub const DEFAULT_BASELINE_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Falling => "falling",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTrend {
    pub direction: TrendDirection,
    pub percent_change: f64,
    pub recent_mean: f64,
    pub baseline_mean: f64,
}

/// Compare mean discharge over the trailing `recent_days` against the
/// `baseline_days` before them.
///
/// Both windows anchor at the last sample, not the wall clock, so archive
/// windows trend too. Either window empty of discharge readings, or a zero
/// baseline mean, is `InsufficientData`.
pub fn compute_trend(
    timeline: &Timeline,
    recent_days: u32,
    baseline_days: u32,
) -> Result<FlowTrend> {
    let anchor = timeline
        .last()
        .map(|s| s.timestamp)
        .ok_or_else(|| WscError::InsufficientData("empty timeline".to_string()))?;
    let recent_start = anchor - Duration::days(recent_days as i64);
    let baseline_start = recent_start - Duration::days(baseline_days as i64);

    let recent: Vec<f64> = timeline
        .iter()
        .filter(|s| s.timestamp > recent_start)
        .filter_map(|s| s.discharge)
        .collect();
    let baseline: Vec<f64> = timeline
        .iter()
        .filter(|s| s.timestamp > baseline_start && s.timestamp <= recent_start)
        .filter_map(|s| s.discharge)
        .collect();

    let recent_mean = mean(&recent).ok_or_else(|| {
        WscError::InsufficientData("no discharge readings in recent window".to_string())
    })?;
    let baseline_mean = mean(&baseline).ok_or_else(|| {
        WscError::InsufficientData("no discharge readings in baseline window".to_string())
    })?;
    if baseline_mean == 0.0 {
        return Err(WscError::InsufficientData(
            "baseline mean is zero".to_string(),
        ));
    }

    let percent_change = round2((recent_mean - baseline_mean) / baseline_mean * 100.0);
    let direction = if percent_change > RISING_THRESHOLD_PCT {
        TrendDirection::Rising
    } else if percent_change < FALLING_THRESHOLD_PCT {
        TrendDirection::Falling
    } else {
        TrendDirection::Stable
    };

    Ok(FlowTrend {
        direction,
        percent_change,
        recent_mean: round2(recent_mean),
        baseline_mean: round2(baseline_mean),
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Days, NaiveDate};
    use crf_wsc::model::{day_start_utc, DataSource, Sample};

    fn daily_series(values: &[f64]) -> Timeline {
        let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
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

    fn series(baseline: f64, recent: f64) -> Timeline {
        let mut values = vec![baseline; 30];
        values.extend_from_slice(&[recent; 7]);
        daily_series(&values)
    }

    #[test]
    fn test_rising_trend() {
        let trend = compute_trend(&series(50.0, 55.0), 7, 30).unwrap();
        assert_eq!(trend.direction, TrendDirection::Rising);
        assert_eq!(trend.percent_change, 10.0);
        assert_eq!(trend.recent_mean, 55.0);
        assert_eq!(trend.baseline_mean, 50.0);
    }

    #[test]
    fn test_falling_trend() {
        let trend = compute_trend(&series(50.0, 40.0), 7, 30).unwrap();
        assert_eq!(trend.direction, TrendDirection::Falling);
        assert_eq!(trend.percent_change, -20.0);
    }

    #[test]
    fn test_stable_trend() {
        let trend = compute_trend(&series(50.0, 51.0), 7, 30).unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.percent_change, 2.0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // exactly +5 percent still reads as stable
        let trend = compute_trend(&series(50.0, 52.5), 7, 30).unwrap();
        assert_eq!(trend.percent_change, 5.0);
        assert_eq!(trend.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_zero_baseline() {
        let result = compute_trend(&series(0.0, 5.0), 7, 30);
        assert!(matches!(result, Err(WscError::InsufficientData(_))));
    }

    #[test]
    fn test_empty_timeline() {
        let result = compute_trend(&Timeline::default(), 7, 30);
        assert!(matches!(result, Err(WscError::InsufficientData(_))));
    }

    #[test]
    fn test_baseline_shorter_than_window() {
        // only 5 days of data: the baseline window holds nothing
        let result = compute_trend(&daily_series(&[10.0; 5]), 7, 30);
        assert!(matches!(result, Err(WscError::InsufficientData(_))));
    }
}
