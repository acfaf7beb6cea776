//! Realtime feeds: the hydrometric-realtime GeoJSON collection and the MSC
//! Datamart rolling CSV.
//!
//! The GeoJSON collection serves 5-minute readings with roughly 30 days of
//! retention; it backs both the high-resolution charts and, bucketed into
//! daily averages, the medium windows. The Datamart CSV is the freshest
//! feed and is tried first for current conditions, with the GeoJSON API as
//! fallback (the API lags behind the CSV for some stations).

use crate::error::{Result, WscError};
use crate::model::{day_start_utc, DataSource, Sample};
use crate::station::StationId;
use crate::window::DateSpan;
use chrono::{DateTime, NaiveDate, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;

#[cfg(feature = "api")]
use crate::model::Timeline;
#[cfg(feature = "api")]
use crate::source::http_get_text;
#[cfg(feature = "api")]
use log::{info, warn};
#[cfg(feature = "api")]
use reqwest::Client;

/// Realtime GeoJSON collection (5-minute readings, ~30 day retention).
pub const REALTIME_ITEMS_URL: &str =
    "https://api.weather.gc.ca/collections/hydrometric-realtime/items";

/// Root of the region-partitioned Datamart CSV tree.
pub const DATAMART_CSV_ROOT: &str = "https://dd.weather.gc.ca/hydrometric/csv";

/// Readings per day at the 5-minute cadence.
pub const SAMPLES_PER_DAY: i64 = 288;

/// Hard cap on `limit` for realtime item requests.
pub const MAX_ITEMS: i64 = 10_000;

/// Date format for realtime item query bounds.
const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: RealtimeProperties,
}

#[derive(Debug, Deserialize)]
struct RealtimeProperties {
    #[serde(rename = "DATETIME")]
    datetime: Option<String>,
    #[serde(rename = "DISCHARGE")]
    discharge: Option<f64>,
    #[serde(rename = "LEVEL")]
    level: Option<f64>,
}

/// Items URL for a date span, ascending by instant.
pub fn realtime_items_url(station: &StationId, span: &DateSpan, limit: i64) -> String {
    format!(
        "{}?STATION_NUMBER={}&datetime={}T00:00:00Z/{}T23:59:59Z&limit={}&sortby=DATETIME&f=json",
        REALTIME_ITEMS_URL,
        station,
        span.start.format(DAY_FORMAT),
        span.end.format(DAY_FORMAT),
        limit
    )
}

/// Items URL for the single most recent reading.
pub fn latest_realtime_url(station: &StationId) -> String {
    format!(
        "{}?STATION_NUMBER={}&limit=1&sortby=-DATETIME&f=json",
        REALTIME_ITEMS_URL, station
    )
}

/// Rolling hourly-hydrometric CSV for a station, partitioned by region.
pub fn datamart_csv_url(station: &StationId) -> String {
    let region = station.region_code();
    format!(
        "{}/{}/hourly/{}_{}_hourly_hydrometric.csv",
        DATAMART_CSV_ROOT,
        region,
        region,
        station.as_str()
    )
}

/// Parse a realtime GeoJSON payload into instant samples.
///
/// Features with an unparsable instant or with neither discharge nor level
/// are skipped. The whole payload failing to decode is `SourceUnavailable`.
pub fn parse_realtime_geojson(body: &str) -> Result<Vec<Sample>> {
    let collection: FeatureCollection =
        serde_json::from_str(body).map_err(|e| WscError::SourceUnavailable {
            feed: DataSource::RealtimeHighRes,
            reason: format!("bad GeoJSON: {}", e),
        })?;

    let mut samples = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let props = feature.properties;
        let timestamp = match props.datetime.as_deref().and_then(parse_instant) {
            Some(t) => t,
            None => continue,
        };
        if props.discharge.is_none() && props.level.is_none() {
            continue;
        }
        samples.push(Sample {
            timestamp,
            discharge: props.discharge,
            level: props.level,
            source: DataSource::RealtimeHighRes,
        });
    }
    Ok(samples)
}

/// Parse the Datamart hourly CSV into instant samples.
///
/// Columns by index: 1 = RFC 3339 timestamp, 2 = water level, 6 = discharge.
/// Empty cells and the literal `no data` (any case) are missing values;
/// malformed rows are skipped.
pub fn parse_datamart_csv(body: &str) -> Vec<Sample> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut samples = Vec::new();
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(_) => continue,
        };
        let timestamp = match record.get(1).and_then(parse_instant) {
            Some(t) => t,
            None => continue,
        };
        let level = record.get(2).and_then(parse_metric);
        let discharge = record.get(6).and_then(parse_metric);
        if discharge.is_none() && level.is_none() {
            continue;
        }
        samples.push(Sample {
            timestamp,
            discharge,
            level,
            source: DataSource::RealtimeHighRes,
        });
    }
    samples
}

/// Bucket instant readings by UTC calendar day and average each day.
///
/// Discharge averages are rounded to 2 decimals, level averages to 3, the
/// upstream archive's precision. Days where both averages are missing are
/// dropped. A day averaging to exactly 0.0 is a real reading and is kept.
pub fn daily_averages(samples: &[Sample]) -> Vec<Sample> {
    let mut by_day: BTreeMap<NaiveDate, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for sample in samples {
        let entry = by_day.entry(sample.timestamp.date_naive()).or_default();
        if let Some(discharge) = sample.discharge {
            entry.0.push(discharge);
        }
        if let Some(level) = sample.level {
            entry.1.push(level);
        }
    }

    by_day
        .into_iter()
        .filter_map(|(day, (discharges, levels))| {
            let discharge = mean(&discharges).map(round2);
            let level = mean(&levels).map(round3);
            if discharge.is_none() && level.is_none() {
                return None;
            }
            Some(Sample {
                timestamp: day_start_utc(day),
                discharge,
                level,
                source: DataSource::RealtimeDaily,
            })
        })
        .collect()
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn parse_metric(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("no data") {
        return None;
    }
    value.parse().ok()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Fetch raw 5-minute readings over a span.
#[cfg(feature = "api")]
pub async fn fetch_high_res(
    client: &Client,
    station: &StationId,
    span: &DateSpan,
) -> Result<Timeline> {
    let limit = ((span.num_days() + 1) * SAMPLES_PER_DAY).min(MAX_ITEMS);
    let url = realtime_items_url(station, span, limit);
    info!(
        "Fetching realtime readings for {} ({} to {})",
        station, span.start, span.end
    );
    let body = http_get_text(client, &url, DataSource::RealtimeHighRes).await?;
    let samples = parse_realtime_geojson(&body)?;
    if samples.is_empty() {
        return Err(WscError::NoData {
            feed: DataSource::RealtimeHighRes,
        });
    }
    Ok(Timeline::from_samples(samples))
}

/// Fetch realtime readings over a span and reduce them to daily averages.
#[cfg(feature = "api")]
pub async fn fetch_daily(
    client: &Client,
    station: &StationId,
    span: &DateSpan,
) -> Result<Timeline> {
    let limit = ((span.num_days() + 1) * SAMPLES_PER_DAY).min(MAX_ITEMS);
    let url = realtime_items_url(station, span, limit);
    info!(
        "Fetching realtime daily averages for {} ({} to {})",
        station, span.start, span.end
    );
    let body = http_get_text(client, &url, DataSource::RealtimeDaily).await?;
    let samples = parse_realtime_geojson(&body)?;
    let daily = daily_averages(&samples);
    if daily.is_empty() {
        return Err(WscError::NoData {
            feed: DataSource::RealtimeDaily,
        });
    }
    Ok(Timeline::from_samples(daily))
}

/// Most recent reading for a station: Datamart CSV first, realtime API as
/// fallback.
#[cfg(feature = "api")]
pub async fn fetch_latest(client: &Client, station: &StationId) -> Result<Sample> {
    match fetch_latest_from_datamart(client, station).await {
        Ok(sample) => Ok(sample),
        Err(e) => {
            warn!(
                "Datamart CSV gave no current reading for {}: {}, falling back to realtime API",
                station, e
            );
            fetch_latest_from_api(client, station).await
        }
    }
}

#[cfg(feature = "api")]
async fn fetch_latest_from_datamart(client: &Client, station: &StationId) -> Result<Sample> {
    let url = datamart_csv_url(station);
    info!("Fetching current conditions for {} from {}", station, url);
    let body = http_get_text(client, &url, DataSource::RealtimeHighRes).await?;
    let samples = parse_datamart_csv(&body);
    samples
        .into_iter()
        .rev()
        .find(|s| s.discharge.is_some())
        .ok_or(WscError::NoData {
            feed: DataSource::RealtimeHighRes,
        })
}

#[cfg(feature = "api")]
async fn fetch_latest_from_api(client: &Client, station: &StationId) -> Result<Sample> {
    let url = latest_realtime_url(station);
    let body = http_get_text(client, &url, DataSource::RealtimeHighRes).await?;
    let samples = parse_realtime_geojson(&body)?;
    samples.into_iter().next().ok_or(WscError::NoData {
        feed: DataSource::RealtimeHighRes,
    })
}
