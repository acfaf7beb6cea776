//! Historical feed: the hydrometric-daily-mean GeoJSON collection.
//!
//! Daily means are published with a lag of roughly a month behind the
//! realtime feeds, but reach back decades. Samples from here are stamped
//! at UTC midnight of their archive date.

use crate::error::{Result, WscError};
use crate::model::{day_start_utc, DataSource, Sample};
use crate::station::StationId;
use crate::window::DateSpan;
use chrono::NaiveDate;
use serde::Deserialize;

#[cfg(feature = "api")]
use crate::model::Timeline;
#[cfg(feature = "api")]
use crate::source::http_get_text;
#[cfg(feature = "api")]
use log::info;
#[cfg(feature = "api")]
use reqwest::Client;

/// Daily-mean GeoJSON collection (validated archive, ~1 month lag).
pub const DAILY_MEAN_ITEMS_URL: &str =
    "https://api.weather.gc.ca/collections/hydrometric-daily-mean/items";

/// Date format used by the archive for both query bounds and `DATE` values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: DailyMeanProperties,
}

#[derive(Debug, Deserialize)]
struct DailyMeanProperties {
    #[serde(rename = "DATE")]
    date: Option<String>,
    #[serde(rename = "DISCHARGE")]
    discharge: Option<f64>,
    #[serde(rename = "LEVEL")]
    level: Option<f64>,
}

/// Items URL for a date span, ascending by archive date.
pub fn daily_mean_items_url(station: &StationId, span: &DateSpan, limit: i64) -> String {
    format!(
        "{}?STATION_NUMBER={}&datetime={}/{}&limit={}&sortby=DATE&f=json",
        DAILY_MEAN_ITEMS_URL,
        station,
        span.start.format(DATE_FORMAT),
        span.end.format(DATE_FORMAT),
        limit
    )
}

/// Parse a daily-mean GeoJSON payload into midnight-stamped samples.
///
/// Features with an unparsable `DATE` or with neither discharge nor level
/// are skipped. The whole payload failing to decode is `SourceUnavailable`.
pub fn parse_daily_mean_geojson(body: &str) -> Result<Vec<Sample>> {
    let collection: FeatureCollection =
        serde_json::from_str(body).map_err(|e| WscError::SourceUnavailable {
            feed: DataSource::Historical,
            reason: format!("bad GeoJSON: {}", e),
        })?;

    let mut samples = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let props = feature.properties;
        let day = match props.date.as_deref().and_then(parse_day) {
            Some(d) => d,
            None => continue,
        };
        if props.discharge.is_none() && props.level.is_none() {
            continue;
        }
        samples.push(Sample {
            timestamp: day_start_utc(day),
            discharge: props.discharge,
            level: props.level,
            source: DataSource::Historical,
        });
    }
    Ok(samples)
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    // the archive sometimes stamps DATE with a midnight time suffix
    let day_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(day_part.trim(), DATE_FORMAT).ok()
}

/// Fetch archived daily means over a span.
#[cfg(feature = "api")]
pub async fn fetch_daily_mean(
    client: &Client,
    station: &StationId,
    span: &DateSpan,
) -> Result<Timeline> {
    // one item per day plus slack for the odd duplicate record
    let limit = span.num_days().clamp(1, 10_000) + 10;
    let url = daily_mean_items_url(station, span, limit);
    info!(
        "Fetching archived daily means for {} ({} to {})",
        station, span.start, span.end
    );
    let body = http_get_text(client, &url, DataSource::Historical).await?;
    let samples = parse_daily_mean_geojson(&body)?;
    if samples.is_empty() {
        return Err(WscError::NoData {
            feed: DataSource::Historical,
        });
    }
    Ok(Timeline::from_samples(samples))
}
