//! The source abstraction the reconciliation layer works against, plus the
//! native HTTP client that implements it over the live WSC endpoints.

use crate::error::Result;
use crate::model::{DataSource, Sample, Timeline};
use crate::station::StationId;
use crate::window::DateSpan;
use async_trait::async_trait;

#[cfg(feature = "api")]
use crate::error::WscError;
#[cfg(feature = "api")]
use crate::{historical, realtime};
#[cfg(feature = "api")]
use reqwest::{Client, StatusCode};
#[cfg(feature = "api")]
use std::time::Duration;

/// One fetch against one feed: which series, over which days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRequest {
    pub source: DataSource,
    pub span: DateSpan,
}

/// A provider of hydrometric series.
///
/// The live implementation is [`WscClient`]; tests substitute canned
/// providers.
#[async_trait]
pub trait HydrometricSource: Send + Sync {
    /// Fetch one series over a span of days.
    async fn fetch(&self, station: &StationId, request: SourceRequest) -> Result<Timeline>;

    /// Most recent reading for a station.
    async fn latest(&self, station: &StationId) -> Result<Sample>;
}

/// Per-request timeout for all WSC endpoints.
#[cfg(feature = "api")]
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client over the live WSC endpoints.
///
/// Requests time out after [`REQUEST_TIMEOUT`] and are never retried
/// automatically; callers decide whether a failure is worth repeating.
#[cfg(feature = "api")]
#[derive(Debug, Clone)]
pub struct WscClient {
    client: Client,
}

#[cfg(feature = "api")]
impl WscClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Wrap an externally configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "api")]
impl Default for WscClient {
    fn default() -> Self {
        Self::new()
    }
}

/// GET a URL and hand back the body, mapping transport and status failures
/// to `SourceUnavailable` tagged with the feed being queried.
#[cfg(feature = "api")]
pub(crate) async fn http_get_text(
    client: &Client,
    url: &str,
    feed: DataSource,
) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| WscError::SourceUnavailable {
            feed,
            reason: e.to_string(),
        })?;
    if response.status() != StatusCode::OK {
        return Err(WscError::SourceUnavailable {
            feed,
            reason: format!("status {}", response.status()),
        });
    }
    response
        .text()
        .await
        .map_err(|e| WscError::SourceUnavailable {
            feed,
            reason: e.to_string(),
        })
}

#[cfg(feature = "api")]
#[async_trait]
impl HydrometricSource for WscClient {
    async fn fetch(&self, station: &StationId, request: SourceRequest) -> Result<Timeline> {
        match request.source {
            DataSource::RealtimeHighRes => {
                realtime::fetch_high_res(&self.client, station, &request.span).await
            }
            DataSource::RealtimeDaily => {
                realtime::fetch_daily(&self.client, station, &request.span).await
            }
            DataSource::Historical => {
                historical::fetch_daily_mean(&self.client, station, &request.span).await
            }
        }
    }

    async fn latest(&self, station: &StationId) -> Result<Sample> {
        realtime::fetch_latest(&self.client, station).await
    }
}

#[cfg(all(test, feature = "api"))]
mod test {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    #[ignore]
    async fn test_latest_live() {
        let client = WscClient::new();
        let station = StationId::new("08NA011").unwrap();
        let sample = client.latest(&station).await.unwrap();
        assert!(sample.discharge.is_some());
        assert!(sample.timestamp <= Utc::now());
    }
}
