use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::{classify_status, series_in_range};
use crate::data_source::{FetchFuture, SeriesSource};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{format_day, parse_day, DataPoint, DateRange, SeriesMetadata, SourceError, SourceKind, TimeSeries};

const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const PROVIDER: &str = "fred";

/// Remote-indicator adapter for the FRED observations API.
#[derive(Clone)]
pub struct FredAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: Option<String>,
    base_url: String,
}

impl FredAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::default()), api_key)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_observations(
        &self,
        metadata: &SeriesMetadata,
        range: DateRange,
    ) -> Result<TimeSeries, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::auth("FRED API key is not configured"));
        };

        let request = HttpRequest::get(&self.base_url)
            .with_query("series_id", &metadata.provider_code)
            .with_query("api_key", api_key)
            .with_query("file_type", "json")
            .with_query("observation_start", format_day(range.start()))
            .with_query("observation_end", format_day(range.end()));

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::transient(format!("fred transport error: {}", e.message())))?;

        let payload = serde_json::from_str::<FredPayload>(&response.body).ok();
        if !response.is_success() {
            let detail = match &payload {
                Some(FredPayload::Error { error_message, .. }) => error_message.as_str(),
                _ => "",
            };
            return Err(classify_fred_error(response.status, detail));
        }

        let observations = match payload {
            Some(FredPayload::Observations { observations }) => observations,
            Some(FredPayload::Error {
                error_code,
                error_message,
            }) => return Err(classify_fred_error(error_code, &error_message)),
            None => {
                return Err(SourceError::transient(
                    "fred returned a payload that is not an observations document",
                ))
            }
        };

        debug!(
            series = %metadata.id,
            code = %metadata.provider_code,
            observations = observations.len(),
            "fred observations received"
        );

        let points = observations
            .into_iter()
            .filter_map(|observation| observation.into_point())
            .collect();
        series_in_range(metadata, points, range)
    }
}

impl SeriesSource for FredAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::RemoteIndicator
    }

    fn fetch<'a>(&'a self, metadata: &'a SeriesMetadata, range: DateRange) -> FetchFuture<'a> {
        Box::pin(self.fetch_observations(metadata, range))
    }
}

/// FRED reports bad keys and unknown series as 400 with a message.
fn classify_fred_error(status: u16, message: &str) -> SourceError {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("api_key") || lowered.contains("api key") {
        return SourceError::auth(format!("fred rejected the API key: {message}"));
    }
    if lowered.contains("does not exist") {
        return SourceError::not_found(format!("fred: {message}"));
    }
    classify_status(PROVIDER, status, message)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FredPayload {
    Observations {
        observations: Vec<FredObservation>,
    },
    Error {
        error_code: u16,
        error_message: String,
    },
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

impl FredObservation {
    /// `"."` marks a missing observation.
    fn into_point(self) -> Option<DataPoint> {
        let date = parse_day(&self.date).ok()?;
        let value = match self.value.trim() {
            "." | "" => None,
            raw => raw.parse::<f64>().ok(),
        };
        Some(DataPoint::new(date, value))
    }
}
