use std::sync::Arc;

use serde::Deserialize;
use time::{Duration, OffsetDateTime, Time};
use tracing::debug;

use super::{classify_status, series_in_range};
use crate::data_source::{FetchFuture, SeriesSource};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{DataPoint, DateRange, SeriesMetadata, SourceError, SourceKind, TimeSeries};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const PROVIDER: &str = "yahoo";

/// Remote-market adapter for daily OHLCV from the Yahoo Finance chart API.
///
/// Non-trading days simply have no point; they are never reported as errors.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::default()))
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_chart(
        &self,
        metadata: &SeriesMetadata,
        range: DateRange,
    ) -> Result<TimeSeries, SourceError> {
        let period1 = OffsetDateTime::new_utc(range.start(), Time::MIDNIGHT).unix_timestamp();
        let period2 = OffsetDateTime::new_utc(range.end(), Time::MIDNIGHT).unix_timestamp()
            + Duration::DAY.whole_seconds();

        let endpoint = format!(
            "{}/{}",
            self.base_url,
            urlencoding::encode(&metadata.provider_code)
        );
        let request = HttpRequest::get(endpoint)
            .with_query("period1", period1.to_string())
            .with_query("period2", period2.to_string())
            .with_query("interval", "1d")
            .with_query("events", "history")
            .with_header("referer", "https://finance.yahoo.com/");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::transient(format!("yahoo transport error: {}", e.message())))?;

        let envelope = serde_json::from_str::<ChartEnvelope>(&response.body).ok();
        let chart = match (response.is_success(), envelope) {
            (_, Some(envelope)) => envelope.chart.into_outcome(),
            (true, None) => {
                return Err(SourceError::transient(
                    "yahoo returned a payload that is not a chart document",
                ))
            }
            (false, None) => return Err(classify_status(PROVIDER, response.status, "")),
        };

        let result = match chart {
            ChartOutcome::Data(result) => result,
            ChartOutcome::Error(error) => {
                let detail = format!("{}: {}", error.code, error.description);
                if error.code.eq_ignore_ascii_case("Not Found") {
                    return Err(SourceError::not_found(format!("yahoo: {detail}")));
                }
                let status = if response.is_success() { 404 } else { response.status };
                return Err(classify_status(PROVIDER, status, &detail));
            }
            ChartOutcome::Empty => {
                return Err(SourceError::not_found(format!(
                    "yahoo has no chart for '{}'",
                    metadata.provider_code
                )))
            }
        };

        debug!(
            series = %metadata.id,
            ticker = %metadata.provider_code,
            bars = result.timestamp.len(),
            "yahoo chart received"
        );

        series_in_range(metadata, result.into_points(), range)
    }
}

impl SeriesSource for YahooAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::RemoteMarket
    }

    fn fetch<'a>(&'a self, metadata: &'a SeriesMetadata, range: DateRange) -> FetchFuture<'a> {
        Box::pin(self.fetch_chart(metadata, range))
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

enum ChartOutcome {
    Data(ChartResult),
    Error(ChartError),
    Empty,
}

impl ChartBody {
    fn into_outcome(self) -> ChartOutcome {
        if let Some(error) = self.error {
            return ChartOutcome::Error(error);
        }
        match self.result.and_then(|results| results.into_iter().next()) {
            Some(result) => ChartOutcome::Data(result),
            None => ChartOutcome::Empty,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartResult {
    /// Bars are stamped at the session open in UTC; shifting by the exchange
    /// offset first keeps them on their local trading day.
    fn into_points(self) -> Vec<DataPoint> {
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let shifted = ts.checked_add(self.meta.gmtoffset)?;
                let local = OffsetDateTime::from_unix_timestamp(shifted).ok()?;
                let volume = at(&quote.volume, i)
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .map(|v| v.round() as u64);
                Some(
                    DataPoint::new(local.date(), at(&quote.close, i))
                        .with_range(at(&quote.high, i), at(&quote.low, i))
                        .with_volume(volume),
                )
            })
            .collect()
    }
}
