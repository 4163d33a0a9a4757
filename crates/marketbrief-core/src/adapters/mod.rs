//! Provider adapters.
//!
//! | Adapter | Source kind | Provider |
//! |---------|-------------|----------|
//! | [`FredAdapter`] | remote-indicator | FRED `series/observations` |
//! | [`YahooAdapter`] | remote-market | Yahoo Finance v8 chart |
//! | [`StaticAdapter`] | static | built-in and registered datasets |

mod fred;
mod static_data;
mod yahoo;

pub use fred::FredAdapter;
pub use static_data::{StaticAdapter, StaticDataset, StaticFrequency};
pub use yahoo::YahooAdapter;

use crate::{DataPoint, DateRange, SeriesMetadata, SourceError, TimeSeries};

/// Keeps points inside `range` and builds the series. A fetch that produced
/// nothing in range is reported as not found.
pub(crate) fn series_in_range(
    metadata: &SeriesMetadata,
    points: Vec<DataPoint>,
    range: DateRange,
) -> Result<TimeSeries, SourceError> {
    let points: Vec<_> = points
        .into_iter()
        .filter(|point| range.contains(point.date))
        .collect();

    if points.is_empty() {
        return Err(SourceError::not_found(format!(
            "no observations for '{}' in {range}",
            metadata.provider_code
        )));
    }

    TimeSeries::new(metadata.clone(), points)
        .map_err(|e| SourceError::not_found(e.to_string()))
}

/// Common HTTP status classification for remote providers.
pub(crate) fn classify_status(provider: &str, status: u16, detail: &str) -> SourceError {
    let message = if detail.is_empty() {
        format!("{provider} returned status {status}")
    } else {
        format!("{provider} returned status {status}: {detail}")
    };

    match status {
        401 | 403 => SourceError::auth(message),
        429 => SourceError::rate_limited(message),
        408 | 500..=599 => SourceError::transient(message),
        _ => SourceError::not_found(message),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

    /// Returns canned responses in order and records every request.
    pub struct CannedHttpClient {
        responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
        pub requests: Mutex<Vec<HttpRequest>>,
    }

    impl CannedHttpClient {
        pub fn new(mut responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().expect("requests lock").len()
        }
    }

    impl HttpClient for CannedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests.lock().expect("requests lock").push(request);
            let next = self
                .responses
                .lock()
                .expect("responses lock")
                .pop()
                .unwrap_or_else(|| Err(HttpError::new("no canned response left")));
            Box::pin(async move { next })
        }
    }
}
