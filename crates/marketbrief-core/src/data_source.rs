//! Source adapter contract.
//!
//! Every provider implements [`SeriesSource`]. Adapters translate their
//! provider's payload into a [`TimeSeries`] at the boundary and report every
//! failure as a [`SourceError`]; the aggregator turns those into recorded
//! [`FetchResult`](crate::FetchResult) values.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{DateRange, FailureReason, SeriesMetadata, SourceKind, TimeSeries};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Auth,
    RateLimited,
    NotFound,
    Transient,
    Timeout,
}

/// Structured adapter failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Auth,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    /// Rate-limit failure raised locally once the max wait is exhausted.
    /// Waiting again would only repeat the same wait.
    pub fn rate_limit_wait_exceeded(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transient,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Auth => "source.auth",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Transient => "source.transient",
            SourceErrorKind::Timeout => "source.timeout",
        }
    }

    pub const fn reason(&self) -> FailureReason {
        match self.kind {
            SourceErrorKind::Auth => FailureReason::AuthError,
            SourceErrorKind::RateLimited => FailureReason::RateLimited,
            SourceErrorKind::NotFound => FailureReason::NotFound,
            SourceErrorKind::Transient => FailureReason::TransientError,
            SourceErrorKind::Timeout => FailureReason::Timeout,
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Boxed future returned by [`SeriesSource::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<TimeSeries, SourceError>> + Send + 'a>>;

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the aggregator shares one instance
/// per source kind across concurrent fetch tasks.
pub trait SeriesSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Fetches one series over `range`. A successful series is non-empty and
    /// only holds points inside `range`.
    fn fetch<'a>(&'a self, metadata: &'a SeriesMetadata, range: DateRange) -> FetchFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_reasons_line_up() {
        let cases = [
            (SourceError::auth("x"), "source.auth", FailureReason::AuthError, false),
            (SourceError::rate_limited("x"), "source.rate_limited", FailureReason::RateLimited, true),
            (SourceError::not_found("x"), "source.not_found", FailureReason::NotFound, false),
            (SourceError::transient("x"), "source.transient", FailureReason::TransientError, true),
            (SourceError::timeout("x"), "source.timeout", FailureReason::Timeout, false),
        ];

        for (error, code, reason, retryable) in cases {
            assert_eq!(error.code(), code);
            assert_eq!(error.reason(), reason);
            assert_eq!(error.retryable(), retryable);
        }
    }

    #[test]
    fn exhausted_rate_limit_wait_is_final() {
        let error = SourceError::rate_limit_wait_exceeded("waited 30s");
        assert_eq!(error.reason(), FailureReason::RateLimited);
        assert!(!error.retryable());
    }
}
