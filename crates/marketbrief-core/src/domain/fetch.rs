use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{SourceKind, TimeSeries};

/// Why a series could not be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    AuthError,
    RateLimited,
    NotFound,
    TransientError,
    Timeout,
}

impl FailureReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthError => "AuthError",
            Self::RateLimited => "RateLimited",
            Self::NotFound => "NotFound",
            Self::TransientError => "TransientError",
            Self::Timeout => "Timeout",
        }
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded failure for one requested series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub reason: FailureReason,
    pub source: SourceKind,
    pub message: String,
    pub attempts: u32,
}

impl FetchFailure {
    pub fn new(reason: FailureReason, source: SourceKind, message: impl Into<String>) -> Self {
        Self {
            reason,
            source,
            message: message.into(),
            attempts: 0,
        }
    }

    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

impl Display for FetchFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} from {}: {}", self.reason, self.source, self.message)
    }
}

/// Outcome of fetching one series. Exactly one per requested identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResult {
    Available { series: TimeSeries },
    Failed { failure: FetchFailure },
}

impl FetchResult {
    pub fn available(series: TimeSeries) -> Self {
        Self::Available { series }
    }

    pub fn failed(failure: FetchFailure) -> Self {
        Self::Failed { failure }
    }

    pub fn series(&self) -> Option<&TimeSeries> {
        match self {
            Self::Available { series } => Some(series),
            Self::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Available { .. } => None,
            Self::Failed { failure } => Some(failure),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}
