use thiserror::Error;

/// Validation and contract errors exposed by `marketbrief-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("series identifier cannot be empty")]
    EmptyIdentifier,
    #[error("series identifier length {len} exceeds max {max}")]
    IdentifierTooLong { len: usize, max: usize },
    #[error("series identifier contains whitespace at index {index}")]
    IdentifierWhitespace { index: usize },

    #[error("invalid source kind '{value}', expected one of remote-indicator, remote-market, static")]
    InvalidSourceKind { value: String },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("date range start {start} is after end {end}")]
    InvertedDateRange { start: String, end: String },

    #[error("time series '{identifier}' must contain at least one point")]
    EmptySeries { identifier: String },
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
}

/// Configuration parsing errors. Each variant names the offending key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got '{value}'")]
    InvalidInteger { key: &'static str, value: String },
    #[error("{key} must be a number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be formatted as YYYY-MM-DD, got '{value}'")]
    InvalidDate { key: &'static str, value: String },
    #[error("{key} must look like '<requests>/<seconds>s', got '{value}'")]
    InvalidRateBudget { key: &'static str, value: String },
    #[error("{key} lists an invalid identifier: {source}")]
    InvalidIdentifier {
        key: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("{key} must be one of {expected}, got '{value}'")]
    InvalidChoice {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{key} must be greater than zero")]
    MustBePositive { key: &'static str },
}

/// Run-level aggregation failures. These are the only conditions that stop a
/// run before any fetch is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("no series were requested")]
    EmptyRequest,
    #[error("series '{identifier}' was requested more than once")]
    DuplicateIdentifier { identifier: String },
}
