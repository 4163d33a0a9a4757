//! # marketbrief core
//!
//! Data collection half of the marketbrief pipeline: domain types, provider
//! adapters, the shared rate limiter, the aggregator and the normalizer.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | FRED, Yahoo chart and static dataset adapters |
//! | [`aggregator`] | Concurrent, order-preserving fan-out of series requests |
//! | [`catalog`] | Built-in series metadata |
//! | [`config`] | Immutable run configuration |
//! | [`data_source`] | Adapter contract and `SourceError` |
//! | [`domain`] | Series, results, datasets, artifacts |
//! | [`error`] | Validation, config and aggregation errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Cleaning and comparison scaling |
//! | [`rate_limit`] | Per-source-kind request budgets |
//! | [`retry`] | Backoff policy |
//! | [`source`] | Source kinds |
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use marketbrief_core::{
//!     Aggregator, FredAdapter, PipelineConfig, RequestGroup, SeriesCatalog, SeriesRequest,
//! };
//!
//! let config = PipelineConfig::from_env()?;
//! let catalog = SeriesCatalog::builtin();
//! let fred = Arc::new(FredAdapter::new(config.fred_api_key.as_ref().map(|k| k.expose().to_owned())));
//! let aggregator = Aggregator::from_config(&config, vec![fred]);
//! let end = config.report_date_or_today();
//! let requests = config
//!     .indicators
//!     .iter()
//!     .map(|id| SeriesRequest::new(catalog.resolve(id, RequestGroup::Indicators), config.economic_range(end)))
//!     .collect();
//! let dataset = aggregator.collect(requests).await?;
//! ```

pub mod adapters;
pub mod aggregator;
pub mod catalog;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod rate_limit;
pub mod retry;
pub mod source;

pub use adapters::{FredAdapter, StaticAdapter, StaticDataset, StaticFrequency, YahooAdapter};
pub use aggregator::{Aggregator, SeriesRequest};
pub use catalog::{RequestGroup, SeriesCatalog};
pub use config::{ApiKey, PipelineConfig};
pub use data_source::{FetchFuture, SeriesSource, SourceError, SourceErrorKind};
pub use domain::*;
pub use error::{AggregateError, ConfigError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use normalize::{
    clean, compare, rebase, scale, ComparisonSet, Exclusion, ExclusionReason, GapPolicy, ScaleMode,
    DEFAULT_BASELINE,
};
pub use rate_limit::{Permit, RateBudget, RateLimiter};
pub use retry::{Backoff, RetryPolicy};
pub use source::SourceKind;
