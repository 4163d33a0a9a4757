//! # Domain Models
//!
//! Per-run entities flowing through the pipeline. Every type validates its
//! invariants at construction and none is mutated once its stage completes.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SeriesId`] | Validated series identifier |
//! | [`DateRange`] | Inclusive day window |
//! | [`SeriesMetadata`] | Configured description of a series |
//! | [`DataPoint`] | Day-resolution observation |
//! | [`TimeSeries`] | Ordered, non-empty fetched series |
//! | [`NormalizedSeries`] | Cleaned or rescaled series for rendering |
//! | [`FetchResult`] | Available series or recorded failure |
//! | [`AggregateDataset`] | Request-ordered outcomes of one run |
//! | [`ChartArtifact`] | Rendered chart on disk |

mod artifact;
mod dataset;
mod day;
mod fetch;
mod identifier;
mod series;
mod timestamp;

pub use artifact::{ChartArtifact, ChartCategory};
pub use dataset::{AggregateDataset, DatasetEntry};
pub use day::{compact_day, day_format, format_day, parse_day, DateRange};
pub use fetch::{FailureReason, FetchFailure, FetchResult};
pub use identifier::SeriesId;
pub use series::{DataPoint, NormalizedSeries, SeriesMetadata, TimeSeries};
pub use timestamp::UtcDateTime;
