//! # marketbrief report
//!
//! Final stage of a run. [`ReportAssembler`] merges the fetched dataset with
//! the rendered charts into a [`Report`] and its text digest, and
//! [`Pipeline`] drives a whole run from a
//! [`PipelineConfig`](marketbrief_core::PipelineConfig).
//!
//! ```rust,no_run
//! use marketbrief_core::PipelineConfig;
//! use marketbrief_report::{DirectorySink, Pipeline, ReportSink};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_env()?;
//! let sink = DirectorySink::new(config.output_dir.clone());
//! let report = Pipeline::from_config(config).run().await?;
//! sink.deliver(&report)?;
//! print!("{}", report.digest);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod delivery;
pub mod digest;
pub mod movers;
pub mod pipeline;
pub mod report;

pub use assembler::{ReportAssembler, ReportInput};
pub use delivery::{DeliveryError, DeliveryReceipt, DirectorySink, ReportSink};
pub use movers::{scan as scan_movers, Mover, MoverSignal, MoverThresholds};
pub use pipeline::{Pipeline, PipelineError};
pub use report::{
    ComparisonNote, ExcludedArtifact, LatestValue, Report, SkippedChart, UnavailableSeries,
};
