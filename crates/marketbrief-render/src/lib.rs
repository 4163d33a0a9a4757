//! # marketbrief render
//!
//! Turns normalized series into SVG chart artifacts.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`job`] | The four chart categories as render jobs |
//! | [`naming`] | Deterministic output file names |
//! | [`renderer`] | Parallel rendering pass and per-chart outcomes |
//! | [`charts`] | Drawing code per category |
//!
//! ```rust,no_run
//! use marketbrief_render::{ChartJob, RenderConfig, Renderer};
//! # fn jobs() -> Vec<ChartJob> { Vec::new() }
//!
//! let renderer = Renderer::new(RenderConfig::new("graphs", 100));
//! let outcomes = renderer.render_all(&jobs(), time::macros::date!(2024 - 05 - 01));
//! for outcome in outcomes {
//!     match outcome.result {
//!         Ok(artifact) => println!("{}", artifact.path.display()),
//!         Err(error) => eprintln!("skipped {}: {error}", outcome.title),
//!     }
//! }
//! ```

mod canvas;
pub mod charts;
pub mod error;
pub mod job;
pub mod naming;
pub mod renderer;

pub use charts::summary::grid_dimensions;
pub use error::RenderError;
pub use job::ChartJob;
pub use naming::{plan_paths, slugify};
pub use renderer::{RenderConfig, RenderOutcome, Renderer};
