//! One module per [`ChartCategory`](marketbrief_core::ChartCategory).
//!
//! Every renderer checks its data before touching the filesystem, so a chart
//! that is skipped never leaves a partial file behind.

pub(crate) mod comparison;
pub(crate) mod individual;
pub(crate) mod price_volume;
pub mod summary;

use std::path::Path;

use crate::{ChartJob, RenderError};

/// Draws `job` to `path`. Returns whether a placeholder was drawn.
pub(crate) fn draw(job: &ChartJob, path: &Path, dpi: u32) -> Result<bool, RenderError> {
    match job {
        ChartJob::Individual { series } => individual::render(path, dpi, series),
        ChartJob::Comparison { title, set, .. } => {
            comparison::render(path, dpi, title, set).map(|()| false)
        }
        ChartJob::PriceVolume { series } => price_volume::render(path, dpi, series).map(|()| false),
        ChartJob::Summary { title, panels, .. } => {
            summary::render(path, dpi, title, panels).map(|()| false)
        }
    }
}
