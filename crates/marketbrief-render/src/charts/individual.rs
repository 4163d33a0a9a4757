use std::path::Path;

use marketbrief_core::NormalizedSeries;
use plotters::prelude::*;

use crate::canvas::{color, draw_line_panel, Figure, PanelStyle};
use crate::RenderError;

/// Line with markers for one series. Returns `true` when the series had no
/// values and a placeholder was drawn instead.
pub(crate) fn render(path: &Path, dpi: u32, series: &NormalizedSeries) -> Result<bool, RenderError> {
    let figure = Figure::new(12.0, 6.0, dpi);
    let root = SVGBackend::new(path, figure.size()).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::backend)?;

    let placeholder = series.values().next().is_none();
    let caption = if series.metadata.description.is_empty() {
        series.metadata.display_name.clone()
    } else {
        format!("{} ({})", series.metadata.display_name, series.metadata.description)
    };

    draw_line_panel(
        &root,
        &figure,
        series,
        &PanelStyle {
            caption: &caption,
            caption_pt: 16.0,
            label_pt: 10.0,
            color: color(0),
            markers: true,
            y_desc: Some(&series.metadata.unit),
        },
    )?;

    root.present().map_err(RenderError::backend)?;
    Ok(placeholder)
}
