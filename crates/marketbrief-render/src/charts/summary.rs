use std::path::Path;

use marketbrief_core::NormalizedSeries;
use plotters::prelude::*;

use crate::canvas::{color, draw_line_panel, Figure, PanelStyle, FONT};
use crate::RenderError;

/// Near-square grid: `cols = ceil(sqrt(n))`, `rows = ceil(n / cols)`.
pub fn grid_dimensions(panels: usize) -> (usize, usize) {
    if panels == 0 {
        return (0, 0);
    }
    let mut cols = 1;
    while cols * cols < panels {
        cols += 1;
    }
    (panels.div_ceil(cols), cols)
}

pub(crate) fn check(panels: &[NormalizedSeries]) -> Result<(), RenderError> {
    if panels.is_empty() {
        return Err(RenderError::insufficient("summary chart", "no series to lay out"));
    }
    Ok(())
}

/// One small panel per series on its own axis, laid out row-major.
pub(crate) fn render(
    path: &Path,
    dpi: u32,
    title: &str,
    panels: &[NormalizedSeries],
) -> Result<(), RenderError> {
    check(panels)?;
    let (rows, cols) = grid_dimensions(panels.len());

    let figure = Figure::new(15.0, 5.0 * rows as f64, dpi);
    let root = SVGBackend::new(path, figure.size()).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::backend)?;
    let root = root
        .titled(title, (FONT, figure.px(18.0)))
        .map_err(RenderError::backend)?;

    for (index, (area, series)) in root.split_evenly((rows, cols)).iter().zip(panels).enumerate() {
        draw_line_panel(
            area,
            &figure,
            series,
            &PanelStyle {
                caption: &series.metadata.display_name,
                caption_pt: 12.0,
                label_pt: 8.0,
                color: color(index),
                markers: false,
                y_desc: Some(&series.metadata.unit),
            },
        )?;
    }

    root.present().map_err(RenderError::backend)?;
    Ok(())
}
