use std::path::Path;

use marketbrief_core::NormalizedSeries;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::canvas::{color, date_label, segments, x_of, x_range, y_range, Figure, FONT};
use crate::RenderError;

pub(crate) fn check(series: &NormalizedSeries) -> Result<(), RenderError> {
    if series.values().next().is_none() {
        return Err(RenderError::insufficient(
            "price/volume chart",
            format!("'{}' has no closing values", series.id()),
        ));
    }
    Ok(())
}

/// Close line (with a high/low band when present) over volume bars sharing
/// the date axis. Without volume the price panel takes the whole figure.
pub(crate) fn render(path: &Path, dpi: u32, series: &NormalizedSeries) -> Result<(), RenderError> {
    check(series)?;

    let figure = Figure::new(12.0, 8.0, dpi);
    let root = SVGBackend::new(path, figure.size()).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::backend)?;

    let caption = format!("{} price and volume", series.metadata.display_name);
    let root = root
        .titled(&caption, (FONT, figure.px(16.0)))
        .map_err(RenderError::backend)?;

    let xs = || series.points.iter().map(|point| x_of(point.date));
    let x_axis = x_range(xs());

    if series.has_volume() {
        let (_, height) = root.dim_in_pixel();
        let (upper, lower) = root.split_vertically((f64::from(height) * 0.7) as u32);
        draw_price(&upper, &figure, series, x_axis.clone(), false)?;
        draw_volume(&lower, &figure, series, x_axis)?;
    } else {
        draw_price(&root, &figure, series, x_axis, true)?;
    }

    root.present().map_err(RenderError::backend)?;
    Ok(())
}

fn draw_price<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    figure: &Figure,
    series: &NormalizedSeries,
    x_axis: std::ops::Range<f64>,
    show_dates: bool,
) -> Result<(), RenderError> {
    let band: Vec<(f64, f64, f64)> = series
        .points
        .iter()
        .filter_map(|p| Some((x_of(p.date), p.high?, p.low?)))
        .collect();
    let values = series.values().map(|(_, v)| v);
    let extremes = band.iter().flat_map(|&(_, high, low)| [high, low]);

    let mut chart = ChartBuilder::on(area)
        .margin(figure.px(6.0))
        .x_label_area_size(figure.px(if show_dates { 28.0 } else { 4.0 }))
        .y_label_area_size(figure.px(56.0))
        .build_cartesian_2d(x_axis, y_range(values.chain(extremes)))
        .map_err(RenderError::backend)?;

    chart
        .configure_mesh()
        .x_labels(if show_dates { 6 } else { 0 })
        .y_labels(6)
        .x_label_formatter(&date_label)
        .label_style((FONT, figure.px(10.0)))
        .light_line_style(BLACK.mix(0.08))
        .y_desc(series.metadata.unit.as_str())
        .draw()
        .map_err(RenderError::backend)?;

    let line = color(0);
    if band.len() >= 2 {
        let outline: Vec<(f64, f64)> = band
            .iter()
            .map(|&(x, high, _)| (x, high))
            .chain(band.iter().rev().map(|&(x, _, low)| (x, low)))
            .collect();
        chart
            .draw_series(std::iter::once(Polygon::new(outline, line.mix(0.18).filled())))
            .map_err(RenderError::backend)?;
    }

    for run in segments(series) {
        chart
            .draw_series(LineSeries::new(run, line.stroke_width(figure.px(1.5))))
            .map_err(RenderError::backend)?;
    }
    Ok(())
}

fn draw_volume<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    figure: &Figure,
    series: &NormalizedSeries,
    x_axis: std::ops::Range<f64>,
) -> Result<(), RenderError> {
    let bars: Vec<(f64, f64)> = series
        .points
        .iter()
        .filter_map(|p| p.volume.map(|v| (x_of(p.date), v as f64)))
        .collect();
    let top = bars.iter().map(|&(_, v)| v).fold(0.0, f64::max).max(1.0) * 1.1;

    let mut chart = ChartBuilder::on(area)
        .margin(figure.px(6.0))
        .x_label_area_size(figure.px(28.0))
        .y_label_area_size(figure.px(56.0))
        .build_cartesian_2d(x_axis, 0.0..top)
        .map_err(RenderError::backend)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .y_labels(4)
        .x_label_formatter(&date_label)
        .y_label_formatter(&compact_volume)
        .label_style((FONT, figure.px(10.0)))
        .light_line_style(BLACK.mix(0.08))
        .y_desc("Volume")
        .draw()
        .map_err(RenderError::backend)?;

    let fill = color(7).mix(0.7).filled();
    chart
        .draw_series(
            bars.iter()
                .map(|&(x, v)| Rectangle::new([(x - 0.4, 0.0), (x + 0.4, v)], fill)),
        )
        .map_err(RenderError::backend)?;
    Ok(())
}

fn compact_volume(value: &f64) -> String {
    let v = value.abs();
    if v >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if v >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if v >= 1e3 {
        format!("{:.0}K", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}
