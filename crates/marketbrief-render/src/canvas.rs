//! Drawing helpers shared by every chart category.

use std::ops::Range;

use marketbrief_core::{format_day, NormalizedSeries};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use time::Date;

use crate::RenderError;

pub(crate) const FONT: &str = "sans-serif";

pub(crate) const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

pub(crate) fn color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Figure dimensions in inches, rendered at `dpi`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Figure {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl Figure {
    pub fn new(width_in: f64, height_in: f64, dpi: u32) -> Self {
        Self {
            width_in,
            height_in,
            dpi,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.inches(self.width_in), self.inches(self.height_in))
    }

    fn inches(&self, inches: f64) -> u32 {
        (inches * f64::from(self.dpi)).round().max(1.0) as u32
    }

    /// Typographic points to pixels.
    pub fn px(&self, points: f64) -> u32 {
        (points * f64::from(self.dpi) / 72.0).round().max(1.0) as u32
    }
}

/// Dates are plotted as Julian day numbers.
pub(crate) fn x_of(date: Date) -> f64 {
    f64::from(date.to_julian_day())
}

pub(crate) fn date_label(x: &f64) -> String {
    Date::from_julian_day(x.round() as i32)
        .map(format_day)
        .unwrap_or_default()
}

pub(crate) fn x_range(xs: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = bounds(xs);
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }
    min..max
}

/// Value range padded by 5% so extremes do not sit on the frame.
pub(crate) fn y_range(ys: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = bounds(ys);
    let span = max - min;
    if span == 0.0 {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
        return (min - pad)..(max + pad);
    }
    (min - span * 0.05)..(max + span * 0.05)
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min.is_finite() && max.is_finite() {
        (min, max)
    } else {
        (0.0, 0.0)
    }
}

/// Continuous runs of valued points. When gaps are preserved an absent value
/// ends the current run so the line breaks there.
pub(crate) fn segments(series: &NormalizedSeries) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for point in &series.points {
        match point.value {
            Some(value) => current.push((x_of(point.date), value)),
            None if series.gaps_preserved && !current.is_empty() => {
                runs.push(std::mem::take(&mut current));
            }
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Writes an explanatory label in place of a chart.
pub(crate) fn draw_placeholder<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    figure: &Figure,
    caption: &str,
    message: &str,
) -> Result<(), RenderError> {
    area.fill(&WHITE).map_err(RenderError::backend)?;
    let (width, height) = area.dim_in_pixel();
    let centre = (width as i32 / 2, height as i32 / 2);

    let caption_style = TextStyle::from((FONT, figure.px(14.0)).into_font())
        .pos(Pos::new(HPos::Center, VPos::Top));
    area.draw_text(caption, &caption_style, (centre.0, figure.px(8.0) as i32))
        .map_err(RenderError::backend)?;

    let muted = BLACK.mix(0.6);
    let message_style = TextStyle::from((FONT, figure.px(12.0)).into_font())
        .color(&muted)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw_text(message, &message_style, centre)
        .map_err(RenderError::backend)
}

/// Options for [`draw_line_panel`].
pub(crate) struct PanelStyle<'a> {
    pub caption: &'a str,
    pub caption_pt: f64,
    pub label_pt: f64,
    pub color: RGBColor,
    pub markers: bool,
    pub y_desc: Option<&'a str>,
}

/// Line chart of one series on its own scale with a grid. An empty series
/// becomes a labelled placeholder.
pub(crate) fn draw_line_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    figure: &Figure,
    series: &NormalizedSeries,
    style: &PanelStyle<'_>,
) -> Result<(), RenderError> {
    let runs = segments(series);
    if runs.is_empty() {
        return draw_placeholder(area, figure, style.caption, "No data available for this period");
    }

    let all = || runs.iter().flatten();
    let mut chart = ChartBuilder::on(area)
        .caption(style.caption, (FONT, figure.px(style.caption_pt)))
        .margin(figure.px(6.0))
        .x_label_area_size(figure.px(style.label_pt * 2.5))
        .y_label_area_size(figure.px(style.label_pt * 5.0))
        .build_cartesian_2d(x_range(all().map(|p| p.0)), y_range(all().map(|p| p.1)))
        .map_err(RenderError::backend)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_labels(5)
        .y_labels(6)
        .x_label_formatter(&date_label)
        .label_style((FONT, figure.px(style.label_pt)))
        .light_line_style(BLACK.mix(0.08));
    if let Some(desc) = style.y_desc.filter(|desc| !desc.is_empty()) {
        mesh.y_desc(desc);
    }
    mesh.draw().map_err(RenderError::backend)?;

    let stroke = figure.px(1.5);
    for run in &runs {
        chart
            .draw_series(LineSeries::new(run.iter().copied(), style.color.stroke_width(stroke)))
            .map_err(RenderError::backend)?;
    }

    if style.markers {
        let radius = figure.px(2.5);
        chart
            .draw_series(
                all().map(|&(x, y)| Circle::new((x, y), radius, style.color.filled())),
            )
            .map_err(RenderError::backend)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use marketbrief_core::{DataPoint, SeriesId, SeriesMetadata, SourceKind};
    use time::macros::date;

    use super::*;

    #[test]
    fn figure_scales_with_dpi() {
        let figure = Figure::new(12.0, 6.0, 100);
        assert_eq!(figure.size(), (1200, 600));
        assert_eq!(figure.px(72.0), 100);
    }

    #[test]
    fn ranges_pad_flat_and_empty_inputs() {
        assert_eq!(y_range([5.0, 5.0].into_iter()), 4.75..5.25);
        assert_eq!(y_range(std::iter::empty()), -1.0..1.0);
        assert_eq!(x_range([10.0].into_iter()), 9.0..11.0);
    }

    #[test]
    fn date_labels_round_trip_julian_days() {
        assert_eq!(date_label(&x_of(date!(2024 - 02 - 29))), "2024-02-29");
    }

    #[test]
    fn preserved_gaps_split_runs() {
        let mut series = NormalizedSeries::empty(SeriesMetadata::new(
            SeriesId::parse("^GSPC").expect("id"),
            "S&P 500",
            SourceKind::RemoteMarket,
        ));
        series.points = vec![
            DataPoint::new(date!(2024 - 01 - 02), Some(1.0)),
            DataPoint::new(date!(2024 - 01 - 03), None),
            DataPoint::new(date!(2024 - 01 - 04), Some(2.0)),
        ];

        assert_eq!(segments(&series).len(), 1);
        series.gaps_preserved = true;
        assert_eq!(segments(&series).len(), 2);
    }
}
