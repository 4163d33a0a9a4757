use std::path::Path;

use marketbrief_core::ComparisonSet;
use plotters::prelude::*;

use crate::canvas::{color, date_label, segments, x_range, y_range, Figure, FONT};
use crate::RenderError;

/// Minimum members for an overlay to say anything.
pub(crate) const MIN_MEMBERS: usize = 2;

pub(crate) fn check(set: &ComparisonSet) -> Result<(), RenderError> {
    if set.members.len() < MIN_MEMBERS {
        let excluded = set
            .excluded
            .iter()
            .map(|exclusion| format!("{} ({})", exclusion.id, exclusion.reason))
            .collect::<Vec<_>>();
        let detail = if excluded.is_empty() {
            format!("{} eligible series, need {MIN_MEMBERS}", set.members.len())
        } else {
            format!(
                "{} eligible series, need {MIN_MEMBERS}; excluded: {}",
                set.members.len(),
                excluded.join(", ")
            )
        };
        return Err(RenderError::insufficient("comparison chart", detail));
    }
    Ok(())
}

/// Overlays rescaled members on one axis with a legend keyed by display name.
pub(crate) fn render(path: &Path, dpi: u32, title: &str, set: &ComparisonSet) -> Result<(), RenderError> {
    check(set)?;

    let figure = Figure::new(14.0, 8.0, dpi);
    let root = SVGBackend::new(path, figure.size()).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::backend)?;

    let runs: Vec<_> = set.members.iter().map(segments).collect();
    let all = || runs.iter().flatten().flatten();

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, figure.px(16.0)))
        .margin(figure.px(8.0))
        .x_label_area_size(figure.px(28.0))
        .y_label_area_size(figure.px(56.0))
        .build_cartesian_2d(x_range(all().map(|p| p.0)), y_range(all().map(|p| p.1)))
        .map_err(RenderError::backend)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .y_labels(8)
        .x_label_formatter(&date_label)
        .label_style((FONT, figure.px(10.0)))
        .light_line_style(BLACK.mix(0.08))
        .y_desc(set.mode_label.as_str())
        .draw()
        .map_err(RenderError::backend)?;

    let stroke = figure.px(1.5);
    let legend_len = figure.px(18.0) as i32;
    for (index, (member, member_runs)) in set.members.iter().zip(&runs).enumerate() {
        let line = color(index);
        for (run_index, run) in member_runs.iter().enumerate() {
            let anno = chart
                .draw_series(LineSeries::new(run.iter().copied(), line.stroke_width(stroke)))
                .map_err(RenderError::backend)?;
            if run_index == 0 {
                anno.label(member.metadata.display_name.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + legend_len, y)], line.stroke_width(stroke))
                });
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font((FONT, figure.px(10.0)))
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.3))
        .draw()
        .map_err(RenderError::backend)?;

    root.present().map_err(RenderError::backend)?;
    Ok(())
}
