//! Plain-text digest accompanying the charts.

use marketbrief_core::format_day;

use crate::Report;

const INDENT: &str = "  ";

/// Renders every section of `report` except the digest itself. The latest
/// values and unavailable sections are always present so a reader can tell
/// an empty section from a missing one.
pub fn compose(report: &Report) -> String {
    let mut lines = vec![
        format!("Market brief for {}", format_day(report.report_date)),
        format!(
            "Run {} generated {}",
            report.run_id,
            report.generated_at.format_rfc3339()
        ),
    ];

    section(&mut lines, "Latest values", true, report.latest.iter().map(|latest| {
        let value = match latest.value {
            Some(value) if latest.unit.is_empty() => format!("{value:.2}"),
            Some(value) => format!("{value:.2} {}", latest.unit),
            None => String::from("no value reported"),
        };
        format!(
            "{} ({}): {value} as of {}",
            latest.display_name,
            latest.id,
            format_day(latest.as_of)
        )
    }));

    section(&mut lines, "Unavailable", true, report.unavailable.iter().map(|series| {
        format!(
            "{} ({}): {} from {} after {} attempt(s): {}",
            series.display_name, series.id, series.reason, series.source, series.attempts, series.message
        )
    }));

    section(&mut lines, "Notable movers", false, report.movers.iter().map(|mover| {
        let signals = mover
            .signals
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        format!("{} ({}): {signals} on {}", mover.display_name, mover.id, format_day(mover.as_of))
    }));

    section(&mut lines, "Charts", false, report.artifacts.iter().map(|artifact| {
        let note = if artifact.placeholder { " [placeholder]" } else { "" };
        format!("{}: {}{note} -> {}", artifact.category, artifact.title, artifact.path.display())
    }));

    section(
        &mut lines,
        "Charts not attached",
        false,
        report.excluded_artifacts.iter().map(|excluded| {
            format!(
                "{}: {} bytes exceeds the {} byte attachment limit ({})",
                excluded.title,
                excluded.size_bytes,
                excluded.limit_bytes,
                excluded.path.display()
            )
        }),
    );

    section(&mut lines, "Charts skipped", false, report.skipped_charts.iter().map(|skipped| {
        format!("{}: {}: {}", skipped.category, skipped.title, skipped.reason)
    }));

    section(
        &mut lines,
        "Left out of comparisons",
        false,
        report.comparison_notes.iter().map(|note| {
            format!("{}: {} ({}): {}", note.chart, note.display_name, note.id, note.reason)
        }),
    );

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn section(
    lines: &mut Vec<String>,
    heading: &str,
    always: bool,
    items: impl Iterator<Item = String>,
) {
    let items: Vec<String> = items.collect();
    if items.is_empty() && !always {
        return;
    }

    lines.push(String::new());
    lines.push(heading.to_owned());
    if items.is_empty() {
        lines.push(format!("{INDENT}(none)"));
    }
    lines.extend(items.into_iter().map(|item| format!("{INDENT}{item}")));
}
