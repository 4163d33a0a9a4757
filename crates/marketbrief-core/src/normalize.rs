//! Series cleaning and cross-series scaling.
//!
//! Nothing here blocks or fails the run: a series that cannot be scaled is
//! listed as an [`Exclusion`] of the group it was asked to join.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::{DataPoint, NormalizedSeries, SeriesId, TimeSeries, ValidationError};

/// Baseline used by comparison charts.
pub const DEFAULT_BASELINE: f64 = 100.0;

/// Sorts by date and keeps the last-seen point for a repeated date.
pub fn order_points(mut points: Vec<DataPoint>) -> Vec<DataPoint> {
    points.sort_by_key(|point| point.date);
    let mut ordered: Vec<DataPoint> = Vec::with_capacity(points.len());
    for point in points {
        match ordered.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => ordered.push(point),
        }
    }
    ordered
}

/// Treatment of points without a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
    #[default]
    Drop,
    /// Keep absent values so renderers can break the line.
    Preserve,
}

impl GapPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Preserve => "preserve",
        }
    }
}

impl FromStr for GapPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "preserve" => Ok(Self::Preserve),
            other => Err(format!("unknown gap policy '{other}'")),
        }
    }
}

/// Single-series pass: re-sort, dedup and apply the gap policy.
pub fn clean(series: &TimeSeries, policy: GapPolicy) -> NormalizedSeries {
    let ordered = order_points(series.points().to_vec());
    let points = match policy {
        GapPolicy::Drop => ordered
            .into_iter()
            .filter(|point| point.value.is_some())
            .collect(),
        GapPolicy::Preserve => ordered,
    };

    NormalizedSeries {
        metadata: series.metadata().clone(),
        points,
        gaps_preserved: policy == GapPolicy::Preserve,
    }
}

/// Value transformation applied per series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleMode {
    /// First valued point maps to the baseline; later points keep their ratio to it.
    Rebase(f64),
    /// `(v - min) / (max - min)`, onto 0..=1.
    MinMax,
    /// Percent change from the first valued point.
    PercentChange,
}

impl ScaleMode {
    pub fn unit_label(self) -> String {
        match self {
            Self::Rebase(baseline) => format!("index (first = {baseline})"),
            Self::MinMax => String::from("scaled 0-1"),
            Self::PercentChange => String::from("% change"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    TooFewPoints { valued: usize },
    ZeroBaseline,
    FlatRange,
}

impl Display for ExclusionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewPoints { valued } => {
                write!(f, "needs at least 2 points with a value, has {valued}")
            }
            Self::ZeroBaseline => f.write_str("first value is zero"),
            Self::FlatRange => f.write_str("all values are equal"),
        }
    }
}

/// A series left out of one comparison group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exclusion {
    pub id: SeriesId,
    pub display_name: String,
    pub reason: ExclusionReason,
}

/// Result of scaling a group: eligible members in input order plus the
/// series that were left out and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSet {
    pub mode_label: String,
    pub members: Vec<NormalizedSeries>,
    pub excluded: Vec<Exclusion>,
}

impl ComparisonSet {
    pub fn member_ids(&self) -> Vec<SeriesId> {
        self.members.iter().map(|member| member.id().clone()).collect()
    }
}

/// Scales one series. Absent values stay absent.
pub fn scale(series: &NormalizedSeries, mode: ScaleMode) -> Result<NormalizedSeries, ExclusionReason> {
    let values: Vec<f64> = series.values().map(|(_, value)| value).collect();
    if values.len() < 2 {
        return Err(ExclusionReason::TooFewPoints {
            valued: values.len(),
        });
    }

    let first = values[0];
    let transform: Box<dyn Fn(f64) -> f64> = match mode {
        ScaleMode::Rebase(baseline) => {
            if first == 0.0 {
                return Err(ExclusionReason::ZeroBaseline);
            }
            Box::new(move |value| baseline * value / first)
        }
        ScaleMode::PercentChange => {
            if first == 0.0 {
                return Err(ExclusionReason::ZeroBaseline);
            }
            Box::new(move |value| (value - first) / first.abs() * 100.0)
        }
        ScaleMode::MinMax => {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let span = max - min;
            if span == 0.0 {
                return Err(ExclusionReason::FlatRange);
            }
            Box::new(move |value| (value - min) / span)
        }
    };

    let points = series
        .points
        .iter()
        .map(|point| DataPoint {
            value: point.value.map(&transform),
            high: point.high.map(&transform),
            low: point.low.map(&transform),
            ..*point
        })
        .collect();

    Ok(NormalizedSeries {
        metadata: series.metadata.clone(),
        points,
        gaps_preserved: series.gaps_preserved,
    })
}

/// Scales every series of a group independently, keeping input order.
pub fn compare(group: &[NormalizedSeries], mode: ScaleMode) -> ComparisonSet {
    let mut members = Vec::with_capacity(group.len());
    let mut excluded = Vec::new();

    for series in group {
        match scale(series, mode) {
            Ok(scaled) => members.push(scaled),
            Err(reason) => excluded.push(Exclusion {
                id: series.id().clone(),
                display_name: series.metadata.display_name.clone(),
                reason,
            }),
        }
    }

    ComparisonSet {
        mode_label: mode.unit_label(),
        members,
        excluded,
    }
}

/// Baseline normalization for comparison charts.
pub fn rebase(group: &[NormalizedSeries], baseline: f64) -> Result<ComparisonSet, ValidationError> {
    if !baseline.is_finite() || baseline == 0.0 {
        return Err(ValidationError::NonFiniteValue { field: "baseline" });
    }
    Ok(compare(group, ScaleMode::Rebase(baseline)))
}

#[cfg(test)]
mod tests {
    use time::macros::date;
    use time::Date;

    use super::*;
    use crate::{SeriesMetadata, SourceKind};

    fn series(id: &str, points: &[(Date, Option<f64>)]) -> TimeSeries {
        TimeSeries::new(
            SeriesMetadata::new(SeriesId::parse(id).expect("id"), id, SourceKind::RemoteIndicator),
            points.iter().map(|(d, v)| DataPoint::new(*d, *v)).collect(),
        )
        .expect("series")
    }

    #[test]
    fn clean_drops_gaps_unless_preserved() {
        let raw = series(
            "UNRATE",
            &[
                (date!(2024 - 02 - 01), None),
                (date!(2024 - 01 - 01), Some(3.7)),
                (date!(2024 - 03 - 01), Some(3.9)),
            ],
        );

        let dropped = clean(&raw, GapPolicy::Drop);
        let kept = clean(&raw, GapPolicy::Preserve);

        assert_eq!(dropped.points.len(), 2);
        assert_eq!(kept.points.len(), 3);
        assert!(kept.gaps_preserved);
        assert_eq!(kept.points[0].date, date!(2024 - 01 - 01));
    }

    #[test]
    fn rebase_maps_first_value_to_baseline_and_keeps_ratios() {
        let gdp = clean(
            &series(
                "GDP",
                &[
                    (date!(2024 - 01 - 01), Some(250.0)),
                    (date!(2024 - 04 - 01), Some(275.0)),
                    (date!(2024 - 07 - 01), Some(200.0)),
                ],
            ),
            GapPolicy::Drop,
        );

        let set = rebase(&[gdp], 100.0).expect("valid baseline");
        let values: Vec<f64> = set.members[0].values().map(|(_, v)| v).collect();

        assert_eq!(values[0], 100.0);
        assert!((values[1] - 110.0).abs() < 1e-9);
        assert!((values[2] - 80.0).abs() < 1e-9);
    }

    #[test]
    fn short_and_zero_based_series_are_excluded_with_reason() {
        let single = clean(&series("ONE", &[(date!(2024 - 01 - 01), Some(1.0))]), GapPolicy::Drop);
        let zero = clean(
            &series(
                "ZERO",
                &[(date!(2024 - 01 - 01), Some(0.0)), (date!(2024 - 02 - 01), Some(1.0))],
            ),
            GapPolicy::Drop,
        );

        let set = rebase(&[single, zero], DEFAULT_BASELINE).expect("valid baseline");

        assert!(set.members.is_empty());
        assert_eq!(set.excluded[0].reason, ExclusionReason::TooFewPoints { valued: 1 });
        assert_eq!(set.excluded[1].reason, ExclusionReason::ZeroBaseline);
    }

    #[test]
    fn min_max_and_percent_change() {
        let cpi = clean(
            &series(
                "CPI",
                &[
                    (date!(2024 - 01 - 01), Some(200.0)),
                    (date!(2024 - 02 - 01), Some(300.0)),
                    (date!(2024 - 03 - 01), Some(250.0)),
                ],
            ),
            GapPolicy::Drop,
        );

        let unit: Vec<f64> = scale(&cpi, ScaleMode::MinMax)
            .expect("scales")
            .values()
            .map(|(_, v)| v)
            .collect();
        let pct: Vec<f64> = scale(&cpi, ScaleMode::PercentChange)
            .expect("scales")
            .values()
            .map(|(_, v)| v)
            .collect();

        assert_eq!(unit, vec![0.0, 1.0, 0.5]);
        assert_eq!(pct, vec![0.0, 50.0, 25.0]);
    }

    #[test]
    fn rejects_degenerate_baseline() {
        assert!(rebase(&[], f64::NAN).is_err());
        assert!(rebase(&[], 0.0).is_err());
    }
}
