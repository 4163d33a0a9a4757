use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::day::day_format;
use crate::normalize::order_points;
use crate::{SeriesId, SourceKind, ValidationError};

/// Static description of a series, fixed at configuration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    pub id: SeriesId,
    pub display_name: String,
    pub kind: SourceKind,
    pub unit: String,
    pub description: String,
    /// Code the provider knows the series by (FRED series id, exchange ticker).
    pub provider_code: String,
}

impl SeriesMetadata {
    pub fn new(id: SeriesId, display_name: impl Into<String>, kind: SourceKind) -> Self {
        let provider_code = id.as_str().to_owned();
        Self {
            id,
            display_name: display_name.into(),
            kind,
            unit: String::new(),
            description: String::new(),
            provider_code,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = code.into();
        self
    }
}

/// One observation at day resolution. `value` is the closing value for
/// market series; `high`, `low` and `volume` are only filled by OHLCV sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde(with = "day_format")]
    pub date: Date,
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl DataPoint {
    pub const fn new(date: Date, value: Option<f64>) -> Self {
        Self {
            date,
            value,
            high: None,
            low: None,
            volume: None,
        }
    }

    pub const fn with_range(mut self, high: Option<f64>, low: Option<f64>) -> Self {
        self.high = high;
        self.low = low;
        self
    }

    pub const fn with_volume(mut self, volume: Option<u64>) -> Self {
        self.volume = volume;
        self
    }

    fn sanitized(self) -> Self {
        Self {
            value: self.value.filter(|v| v.is_finite()),
            high: self.high.filter(|v| v.is_finite()),
            low: self.low.filter(|v| v.is_finite()),
            ..self
        }
    }
}

/// Successfully fetched series: non-empty, ascending by date, one point per
/// date. Non-finite values are stored as absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    metadata: SeriesMetadata,
    points: Vec<DataPoint>,
}

impl TimeSeries {
    pub fn new(metadata: SeriesMetadata, points: Vec<DataPoint>) -> Result<Self, ValidationError> {
        if points.is_empty() {
            return Err(ValidationError::EmptySeries {
                identifier: metadata.id.to_string(),
            });
        }

        let points = order_points(points.into_iter().map(DataPoint::sanitized).collect());
        Ok(Self { metadata, points })
    }

    pub fn metadata(&self) -> &SeriesMetadata {
        &self.metadata
    }

    pub fn id(&self) -> &SeriesId {
        &self.metadata.id
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent point carrying a value.
    pub fn latest(&self) -> Option<&DataPoint> {
        self.points.iter().rev().find(|point| point.value.is_some())
    }

    pub fn has_volume(&self) -> bool {
        self.points.iter().any(|point| point.volume.is_some())
    }
}

/// Output of the normalizer. Unlike [`TimeSeries`] it may be empty, and when
/// `gaps_preserved` is set absent values are kept so renderers can break lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSeries {
    pub metadata: SeriesMetadata,
    pub points: Vec<DataPoint>,
    pub gaps_preserved: bool,
}

impl NormalizedSeries {
    pub fn empty(metadata: SeriesMetadata) -> Self {
        Self {
            metadata,
            points: Vec::new(),
            gaps_preserved: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn id(&self) -> &SeriesId {
        &self.metadata.id
    }

    /// `(date, value)` pairs with a value present.
    pub fn values(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|point| point.value.map(|value| (point.date, value)))
    }

    pub fn has_volume(&self) -> bool {
        self.points.iter().any(|point| point.volume.is_some())
    }

    pub fn has_range(&self) -> bool {
        self.points
            .iter()
            .any(|point| point.high.is_some() && point.low.is_some())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn metadata() -> SeriesMetadata {
        SeriesMetadata::new(
            SeriesId::parse("us_cpi").expect("valid id"),
            "US CPI",
            SourceKind::RemoteIndicator,
        )
        .with_provider_code("CPIAUCSL")
    }

    #[test]
    fn construction_orders_and_dedups() {
        let series = TimeSeries::new(
            metadata(),
            vec![
                DataPoint::new(date!(2024 - 03 - 01), Some(3.0)),
                DataPoint::new(date!(2024 - 01 - 01), Some(1.0)),
                DataPoint::new(date!(2024 - 03 - 01), Some(4.0)),
            ],
        )
        .expect("series should build");

        let values: Vec<_> = series.points().iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(1.0), Some(4.0)]);
    }

    #[test]
    fn empty_series_is_rejected() {
        let err = TimeSeries::new(metadata(), Vec::new()).expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::EmptySeries {
                identifier: String::from("us_cpi")
            }
        );
    }

    #[test]
    fn latest_skips_absent_values() {
        let series = TimeSeries::new(
            metadata(),
            vec![
                DataPoint::new(date!(2024 - 01 - 01), Some(1.0)),
                DataPoint::new(date!(2024 - 02 - 01), Some(f64::NAN)),
            ],
        )
        .expect("series should build");

        let latest = series.latest().expect("has a valued point");
        assert_eq!(latest.date, date!(2024 - 01 - 01));
        assert_eq!(series.points()[1].value, None);
    }
}
