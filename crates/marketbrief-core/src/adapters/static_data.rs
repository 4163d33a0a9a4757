use std::collections::BTreeMap;
use std::sync::Arc;

use time::{Date, Month};

use super::series_in_range;
use crate::data_source::{FetchFuture, SeriesSource};
use crate::{DataPoint, DateRange, SeriesMetadata, SourceError, SourceKind};

/// Reporting cadence of a generated dataset. Observations are stamped on the
/// last day of each period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticFrequency {
    Monthly,
    Quarterly,
}

/// Fixed dataset served without a network call.
#[derive(Debug, Clone, PartialEq)]
pub enum StaticDataset {
    /// Explicit observations.
    Points(Vec<DataPoint>),
    /// Deterministic periodic series `level + swing * sin(month_index / 2)`
    /// for any requested window.
    Periodic {
        frequency: StaticFrequency,
        level: f64,
        swing: f64,
    },
}

impl StaticDataset {
    fn points_for(&self, range: DateRange) -> Vec<DataPoint> {
        match self {
            Self::Points(points) => points.clone(),
            Self::Periodic {
                frequency,
                level,
                swing,
            } => period_ends(*frequency, range)
                .into_iter()
                .map(|date| {
                    let index = date.year() * 12 + i32::from(u8::from(date.month()));
                    let value = level + swing * (f64::from(index) / 2.0).sin();
                    DataPoint::new(date, Some((value * 100.0).round() / 100.0))
                })
                .collect(),
        }
    }
}

/// Static adapter for indicators with no free live source.
///
/// Lookups use the series' provider code. An unknown code is the only failure.
#[derive(Debug, Clone, Default)]
pub struct StaticAdapter {
    datasets: Arc<BTreeMap<String, StaticDataset>>,
}

impl StaticAdapter {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adapter preloaded with the Japan GDP, CPI and unemployment datasets.
    pub fn with_builtin() -> Self {
        Self::empty()
            .register(
                "japan_gdp",
                StaticDataset::Periodic {
                    frequency: StaticFrequency::Quarterly,
                    level: 100.0,
                    swing: 2.0,
                },
            )
            .register(
                "japan_cpi",
                StaticDataset::Periodic {
                    frequency: StaticFrequency::Monthly,
                    level: 100.0,
                    swing: 1.0,
                },
            )
            .register(
                "japan_unemployment",
                StaticDataset::Periodic {
                    frequency: StaticFrequency::Monthly,
                    level: 3.0,
                    swing: 0.5,
                },
            )
    }

    pub fn register(self, code: impl Into<String>, dataset: StaticDataset) -> Self {
        let mut datasets = Arc::unwrap_or_clone(self.datasets);
        datasets.insert(code.into(), dataset);
        Self {
            datasets: Arc::new(datasets),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.datasets.contains_key(code)
    }
}

impl SeriesSource for StaticAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Static
    }

    fn fetch<'a>(&'a self, metadata: &'a SeriesMetadata, range: DateRange) -> FetchFuture<'a> {
        Box::pin(async move {
            let dataset = self.datasets.get(&metadata.provider_code).ok_or_else(|| {
                SourceError::not_found(format!(
                    "no static dataset named '{}'",
                    metadata.provider_code
                ))
            })?;
            series_in_range(metadata, dataset.points_for(range), range)
        })
    }
}

fn month_end(year: i32, month: Month) -> Option<Date> {
    let (next_year, next_month) = match month {
        Month::December => (year + 1, Month::January),
        other => (year, other.next()),
    };
    Date::from_calendar_date(next_year, next_month, 1)
        .ok()?
        .previous_day()
}

fn period_ends(frequency: StaticFrequency, range: DateRange) -> Vec<Date> {
    let mut dates = Vec::new();
    let mut year = range.start().year();
    let mut month = range.start().month();

    while let Some(end) = month_end(year, month) {
        if end > range.end() {
            break;
        }
        let on_cadence = match frequency {
            StaticFrequency::Monthly => true,
            StaticFrequency::Quarterly => u8::from(month) % 3 == 0,
        };
        if on_cadence && range.contains(end) {
            dates.push(end);
        }
        if month == Month::December {
            year += 1;
        }
        month = month.next();
    }
    dates
}
