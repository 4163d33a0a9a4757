//! Descriptive scan for unusual moves in market series.

use std::fmt::{Display, Formatter};

use marketbrief_core::{day_format, PipelineConfig, SeriesId, TimeSeries};
use serde::Serialize;
use time::Date;

/// Flagging thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoverThresholds {
    /// Last volume as a multiple of the mean of earlier volumes.
    pub volume_ratio: f64,
    /// Absolute fractional change between the last two closes.
    pub price_change: f64,
}

impl MoverThresholds {
    pub const fn new(volume_ratio: f64, price_change: f64) -> Self {
        Self {
            volume_ratio,
            price_change,
        }
    }
}

impl Default for MoverThresholds {
    fn default() -> Self {
        Self::new(2.0, 0.05)
    }
}

impl From<&PipelineConfig> for MoverThresholds {
    fn from(config: &PipelineConfig) -> Self {
        Self::new(config.volume_threshold, config.price_change_threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum MoverSignal {
    VolumeSpike { ratio: f64 },
    PriceMove { change: f64 },
}

impl Display for MoverSignal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VolumeSpike { ratio } => write!(f, "volume {ratio:.1}x prior average"),
            Self::PriceMove { change } => write!(f, "close {:+.1}%", change * 100.0),
        }
    }
}

/// A market series whose latest session stood out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mover {
    pub id: SeriesId,
    pub display_name: String,
    pub last_close: Option<f64>,
    #[serde(with = "day_format")]
    pub as_of: Date,
    pub signals: Vec<MoverSignal>,
}

/// Returns the series that cross either threshold, in input order.
pub fn scan<'a>(
    series: impl IntoIterator<Item = &'a TimeSeries>,
    thresholds: MoverThresholds,
) -> Vec<Mover> {
    series
        .into_iter()
        .filter_map(|series| inspect(series, thresholds))
        .collect()
}

fn inspect(series: &TimeSeries, thresholds: MoverThresholds) -> Option<Mover> {
    let points = series.points();
    let (last, earlier) = points.split_last()?;
    if earlier.is_empty() {
        return None;
    }

    let mut signals = Vec::new();

    if let Some(volume) = last.volume {
        let prior: Vec<f64> = earlier.iter().filter_map(|p| p.volume).map(|v| v as f64).collect();
        if !prior.is_empty() {
            let mean = prior.iter().sum::<f64>() / prior.len() as f64;
            if mean > 0.0 {
                let ratio = volume as f64 / mean;
                if ratio >= thresholds.volume_ratio {
                    signals.push(MoverSignal::VolumeSpike { ratio });
                }
            }
        }
    }

    let mut closes = points.iter().rev().filter_map(|p| p.value);
    if let (Some(close), Some(previous)) = (closes.next(), closes.next()) {
        if previous != 0.0 {
            let change = (close - previous) / previous;
            if change.abs() >= thresholds.price_change {
                signals.push(MoverSignal::PriceMove { change });
            }
        }
    }

    if signals.is_empty() {
        return None;
    }
    Some(Mover {
        id: series.id().clone(),
        display_name: series.metadata().display_name.clone(),
        last_close: last.value,
        as_of: last.date,
        signals,
    })
}

#[cfg(test)]
mod tests {
    use marketbrief_core::{DataPoint, SeriesMetadata, SourceKind};
    use time::macros::date;

    use super::*;

    fn market(id: &str, rows: &[(f64, u64)]) -> TimeSeries {
        let start = date!(2024 - 04 - 01);
        TimeSeries::new(
            SeriesMetadata::new(SeriesId::parse(id).expect("id"), id, SourceKind::RemoteMarket),
            rows.iter()
                .enumerate()
                .map(|(i, (close, volume))| {
                    DataPoint::new(start + time::Duration::days(i as i64), Some(*close))
                        .with_volume(Some(*volume))
                })
                .collect(),
        )
        .expect("series")
    }

    #[test]
    fn flags_volume_spikes_and_large_moves() {
        let quiet = market("^DJI", &[(100.0, 1_000), (101.0, 1_100), (101.5, 1_050)]);
        let spike = market("^GSPC", &[(100.0, 1_000), (100.5, 1_000), (100.2, 2_500)]);
        let jump = market("^N225", &[(100.0, 1_000), (100.0, 1_000), (94.0, 1_000)]);

        let movers = scan([&quiet, &spike, &jump], MoverThresholds::default());

        assert_eq!(movers.len(), 2);
        assert_eq!(movers[0].id.as_str(), "^GSPC");
        assert!(matches!(movers[0].signals[..], [MoverSignal::VolumeSpike { ratio }] if ratio == 2.5));
        assert_eq!(movers[1].id.as_str(), "^N225");
        assert!(matches!(movers[1].signals[..], [MoverSignal::PriceMove { change }] if change < -0.05));
    }

    #[test]
    fn single_point_series_are_never_flagged() {
        let one = market("^IXIC", &[(100.0, 9_999_999)]);
        assert!(scan([&one], MoverThresholds::new(0.0, 0.0)).is_empty());
    }

    #[test]
    fn signals_describe_themselves() {
        assert_eq!(MoverSignal::VolumeSpike { ratio: 2.46 }.to_string(), "volume 2.5x prior average");
        assert_eq!(MoverSignal::PriceMove { change: -0.062 }.to_string(), "close -6.2%");
    }
}
