//! Shared fixtures for the behavior suites: scripted sources and small
//! series builders. Nothing here touches the network.

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use marketbrief_core::{
    DataPoint, DateRange, FetchFuture, NormalizedSeries, PipelineConfig, RateBudget, SeriesId,
    SeriesMetadata, SeriesSource, SourceError, SourceKind, TimeSeries,
};
use time::Date;

/// Answer for one provider code.
#[derive(Debug, Clone)]
pub struct Script {
    pub delay: Duration,
    pub outcome: Result<Vec<DataPoint>, SourceError>,
}

/// In-memory source keyed by provider code. Unknown codes are `NotFound`.
#[derive(Debug)]
pub struct ScriptedSource {
    kind: SourceKind,
    scripts: HashMap<String, Script>,
    leading_failures: Mutex<HashMap<String, VecDeque<SourceError>>>,
    calls: AtomicUsize,
    call_times: Mutex<Vec<Instant>>,
}

impl ScriptedSource {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            scripts: HashMap::new(),
            leading_failures: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            call_times: Mutex::new(Vec::new()),
        }
    }

    /// Fails with each of `failures` in turn, then serves `points`.
    pub fn with_series_after_failures(self, code: &str, failures: Vec<SourceError>, points: Vec<DataPoint>) -> Self {
        self.leading_failures
            .lock()
            .expect("failures lock")
            .insert(code.to_owned(), failures.into());
        self.with_series(code, points)
    }

    pub fn with_series(self, code: &str, points: Vec<DataPoint>) -> Self {
        self.with_delayed_series(code, Duration::ZERO, points)
    }

    pub fn with_delayed_series(mut self, code: &str, delay: Duration, points: Vec<DataPoint>) -> Self {
        self.scripts.insert(
            code.to_owned(),
            Script {
                delay,
                outcome: Ok(points),
            },
        );
        self
    }

    pub fn with_failure(mut self, code: &str, error: SourceError) -> Self {
        self.scripts.insert(
            code.to_owned(),
            Script {
                delay: Duration::ZERO,
                outcome: Err(error),
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Gaps between consecutive fetch calls, in call order.
    pub fn call_gaps(&self) -> Vec<Duration> {
        let times = self.call_times.lock().expect("call times lock");
        times.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl SeriesSource for ScriptedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn fetch<'a>(&'a self, metadata: &'a SeriesMetadata, _range: DateRange) -> FetchFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.call_times.lock().expect("call times lock").push(Instant::now());
            let leading = self
                .leading_failures
                .lock()
                .expect("failures lock")
                .get_mut(&metadata.provider_code)
                .and_then(VecDeque::pop_front);
            if let Some(error) = leading {
                return Err(error);
            }
            let script = self
                .scripts
                .get(&metadata.provider_code)
                .cloned()
                .ok_or_else(|| SourceError::not_found(format!("unknown code '{}'", metadata.provider_code)))?;
            if !script.delay.is_zero() {
                tokio::time::sleep(script.delay).await;
            }
            let points = script.outcome?;
            TimeSeries::new(metadata.clone(), points).map_err(|error| SourceError::not_found(error.to_string()))
        })
    }
}

pub fn id(value: &str) -> SeriesId {
    SeriesId::parse(value).expect("valid identifier")
}

pub fn metadata(value: &str, kind: SourceKind) -> SeriesMetadata {
    SeriesMetadata::new(id(value), value, kind)
}

/// Daily points starting at `start`, one per value.
pub fn daily(start: Date, values: &[f64]) -> Vec<DataPoint> {
    values
        .iter()
        .enumerate()
        .map(|(offset, value)| DataPoint::new(start + time::Duration::days(offset as i64), Some(*value)))
        .collect()
}

/// Daily close and volume pairs starting at `start`.
pub fn sessions(start: Date, rows: &[(f64, u64)]) -> Vec<DataPoint> {
    rows.iter()
        .enumerate()
        .map(|(offset, (close, volume))| {
            DataPoint::new(start + time::Duration::days(offset as i64), Some(*close))
                .with_range(Some(close * 1.01), Some(close * 0.99))
                .with_volume(Some(*volume))
        })
        .collect()
}

pub fn normalized(value: &str, kind: SourceKind, points: Vec<DataPoint>) -> NormalizedSeries {
    let mut series = NormalizedSeries::empty(metadata(value, kind));
    series.points = points;
    series
}

pub fn budget(requests: u32, window: Duration) -> RateBudget {
    RateBudget::new(NonZeroU32::new(requests).expect("non-zero"), window)
}

/// Defaults with the given overrides, writing under `output_dir`. Remote
/// budgets are widened so runs do not wait on rate limits.
pub fn config_with(output_dir: &Path, overrides: &[(&str, &str)]) -> PipelineConfig {
    let mut values: HashMap<String, String> = overrides
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    values
        .entry(String::from("GRAPH_OUTPUT_DIR"))
        .or_insert_with(|| output_dir.display().to_string());
    values.entry(String::from("GRAPH_DPI")).or_insert_with(|| String::from("40"));
    for key in ["INDICATOR_RATE_LIMIT", "MARKET_RATE_LIMIT"] {
        values.entry(String::from(key)).or_insert_with(|| String::from("1000/1s"));
    }
    PipelineConfig::from_lookup(|key| values.get(key).cloned()).expect("valid configuration")
}
