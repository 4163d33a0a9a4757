use std::path::{Path, PathBuf};

use marketbrief_core::{
    day_format, ChartArtifact, ChartCategory, FailureReason, SeriesId, SourceKind, UtcDateTime,
};
use serde::Serialize;
use time::Date;

use crate::movers::Mover;

/// Most recent point of an available series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestValue {
    pub id: SeriesId,
    pub display_name: String,
    pub unit: String,
    /// Absent when the series carried no valued point in range.
    pub value: Option<f64>,
    #[serde(with = "day_format")]
    pub as_of: Date,
}

/// A requested series that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnavailableSeries {
    pub id: SeriesId,
    pub display_name: String,
    pub reason: FailureReason,
    pub source: SourceKind,
    pub message: String,
    pub attempts: u32,
}

/// A rendered chart left out because the transport would reject its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedArtifact {
    pub title: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub limit_bytes: u64,
}

/// A chart that was not rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedChart {
    pub category: ChartCategory,
    pub title: String,
    pub reason: String,
}

/// A series left out of one comparison chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonNote {
    pub chart: String,
    pub id: SeriesId,
    pub display_name: String,
    pub reason: String,
}

/// Final deliverable of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub run_id: String,
    pub generated_at: UtcDateTime,
    #[serde(with = "day_format")]
    pub report_date: Date,
    /// Attachments in rendering order.
    pub artifacts: Vec<ChartArtifact>,
    pub latest: Vec<LatestValue>,
    pub unavailable: Vec<UnavailableSeries>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_artifacts: Vec<ExcludedArtifact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_charts: Vec<SkippedChart>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comparison_notes: Vec<ComparisonNote>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movers: Vec<Mover>,
    pub digest: String,
}

impl Report {
    /// True when at least one requested series is missing.
    pub fn is_partial(&self) -> bool {
        !self.unavailable.is_empty()
    }

    pub fn attachment_paths(&self) -> impl Iterator<Item = &Path> {
        self.artifacts.iter().map(|artifact| artifact.path.as_path())
    }

    pub fn unavailable_ids(&self) -> impl Iterator<Item = &SeriesId> {
        self.unavailable.iter().map(|series| &series.id)
    }

    pub fn latest_ids(&self) -> impl Iterator<Item = &SeriesId> {
        self.latest.iter().map(|latest| &latest.id)
    }
}
