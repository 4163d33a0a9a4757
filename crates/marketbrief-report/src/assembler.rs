use marketbrief_core::{AggregateDataset, FetchResult, PipelineConfig, UtcDateTime};
use marketbrief_render::RenderOutcome;
use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use crate::digest;
use crate::movers::Mover;
use crate::report::{
    ComparisonNote, ExcludedArtifact, LatestValue, Report, SkippedChart, UnavailableSeries,
};

/// Everything the assembler combines into a [`Report`].
#[derive(Debug)]
pub struct ReportInput<'a> {
    pub report_date: Date,
    pub dataset: &'a AggregateDataset,
    pub outcomes: Vec<RenderOutcome>,
    pub comparison_notes: Vec<ComparisonNote>,
    pub movers: Vec<Mover>,
}

impl<'a> ReportInput<'a> {
    pub fn new(report_date: Date, dataset: &'a AggregateDataset) -> Self {
        Self {
            report_date,
            dataset,
            outcomes: Vec::new(),
            comparison_notes: Vec::new(),
            movers: Vec::new(),
        }
    }

    pub fn with_outcomes(mut self, outcomes: Vec<RenderOutcome>) -> Self {
        self.outcomes = outcomes;
        self
    }

    pub fn with_comparison_notes(mut self, notes: Vec<ComparisonNote>) -> Self {
        self.comparison_notes = notes;
        self
    }

    pub fn with_movers(mut self, movers: Vec<Mover>) -> Self {
        self.movers = movers;
        self
    }
}

/// Builds reports. Every dataset entry lands in exactly one of the latest
/// values or unavailable sections, in request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportAssembler {
    max_attachment_bytes: u64,
}

impl ReportAssembler {
    pub const fn new(max_attachment_bytes: u64) -> Self {
        Self {
            max_attachment_bytes,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_attachment_bytes)
    }

    pub const fn max_attachment_bytes(&self) -> u64 {
        self.max_attachment_bytes
    }

    pub fn assemble(&self, input: ReportInput<'_>) -> Report {
        let mut latest = Vec::new();
        let mut unavailable = Vec::new();
        for entry in input.dataset.entries() {
            let metadata = &entry.metadata;
            match &entry.result {
                FetchResult::Available { series } => {
                    let (value, as_of) = match series.latest() {
                        Some(point) => (point.value, point.date),
                        None => (None, series.points().last().map_or(input.report_date, |p| p.date)),
                    };
                    latest.push(LatestValue {
                        id: metadata.id.clone(),
                        display_name: metadata.display_name.clone(),
                        unit: metadata.unit.clone(),
                        value,
                        as_of,
                    });
                }
                FetchResult::Failed { failure } => unavailable.push(UnavailableSeries {
                    id: metadata.id.clone(),
                    display_name: metadata.display_name.clone(),
                    reason: failure.reason,
                    source: failure.source,
                    message: failure.message.clone(),
                    attempts: failure.attempts,
                }),
            }
        }

        let mut artifacts = Vec::new();
        let mut excluded_artifacts = Vec::new();
        let mut skipped_charts = Vec::new();
        for outcome in input.outcomes {
            match outcome.result {
                Ok(artifact) if artifact.size_bytes > self.max_attachment_bytes => {
                    warn!(
                        path = %artifact.path.display(),
                        size_bytes = artifact.size_bytes,
                        limit_bytes = self.max_attachment_bytes,
                        "chart exceeds attachment limit; leaving it out of the report"
                    );
                    excluded_artifacts.push(ExcludedArtifact {
                        title: artifact.title,
                        path: artifact.path,
                        size_bytes: artifact.size_bytes,
                        limit_bytes: self.max_attachment_bytes,
                    });
                }
                Ok(artifact) => artifacts.push(artifact),
                Err(error) => skipped_charts.push(SkippedChart {
                    category: outcome.category,
                    title: outcome.title,
                    reason: error.to_string(),
                }),
            }
        }

        let mut report = Report {
            run_id: Uuid::new_v4().to_string(),
            generated_at: UtcDateTime::now(),
            report_date: input.report_date,
            artifacts,
            latest,
            unavailable,
            excluded_artifacts,
            skipped_charts,
            comparison_notes: input.comparison_notes,
            movers: input.movers,
            digest: String::new(),
        };
        report.digest = digest::compose(&report);

        info!(
            run_id = %report.run_id,
            latest = report.latest.len(),
            unavailable = report.unavailable.len(),
            artifacts = report.artifacts.len(),
            "report assembled"
        );
        report
    }
}
