use std::fs;
use std::path::{Path, PathBuf};

use marketbrief_core::{ChartArtifact, ChartCategory, PipelineConfig, SeriesId, UtcDateTime};
use rayon::prelude::*;
use time::Date;
use tracing::{info, warn};

use crate::naming::plan_paths;
use crate::{charts, ChartJob, RenderError};

/// Output settings for one rendering pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub output_dir: PathBuf,
    pub dpi: u32,
}

impl RenderConfig {
    pub fn new(output_dir: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            dpi: dpi.max(1),
        }
    }
}

impl From<&PipelineConfig> for RenderConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self::new(config.output_dir.clone(), config.dpi)
    }
}

/// Result of one chart job. `result` is an error when the chart was skipped.
#[derive(Debug)]
pub struct RenderOutcome {
    pub category: ChartCategory,
    pub title: String,
    pub series: Vec<SeriesId>,
    pub path: PathBuf,
    pub result: Result<ChartArtifact, RenderError>,
}

impl RenderOutcome {
    pub fn artifact(&self) -> Option<&ChartArtifact> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&RenderError> {
        self.result.as_ref().err()
    }
}

/// Renders chart jobs to SVG files in parallel.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders every job, one outcome per job in job order.
    ///
    /// File names are fixed before any drawing starts. Failures never escape
    /// the pass: a chart that cannot be drawn carries its error in its outcome,
    /// and an output directory that cannot be created skips every chart.
    pub fn render_all(&self, jobs: &[ChartJob], date: Date) -> Vec<RenderOutcome> {
        let dir = &self.config.output_dir;
        if let Err(source) = fs::create_dir_all(dir) {
            let error = RenderError::Io {
                path: dir.clone(),
                source,
            };
            warn!(dir = %dir.display(), error = %error, "output directory unavailable, skipping every chart");
            return self.skip_all(jobs, date, &error);
        }

        let paths = plan_paths(jobs, dir, date);
        let outcomes: Vec<RenderOutcome> = jobs
            .par_iter()
            .zip(paths.into_par_iter())
            .map(|(job, path)| {
                let result = self.render_one(job, &path);
                RenderOutcome {
                    category: job.category(),
                    title: job.title(),
                    series: job.series_ids(),
                    path,
                    result,
                }
            })
            .collect();

        let rendered = outcomes.iter().filter(|outcome| outcome.result.is_ok()).count();
        info!(
            rendered,
            skipped = outcomes.len() - rendered,
            dir = %dir.display(),
            "chart rendering finished"
        );
        outcomes
    }

    /// One skipped outcome per job, each carrying `error`, at the paths the
    /// jobs would have been written to.
    pub fn skip_all(&self, jobs: &[ChartJob], date: Date, error: &RenderError) -> Vec<RenderOutcome> {
        jobs.iter()
            .zip(plan_paths(jobs, &self.config.output_dir, date))
            .map(|(job, path)| RenderOutcome {
                category: job.category(),
                title: job.title(),
                series: job.series_ids(),
                path,
                result: Err(error.duplicate()),
            })
            .collect()
    }

    fn render_one(&self, job: &ChartJob, path: &Path) -> Result<ChartArtifact, RenderError> {
        let category = job.category();
        let drawn = charts::draw(job, path, self.config.dpi).and_then(|placeholder| {
            let size_bytes = fs::metadata(path)
                .map_err(|source| RenderError::Io {
                    path: path.to_path_buf(),
                    source,
                })?
                .len();
            Ok(ChartArtifact {
                category,
                path: path.to_path_buf(),
                title: job.title(),
                series: job.series_ids(),
                rendered_at: UtcDateTime::now(),
                size_bytes,
                placeholder,
            })
        });

        if let Err(error) = &drawn {
            warn!(
                category = category.as_str(),
                title = %job.title(),
                error = %error,
                "chart skipped"
            );
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use marketbrief_core::{compare, NormalizedSeries, ScaleMode, SeriesMetadata, SourceKind};
    use marketbrief_core::{DataPoint, SeriesId};
    use time::macros::date;

    use super::*;

    fn series(id: &str, values: &[f64]) -> NormalizedSeries {
        let mut series = NormalizedSeries::empty(SeriesMetadata::new(
            SeriesId::parse(id).expect("id"),
            id,
            SourceKind::RemoteMarket,
        ));
        series.points = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                DataPoint::new(date!(2024 - 03 - 01) + time::Duration::days(i as i64), Some(*v))
                    .with_volume(Some(1_000 * (i as u64 + 1)))
            })
            .collect();
        series
    }

    #[test]
    fn renders_every_category_and_reports_sizes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let renderer = Renderer::new(RenderConfig::new(dir.path().join("graphs"), 50));
        let a = series("^GSPC", &[10.0, 11.0, 12.5]);
        let b = series("^N225", &[20.0, 19.0, 21.0]);
        let jobs = vec![
            ChartJob::Individual { series: a.clone() },
            ChartJob::PriceVolume { series: b.clone() },
            ChartJob::Comparison {
                title: "Markets".into(),
                slug: "markets".into(),
                set: compare(&[a.clone(), b.clone()], ScaleMode::Rebase(100.0)),
            },
            ChartJob::Summary {
                title: "Markets overview".into(),
                slug: "markets".into(),
                panels: vec![a, b],
            },
        ];

        let outcomes = renderer.render_all(&jobs, date!(2024 - 03 - 04));

        assert_eq!(outcomes.len(), 4);
        for outcome in &outcomes {
            let artifact = outcome.artifact().expect("rendered");
            assert!(artifact.path.exists());
            assert!(artifact.size_bytes > 0);
            assert!(!artifact.placeholder);
        }
        assert!(outcomes[2].path.ends_with("comparison_markets_20240304.svg"));
    }

    #[test]
    fn skipped_chart_leaves_no_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let renderer = Renderer::new(RenderConfig::new(dir.path(), 50));
        let jobs = vec![ChartJob::Summary {
            title: "Empty".into(),
            slug: "empty".into(),
            panels: Vec::new(),
        }];

        let outcomes = renderer.render_all(&jobs, date!(2024 - 03 - 04));

        assert!(outcomes[0].error().is_some_and(RenderError::is_insufficient_data));
        assert!(!outcomes[0].path.exists());
    }

    #[test]
    fn unusable_output_dir_skips_every_chart() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").expect("write file");
        let renderer = Renderer::new(RenderConfig::new(blocker.join("graphs"), 50));
        let jobs = vec![
            ChartJob::Individual {
                series: series("^GSPC", &[10.0, 11.0]),
            },
            ChartJob::PriceVolume {
                series: series("^GSPC", &[10.0, 11.0]),
            },
        ];

        let outcomes = renderer.render_all(&jobs, date!(2024 - 03 - 04));

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|outcome| matches!(outcome.error(), Some(RenderError::Io { .. }))));
        assert!(outcomes[1].path.ends_with("price-volume_gspc_20240304.svg"));
    }
}
