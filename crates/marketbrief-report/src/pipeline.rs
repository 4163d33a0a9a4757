//! End-to-end run: fetch, normalize, render, assemble.

use std::collections::HashSet;
use std::sync::Arc;

use marketbrief_core::{
    clean, compare, AggregateDataset, AggregateError, Aggregator, ComparisonSet, FredAdapter,
    NormalizedSeries, PipelineConfig, RequestGroup, ScaleMode, SeriesCatalog, SeriesId,
    SeriesRequest, SeriesSource, StaticAdapter, YahooAdapter, DEFAULT_BASELINE,
};
use marketbrief_render::{ChartJob, RenderConfig, RenderError, Renderer};
use thiserror::Error;
use time::Date;
use tracing::{info, warn};

use crate::assembler::{ReportAssembler, ReportInput};
use crate::movers::{self, MoverThresholds};
use crate::report::{ComparisonNote, Report};

/// Run-level failures. Per-series and per-chart problems never surface here;
/// they are recorded in the report.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Wires the stages together for one configuration.
pub struct Pipeline {
    config: PipelineConfig,
    catalog: SeriesCatalog,
    aggregator: Aggregator,
    renderer: Renderer,
    assembler: ReportAssembler,
}

impl Pipeline {
    /// Uses the FRED, Yahoo chart and built-in static adapters.
    pub fn from_config(config: PipelineConfig) -> Self {
        let api_key = config.fred_api_key.as_ref().map(|key| key.expose().to_owned());
        let adapters: Vec<Arc<dyn SeriesSource>> = vec![
            Arc::new(FredAdapter::new(api_key)),
            Arc::new(YahooAdapter::default()),
            Arc::new(StaticAdapter::with_builtin()),
        ];
        Self::with_adapters(config, adapters)
    }

    pub fn with_adapters(config: PipelineConfig, adapters: Vec<Arc<dyn SeriesSource>>) -> Self {
        Self {
            aggregator: Aggregator::from_config(&config, adapters),
            renderer: Renderer::new(RenderConfig::from(&config)),
            assembler: ReportAssembler::from_config(&config),
            catalog: SeriesCatalog::builtin(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<Report, PipelineError> {
        let report_date = self.config.report_date_or_today();

        let dataset = self.aggregator.collect(self.requests(report_date)).await?;
        info!(
            requested = dataset.len(),
            available = dataset.available().count(),
            gap_policy = self.config.gap_policy.as_str(),
            "fetch stage finished"
        );

        let plan = self.plan_charts(&dataset);
        let jobs = Arc::new(plan.jobs);
        let renderer = self.renderer.clone();
        let task_jobs = Arc::clone(&jobs);
        let outcomes =
            match tokio::task::spawn_blocking(move || renderer.render_all(&task_jobs, report_date)).await {
                Ok(outcomes) => outcomes,
                Err(error) => {
                    warn!(error = %error, "render task failed, skipping every chart");
                    let reason = RenderError::Interrupted(error.to_string());
                    self.renderer.skip_all(&jobs, report_date, &reason)
                }
            };

        let market_ids: HashSet<&SeriesId> = self.config.markets.iter().collect();
        let movers = movers::scan(
            dataset.available().filter(|series| market_ids.contains(series.id())),
            MoverThresholds::from(&self.config),
        );

        Ok(self.assembler.assemble(
            ReportInput::new(report_date, &dataset)
                .with_outcomes(outcomes)
                .with_comparison_notes(plan.notes)
                .with_movers(movers),
        ))
    }

    /// Indicators first, then markets, each in configured order.
    fn requests(&self, end: Date) -> Vec<SeriesRequest> {
        let indicators = self.config.indicators.iter().map(|id| {
            SeriesRequest::new(
                self.catalog.resolve(id, RequestGroup::Indicators),
                self.config.economic_range(end),
            )
        });
        let markets = self.config.markets.iter().map(|id| {
            SeriesRequest::new(
                self.catalog.resolve(id, RequestGroup::Markets),
                self.config.market_range(end),
            )
        });
        indicators.chain(markets).collect()
    }

    fn plan_charts(&self, dataset: &AggregateDataset) -> ChartPlan {
        let indicators = self.normalized(dataset, &self.config.indicators);
        let markets = self.normalized(dataset, &self.config.markets);
        let mut plan = ChartPlan::default();

        plan.jobs.extend(
            indicators
                .iter()
                .map(|series| ChartJob::Individual { series: series.clone() }),
        );
        plan.jobs.extend(
            markets
                .iter()
                .map(|series| ChartJob::PriceVolume { series: series.clone() }),
        );

        let groups = [
            ("Economic indicators", "indicators", &self.config.indicators, indicators),
            ("Market indices", "markets", &self.config.markets, markets),
        ];
        for (title, slug, requested, members) in groups {
            if requested.is_empty() {
                continue;
            }
            let comparison_title = format!("{title} (rebased to {DEFAULT_BASELINE})");
            let set = compare(&members, ScaleMode::Rebase(DEFAULT_BASELINE));
            plan.note_exclusions(&comparison_title, &set);
            plan.jobs.push(ChartJob::Comparison {
                title: comparison_title,
                slug: slug.to_owned(),
                set,
            });
            plan.jobs.push(ChartJob::Summary {
                title: format!("{title} overview"),
                slug: slug.to_owned(),
                panels: members,
            });
        }
        plan
    }

    /// Available members of `ids`, cleaned, in request order.
    fn normalized(&self, dataset: &AggregateDataset, ids: &[SeriesId]) -> Vec<NormalizedSeries> {
        ids.iter()
            .filter_map(|id| dataset.get(id)?.series())
            .map(|series| clean(series, self.config.gap_policy))
            .collect()
    }
}

#[derive(Default)]
struct ChartPlan {
    jobs: Vec<ChartJob>,
    notes: Vec<ComparisonNote>,
}

impl ChartPlan {
    fn note_exclusions(&mut self, chart: &str, set: &ComparisonSet) {
        self.notes.extend(set.excluded.iter().map(|exclusion| ComparisonNote {
            chart: chart.to_owned(),
            id: exclusion.id.clone(),
            display_name: exclusion.display_name.clone(),
            reason: exclusion.reason.to_string(),
        }));
    }
}
