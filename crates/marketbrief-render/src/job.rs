use marketbrief_core::{ChartCategory, ComparisonSet, NormalizedSeries, SeriesId};

/// One chart to draw. Jobs are planned up front so every output path is fixed
/// before any rendering starts.
#[derive(Debug, Clone)]
pub enum ChartJob {
    /// Line with point markers for one series.
    Individual { series: NormalizedSeries },
    /// Rescaled series overlaid on one axis. Needs at least two members.
    Comparison {
        title: String,
        slug: String,
        set: ComparisonSet,
    },
    /// Close line over a volume bar panel.
    PriceVolume { series: NormalizedSeries },
    /// Grid of small independent panels.
    Summary {
        title: String,
        slug: String,
        panels: Vec<NormalizedSeries>,
    },
}

impl ChartJob {
    pub fn category(&self) -> ChartCategory {
        match self {
            Self::Individual { .. } => ChartCategory::Individual,
            Self::Comparison { .. } => ChartCategory::Comparison,
            Self::PriceVolume { .. } => ChartCategory::PriceVolume,
            Self::Summary { .. } => ChartCategory::Summary,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::Individual { series } => series.metadata.display_name.clone(),
            Self::PriceVolume { series } => format!("{} price and volume", series.metadata.display_name),
            Self::Comparison { title, .. } | Self::Summary { title, .. } => title.clone(),
        }
    }

    /// Text the file name slug is derived from.
    pub fn name_stem(&self) -> &str {
        match self {
            Self::Individual { series } | Self::PriceVolume { series } => series.id().as_str(),
            Self::Comparison { slug, .. } | Self::Summary { slug, .. } => slug,
        }
    }

    /// Series drawn by this chart.
    pub fn series_ids(&self) -> Vec<SeriesId> {
        match self {
            Self::Individual { series } | Self::PriceVolume { series } => vec![series.id().clone()],
            Self::Comparison { set, .. } => set.member_ids(),
            Self::Summary { panels, .. } => panels.iter().map(|panel| panel.id().clone()).collect(),
        }
    }
}
