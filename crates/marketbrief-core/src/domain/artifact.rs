use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{SeriesId, UtcDateTime};

/// Chart rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartCategory {
    Individual,
    Comparison,
    PriceVolume,
    Summary,
}

impl ChartCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Comparison => "comparison",
            Self::PriceVolume => "price-volume",
            Self::Summary => "summary",
        }
    }
}

impl Display for ChartCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chart written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartArtifact {
    pub category: ChartCategory,
    pub path: PathBuf,
    pub title: String,
    pub series: Vec<SeriesId>,
    pub rendered_at: UtcDateTime,
    pub size_bytes: u64,
    /// Set when the chart only carries an explanatory label.
    pub placeholder: bool,
}
