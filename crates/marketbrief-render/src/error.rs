use std::path::PathBuf;

use thiserror::Error;

/// Per-chart rendering failure. None of these stop the run; the chart is
/// skipped and the failure is logged.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("not enough data for {chart}: {detail}")]
    InsufficientData { chart: String, detail: String },

    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("drawing backend error: {0}")]
    Backend(String),

    #[error("rendering stopped before this chart: {0}")]
    Interrupted(String),
}

impl RenderError {
    pub fn insufficient(chart: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InsufficientData {
            chart: chart.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn backend(error: impl std::fmt::Display) -> Self {
        Self::Backend(error.to_string())
    }

    /// Same failure for one more chart; `io::Error` cannot be cloned.
    pub(crate) fn duplicate(&self) -> Self {
        match self {
            Self::InsufficientData { chart, detail } => Self::insufficient(chart.clone(), detail.clone()),
            Self::Io { path, source } => Self::Io {
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            Self::Backend(message) => Self::Backend(message.clone()),
            Self::Interrupted(message) => Self::Interrupted(message.clone()),
        }
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
