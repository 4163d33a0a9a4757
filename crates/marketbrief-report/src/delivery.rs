use std::fs;
use std::path::{Path, PathBuf};

use marketbrief_core::compact_day;
use thiserror::Error;
use tracing::info;

use crate::Report;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// What a sink produced for one report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliveryReceipt {
    pub files: Vec<PathBuf>,
}

/// Delivery collaborator. Transport concerns such as recipients and size
/// limits belong to the implementation.
pub trait ReportSink: Send + Sync {
    fn deliver(&self, report: &Report) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Writes `report_<YYYYMMDD>.txt` (the digest) and `report_<YYYYMMDD>.json`
/// (the full report) into a directory. Re-running on the same day overwrites
/// both files.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for DirectorySink {
    fn deliver(&self, report: &Report) -> Result<DeliveryReceipt, DeliveryError> {
        fs::create_dir_all(&self.dir).map_err(|source| DeliveryError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let stem = format!("report_{}", compact_day(report.report_date));
        let digest_path = self.dir.join(format!("{stem}.txt"));
        let manifest_path = self.dir.join(format!("{stem}.json"));

        write(&digest_path, report.digest.as_bytes())?;
        write(&manifest_path, &serde_json::to_vec_pretty(report)?)?;

        info!(
            digest = %digest_path.display(),
            manifest = %manifest_path.display(),
            "report written"
        );
        Ok(DeliveryReceipt {
            files: vec![digest_path, manifest_path],
        })
    }
}

fn write(path: &Path, contents: &[u8]) -> Result<(), DeliveryError> {
    fs::write(path, contents).map_err(|source| DeliveryError::Io {
        path: path.to_path_buf(),
        source,
    })
}
