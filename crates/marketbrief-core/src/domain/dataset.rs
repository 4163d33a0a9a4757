use serde::Serialize;

use crate::{FetchFailure, FetchResult, SeriesId, SeriesMetadata, TimeSeries};

/// One requested series and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetEntry {
    pub metadata: SeriesMetadata,
    pub result: FetchResult,
}

/// Per-run mapping from identifier to outcome. Entries are kept in request
/// order and the dataset is never mutated after the aggregator returns it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AggregateDataset {
    entries: Vec<DatasetEntry>,
}

impl AggregateDataset {
    /// Wraps entries that are already in request order.
    pub fn from_entries(entries: Vec<DatasetEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &SeriesId) -> Option<&FetchResult> {
        self.entries
            .iter()
            .find(|entry| &entry.metadata.id == id)
            .map(|entry| &entry.result)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &SeriesId> {
        self.entries.iter().map(|entry| &entry.metadata.id)
    }

    pub fn available(&self) -> impl Iterator<Item = &TimeSeries> {
        self.entries.iter().filter_map(|entry| entry.result.series())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&SeriesMetadata, &FetchFailure)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.result.failure().map(|f| (&entry.metadata, f)))
    }

    pub fn all_available(&self) -> bool {
        self.entries.iter().all(|entry| entry.result.is_available())
    }
}
