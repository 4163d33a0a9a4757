use std::collections::BTreeMap;

use crate::{SeriesId, SeriesMetadata, SourceKind};

/// Which request list an identifier came from. Decides how identifiers that
/// are not in the catalog get resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestGroup {
    Indicators,
    Markets,
}

/// Known series and their configured metadata.
#[derive(Debug, Clone, Default)]
pub struct SeriesCatalog {
    entries: BTreeMap<SeriesId, SeriesMetadata>,
}

struct Entry {
    id: &'static str,
    name: &'static str,
    kind: SourceKind,
    code: &'static str,
    unit: &'static str,
    description: &'static str,
}

const BUILTIN: &[Entry] = &[
    Entry {
        id: "us_gdp",
        name: "US GDP",
        kind: SourceKind::RemoteIndicator,
        code: "GDP",
        unit: "Billions of USD",
        description: "US gross domestic product (quarterly)",
    },
    Entry {
        id: "us_cpi",
        name: "US CPI",
        kind: SourceKind::RemoteIndicator,
        code: "CPIAUCSL",
        unit: "Index 1982-1984=100",
        description: "US consumer price index (monthly)",
    },
    Entry {
        id: "us_unemployment",
        name: "US Unemployment Rate",
        kind: SourceKind::RemoteIndicator,
        code: "UNRATE",
        unit: "Percent",
        description: "US unemployment rate (monthly)",
    },
    Entry {
        id: "us_interest_rate",
        name: "US Federal Funds Rate",
        kind: SourceKind::RemoteIndicator,
        code: "FEDFUNDS",
        unit: "Percent",
        description: "Effective federal funds rate (monthly)",
    },
    Entry {
        id: "japan_gdp",
        name: "Japan GDP",
        kind: SourceKind::Static,
        code: "japan_gdp",
        unit: "Index",
        description: "Japan real GDP (quarterly)",
    },
    Entry {
        id: "japan_cpi",
        name: "Japan CPI",
        kind: SourceKind::Static,
        code: "japan_cpi",
        unit: "Index",
        description: "Japan consumer price index (monthly)",
    },
    Entry {
        id: "japan_unemployment",
        name: "Japan Unemployment Rate",
        kind: SourceKind::Static,
        code: "japan_unemployment",
        unit: "Percent",
        description: "Japan unemployment rate (monthly)",
    },
    Entry {
        id: "^DJI",
        name: "Dow Jones Industrial Average",
        kind: SourceKind::RemoteMarket,
        code: "^DJI",
        unit: "Points",
        description: "NYSE/Nasdaq blue-chip index",
    },
    Entry {
        id: "^GSPC",
        name: "S&P 500",
        kind: SourceKind::RemoteMarket,
        code: "^GSPC",
        unit: "Points",
        description: "US large-cap index",
    },
    Entry {
        id: "^IXIC",
        name: "NASDAQ Composite",
        kind: SourceKind::RemoteMarket,
        code: "^IXIC",
        unit: "Points",
        description: "Nasdaq-listed equities",
    },
    Entry {
        id: "^N225",
        name: "Nikkei 225",
        kind: SourceKind::RemoteMarket,
        code: "^N225",
        unit: "Points",
        description: "Tokyo Stock Exchange index",
    },
];

impl SeriesCatalog {
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for entry in BUILTIN {
            if let Ok(id) = SeriesId::parse(entry.id) {
                catalog.insert(
                    SeriesMetadata::new(id, entry.name, entry.kind)
                        .with_provider_code(entry.code)
                        .with_unit(entry.unit)
                        .with_description(entry.description),
                );
            }
        }
        catalog
    }

    pub fn insert(&mut self, metadata: SeriesMetadata) {
        self.entries.insert(metadata.id.clone(), metadata);
    }

    pub fn get(&self, id: &SeriesId) -> Option<&SeriesMetadata> {
        self.entries.get(id)
    }

    /// Catalog metadata, or a verbatim provider code for the request group.
    pub fn resolve(&self, id: &SeriesId, group: RequestGroup) -> SeriesMetadata {
        if let Some(metadata) = self.get(id) {
            return metadata.clone();
        }

        let kind = match group {
            RequestGroup::Indicators => SourceKind::RemoteIndicator,
            RequestGroup::Markets => SourceKind::RemoteMarket,
        };
        SeriesMetadata::new(id.clone(), id.as_str(), kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> SeriesId {
        SeriesId::parse(value).expect("valid id")
    }

    #[test]
    fn builtin_entries_map_to_provider_codes() {
        let catalog = SeriesCatalog::builtin();

        let cpi = catalog.resolve(&id("us_cpi"), RequestGroup::Indicators);
        assert_eq!(cpi.provider_code, "CPIAUCSL");
        assert_eq!(cpi.kind, SourceKind::RemoteIndicator);

        let japan = catalog.resolve(&id("japan_cpi"), RequestGroup::Indicators);
        assert_eq!(japan.kind, SourceKind::Static);
    }

    #[test]
    fn unknown_identifiers_resolve_by_group() {
        let catalog = SeriesCatalog::builtin();

        let raw_fred = catalog.resolve(&id("T10Y2Y"), RequestGroup::Indicators);
        assert_eq!(raw_fred.kind, SourceKind::RemoteIndicator);
        assert_eq!(raw_fred.provider_code, "T10Y2Y");

        let ticker = catalog.resolve(&id("7203.T"), RequestGroup::Markets);
        assert_eq!(ticker.kind, SourceKind::RemoteMarket);
        assert_eq!(ticker.display_name, "7203.T");
    }
}
