use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Provider category. Governs which adapter serves a series, which rate
/// budget it draws from and which failures it can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    RemoteIndicator,
    RemoteMarket,
    Static,
}

impl SourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RemoteIndicator => "remote-indicator",
            Self::RemoteMarket => "remote-market",
            Self::Static => "static",
        }
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "remote-indicator" | "indicator" => Ok(Self::RemoteIndicator),
            "remote-market" | "market" => Ok(Self::RemoteMarket),
            "static" | "manual" => Ok(Self::Static),
            other => Err(ValidationError::InvalidSourceKind {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("manual".parse::<SourceKind>(), Ok(SourceKind::Static));
        assert_eq!(
            "Remote_Market".parse::<SourceKind>(),
            Ok(SourceKind::RemoteMarket)
        );
        assert!(matches!(
            "ftp".parse::<SourceKind>(),
            Err(ValidationError::InvalidSourceKind { .. })
        ));
    }
}
