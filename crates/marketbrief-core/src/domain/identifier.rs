use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_IDENTIFIER_LEN: usize = 32;

/// Opaque key naming one time series (a ticker such as `^GSPC` or an
/// indicator code such as `us_cpi`). Case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeriesId(String);

impl SeriesId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyIdentifier);
        }

        let len = trimmed.chars().count();
        if len > MAX_IDENTIFIER_LEN {
            return Err(ValidationError::IdentifierTooLong {
                len,
                max: MAX_IDENTIFIER_LEN,
            });
        }

        if let Some(index) = trimmed.chars().position(char::is_whitespace) {
            return Err(ValidationError::IdentifierWhitespace { index });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SeriesId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SeriesId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for SeriesId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SeriesId> for String {
    fn from(value: SeriesId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_preserves_case() {
        let parsed = SeriesId::parse("  ^GSPC ").expect("identifier should parse");
        assert_eq!(parsed.as_str(), "^GSPC");
        assert_eq!(SeriesId::parse("us_cpi").expect("valid").as_str(), "us_cpi");
    }

    #[test]
    fn rejects_inner_whitespace() {
        let err = SeriesId::parse("US GDP").expect_err("must fail");
        assert!(matches!(err, ValidationError::IdentifierWhitespace { index: 2 }));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(SeriesId::parse("   "), Err(ValidationError::EmptyIdentifier));
    }
}
