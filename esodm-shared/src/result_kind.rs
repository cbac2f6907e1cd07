//! Output shapes a search response can be materialized as.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MappingError;

/// Selects how a raw search response is turned into a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// Iterator of hydrated documents.
    #[default]
    Object,
    /// List of document sources.
    Array,
    /// The response exactly as returned by the engine.
    Raw,
    /// Iterator of raw hit objects.
    RawIterator,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Object => "object",
            ResultKind::Array => "array",
            ResultKind::Raw => "raw",
            ResultKind::RawIterator => "raw_iterator",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultKind {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "object" => Ok(ResultKind::Object),
            "array" => Ok(ResultKind::Array),
            "raw" => Ok(ResultKind::Raw),
            "raw_iterator" => Ok(ResultKind::RawIterator),
            other => Err(MappingError::InvalidResultKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_object() {
        assert_eq!(ResultKind::default(), ResultKind::Object);
    }

    #[test]
    fn test_parse_and_display() {
        for kind in [
            ResultKind::Object,
            ResultKind::Array,
            ResultKind::Raw,
            ResultKind::RawIterator,
        ] {
            assert_eq!(kind.to_string().parse::<ResultKind>(), Ok(kind));
        }
        assert!("objects".parse::<ResultKind>().is_err());
    }
}
