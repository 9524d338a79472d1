//! Metric scope: global, a watched brand, or one of its competitors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DetectionError;

/// The subject a snapshot, score or alert is about.
///
/// Serialized as `global`, `brand:<name>` or `competitor:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    Global,
    Brand(String),
    Competitor(String),
}

impl Scope {
    pub fn brand(name: impl Into<String>) -> Self {
        Self::Brand(name.into())
    }

    pub fn competitor(name: impl Into<String>) -> Self {
        Self::Competitor(name.into())
    }

    /// The brand or competitor name, `None` for the global scope.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Brand(n) | Self::Competitor(n) => Some(n),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    pub fn is_brand(&self) -> bool {
        matches!(self, Self::Brand(_))
    }

    /// Scope kind without the name: `global`, `brand` or `competitor`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Brand(_) => "brand",
            Self::Competitor(_) => "competitor",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Brand(n) => write!(f, "brand:{n}"),
            Self::Competitor(n) => write!(f, "competitor:{n}"),
        }
    }
}

impl FromStr for Scope {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "global" {
            return Ok(Self::Global);
        }
        match s.split_once(':') {
            Some(("brand", name)) if !name.is_empty() => Ok(Self::Brand(name.to_string())),
            Some(("competitor", name)) if !name.is_empty() => {
                Ok(Self::Competitor(name.to_string()))
            }
            _ => Err(DetectionError::InvalidScope(s.to_string())),
        }
    }
}

impl TryFrom<String> for Scope {
    type Error = DetectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_string()
    }
}
