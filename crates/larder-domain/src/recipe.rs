//! Recipe provenance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::household::UnknownVariant;

/// Where a recipe came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Manual,
    SiteImport,
    AiGenerated,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::SiteImport => "site_import",
            Self::AiGenerated => "ai_generated",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "site_import" => Ok(Self::SiteImport),
            "ai_generated" => Ok(Self::AiGenerated),
            other => Err(UnknownVariant {
                kind: "source type",
                value: other.to_owned(),
            }),
        }
    }
}
