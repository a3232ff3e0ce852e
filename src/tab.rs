//! Mutually exclusive data scopes shown by the map.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AtlasError;

/// A tab owns its own data source and filter criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Summits,
    Bike,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Summits, Tab::Bike];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Summits => "summits",
            Tab::Bike => "bike",
        }
    }

    /// Track popups list the activity type everywhere except on the bike tab.
    pub fn shows_activity_type(&self) -> bool {
        !matches!(self, Tab::Bike)
    }

    /// Whether the filter panel is offered for this tab.
    pub fn supports_filters(&self) -> bool {
        !matches!(self, Tab::Bike)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summits" => Ok(Tab::Summits),
            "bike" => Ok(Tab::Bike),
            other => Err(AtlasError::Config {
                message: format!("unknown tab '{}'", other),
            }),
        }
    }
}
