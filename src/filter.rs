//! Filter engine.
//!
//! Every non-"all" criterion must equal the entity's field exactly (case
//! sensitive, as stored). Entities outside the active tab are never visible.

use std::convert::Infallible;
use std::str::FromStr;

use crate::{Marker, Status, Tab, Track};

/// One filter dropdown value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn only(value: impl Into<String>) -> Self {
        Selection::Only(value.into())
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }
}

impl FromStr for Selection {
    type Err = Infallible;

    /// `"all"` is the wildcard, any other value is matched exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "all" => Selection::All,
            other => Selection::Only(other.to_string()),
        })
    }
}

impl From<&str> for Selection {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(selection) => selection,
            Err(never) => match never {},
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub activity_type: Selection,
    pub status: Selection,
    pub season: Selection,
}

impl FilterCriteria {
    /// Criteria that show everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build from raw dropdown values.
    pub fn from_values(activity_type: &str, status: &str, season: &str) -> Self {
        Self {
            activity_type: activity_type.into(),
            status: status.into(),
            season: season.into(),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        *self == Self::all()
    }
}

/// Category fields the filter engine reads.
pub trait Filterable {
    fn tab(&self) -> Tab;
    fn activity_type(&self) -> &str;
    fn status(&self) -> Status;
    fn season(&self) -> &str;
}

impl Filterable for Marker {
    fn tab(&self) -> Tab {
        self.tab
    }
    fn activity_type(&self) -> &str {
        &self.activity_type
    }
    fn status(&self) -> Status {
        self.status
    }
    fn season(&self) -> &str {
        &self.season
    }
}

impl Filterable for Track {
    fn tab(&self) -> Tab {
        self.tab
    }
    fn activity_type(&self) -> &str {
        &self.activity_type
    }
    fn status(&self) -> Status {
        Track::status(self)
    }
    fn season(&self) -> &str {
        &self.season
    }
}

/// Visibility of a single entity under `criteria` while `active_tab` is shown.
pub fn evaluate<E: Filterable + ?Sized>(entity: &E, criteria: &FilterCriteria, active_tab: Tab) -> bool {
    entity.tab() == active_tab
        && criteria.activity_type.matches(entity.activity_type())
        && criteria.status.matches(entity.status().as_str())
        && criteria.season.matches(entity.season())
}

/// Visibility set over the whole live entity set, index-aligned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Visibility {
    pub markers: Vec<bool>,
    pub tracks: Vec<bool>,
}

impl Visibility {
    pub fn visible_count(&self) -> usize {
        self.markers.iter().chain(&self.tracks).filter(|v| **v).count()
    }
}

/// Full re-evaluation; no state is carried between calls.
pub fn evaluate_all(
    markers: &[Marker],
    tracks: &[Track],
    criteria: &FilterCriteria,
    active_tab: Tab,
) -> Visibility {
    Visibility {
        markers: markers.iter().map(|m| evaluate(m, criteria, active_tab)).collect(),
        tracks: tracks.iter().map(|t| evaluate(t, criteria, active_tab)).collect(),
    }
}
