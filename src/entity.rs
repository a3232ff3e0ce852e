//! Marker and track entities.
//!
//! A marker is keyed by record `name`, a track by `display_name`. Both carry
//! the category fields the filter engine reads and the layer ids under which
//! they are rendered.

use std::fmt;

use crate::style::{LineStyle, LineWeight, MarkerIcon};
use crate::surface::Layer;
use crate::{Bounds, GpsPoint, Popup, Tab, TrackGeometry};

/// Completion status as exposed to filters ("completed" / "to do").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Completed,
    ToDo,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Completed => "completed",
            Status::ToDo => "to do",
        }
    }

    pub fn from_completion(completed: bool) -> Self {
        if completed {
            Status::Completed
        } else {
            Status::ToDo
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle of one renderable layer on the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// Monotonic layer id source. Ids are never reused within a session so a
/// late operation on a torn-down layer cannot hit a new one.
#[derive(Debug, Default)]
pub struct LayerIds {
    next: u64,
}

impl LayerIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> LayerId {
        self.next += 1;
        LayerId(self.next)
    }
}

/// Point entity for a named destination.
#[derive(Debug, Clone)]
pub struct Marker {
    pub name: String,
    pub position: GpsPoint,
    pub icon: MarkerIcon,
    pub popup: Popup,
    pub activity_type: String,
    pub status: Status,
    pub season: String,
    pub tab: Tab,
    pub layer: LayerId,
    pub(crate) visible: bool,
}

impl Marker {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn layer_spec(&self) -> Layer<'_> {
        Layer::Point {
            position: self.position,
            icon: &self.icon,
            popup: &self.popup,
        }
    }
}

/// Line entity for a recorded route.
///
/// Rendered as two layers over the same geometry: the styled line and a
/// wide invisible hit target. They are always shown and hidden together.
#[derive(Debug, Clone)]
pub struct Track {
    pub display_name: String,
    pub track_file_id: String,
    pub geometry: TrackGeometry,
    pub bounds: Option<Bounds>,
    pub style: LineStyle,
    pub popup: Popup,
    pub activity_type: String,
    pub season: String,
    pub tab: Tab,
    pub line_layer: LayerId,
    pub hit_layer: LayerId,
    pub(crate) weight: LineWeight,
    pub(crate) visible: bool,
}

impl Track {
    /// Tracks exist only for recorded activities.
    pub fn status(&self) -> Status {
        Status::Completed
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn weight(&self) -> LineWeight {
        self.weight
    }

    pub fn layers(&self) -> [LayerId; 2] {
        [self.line_layer, self.hit_layer]
    }

    pub fn line_layer_spec(&self) -> Layer<'_> {
        Layer::Line {
            geometry: &self.geometry,
            style: &self.style,
            popup: &self.popup,
        }
    }

    pub fn hit_layer_spec(&self) -> Layer<'_> {
        Layer::HitTarget {
            geometry: &self.geometry,
            popup: &self.popup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(Status::Completed.as_str(), "completed");
        assert_eq!(Status::ToDo.to_string(), "to do");
        assert_eq!(Status::from_completion(true), Status::Completed);
        assert_eq!(Status::from_completion(false), Status::ToDo);
    }
}
