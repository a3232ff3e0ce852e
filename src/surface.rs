//! Map surface collaborator.
//!
//! Tiling, pan/zoom and compositing live outside this crate. The session
//! drives whatever implements [`MapSurface`] with add/remove/restyle calls.

use std::collections::{BTreeMap, BTreeSet};

use crate::entity::LayerId;
use crate::style::{LineStyle, MarkerIcon};
use crate::{Bounds, GpsPoint, Popup, TrackGeometry};

/// Renderable layer description, borrowed from the owning entity.
#[derive(Debug, Clone, Copy)]
pub enum Layer<'a> {
    Point {
        position: GpsPoint,
        icon: &'a MarkerIcon,
        popup: &'a Popup,
    },
    Line {
        geometry: &'a TrackGeometry,
        style: &'a LineStyle,
        popup: &'a Popup,
    },
    /// Invisible wide stroke over a track's geometry, easing click selection.
    HitTarget {
        geometry: &'a TrackGeometry,
        popup: &'a Popup,
    },
}

impl Layer<'_> {
    pub fn popup(&self) -> &Popup {
        match self {
            Layer::Point { popup, .. } | Layer::Line { popup, .. } | Layer::HitTarget { popup, .. } => *popup,
        }
    }

    pub fn line_style(&self) -> Option<LineStyle> {
        match self {
            Layer::Point { .. } => None,
            Layer::Line { style, .. } => Some((*style).clone()),
            Layer::HitTarget { .. } => Some(LineStyle::hit_target()),
        }
    }
}

/// Operations consumed from the map rendering surface.
pub trait MapSurface {
    fn add_layer(&mut self, id: LayerId, layer: Layer<'_>);

    fn remove_layer(&mut self, id: LayerId);

    fn set_line_weight(&mut self, id: LayerId, weight: f64);

    fn bring_to_front(&mut self, _id: LayerId) {}

    fn open_popup(&mut self, id: LayerId);

    fn fit_bounds(&mut self, bounds: Bounds, padding: [u32; 2]);

    fn set_view(&mut self, center: GpsPoint, zoom: u8);
}

/// Last view change requested from a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    Fit { bounds: Bounds, padding: [u32; 2] },
    Center { center: GpsPoint, zoom: u8 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerRecord {
    pub kind: LayerKind,
    pub title: String,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Point,
    Line,
    HitTarget,
}

/// In-memory surface recording the live layer set, for headless use and tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    layers: BTreeMap<LayerId, LayerRecord>,
    front: Option<LayerId>,
    opened_popups: Vec<LayerId>,
    view: Option<ViewChange>,
    adds: usize,
    removes: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerRecord> {
        self.layers.get(&id)
    }

    pub fn layer_ids(&self) -> BTreeSet<LayerId> {
        self.layers.keys().copied().collect()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Titles of live layers of one kind, in layer id order.
    pub fn titles(&self, kind: LayerKind) -> Vec<&str> {
        self.layers
            .values()
            .filter(|l| l.kind == kind)
            .map(|l| l.title.as_str())
            .collect()
    }

    pub fn front(&self) -> Option<LayerId> {
        self.front
    }

    pub fn opened_popups(&self) -> &[LayerId] {
        &self.opened_popups
    }

    pub fn view(&self) -> Option<&ViewChange> {
        self.view.as_ref()
    }

    /// Total add and remove calls received.
    pub fn churn(&self) -> (usize, usize) {
        (self.adds, self.removes)
    }
}

impl MapSurface for RecordingSurface {
    fn add_layer(&mut self, id: LayerId, layer: Layer<'_>) {
        let kind = match layer {
            Layer::Point { .. } => LayerKind::Point,
            Layer::Line { .. } => LayerKind::Line,
            Layer::HitTarget { .. } => LayerKind::HitTarget,
        };
        self.adds += 1;
        self.layers.insert(
            id,
            LayerRecord {
                kind,
                title: layer.popup().title.clone(),
                weight: layer.line_style().map(|s| s.weight),
            },
        );
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.removes += 1;
        self.layers.remove(&id);
    }

    fn set_line_weight(&mut self, id: LayerId, weight: f64) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.weight = Some(weight);
        }
    }

    fn bring_to_front(&mut self, id: LayerId) {
        self.front = Some(id);
    }

    fn open_popup(&mut self, id: LayerId) {
        self.opened_popups.push(id);
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: [u32; 2]) {
        self.view = Some(ViewChange::Fit { bounds, padding });
    }

    fn set_view(&mut self, center: GpsPoint, zoom: u8) {
        self.view = Some(ViewChange::Center { center, zoom });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_surface_tracks_layers() {
        let mut surface = RecordingSurface::new();
        let icon = MarkerIcon::new("#808080", false);
        let popup = Popup::new("Col de Balme");

        surface.add_layer(
            LayerId(1),
            Layer::Point {
                position: GpsPoint::new(46.0, 7.0),
                icon: &icon,
                popup: &popup,
            },
        );
        assert!(surface.contains(LayerId(1)));
        assert_eq!(surface.titles(LayerKind::Point), vec!["Col de Balme"]);

        surface.remove_layer(LayerId(1));
        assert_eq!(surface.layer_count(), 0);
        assert_eq!(surface.churn(), (1, 1));
    }

    #[test]
    fn test_hit_target_is_transparent() {
        let geometry =
            TrackGeometry::from_segments(&[vec![GpsPoint::new(46.0, 7.0), GpsPoint::new(46.1, 7.1)]])
                .unwrap();
        let popup = Popup::new("x");
        let layer = Layer::HitTarget {
            geometry: &geometry,
            popup: &popup,
        };
        let style = layer.line_style().unwrap();
        assert_eq!(style.opacity, 0.0);
        assert!(style.weight > 6.0);
    }
}
