//! Focus navigator: turn a selected name into a framing directive.
//!
//! A track with the given display name takes precedence because it carries a
//! bounding region. Only when no track matches is a marker looked up by
//! `name`. An unknown name resolves to `None`.

use std::collections::HashMap;

use crate::entity::LayerId;
use crate::style::LineWeight;
use crate::{Bounds, FocusOptions, GpsPoint, Marker, Track};

#[derive(Debug, Clone, PartialEq)]
pub enum FocusTarget {
    Track {
        display_name: String,
        /// Present only when the track's bounds are valid.
        bounds: Option<Bounds>,
        padding: [u32; 2],
        line_layer: LayerId,
        highlight: LineWeight,
        open_popup: bool,
    },
    Marker {
        name: String,
        center: GpsPoint,
        zoom: u8,
        layer: LayerId,
        open_popup: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FocusDirective {
    pub target: FocusTarget,
    /// Line layers of every other track, to be returned to normal weight.
    pub reset: Vec<LayerId>,
}

impl FocusDirective {
    pub fn is_track(&self) -> bool {
        matches!(self.target, FocusTarget::Track { .. })
    }

    /// Line layer that will be emphasized, if a track is focused.
    pub fn emphasized_layer(&self) -> Option<LayerId> {
        match &self.target {
            FocusTarget::Track { line_layer, .. } => Some(*line_layer),
            FocusTarget::Marker { .. } => None,
        }
    }
}

/// Resolve `name` against the live entities.
pub fn resolve(
    name: &str,
    markers: &[Marker],
    marker_index: &HashMap<String, usize>,
    tracks: &[Track],
    track_index: &HashMap<String, usize>,
    options: &FocusOptions,
) -> Option<FocusDirective> {
    if let Some(track) = track_index.get(name).and_then(|&i| tracks.get(i)) {
        let reset = tracks
            .iter()
            .filter(|t| t.line_layer != track.line_layer)
            .map(|t| t.line_layer)
            .collect();
        return Some(FocusDirective {
            target: FocusTarget::Track {
                display_name: track.display_name.clone(),
                bounds: track.bounds.filter(Bounds::is_valid),
                padding: options.padding,
                line_layer: track.line_layer,
                highlight: LineWeight::Emphasized,
                open_popup: true,
            },
            reset,
        });
    }

    let marker = marker_index.get(name).and_then(|&i| markers.get(i))?;
    Some(FocusDirective {
        target: FocusTarget::Marker {
            name: marker.name.clone(),
            center: marker.position,
            zoom: options.marker_zoom,
            layer: marker.layer,
            open_popup: true,
        },
        reset: tracks.iter().map(|t| t.line_layer).collect(),
    })
}
