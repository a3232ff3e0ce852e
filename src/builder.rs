//! Entity builder: records to markers and pending tracks.
//!
//! Markers are built synchronously. Tracks need their geometry first, so the
//! builder emits a [`TrackDraft`] carrying everything except the geometry and
//! the load pipeline completes it once the fetch resolves.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::entity::{LayerIds, Marker, Status, Track};
use crate::style::{self, LineStyle, LineWeight, MarkerIcon};
use crate::{ActivityRecord, Popup, Tab, TrackGeometry};

/// A track whose geometry has not arrived yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDraft {
    pub display_name: String,
    pub track_file_id: String,
    pub style: LineStyle,
    pub popup: Popup,
    pub activity_type: String,
    pub season: String,
    pub tab: Tab,
}

impl TrackDraft {
    pub fn from_record(record: &ActivityRecord, tab: Tab) -> Option<Self> {
        if !record.has_track() {
            return None;
        }
        let track_file_id = record.track_file_id.clone()?;
        let color = style::track_color(&record.activity_type, &record.project, tab);

        Some(Self {
            display_name: record.display_name.clone(),
            track_file_id,
            style: LineStyle::visible(color),
            popup: Popup::for_track(record, tab),
            activity_type: record.activity_type.clone(),
            season: record.season.clone(),
            tab,
        })
    }

    /// Complete the track with its geometry and layer handles. Starts hidden
    /// at normal weight; the session decides visibility on insertion.
    pub fn into_track(self, geometry: TrackGeometry, layer_ids: &mut LayerIds) -> Track {
        let bounds = geometry.bounds();
        Track {
            display_name: self.display_name,
            track_file_id: self.track_file_id,
            geometry,
            bounds,
            style: self.style,
            popup: self.popup,
            activity_type: self.activity_type,
            season: self.season,
            tab: self.tab,
            line_layer: layer_ids.next_id(),
            hit_layer: layer_ids.next_id(),
            weight: LineWeight::Normal,
            visible: false,
        }
    }
}

/// Output of one build pass.
#[derive(Debug, Default)]
pub struct BuildOutput {
    /// Markers in first-seen order.
    pub markers: Vec<Marker>,
    /// Track drafts in row order. Not deduplicated by file.
    pub drafts: Vec<TrackDraft>,
    /// Marker name -> index into `markers`.
    pub marker_index: HashMap<String, usize>,
    pub rows: usize,
    /// Rows whose marker lost to an earlier row with the same name.
    pub duplicate_markers: usize,
    /// Rows without a valid position (no marker).
    pub unlocated_rows: usize,
}

/// Turns records of one tab into entities, first marker per name wins.
pub struct EntityBuilder<'a> {
    tab: Tab,
    layer_ids: &'a mut LayerIds,
    seen_names: HashSet<String>,
}

impl<'a> EntityBuilder<'a> {
    pub fn new(tab: Tab, layer_ids: &'a mut LayerIds) -> Self {
        Self {
            tab,
            layer_ids,
            seen_names: HashSet::new(),
        }
    }

    /// Build the marker for a record, unless its name was already used in this
    /// pass or it has no usable position.
    pub fn marker(&mut self, record: &ActivityRecord) -> Option<Marker> {
        if record.name.is_empty() {
            return None;
        }
        let position = record.position()?;
        if !self.seen_names.insert(record.name.clone()) {
            debug!("[EntityBuilder] Duplicate marker name '{}' ignored", record.name);
            return None;
        }

        let status = Status::from_completion(record.is_completed());
        let color = style::marker_color(&record.project, self.tab);

        Some(Marker {
            name: record.name.clone(),
            position,
            icon: MarkerIcon::new(color, record.is_completed()),
            popup: Popup::for_marker(record, status),
            activity_type: record.activity_type.clone(),
            status,
            season: record.season.clone(),
            tab: self.tab,
            layer: self.layer_ids.next_id(),
            visible: false,
        })
    }

    pub fn track_draft(&self, record: &ActivityRecord) -> Option<TrackDraft> {
        TrackDraft::from_record(record, self.tab)
    }

    /// Consume a record sequence in order.
    pub fn build<I>(mut self, records: I) -> BuildOutput
    where
        I: IntoIterator<Item = ActivityRecord>,
    {
        let mut output = BuildOutput::default();

        for record in records {
            output.rows += 1;

            if record.position().is_none() {
                output.unlocated_rows += 1;
            } else if !record.name.is_empty() && self.seen_names.contains(&record.name) {
                output.duplicate_markers += 1;
            }

            if let Some(marker) = self.marker(&record) {
                output
                    .marker_index
                    .insert(marker.name.clone(), output.markers.len());
                output.markers.push(marker);
            }
            if let Some(draft) = self.track_draft(&record) {
                output.drafts.push(draft);
            }
        }

        output
    }
}
