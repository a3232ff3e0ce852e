//! # Atlas Session
//!
//! Single owner of all mutable map state and the two-phase load pipeline.
//!
//! ## Load cycle
//!
//! 1. [`AtlasSession::begin_load`] tears down every entity of the previous
//!    cycle (surface layers, name indexes, search index, fetch dedup set) and
//!    bumps the generation. This is synchronous and completes before any
//!    fetch of the new cycle is issued.
//! 2. [`AtlasSession::ingest_records`] parses the activity log, inserts
//!    markers and returns one [`GeometryRequest`] per distinct track file.
//! 3. [`AtlasSession::attach_track`] completes each track when its geometry
//!    arrives, in whatever order the caller resolves them.
//!
//! Every continuation carries the [`LoadTicket`] of the cycle that issued it.
//! A ticket from a superseded cycle mutates nothing, so a slow fetch from a
//! previous tab can never resurrect entities after a reload. Each cycle
//! ingests its activity log exactly once.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use crate::entity::{LayerIds, Marker, Track};
use crate::filter::{self, FilterCriteria, Selection};
use crate::focus::{self, FocusDirective, FocusTarget};
use crate::style::LineWeight;
use crate::{
    parse_records, AtlasError, EntityBuilder, FocusOptions, MapSurface, Result, SearchIndex, Tab,
    TrackDraft, TrackGeometry,
};

static UNRESTRICTED: FilterCriteria = FilterCriteria {
    activity_type: Selection::All,
    status: Selection::All,
    season: Selection::All,
};

/// Identifies one load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub tab: Tab,
    pub generation: u64,
}

/// A pending geometry fetch and the track it will complete.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRequest {
    pub ticket: LoadTicket,
    pub draft: TrackDraft,
}

impl GeometryRequest {
    pub fn track_file_id(&self) -> &str {
        &self.draft.track_file_id
    }
}

/// What happened to a fetched geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    /// Fetch or parse failed; the track is omitted.
    Failed,
    /// The issuing load cycle was superseded; nothing changed.
    Stale,
}

/// Counters for the current load cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub generation: u64,
    pub rows: u32,
    pub skipped_rows: u32,
    pub unlocated_rows: u32,
    pub markers: u32,
    pub duplicate_markers: u32,
    pub geometry_requests: u32,
    pub dedup_hits: u32,
    pub name_collisions: u32,
    pub tracks: u32,
    pub fetch_failures: u32,
    pub stale_results: u32,
}

/// The whole live state of the map.
pub struct AtlasSession {
    active_tab: Tab,
    generation: u64,

    markers: Vec<Marker>,
    tracks: Vec<Track>,
    marker_index: HashMap<String, usize>,
    track_index: HashMap<String, usize>,
    search: SearchIndex,

    // (tab, track file id) already requested in this cycle
    requested_files: HashSet<(Tab, String)>,
    // display name -> track file id that claimed it in this cycle
    claimed_names: HashMap<String, String>,

    // records of the current cycle were ingested
    ingested: bool,

    criteria: HashMap<Tab, FilterCriteria>,
    layer_ids: LayerIds,
    stats: SessionStats,
}

impl AtlasSession {
    pub fn new() -> Self {
        Self {
            active_tab: Tab::default(),
            generation: 0,
            markers: Vec::new(),
            tracks: Vec::new(),
            marker_index: HashMap::new(),
            track_index: HashMap::new(),
            search: SearchIndex::new(),
            requested_files: HashSet::new(),
            claimed_names: HashMap::new(),
            ingested: false,
            criteria: HashMap::new(),
            layer_ids: LayerIds::new(),
            stats: SessionStats::default(),
        }
    }

    // ========================================================================
    // Load pipeline
    // ========================================================================

    /// Remove every entity from the surface and drop all per-cycle state.
    ///
    /// Bumps the generation, so tickets issued before the reset go stale.
    /// Filter criteria and the layer id counter survive.
    pub fn reset_state(&mut self, surface: &mut dyn MapSurface) {
        for marker in &self.markers {
            if marker.visible {
                surface.remove_layer(marker.layer);
            }
        }
        for track in &self.tracks {
            if track.visible {
                for id in track.layers() {
                    surface.remove_layer(id);
                }
            }
        }

        self.markers.clear();
        self.tracks.clear();
        self.marker_index.clear();
        self.track_index.clear();
        self.search.clear();
        self.requested_files.clear();
        self.claimed_names.clear();
        self.ingested = false;
        self.generation += 1;
        self.stats = SessionStats {
            generation: self.generation,
            ..SessionStats::default()
        };
    }

    /// Start a new load cycle for `tab`. Previous state is gone when this returns.
    pub fn begin_load(&mut self, tab: Tab, surface: &mut dyn MapSurface) -> LoadTicket {
        self.reset_state(surface);
        self.active_tab = tab;

        info!("[AtlasSession] Load cycle {} started for tab {}", self.generation, tab);

        LoadTicket {
            tab,
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && ticket.tab == self.active_tab
    }

    fn ensure_current(&self, ticket: &LoadTicket) -> Result<()> {
        if self.is_current(ticket) {
            Ok(())
        } else {
            Err(AtlasError::StaleLoad {
                generation: ticket.generation,
                current: self.generation,
            })
        }
    }

    /// Build markers from the raw activity log and plan geometry fetches.
    ///
    /// Markers are on the surface when this returns. The returned requests
    /// are unique per `(tab, track file id)` and per display name. A second
    /// call for the same cycle is rejected with `AlreadyIngested`.
    ///
    /// A display name is claimed by the first file planned for it. Later
    /// files with the same display name are skipped even if the claimant's
    /// fetch fails, in which case no track carries that name this cycle.
    pub fn ingest_records(
        &mut self,
        ticket: &LoadTicket,
        text: &str,
        surface: &mut dyn MapSurface,
    ) -> Result<Vec<GeometryRequest>> {
        if let Err(e) = self.ensure_current(ticket) {
            self.stats.stale_results += 1;
            warn!("[AtlasSession] Dropping activity log: {}", e);
            return Err(e);
        }
        if self.ingested {
            warn!(
                "[AtlasSession] Activity log of cycle {} already ingested",
                ticket.generation
            );
            return Err(AtlasError::AlreadyIngested {
                generation: ticket.generation,
            });
        }
        self.ingested = true;

        let mut records = parse_records(text);
        let output = EntityBuilder::new(ticket.tab, &mut self.layer_ids).build(records.by_ref());

        self.stats.rows = output.rows as u32;
        self.stats.skipped_rows = records.skipped() as u32;
        self.stats.unlocated_rows = output.unlocated_rows as u32;
        self.stats.duplicate_markers = output.duplicate_markers as u32;

        let criteria = self.criteria_for(ticket.tab).clone();
        for mut marker in output.markers {
            marker.visible = filter::evaluate(&marker, &criteria, self.active_tab);
            if marker.visible {
                surface.add_layer(marker.layer, marker.layer_spec());
            }
            self.marker_index.insert(marker.name.clone(), self.markers.len());
            self.markers.push(marker);
        }
        self.stats.markers = self.markers.len() as u32;

        let mut requests = Vec::new();
        for draft in output.drafts {
            let key = (ticket.tab, draft.track_file_id.clone());
            if !self.requested_files.insert(key) {
                self.stats.dedup_hits += 1;
                debug!(
                    "[AtlasSession] Geometry '{}' already requested this cycle",
                    draft.track_file_id
                );
                continue;
            }
            if let Some(owner) = self.claimed_names.get(&draft.display_name) {
                self.stats.name_collisions += 1;
                warn!(
                    "[AtlasSession] Display name '{}' already used by '{}', skipping '{}'",
                    draft.display_name, owner, draft.track_file_id
                );
                continue;
            }
            self.claimed_names
                .insert(draft.display_name.clone(), draft.track_file_id.clone());
            requests.push(GeometryRequest {
                ticket: *ticket,
                draft,
            });
        }
        self.stats.geometry_requests = requests.len() as u32;

        info!(
            "[AtlasSession] Cycle {}: {} rows, {} markers, {} geometry requests",
            ticket.generation,
            self.stats.rows,
            self.stats.markers,
            requests.len()
        );

        Ok(requests)
    }

    /// Complete a track with its fetched geometry.
    pub fn attach_track(
        &mut self,
        request: GeometryRequest,
        fetched: Result<TrackGeometry>,
        surface: &mut dyn MapSurface,
    ) -> AttachOutcome {
        if !self.is_current(&request.ticket) {
            self.stats.stale_results += 1;
            debug!(
                "[AtlasSession] Discarding geometry '{}' from superseded cycle {}",
                request.draft.track_file_id, request.ticket.generation
            );
            return AttachOutcome::Stale;
        }

        let geometry = match fetched {
            Ok(geometry) => geometry,
            Err(e) => {
                self.stats.fetch_failures += 1;
                warn!(
                    "[AtlasSession] Track '{}' omitted: {}",
                    request.draft.display_name, e
                );
                return AttachOutcome::Failed;
            }
        };

        let mut track = request.draft.into_track(geometry, &mut self.layer_ids);
        track.visible = filter::evaluate(&track, self.criteria_for(track.tab), self.active_tab);
        if track.visible {
            surface.add_layer(track.line_layer, track.line_layer_spec());
            surface.add_layer(track.hit_layer, track.hit_layer_spec());
        }

        self.search.insert(&track.display_name);
        self.track_index
            .insert(track.display_name.clone(), self.tracks.len());
        self.tracks.push(track);
        self.stats.tracks = self.tracks.len() as u32;

        AttachOutcome::Attached
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Criteria last applied on `tab`; unrestricted until the first apply.
    pub fn criteria_for(&self, tab: Tab) -> &FilterCriteria {
        self.criteria.get(&tab).unwrap_or(&UNRESTRICTED)
    }

    /// Store `criteria` for the active tab and re-evaluate every live entity.
    ///
    /// Returns the number of visible entities (a track counts once).
    pub fn apply_filters(&mut self, criteria: FilterCriteria, surface: &mut dyn MapSurface) -> usize {
        let tab = self.active_tab;
        let visibility = filter::evaluate_all(&self.markers, &self.tracks, &criteria, tab);

        for (marker, visible) in self.markers.iter_mut().zip(&visibility.markers) {
            if marker.visible != *visible {
                if *visible {
                    surface.add_layer(marker.layer, marker.layer_spec());
                } else {
                    surface.remove_layer(marker.layer);
                }
                marker.visible = *visible;
            }
        }

        for (track, visible) in self.tracks.iter_mut().zip(&visibility.tracks) {
            if track.visible != *visible {
                if *visible {
                    surface.add_layer(track.line_layer, track.line_layer_spec());
                    surface.add_layer(track.hit_layer, track.hit_layer_spec());
                    if track.weight != LineWeight::Normal {
                        surface.set_line_weight(track.line_layer, track.weight.pixels());
                    }
                } else {
                    for id in track.layers() {
                        surface.remove_layer(id);
                    }
                }
                track.visible = *visible;
            }
        }

        debug!(
            "[AtlasSession] Filters applied on {}: {} visible",
            tab,
            visibility.visible_count()
        );
        self.criteria.insert(tab, criteria);
        visibility.visible_count()
    }

    // ========================================================================
    // Search and focus
    // ========================================================================

    pub fn search(&self, term: &str) -> Vec<&str> {
        self.search.query(term)
    }

    pub fn focus(&self, name: &str, options: &FocusOptions) -> Option<FocusDirective> {
        focus::resolve(
            name,
            &self.markers,
            &self.marker_index,
            &self.tracks,
            &self.track_index,
            options,
        )
    }

    /// Carry out a focus directive on the surface and record track weights.
    pub fn apply_focus(&mut self, directive: &FocusDirective, surface: &mut dyn MapSurface) {
        for track in self.tracks.iter_mut() {
            if directive.reset.contains(&track.line_layer) {
                track.weight = LineWeight::Normal;
                if track.visible {
                    surface.set_line_weight(track.line_layer, LineWeight::Normal.pixels());
                }
            }
        }

        match &directive.target {
            FocusTarget::Track {
                bounds,
                padding,
                line_layer,
                highlight,
                open_popup,
                ..
            } => {
                // A filtered-out track is framed but its layers are not on the surface
                let mut visible = false;
                if let Some(track) = self.tracks.iter_mut().find(|t| t.line_layer == *line_layer) {
                    track.weight = *highlight;
                    visible = track.visible;
                }
                if visible {
                    surface.bring_to_front(*line_layer);
                    surface.set_line_weight(*line_layer, highlight.pixels());
                }
                if let Some(bounds) = bounds {
                    surface.fit_bounds(*bounds, *padding);
                }
                if visible && *open_popup {
                    surface.open_popup(*line_layer);
                }
            }
            FocusTarget::Marker {
                center,
                zoom,
                layer,
                open_popup,
                ..
            } => {
                surface.set_view(*center, *zoom);
                let visible = self.markers.iter().any(|m| m.layer == *layer && m.visible);
                if visible && *open_popup {
                    surface.open_popup(*layer);
                }
            }
        }
    }

    /// Emphasize a clicked track and bring it to the front.
    pub fn select_track(&mut self, display_name: &str, surface: &mut dyn MapSurface) -> bool {
        self.set_track_weight(display_name, LineWeight::Emphasized, surface)
    }

    /// Return a track to normal weight when its popup closes.
    pub fn release_track(&mut self, display_name: &str, surface: &mut dyn MapSurface) -> bool {
        self.set_track_weight(display_name, LineWeight::Normal, surface)
    }

    fn set_track_weight(
        &mut self,
        display_name: &str,
        weight: LineWeight,
        surface: &mut dyn MapSurface,
    ) -> bool {
        let Some(&i) = self.track_index.get(display_name) else {
            return false;
        };
        let track = &mut self.tracks[i];
        track.weight = weight;
        if track.visible {
            if weight == LineWeight::Emphasized {
                surface.bring_to_front(track.line_layer);
            }
            surface.set_line_weight(track.line_layer, weight.pixels());
        }
        true
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn marker(&self, name: &str) -> Option<&Marker> {
        self.marker_index.get(name).map(|&i| &self.markers[i])
    }

    pub fn track(&self, display_name: &str) -> Option<&Track> {
        self.track_index.get(display_name).map(|&i| &self.tracks[i])
    }

    pub fn search_index(&self) -> &SearchIndex {
        &self.search
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}

impl Default for AtlasSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
