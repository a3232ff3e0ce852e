//! # Atlas Engine
//!
//! UI-facing entry point tying a data source, a map surface and the session
//! together. One engine serves one map:
//! - `load_data` / `switch_tab` reload the active tab
//! - `apply_filters` re-evaluates visibility
//! - `search` and `focus` back the search box
//!
//! The engine drives a single load at a time. Callers that need to overlap
//! loads (a tab switch while geometry is still in flight) use the
//! [`AtlasSession`] two-phase API directly; its tickets keep late results out.

use futures::stream::{self, StreamExt};
use log::{info, warn};

use crate::filter::FilterCriteria;
use crate::focus::FocusDirective;
use crate::session::{AttachOutcome, LoadTicket};
use crate::{AtlasConfig, AtlasSession, AtlasSource, MapSurface, Result, Tab};

/// Outcome of one completed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub tab: Tab,
    pub generation: u64,
    pub markers: usize,
    pub tracks: usize,
    pub fetch_failures: usize,
}

pub struct AtlasEngine<S: AtlasSource, M: MapSurface> {
    config: AtlasConfig,
    source: S,
    surface: M,
    session: AtlasSession,
}

impl<S: AtlasSource, M: MapSurface> AtlasEngine<S, M> {
    pub fn new(config: AtlasConfig, source: S, surface: M) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            surface,
            session: AtlasSession::new(),
        })
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Tear down the current tab and load `tab` from the source.
    ///
    /// Only a failed activity log fetch is an error. Individual geometry
    /// failures are logged and leave that track out.
    pub async fn load_data(&mut self, tab: Tab) -> Result<LoadSummary> {
        let ticket = self.session.begin_load(tab, &mut self.surface);
        self.finish_load(ticket).await
    }

    /// Load `tab` and move the view to its default center and zoom.
    pub async fn switch_tab(&mut self, tab: Tab) -> Result<LoadSummary> {
        let ticket = self.session.begin_load(tab, &mut self.surface);
        let tab_config = self.config.tab(tab);
        self.surface
            .set_view(tab_config.default_center, tab_config.default_zoom);
        self.finish_load(ticket).await
    }

    async fn finish_load(&mut self, ticket: LoadTicket) -> Result<LoadSummary> {
        let Self {
            config,
            source,
            surface,
            session,
        } = self;

        let text = match source.fetch_records(ticket.tab).await {
            Ok(text) => text,
            Err(e) => {
                warn!("[AtlasEngine] Activity log for {} unavailable: {}", ticket.tab, e);
                return Err(e);
            }
        };
        let requests = session.ingest_records(&ticket, &text, &mut *surface)?;

        // `buffered` keeps row order, so tracks (and search results) follow the log
        let source = &*source;
        let mut fetches = stream::iter(requests)
            .map(|request| async move {
                let fetched = source
                    .fetch_geometry(request.ticket.tab, request.track_file_id())
                    .await;
                (request, fetched)
            })
            .buffered(config.fetch_concurrency);

        let mut failures = 0;
        while let Some((request, fetched)) = fetches.next().await {
            if session.attach_track(request, fetched, &mut *surface) == AttachOutcome::Failed {
                failures += 1;
            }
        }

        let summary = LoadSummary {
            tab: ticket.tab,
            generation: ticket.generation,
            markers: session.markers().len(),
            tracks: session.tracks().len(),
            fetch_failures: failures,
        };
        info!(
            "[AtlasEngine] Loaded {}: {} markers, {} tracks, {} failed",
            summary.tab, summary.markers, summary.tracks, summary.fetch_failures
        );
        Ok(summary)
    }

    // ========================================================================
    // Interaction
    // ========================================================================

    /// Apply criteria to the active tab. Returns the visible entity count.
    pub fn apply_filters(&mut self, criteria: FilterCriteria) -> usize {
        self.session.apply_filters(criteria, &mut self.surface)
    }

    /// Display names matching `term`, in load order.
    pub fn search(&self, term: &str) -> Vec<String> {
        self.session
            .search(term)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Frame and emphasize `name`. `None` for unknown names.
    pub fn focus(&mut self, name: &str) -> Option<FocusDirective> {
        let directive = self.session.focus(name, &self.config.focus_options())?;
        self.session.apply_focus(&directive, &mut self.surface);
        Some(directive)
    }

    pub fn select_track(&mut self, display_name: &str) -> bool {
        self.session.select_track(display_name, &mut self.surface)
    }

    pub fn release_track(&mut self, display_name: &str) -> bool {
        self.session.release_track(display_name, &mut self.surface)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn session(&self) -> &AtlasSession {
        &self.session
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut M {
        &mut self.surface
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn active_tab(&self) -> Tab {
        self.session.active_tab()
    }

    /// Whether the UI should offer the filter panel for the active tab.
    pub fn filters_available(&self) -> bool {
        self.session.active_tab().supports_filters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use futures::executor::block_on;
    use futures::future::{BoxFuture, FutureExt};

    use crate::surface::{LayerKind, ViewChange};
    use crate::{AtlasError, GpsPoint, RecordingSurface, TrackGeometry};

    const SUMMITS: &str = "header
Dent Blanche,4357,46.034,7.612,Summer,Mountaineering,AD,,9.5,,dent_blanche,4000,Dent_Blanche
Grand Combin,4314,45.937,7.299,Spring,Ski touring,,,,,,4000,
";

    const BIKE: &str = "header
,,,,Summer,Bike,,112,5.25,1400,day_1,Morges to Como,Day_1
";

    #[derive(Default)]
    struct MemorySource {
        records: HashMap<Tab, String>,
        geometry: HashMap<String, String>,
    }

    impl AtlasSource for MemorySource {
        fn fetch_records(&self, tab: Tab) -> BoxFuture<'_, Result<String>> {
            let result = self.records.get(&tab).cloned().ok_or_else(|| AtlasError::Fetch {
                path: tab.to_string(),
                message: "Not Found".to_string(),
                status_code: Some(404),
            });
            async move { result }.boxed()
        }

        fn fetch_geometry<'a>(&'a self, _tab: Tab, id: &'a str) -> BoxFuture<'a, Result<TrackGeometry>> {
            async move {
                let json = self.geometry.get(id).ok_or_else(|| AtlasError::Fetch {
                    path: id.to_string(),
                    message: "Not Found".to_string(),
                    status_code: Some(404),
                })?;
                TrackGeometry::from_geojson_str(id, json)
            }
            .boxed()
        }
    }

    fn source() -> MemorySource {
        let mut source = MemorySource::default();
        source.records.insert(Tab::Summits, SUMMITS.to_string());
        source.records.insert(Tab::Bike, BIKE.to_string());
        source.geometry.insert(
            "dent_blanche".to_string(),
            r#"{"type": "LineString", "coordinates": [[7.60, 46.02], [7.61, 46.03]]}"#.to_string(),
        );
        source.geometry.insert(
            "day_1".to_string(),
            r#"{"type": "LineString", "coordinates": [[6.50, 46.51], [8.90, 45.81]]}"#.to_string(),
        );
        source
    }

    fn engine() -> AtlasEngine<MemorySource, RecordingSurface> {
        AtlasEngine::new(AtlasConfig::default(), source(), RecordingSurface::new()).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AtlasConfig::default();
        config.fetch_concurrency = 0;
        let result = AtlasEngine::new(config, source(), RecordingSurface::new());
        assert!(matches!(result, Err(AtlasError::Config { .. })));
    }

    #[test]
    fn test_load_summits() {
        let mut engine = engine();
        let summary = block_on(engine.load_data(Tab::Summits)).unwrap();

        assert!(engine.filters_available());
        assert_eq!(summary.markers, 2);
        assert_eq!(summary.tracks, 1);
        assert_eq!(summary.fetch_failures, 0);
        assert_eq!(engine.surface().titles(LayerKind::Line), vec!["Dent Blanche"]);
        assert_eq!(engine.search("dent"), vec!["Dent Blanche"]);
    }

    #[test]
    fn test_switch_tab_replaces_everything() {
        let mut engine = engine();
        block_on(engine.load_data(Tab::Summits)).unwrap();
        let summary = block_on(engine.switch_tab(Tab::Bike)).unwrap();

        assert_eq!(summary.tab, Tab::Bike);
        assert_eq!(summary.markers, 0);
        assert!(!engine.filters_available());
        assert_eq!(engine.surface().titles(LayerKind::Point), Vec::<&str>::new());
        assert_eq!(engine.surface().titles(LayerKind::Line), vec!["Day 1"]);
        assert!(engine.search("dent").is_empty());
        assert_eq!(
            engine.surface().view(),
            Some(&ViewChange::Center {
                center: GpsPoint::new(46.2, 7.5),
                zoom: 6
            })
        );
    }

    #[test]
    fn test_missing_log_is_error_and_leaves_map_empty() {
        let mut engine = engine();
        block_on(engine.load_data(Tab::Summits)).unwrap();
        engine.source.records.remove(&Tab::Bike);

        let err = block_on(engine.switch_tab(Tab::Bike)).unwrap_err();
        assert!(matches!(err, AtlasError::Fetch { status_code: Some(404), .. }));
        assert_eq!(engine.surface().layer_count(), 0);
        assert_eq!(engine.active_tab(), Tab::Bike);
    }

    #[test]
    fn test_missing_geometry_counts_as_failure() {
        let mut engine = engine();
        engine.source.geometry.remove("dent_blanche");

        let summary = block_on(engine.load_data(Tab::Summits)).unwrap();
        assert_eq!(summary.tracks, 0);
        assert_eq!(summary.fetch_failures, 1);
        assert_eq!(summary.markers, 2);
    }

    #[test]
    fn test_focus_and_filters() {
        let mut engine = engine();
        block_on(engine.load_data(Tab::Summits)).unwrap();

        let directive = engine.focus("Dent Blanche").unwrap();
        let layer = directive.emphasized_layer().unwrap();
        assert_eq!(engine.surface().layer(layer).unwrap().weight, Some(6.0));
        assert!(matches!(engine.surface().view(), Some(ViewChange::Fit { .. })));
        assert!(engine.focus("Matterhorn").is_none());

        let visible = engine.apply_filters(FilterCriteria::from_values("all", "to do", "all"));
        assert_eq!(visible, 1);
        assert_eq!(engine.surface().titles(LayerKind::Point), vec!["Grand Combin (4314m)"]);
    }
}
