//! Atlas configuration.
//!
//! Paths are relative to whatever root the active [`AtlasSource`](crate::AtlasSource)
//! resolves against: a directory for [`FileSource`](crate::FileSource), a base
//! URL for the HTTP source.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{AtlasError, GpsPoint, Result, Tab};

/// Per-tab data locations and default view.
///
/// Inside an [`AtlasConfig`] document, fields left out of a tab section keep
/// that tab's own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabConfig {
    /// Delimited activity log for this tab.
    pub records_path: String,

    /// Directory holding `{track_file_id}.{geometry_extension}` files.
    pub geometry_dir: String,

    /// Map center shown when switching to this tab.
    /// Default: 46.2, 7.5 (western Alps)
    pub default_center: GpsPoint,

    /// Zoom shown when switching to this tab.
    /// Default: 8 for summits, 6 for bike (longer trips)
    pub default_zoom: u8,
}

impl TabConfig {
    fn summits() -> Self {
        Self {
            records_path: "data/processed/activities.csv".to_string(),
            geometry_dir: "data/processed".to_string(),
            default_center: GpsPoint::new(46.2, 7.5),
            default_zoom: 8,
        }
    }

    fn bike() -> Self {
        Self {
            records_path: "data/bike/processed/bike_activities.csv".to_string(),
            geometry_dir: "data/bike/processed".to_string(),
            default_center: GpsPoint::new(46.2, 7.5),
            default_zoom: 6,
        }
    }
}

/// A tab section as written in a config document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TabOverrides {
    records_path: Option<String>,
    geometry_dir: Option<String>,
    default_center: Option<GpsPoint>,
    default_zoom: Option<u8>,
}

impl TabOverrides {
    fn apply(self, base: TabConfig) -> TabConfig {
        TabConfig {
            records_path: self.records_path.unwrap_or(base.records_path),
            geometry_dir: self.geometry_dir.unwrap_or(base.geometry_dir),
            default_center: self.default_center.unwrap_or(base.default_center),
            default_zoom: self.default_zoom.unwrap_or(base.default_zoom),
        }
    }
}

fn summits_tab<'de, D>(deserializer: D) -> std::result::Result<TabConfig, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(TabOverrides::deserialize(deserializer)?.apply(TabConfig::summits()))
}

fn bike_tab<'de, D>(deserializer: D) -> std::result::Result<TabConfig, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(TabOverrides::deserialize(deserializer)?.apply(TabConfig::bike()))
}

/// Configuration for loading and presenting the atlas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Summit tab sources.
    #[serde(deserialize_with = "summits_tab")]
    pub summits: TabConfig,

    /// Bike tab sources.
    #[serde(deserialize_with = "bike_tab")]
    pub bike: TabConfig,

    /// File extension of track geometry documents.
    /// Default: "geojson"
    pub geometry_extension: String,

    /// Padding in pixels applied when fitting the view to a track.
    /// Default: [50, 50]
    pub fit_padding: [u32; 2],

    /// Zoom used when focusing a marker that has no track.
    /// Default: 13
    pub marker_focus_zoom: u8,

    /// Maximum geometry fetches in flight during one load.
    /// Default: 8
    pub fetch_concurrency: usize,

    /// HTTP request timeout in seconds (HTTP source only).
    /// Default: 30
    pub request_timeout_secs: u64,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            summits: TabConfig::summits(),
            bike: TabConfig::bike(),
            geometry_extension: "geojson".to_string(),
            fit_padding: [50, 50],
            marker_focus_zoom: 13,
            fetch_concurrency: 8,
            request_timeout_secs: 30,
        }
    }
}

/// Framing parameters consumed by focus resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusOptions {
    pub padding: [u32; 2],
    pub marker_zoom: u8,
}

impl Default for FocusOptions {
    fn default() -> Self {
        AtlasConfig::default().focus_options()
    }
}

const MAX_ZOOM: u8 = 22;

impl AtlasConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| AtlasError::Config {
            message: format!("invalid config JSON: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| AtlasError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn tab(&self, tab: Tab) -> &TabConfig {
        match tab {
            Tab::Summits => &self.summits,
            Tab::Bike => &self.bike,
        }
    }

    /// Relative location of a track's geometry document.
    pub fn geometry_path(&self, tab: Tab, track_file_id: &str) -> String {
        let dir = self.tab(tab).geometry_dir.trim_end_matches('/');
        if dir.is_empty() {
            format!("{}.{}", track_file_id, self.geometry_extension)
        } else {
            format!("{}/{}.{}", dir, track_file_id, self.geometry_extension)
        }
    }

    pub fn focus_options(&self) -> FocusOptions {
        FocusOptions {
            padding: self.fit_padding,
            marker_zoom: self.marker_focus_zoom,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch_concurrency == 0 {
            return Err(config_error("fetch_concurrency must be at least 1"));
        }
        if self.geometry_extension.trim().is_empty() {
            return Err(config_error("geometry_extension must not be empty"));
        }
        if self.marker_focus_zoom > MAX_ZOOM {
            return Err(config_error("marker_focus_zoom exceeds maximum zoom"));
        }
        for tab in Tab::ALL {
            let tab_config = self.tab(tab);
            if tab_config.records_path.trim().is_empty() {
                return Err(config_error(&format!("{}: records_path is empty", tab)));
            }
            if tab_config.default_zoom > MAX_ZOOM {
                return Err(config_error(&format!("{}: default_zoom exceeds maximum zoom", tab)));
            }
            if !tab_config.default_center.is_valid() {
                return Err(config_error(&format!("{}: default_center is not a valid coordinate", tab)));
            }
        }
        Ok(())
    }
}

fn config_error(message: &str) -> AtlasError {
    AtlasError::Config {
        message: message.to_string(),
    }
}
