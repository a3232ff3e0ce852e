//! # Activity Atlas
//!
//! In-memory core for a personal activity map: summits and bike routes.
//!
//! This library provides:
//! - Parsing of the delimited activity log into typed records
//! - Marker and track entities with derived color, icon and popup content
//! - Case-insensitive search over track display names
//! - Multi-criteria filtering scoped to the active tab
//! - Focus directives for recentering the map on a searched name
//!
//! Rendering is delegated to a [`MapSurface`] implementation and data is
//! pulled from an [`AtlasSource`]. Every reload tears the previous tab down
//! before anything from the new tab appears, and late geometry from a
//! superseded load is discarded by generation check.
//!
//! ## Features
//!
//! - **`http`** - Enable [`HttpSource`] for fetching records and geometry over HTTP
//!
//! ## Quick Start
//!
//! ```rust
//! use activity_atlas::{parse_records, format_duration};
//!
//! let csv = "Name,Alt,Lat,Lon,Season,Type,Grade,Dist,Dur,Gain,File,Project,GPXName\n\
//!            Dent Blanche,4357,46.034,7.612,Summer,Mountaineering,AD,,9.5,,dent_blanche,4000,Dent_Blanche\n";
//!
//! let records: Vec<_> = parse_records(csv).collect();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].display_name, "Dent Blanche");
//! assert_eq!(format_duration(&records[0].duration_raw), "9h30");
//! ```

use geo::Rect;
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{AtlasError, OptionExt, Result};

// Configuration
pub mod config;
pub use config::{AtlasConfig, FocusOptions, TabConfig};

// Data scope per tab
pub mod tab;
pub use tab::Tab;

// Record parser
pub mod record;
pub use record::{parse_records, ActivityRecord, Records};

// Track geometry (GeoJSON)
pub mod geometry;
pub use geometry::TrackGeometry;

// Color and icon resolution
pub mod style;
pub use style::{LineStyle, LineWeight, MarkerIcon, Outline};

// Popup content and duration formatting
pub mod popup;
pub use popup::{format_decimal_hours, format_duration, Popup};

// Marker and track entities
pub mod entity;
pub use entity::{LayerId, Marker, Status, Track};

// Entity construction from records
pub mod builder;
pub use builder::{BuildOutput, EntityBuilder, TrackDraft};

// Search over track display names
pub mod search;
pub use search::SearchIndex;

// Filter predicates
pub mod filter;
pub use filter::{FilterCriteria, Filterable, Selection, Visibility};

// Focus resolution
pub mod focus;
pub use focus::FocusDirective;

// Rendering collaborator
pub mod surface;
pub use surface::{Layer, MapSurface, RecordingSurface};

// Data sources
pub mod source;
pub use source::{AtlasSource, FileSource};

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::HttpSource;

// Session state and load pipeline
pub mod session;
pub use session::{AttachOutcome, AtlasSession, GeometryRequest, LoadTicket, SessionStats};

// UI-facing engine
pub mod engine;
pub use engine::{AtlasEngine, LoadSummary};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use activity_atlas::GpsPoint;
/// let point = GpsPoint::new(45.8326, 6.8652); // Mont Blanc
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding region of a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Convert a `geo` rectangle (x = longitude, y = latitude).
    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        }
    }

    /// Finite and ordered corners. Only valid bounds are used for framing.
    pub fn is_valid(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_lng, self.max_lng]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lat <= self.max_lat
            && self.min_lng <= self.max_lng
    }
}

// ============================================================================
// Tests
// ============================================================================
