//! Track geometry loaded from GeoJSON.
//!
//! Converted GPX files are FeatureCollections with one LineString feature per
//! track segment. Bare geometries and single features are accepted too.

use geo::{BoundingRect, Coord, LineString, MultiLineString};
use serde::Deserialize;

use crate::{AtlasError, Bounds, GpsPoint, OptionExt, Result};

/// Opaque line geometry shared by a track's visible and hit-target layers.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackGeometry {
    lines: MultiLineString<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Document {
    FeatureCollection {
        features: Vec<Feature>,
    },
    Feature {
        geometry: Option<Geometry>,
    },
    LineString {
        coordinates: Vec<Vec<f64>>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    fn into_segments(self) -> Vec<Vec<Vec<f64>>> {
        match self {
            Geometry::LineString { coordinates } => vec![coordinates],
            Geometry::MultiLineString { coordinates } => coordinates,
            Geometry::Unsupported => Vec::new(),
        }
    }
}

impl TrackGeometry {
    /// Parse a GeoJSON document. `track_file_id` is only used for error context.
    pub fn from_geojson_str(track_file_id: &str, json: &str) -> Result<Self> {
        let document: Document =
            serde_json::from_str(json).map_err(|e| AtlasError::Geometry {
                track_file_id: track_file_id.to_string(),
                message: format!("invalid GeoJSON: {}", e),
            })?;

        let raw_segments: Vec<Vec<Vec<f64>>> = match document {
            Document::FeatureCollection { features } => features
                .into_iter()
                .filter_map(|f| f.geometry)
                .flat_map(Geometry::into_segments)
                .collect(),
            Document::Feature { geometry } => geometry
                .map(Geometry::into_segments)
                .unwrap_or_default(),
            Document::LineString { coordinates } => vec![coordinates],
            Document::MultiLineString { coordinates } => coordinates,
            Document::Unsupported => Vec::new(),
        };

        let lines: Vec<LineString<f64>> = raw_segments
            .iter()
            .filter_map(|segment| line_from_positions(segment))
            .collect();

        (!lines.is_empty())
            .then(|| Self {
                lines: MultiLineString::new(lines),
            })
            .ok_or_geometry(track_file_id, "no line geometry with at least two points")
    }

    /// Build geometry directly from point segments. Segments under two valid points are dropped.
    pub fn from_segments(segments: &[Vec<GpsPoint>]) -> Option<Self> {
        let lines: Vec<LineString<f64>> = segments
            .iter()
            .map(|segment| {
                segment
                    .iter()
                    .filter(|p| p.is_valid())
                    .map(|p| Coord {
                        x: p.longitude,
                        y: p.latitude,
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|coords| coords.len() >= 2)
            .map(LineString::new)
            .collect();

        (!lines.is_empty()).then(|| Self {
            lines: MultiLineString::new(lines),
        })
    }

    /// Bounding region over every segment.
    pub fn bounds(&self) -> Option<Bounds> {
        self.lines.bounding_rect().map(Bounds::from_rect)
    }

    pub fn segment_count(&self) -> usize {
        self.lines.0.len()
    }

    pub fn point_count(&self) -> usize {
        self.lines.0.iter().map(|l| l.0.len()).sum()
    }

    /// Segments as latitude/longitude points, in document order.
    pub fn segments(&self) -> Vec<Vec<GpsPoint>> {
        self.lines
            .0
            .iter()
            .map(|line| line.0.iter().map(|c| GpsPoint::new(c.y, c.x)).collect())
            .collect()
    }
}

/// GeoJSON positions are `[lon, lat]` with an optional trailing elevation.
fn line_from_positions(positions: &[Vec<f64>]) -> Option<LineString<f64>> {
    let coords: Vec<Coord> = positions
        .iter()
        .filter_map(|pos| match pos.as_slice() {
            [lon, lat, ..] if GpsPoint::new(*lat, *lon).is_valid() => Some(Coord { x: *lon, y: *lat }),
            _ => None,
        })
        .collect();

    (coords.len() >= 2).then(|| LineString::new(coords))
}
