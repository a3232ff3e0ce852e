//! Unified error handling for the activity atlas.
//!
//! Only a few conditions are errors at all. Malformed numeric fields degrade
//! to defaults and rows without a location are skipped; neither reaches this
//! type. Fetch and geometry failures are errors for the single track they
//! concern and are logged and swallowed by the load pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for atlas operations.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Network or source failure (including non-success status)
    #[error("{}", fetch_message(.path, .message, .status_code))]
    Fetch {
        path: String,
        message: String,
        status_code: Option<u16>,
    },
    /// Local file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Geometry document could not be turned into a track
    #[error("Invalid geometry for '{track_file_id}': {message}")]
    Geometry {
        track_file_id: String,
        message: String,
    },
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },
    /// A load cycle was superseded before its data arrived
    #[error("Load cycle {generation} superseded by cycle {current}")]
    StaleLoad { generation: u64, current: u64 },
    /// The activity log of this load cycle was already ingested
    #[error("Records of load cycle {generation} already ingested")]
    AlreadyIngested { generation: u64 },
}

fn fetch_message(path: &str, message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("Fetch of {} failed ({}): {}", path, code, message),
        None => format!("Fetch of {} failed: {}", path, message),
    }
}

impl AtlasError {
    /// Whether this error only concerns a superseded load cycle.
    pub fn is_stale(&self) -> bool {
        matches!(self, AtlasError::StaleLoad { .. })
    }
}

/// Result type alias for atlas operations.
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Extension trait for converting Option to AtlasError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a geometry error for the given track file.
    fn ok_or_geometry(self, track_file_id: &str, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_geometry(self, track_file_id: &str, message: &str) -> Result<T> {
        self.ok_or_else(|| AtlasError::Geometry {
            track_file_id: track_file_id.to_string(),
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_display() {
        let err = AtlasError::Fetch {
            path: "data/processed/a.geojson".to_string(),
            message: "Not Found".to_string(),
            status_code: Some(404),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("a.geojson"));

        let err = AtlasError::Fetch {
            path: "x".to_string(),
            message: "connection reset".to_string(),
            status_code: None,
        };
        assert_eq!(err.to_string(), "Fetch of x failed: connection reset");
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        let result = none.ok_or_geometry("track-1", "no segments");
        assert!(matches!(result, Err(AtlasError::Geometry { .. })));

        assert_eq!(Some(3).ok_or_geometry("track-1", "unused").unwrap(), 3);
    }

    #[test]
    fn test_is_stale() {
        assert!(AtlasError::StaleLoad {
            generation: 1,
            current: 2
        }
        .is_stale());
        assert!(!AtlasError::Config {
            message: String::new()
        }
        .is_stale());
    }
}
