//! Data sources for activity logs and track geometry.

use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use log::debug;

use crate::{AtlasConfig, AtlasError, Result, Tab, TrackGeometry};

/// Where records and geometry come from.
///
/// Both calls are suspension points of the load pipeline. Failures are
/// reported as values; the pipeline decides whether they are fatal.
pub trait AtlasSource {
    /// Raw delimited text of the tab's activity log.
    fn fetch_records(&self, tab: Tab) -> BoxFuture<'_, Result<String>>;

    /// Geometry of `{geometry_dir}/{track_file_id}.{ext}` for the tab.
    fn fetch_geometry<'a>(&'a self, tab: Tab, track_file_id: &'a str) -> BoxFuture<'a, Result<TrackGeometry>>;
}

/// Reads records and geometry from a local directory tree.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    config: AtlasConfig,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>, config: AtlasConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, relative: &str) -> Result<String> {
        let path = self.root.join(relative);
        debug!("[FileSource] Reading {}", path.display());
        std::fs::read_to_string(&path).map_err(|source| AtlasError::Io { path, source })
    }
}

impl AtlasSource for FileSource {
    fn fetch_records(&self, tab: Tab) -> BoxFuture<'_, Result<String>> {
        async move { self.read(&self.config.tab(tab).records_path) }.boxed()
    }

    fn fetch_geometry<'a>(&'a self, tab: Tab, track_file_id: &'a str) -> BoxFuture<'a, Result<TrackGeometry>> {
        async move {
            let json = self.read(&self.config.geometry_path(tab, track_file_id))?;
            TrackGeometry::from_geojson_str(track_file_id, &json)
        }
        .boxed()
    }
}
