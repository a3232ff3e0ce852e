//! HTTP source for activity logs and track geometry.
//!
//! Paths from [`AtlasConfig`] are resolved against a base URL, the way a
//! static site serves its `data/` directory. One pooled client is shared by
//! every request of a load:
//! - Non-success status codes fail immediately (the track is omitted)
//! - Transport errors are retried with exponential backoff

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use log::{debug, warn};
use reqwest::Client;

use crate::{AtlasConfig, AtlasError, AtlasSource, Result, Tab, TrackGeometry};

const MAX_RETRIES: u32 = 2;
const MAX_IDLE_PER_HOST: usize = 16;

/// Fetches records and geometry from a web server.
pub struct HttpSource {
    client: Client,
    base_url: String,
    config: AtlasConfig,
}

impl HttpSource {
    pub fn new(base_url: &str, config: AtlasConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AtlasError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    fn url(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative.trim_start_matches('/'))
    }

    async fn get_text(&self, relative: &str) -> Result<String> {
        let url = self.url(relative);
        let mut retries = 0;

        loop {
            match self.client.get(&url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        return Err(AtlasError::Fetch {
                            path: url,
                            message: status
                                .canonical_reason()
                                .unwrap_or("unexpected status")
                                .to_string(),
                            status_code: Some(status.as_u16()),
                        });
                    }
                    debug!("[HttpSource] {} -> {}", url, status);
                    return resp.text().await.map_err(|e| AtlasError::Fetch {
                        path: url.clone(),
                        message: format!("Body error: {}", e),
                        status_code: Some(status.as_u16()),
                    });
                }
                Err(e) => {
                    retries += 1;
                    if retries > MAX_RETRIES {
                        return Err(AtlasError::Fetch {
                            path: url,
                            message: format!("Request error: {}", e),
                            status_code: None,
                        });
                    }

                    let backoff = Duration::from_millis(500 * (1 << retries));
                    warn!(
                        "[HttpSource] Error for {}: {}, retry {} after {:?}",
                        url, e, retries, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

impl AtlasSource for HttpSource {
    fn fetch_records(&self, tab: Tab) -> BoxFuture<'_, Result<String>> {
        async move { self.get_text(&self.config.tab(tab).records_path).await }.boxed()
    }

    fn fetch_geometry<'a>(&'a self, tab: Tab, track_file_id: &'a str) -> BoxFuture<'a, Result<TrackGeometry>> {
        async move {
            let json = self
                .get_text(&self.config.geometry_path(tab, track_file_id))
                .await?;
            TrackGeometry::from_geojson_str(track_file_id, &json)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let source = HttpSource::new("https://example.org/atlas/", AtlasConfig::default()).unwrap();
        assert_eq!(
            source.url(&source.config.geometry_path(Tab::Bike, "day_1")),
            "https://example.org/atlas/data/bike/processed/day_1.geojson"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let mut config = AtlasConfig::default();
        config.request_timeout_secs = 1;
        // Port 9 (discard) on localhost is closed in test environments
        let source = HttpSource::new("http://127.0.0.1:9", config).unwrap();

        let err = source.fetch_records(Tab::Summits).await.unwrap_err();
        assert!(matches!(err, AtlasError::Fetch { status_code: None, .. }));
    }
}
