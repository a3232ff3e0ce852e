//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use activity_atlas::{AtlasError, AtlasSource, Result, Tab, TrackGeometry};
use futures::future::{BoxFuture, FutureExt};

pub const SUMMITS_LOG: &str = "\
Name,Altitude,Latitude,Longitude,Season,Type,Grade,Distance,Duration,Elevation Gain,File,Project,GPX Name
Dent Blanche,4357,46.034,7.612,Summer,Mountaineering,AD,14.2,9.5,1700,dent_blanche,4000,Dent_Blanche
Weisshorn,4506,46.101,7.716,Summer,Mountaineering,AD,,12.75,,weisshorn,4000,Weisshorn
Grand Combin,4314,45.937,7.299,Spring,Ski touring,,,,,,4000,
Pointe Percée,2750,46.016,6.553,Summer,Hike,F,,,,,Aravis,

Weisshorn,4506,46.101,7.716,Spring,Ski touring,,,,,weisshorn,4000,Weisshorn
Traversée,,,,Summer,Hike,,18,6.2,900,traverse_aravis,Aravis,Traversée_des_Aravis
Mont Vélan,3727,not-a-lat,7.25,Winter,Ski touring,,,,,,,
Tour A,,,,Autumn,Hike,,20,5,,bauges_a,Bauges,Tour_des_Bauges
Tour B,,,,Autumn,Hike,,21,5.5,,bauges_b,Bauges,Tour_des_Bauges
,,,,,,,,,,,,
";

pub const BIKE_LOG: &str = "\
Name,Altitude,Latitude,Longitude,Season,Type,Grade,Distance,Duration,Elevation Gain,File,Project,GPX Name
,,,,Summer,Bike,,112,5.25,1400,day_1,Morges to Como,Day_1
,,,,Summer,Bike,,96,4.5,900,day_2,Morges to Como,Day_2
,,,,Summer,Bike,,130,6,1800,wien_1,Wien to Innsbruck,Wien_Day_1
";

/// Summit names that get a marker, in row order.
pub const SUMMIT_MARKERS: [&str; 4] = ["Dent Blanche", "Weisshorn", "Grand Combin", "Pointe Percée"];

/// Track display names, in row order.
pub const SUMMIT_TRACKS: [&str; 4] = ["Dent Blanche", "Weisshorn", "Traversée des Aravis", "Tour des Bauges"];

pub fn line_geojson(lat: f64, lng: f64) -> String {
    format!(
        r#"{{"type": "Feature", "properties": {{}}, "geometry": {{"type": "LineString", "coordinates": [[{lng}, {lat}], [{}, {}], [{}, {}]]}}}}"#,
        lng + 0.01,
        lat + 0.01,
        lng + 0.02,
        lat + 0.005
    )
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// In-memory source counting every geometry fetch per `(tab, file id)`.
#[derive(Default)]
pub struct CountingSource {
    records: HashMap<Tab, String>,
    geometry: HashMap<String, String>,
    failing: HashSet<String>,
    fetches: Mutex<HashMap<(Tab, String), usize>>,
}

impl CountingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both fixture logs with geometry for every referenced file.
    pub fn with_fixtures() -> Self {
        let mut source = Self::new()
            .records(Tab::Summits, SUMMITS_LOG)
            .records(Tab::Bike, BIKE_LOG);
        let files = [
            ("dent_blanche", 46.02, 7.60),
            ("weisshorn", 46.09, 7.70),
            ("traverse_aravis", 45.95, 6.50),
            ("bauges_a", 45.65, 6.15),
            ("bauges_b", 45.66, 6.16),
            ("day_1", 46.51, 6.50),
            ("day_2", 46.20, 7.40),
            ("wien_1", 48.20, 16.37),
        ];
        for (id, lat, lng) in files {
            source = source.geometry(id, &line_geojson(lat, lng));
        }
        source
    }

    pub fn records(mut self, tab: Tab, text: &str) -> Self {
        self.records.insert(tab, text.to_string());
        self
    }

    pub fn geometry(mut self, id: &str, json: &str) -> Self {
        self.geometry.insert(id.to_string(), json.to_string());
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn fetch_count(&self, tab: Tab, id: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(&(tab, id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }

    fn not_found(path: &str) -> AtlasError {
        AtlasError::Fetch {
            path: path.to_string(),
            message: "Not Found".to_string(),
            status_code: Some(404),
        }
    }
}

impl AtlasSource for CountingSource {
    fn fetch_records(&self, tab: Tab) -> BoxFuture<'_, Result<String>> {
        let result = self
            .records
            .get(&tab)
            .cloned()
            .ok_or_else(|| Self::not_found(tab.as_str()));
        async move { result }.boxed()
    }

    fn fetch_geometry<'a>(&'a self, tab: Tab, track_file_id: &'a str) -> BoxFuture<'a, Result<TrackGeometry>> {
        async move {
            *self
                .fetches
                .lock()
                .unwrap()
                .entry((tab, track_file_id.to_string()))
                .or_insert(0) += 1;

            if self.failing.contains(track_file_id) {
                return Err(Self::not_found(track_file_id));
            }
            let json = self
                .geometry
                .get(track_file_id)
                .ok_or_else(|| Self::not_found(track_file_id))?;
            TrackGeometry::from_geojson_str(track_file_id, json)
        }
        .boxed()
    }
}
