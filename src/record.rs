//! Record parser for the delimited activity log.
//!
//! The first line is a header and is discarded. Columns are positional:
//!
//! | idx | column          | idx | column          |
//! |-----|-----------------|-----|-----------------|
//! | 0   | name            | 7   | distance        |
//! | 1   | altitude        | 8   | duration        |
//! | 2   | latitude        | 9   | elevation gain  |
//! | 3   | longitude       | 10  | track file id   |
//! | 4   | season          | 11  | project         |
//! | 5   | activity type   | 12  | display name    |
//! | 6   | grade           |     |                 |
//!
//! Malformed numbers degrade to defaults; nothing here fails the load.

use log::debug;

use crate::GpsPoint;

/// Field delimiter of the activity log.
pub const FIELD_DELIMITER: char = ',';

/// Project assigned to rows that leave the column empty.
pub const NO_PROJECT: &str = "No Project";

const COL_NAME: usize = 0;
const COL_ALTITUDE: usize = 1;
const COL_LATITUDE: usize = 2;
const COL_LONGITUDE: usize = 3;
const COL_SEASON: usize = 4;
const COL_TYPE: usize = 5;
const COL_GRADE: usize = 6;
const COL_DISTANCE: usize = 7;
const COL_DURATION: usize = 8;
const COL_ELEVATION_GAIN: usize = 9;
const COL_TRACK_FILE: usize = 10;
const COL_PROJECT: usize = 11;
const COL_DISPLAY_NAME: usize = 12;

/// One parsed row of the activity log.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    /// Marker identity. May be empty when the row only carries a track.
    pub name: String,
    /// Meters; 0 when missing or unparsable.
    pub altitude: u32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub project: String,
    pub season: String,
    pub activity_type: String,
    pub grade: String,
    pub distance: String,
    pub duration_raw: String,
    pub elevation_gain: String,
    pub track_file_id: Option<String>,
    /// Track identity: display-name column with underscores as spaces, else `name`.
    pub display_name: String,
}

impl ActivityRecord {
    /// Parse one data line. Returns `None` when the row has no usable identity.
    pub fn from_line(line: &str) -> Option<Self> {
        let columns: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();
        let field = |idx: usize| columns.get(idx).copied().unwrap_or("");

        let name = field(COL_NAME).to_string();
        let display_name = match field(COL_DISPLAY_NAME) {
            "" => name.clone(),
            raw => raw.replace('_', " "),
        };
        if name.is_empty() && display_name.is_empty() {
            return None;
        }

        let project = match field(COL_PROJECT) {
            "" => NO_PROJECT.to_string(),
            p => p.to_string(),
        };
        let track_file_id = match field(COL_TRACK_FILE) {
            "" => None,
            id => Some(id.to_string()),
        };

        Some(Self {
            name,
            altitude: parse_altitude(field(COL_ALTITUDE)),
            latitude: parse_coordinate(field(COL_LATITUDE)),
            longitude: parse_coordinate(field(COL_LONGITUDE)),
            project,
            season: field(COL_SEASON).to_string(),
            activity_type: field(COL_TYPE).to_string(),
            grade: field(COL_GRADE).to_string(),
            distance: field(COL_DISTANCE).to_string(),
            duration_raw: field(COL_DURATION).to_string(),
            elevation_gain: field(COL_ELEVATION_GAIN).to_string(),
            track_file_id,
            display_name,
        })
    }

    /// Marker position, present only when both coordinates parsed to a valid point.
    pub fn position(&self) -> Option<GpsPoint> {
        let point = GpsPoint::new(self.latitude?, self.longitude?);
        point.is_valid().then_some(point)
    }

    /// Completed iff the row references a recorded track.
    pub fn is_completed(&self) -> bool {
        self.track_file_id.is_some()
    }

    /// A track is drawn only for rows with both a file and a display name.
    pub fn has_track(&self) -> bool {
        self.track_file_id.is_some() && !self.display_name.is_empty()
    }
}

/// Integer prefix semantics: "4357" and "4357.8" are 4357, anything else is 0.
fn parse_altitude(raw: &str) -> u32 {
    if let Ok(v) = raw.parse::<u32>() {
        return v;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v <= u32::MAX as f64 => v.trunc() as u32,
        _ => 0,
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Lazy, single-pass iterator over the records of one activity log.
///
/// Blank lines and rows without a usable name are skipped and counted.
pub struct Records<'a> {
    lines: std::iter::Skip<std::str::Lines<'a>>,
    skipped: usize,
}

impl<'a> Records<'a> {
    /// Rows skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for Records<'_> {
    type Item = ActivityRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            match ActivityRecord::from_line(line) {
                Some(record) => return Some(record),
                None => {
                    self.skipped += 1;
                    debug!("[RecordParser] Skipping row without name: {:?}", line);
                }
            }
        }
        None
    }
}

/// Parse a delimited activity log, discarding the header line.
pub fn parse_records(text: &str) -> Records<'_> {
    Records {
        lines: text.lines().skip(1),
        skipped: 0,
    }
}
