//! Tests for record parsing, entity construction and popup content

mod common;

use activity_atlas::entity::LayerIds;
use activity_atlas::style::{self, Outline};
use activity_atlas::{format_duration, parse_records, EntityBuilder, Popup, Status, Tab};

use common::{BIKE_LOG, SUMMITS_LOG, SUMMIT_MARKERS};

#[test]
fn test_fixture_row_accounting() {
    let mut records = parse_records(SUMMITS_LOG);
    let parsed: Vec<_> = records.by_ref().collect();

    assert_eq!(parsed.len(), 9);
    // The all-empty row has no identity; the blank line is not a row
    assert_eq!(records.skipped(), 1);
}

#[test]
fn test_rows_without_position_have_no_marker() {
    let mut ids = LayerIds::new();
    let output = EntityBuilder::new(Tab::Summits, &mut ids).build(parse_records(SUMMITS_LOG));

    let names: Vec<&str> = output.markers.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, SUMMIT_MARKERS);
    assert!(!names.contains(&"Mont Vélan"));
    assert!(!names.contains(&"Traversée"));
    assert_eq!(output.unlocated_rows, 4);
}

#[test]
fn test_first_marker_per_name_wins() {
    let mut ids = LayerIds::new();
    let output = EntityBuilder::new(Tab::Summits, &mut ids).build(parse_records(SUMMITS_LOG));

    let weisshorn = &output.markers[output.marker_index["Weisshorn"]];
    assert_eq!(weisshorn.season, "Summer");
    assert_eq!(weisshorn.activity_type, "Mountaineering");
    assert_eq!(output.duplicate_markers, 1);
}

#[test]
fn test_status_follows_track_file() {
    let mut ids = LayerIds::new();
    let output = EntityBuilder::new(Tab::Summits, &mut ids).build(parse_records(SUMMITS_LOG));

    for marker in &output.markers {
        let expected = match marker.name.as_str() {
            "Dent Blanche" | "Weisshorn" => Status::Completed,
            _ => Status::ToDo,
        };
        assert_eq!(marker.status, expected, "{}", marker.name);
        assert_eq!(
            marker.icon.outline,
            Outline::for_completion(expected == Status::Completed)
        );
        assert_eq!(marker.popup.value("Status"), Some(expected.as_str()));
    }
}

#[test]
fn test_marker_colors_by_project() {
    let mut ids = LayerIds::new();
    let output = EntityBuilder::new(Tab::Summits, &mut ids).build(parse_records(SUMMITS_LOG));

    let dent = &output.markers[output.marker_index["Dent Blanche"]];
    assert_eq!(Some(dent.icon.color), style::project_color("4000"));

    let percee = &output.markers[output.marker_index["Pointe Percée"]];
    assert_eq!(Some(percee.icon.color), style::project_color("Aravis"));
    assert_eq!(percee.popup.title, "Pointe Percée (2750m)");
}

#[test]
fn test_summit_track_popup() {
    let record = parse_records(SUMMITS_LOG).next().unwrap();
    let popup = Popup::for_track(&record, Tab::Summits);

    assert_eq!(popup.title, "Dent Blanche");
    assert_eq!(popup.value("Type"), Some("Mountaineering"));
    assert_eq!(popup.value("Grade"), Some("AD"));
    assert_eq!(popup.value("Distance"), Some("14.2 km"));
    assert_eq!(popup.value("Duration"), Some("9h30"));
    assert_eq!(popup.value("Elevation Gain"), Some("1700 m"));
}

#[test]
fn test_bike_track_popup_and_color() {
    let record = parse_records(BIKE_LOG).next().unwrap();
    assert_eq!(record.display_name, "Day 1");

    let popup = Popup::for_track(&record, Tab::Bike);
    assert_eq!(popup.value("Type"), None);
    assert_eq!(popup.value("Duration"), Some("5h15"));
    assert_eq!(popup.value("Grade"), None);

    let color = style::track_color(&record.activity_type, &record.project, Tab::Bike);
    assert_eq!(Some(color), style::project_color("Morges to Como"));
    assert_eq!(
        style::track_color("Bike", "Unlisted tour", Tab::Bike),
        style::BIKE_TRACK_FALLBACK
    );
}

#[test]
fn test_format_duration_cases() {
    assert_eq!(format_duration("1.5"), "1h30");
    assert_eq!(format_duration("2"), "2h00");
    assert_eq!(format_duration("0.25"), "0h15");
    assert_eq!(format_duration("3 days"), "3 days");
    assert_eq!(format_duration("xyz"), "N/A");
    // Rounds up to a full hour
    assert_eq!(format_duration("1.999"), "2h00");
    assert_eq!(format_duration("-1"), "N/A");
}
