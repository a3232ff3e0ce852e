//! Popup content and duration formatting.

use crate::{ActivityRecord, Status, Tab};

/// Title plus labelled lines, rendered as HTML by the map surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<(String, String)>,
}

impl Popup {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, label: &str, value: impl Into<String>) -> Self {
        self.lines.push((label.to_string(), value.into()));
        self
    }

    /// Add a line only when `value` is non-empty.
    pub fn optional_line(self, label: &str, value: &str, suffix: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.line(label, format!("{}{}", value, suffix))
        }
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_html(&self) -> String {
        let mut html = format!("<b>{}</b>", escape_html(&self.title));
        for (label, value) in &self.lines {
            html.push_str(&format!(
                "<br><b>{}:</b> {}",
                escape_html(label),
                escape_html(value)
            ));
        }
        html
    }

    /// Summary shown on a destination marker.
    pub fn for_marker(record: &ActivityRecord, status: Status) -> Self {
        let title = if record.altitude > 0 {
            format!("{} ({}m)", record.name, record.altitude)
        } else {
            record.name.clone()
        };
        Popup::new(title)
            .line("Project", record.project.as_str())
            .line("Status", status.as_str())
    }

    /// Detail shown on a recorded track. The Type line is left out on the bike tab.
    pub fn for_track(record: &ActivityRecord, tab: Tab) -> Self {
        let mut popup = Popup::new(record.display_name.as_str()).line("Season", record.season.as_str());
        if tab.shows_activity_type() {
            popup = popup.line("Type", record.activity_type.as_str());
        }
        let duration = if record.duration_raw.is_empty() {
            String::new()
        } else {
            format_duration(&record.duration_raw)
        };
        popup
            .optional_line("Grade", &record.grade, "")
            .optional_line("Distance", &record.distance, " km")
            .optional_line("Duration", &duration, "")
            .optional_line("Elevation Gain", &record.elevation_gain, " m")
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ============================================================================
// Duration
// ============================================================================

/// Format a raw duration cell.
///
/// Multi-day values ("2 days") pass through untouched. Anything else is read
/// as decimal hours, accepting a leading numeric prefix ("1.5h").
///
/// ```
/// use activity_atlas::format_duration;
/// assert_eq!(format_duration("1.5"), "1h30");
/// assert_eq!(format_duration("2 days"), "2 days");
/// assert_eq!(format_duration("abc"), "N/A");
/// ```
pub fn format_duration(raw: &str) -> String {
    if raw.contains("day") {
        return raw.to_string();
    }
    match leading_number(raw.trim()) {
        Some(hours) => format_decimal_hours(hours),
        None => "N/A".to_string(),
    }
}

/// Format decimal hours as `{h}h{mm}`; 1.5 becomes "1h30".
pub fn format_decimal_hours(hours: f64) -> String {
    if !hours.is_finite() || hours < 0.0 {
        return "N/A".to_string();
    }
    let mut whole = hours.floor() as u64;
    let mut minutes = ((hours - hours.floor()) * 60.0).round() as u64;
    if minutes == 60 {
        whole += 1;
        minutes = 0;
    }
    format!("{}h{:02}", whole, minutes)
}

/// Longest prefix that parses as a float.
fn leading_number(s: &str) -> Option<f64> {
    let end = s
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    (1..=end).rev().find_map(|len| s[..len].parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ActivityRecord;

    #[test]
    fn test_format_decimal_hours() {
        assert_eq!(format_decimal_hours(1.5), "1h30");
        assert_eq!(format_decimal_hours(2.0), "2h00");
        assert_eq!(format_decimal_hours(0.1), "0h06");
        assert_eq!(format_decimal_hours(1.999), "2h00");
        assert_eq!(format_decimal_hours(-1.0), "N/A");
        assert_eq!(format_decimal_hours(f64::NAN), "N/A");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration("1.5"), "1h30");
        assert_eq!(format_duration("2"), "2h00");
        assert_eq!(format_duration("2 days"), "2 days");
        assert_eq!(format_duration("1 day"), "1 day");
        assert_eq!(format_duration("abc"), "N/A");
        assert_eq!(format_duration(""), "N/A");
        assert_eq!(format_duration("7.25h"), "7h15");
    }

    #[test]
    fn test_marker_popup() {
        let record = ActivityRecord::from_line("Weissmies,4017,46.127,8.012,,,,,,,,4000").unwrap();
        let popup = Popup::for_marker(&record, Status::ToDo);
        assert_eq!(popup.title, "Weissmies (4017m)");
        assert_eq!(popup.value("Project"), Some("4000"));
        assert_eq!(popup.value("Status"), Some("to do"));

        let record = ActivityRecord::from_line("Col,abc,46.1,8.0").unwrap();
        assert_eq!(Popup::for_marker(&record, Status::ToDo).title, "Col");
    }

    #[test]
    fn test_track_popup_omits_type_on_bike_tab() {
        let record = ActivityRecord::from_line(
            "Day 2,,46.5,6.6,Summer,Road bike,,112,6.5,1450,day_2,Morges to Como,Day_2",
        )
        .unwrap();

        let summit_popup = Popup::for_track(&record, Tab::Summits);
        assert_eq!(summit_popup.value("Type"), Some("Road bike"));

        let bike_popup = Popup::for_track(&record, Tab::Bike);
        assert_eq!(bike_popup.title, "Day 2");
        assert_eq!(bike_popup.value("Type"), None);
        assert_eq!(bike_popup.value("Distance"), Some("112 km"));
        assert_eq!(bike_popup.value("Duration"), Some("6h30"));
        assert_eq!(bike_popup.value("Elevation Gain"), Some("1450 m"));
        assert_eq!(bike_popup.value("Grade"), None);
    }

    #[test]
    fn test_html_is_escaped() {
        let html = Popup::new("A <b> & C").line("Project", "x\"y").to_html();
        assert_eq!(html, "<b>A &lt;b&gt; &amp; C</b><br><b>Project:</b> x&quot;y");
    }
}
