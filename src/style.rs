//! Color and icon resolution.
//!
//! Markers are colored by project on every tab. Summit tracks are colored by
//! activity type; bike tracks by project with their own fallback.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::Tab;

/// Neutral gray for unknown projects and unmatched activity types.
pub const DEFAULT_COLOR: &str = "#808080";

/// Fallback for bike tracks whose project has no palette entry.
pub const BIKE_TRACK_FALLBACK: &str = "#32CD32";

static PROJECT_COLORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Proxima", "#45818e"),
        ("Annecy", "#3c78d8"),
        ("Bauges", "#674ea7"),
        ("4000", "#f1c232"),
        ("Aravis", "#a64d79"),
        ("Morges to Como", "#34a853"),
        ("Wien to Innsbruck", "#ea4335"),
    ])
});

/// Checked in order; the first substring found in the lowercased type wins.
const TYPE_COLORS: [(&str, &str); 4] = [
    ("ski", "#46bdc6"),
    ("hike", "#ff6d01"),
    ("mountaineering", "#ea4335"),
    ("bike", "#fbbc04"),
];

pub fn project_color(project: &str) -> Option<&'static str> {
    PROJECT_COLORS.get(project).copied()
}

/// Marker fill color. The tab does not change the palette.
pub fn marker_color(project: &str, _tab: Tab) -> &'static str {
    project_color(project).unwrap_or(DEFAULT_COLOR)
}

pub fn track_color(activity_type: &str, project: &str, tab: Tab) -> &'static str {
    match tab {
        Tab::Bike => project_color(project).unwrap_or(BIKE_TRACK_FALLBACK),
        Tab::Summits => {
            let lowered = activity_type.to_lowercase();
            TYPE_COLORS
                .iter()
                .find(|(needle, _)| lowered.contains(needle))
                .map(|(_, color)| *color)
                .unwrap_or(DEFAULT_COLOR)
        }
    }
}

// ============================================================================
// Marker icon
// ============================================================================

/// Triangle outline thickness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outline {
    /// Completed destinations
    Emphasized,
    Plain,
}

impl Outline {
    pub fn for_completion(completed: bool) -> Self {
        if completed {
            Outline::Emphasized
        } else {
            Outline::Plain
        }
    }

    pub fn stroke_width(&self) -> f64 {
        match self {
            Outline::Emphasized => 2.0,
            Outline::Plain => 0.3,
        }
    }
}

/// Fixed-shape triangular marker icon.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerIcon {
    pub color: &'static str,
    pub outline: Outline,
}

impl MarkerIcon {
    /// Icon edge length in pixels; the anchor is the center.
    pub const SIZE: u32 = 20;

    pub fn new(color: &'static str, completed: bool) -> Self {
        Self {
            color,
            outline: Outline::for_completion(completed),
        }
    }

    /// Inline SVG for surfaces that render HTML icons.
    pub fn svg(&self) -> String {
        format!(
            r#"<svg width="{size}" height="{size}" viewBox="0 0 20 20" xmlns="http://www.w3.org/2000/svg"><path d="M10 2 L2 18 L18 18 Z" fill="{fill}" stroke="black" stroke-width="{stroke}"/></svg>"#,
            size = Self::SIZE,
            fill = self.color,
            stroke = self.outline.stroke_width(),
        )
    }
}

// ============================================================================
// Line style
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineWeight {
    Normal,
    Emphasized,
}

impl LineWeight {
    pub fn pixels(&self) -> f64 {
        match self {
            LineWeight::Normal => 3.0,
            LineWeight::Emphasized => 6.0,
        }
    }
}

/// Stroke style of one line layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
}

impl LineStyle {
    pub fn visible(color: &'static str) -> Self {
        Self {
            color,
            weight: LineWeight::Normal.pixels(),
            opacity: 1.0,
        }
    }

    /// Wide transparent stroke that only exists to catch clicks.
    pub fn hit_target() -> Self {
        Self {
            color: "transparent",
            weight: 15.0,
            opacity: 0.0,
        }
    }
}
