//! Case-insensitive substring search over track display names.

use std::collections::HashSet;

use crate::Track;

/// Display names in track insertion order, with their lowercase forms.
#[derive(Debug, Default, Clone)]
pub struct SearchIndex {
    names: Vec<String>,
    lowered: Vec<String>,
    present: HashSet<String>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the display names of `tracks` in slice order.
    pub fn from_tracks(tracks: &[Track]) -> Self {
        let mut index = Self::new();
        for track in tracks {
            index.insert(&track.display_name);
        }
        index
    }

    /// Append a name. Names already present keep their original position.
    pub fn insert(&mut self, display_name: &str) {
        if !self.present.insert(display_name.to_string()) {
            return;
        }
        self.names.push(display_name.to_string());
        self.lowered.push(display_name.to_lowercase());
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.lowered.clear();
        self.present.clear();
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names whose lowercase form contains the lowercase term, in insertion
    /// order. An empty term means "no results shown", not "everything".
    pub fn query(&self, term: &str) -> Vec<&str> {
        if term.is_empty() {
            return Vec::new();
        }
        let needle = term.to_lowercase();
        self.names
            .iter()
            .zip(&self.lowered)
            .filter(|(_, lowered)| lowered.contains(&needle))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
