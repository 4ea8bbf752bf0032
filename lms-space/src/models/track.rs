//! Track records and the track table

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::features::FeatureVector;
use crate::error::SpaceError;

/// Length of a catalog track id (base62)
const TRACK_ID_LEN: usize = 22;

/// Catalog track id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Build an id from a value already known to be a catalog id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extract the track id from a user-supplied reference.
    ///
    /// Accepts `spotify:track:<id>`, `https://open.spotify.com/[intl-xx/]track/<id>[?...]`
    /// or a bare id.
    pub fn from_reference(reference: &str) -> Result<Self, SpaceError> {
        let reference = reference.trim();
        let invalid = || SpaceError::InvalidReference(reference.to_string());

        let candidate = if let Some(rest) = reference.strip_prefix("spotify:track:") {
            rest
        } else if let Some(rest) = reference
            .strip_prefix("https://")
            .or_else(|| reference.strip_prefix("http://"))
        {
            let path = rest.split(['?', '#']).next().unwrap_or_default();
            let mut segments = path.split('/').filter(|s| !s.is_empty());
            if segments.next() != Some("open.spotify.com") {
                return Err(invalid());
            }
            segments
                .skip_while(|s| *s != "track")
                .nth(1)
                .ok_or_else(invalid)?
        } else {
            reference
        };

        if candidate.len() == TRACK_ID_LEN && candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(invalid())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the track table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Lab label; absent for user-added rows
    pub group: Option<String>,
    /// Member label
    pub member: String,
    /// Reference as supplied (URI, URL or id)
    pub reference: String,
    /// Resolved catalog id (unique in the table)
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Highest-resolution album image
    pub artwork: Option<String>,
    pub features: FeatureVector,
    /// Added this session and not yet drawn
    pub is_new: bool,
    /// User-added rather than part of the reference dataset
    pub is_annotated: bool,
}

/// Ordered track rows with unique ids
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackTable {
    rows: Vec<TrackRecord>,
}

impl TrackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table keeping the first row of every id.
    ///
    /// Returns the table and the ids of rows that were dropped as duplicates.
    pub fn from_records(records: Vec<TrackRecord>) -> (Self, Vec<TrackId>) {
        let mut table = Self::new();
        let mut skipped = Vec::new();
        for record in records {
            let id = record.id.clone();
            if table.insert(record).is_err() {
                skipped.push(id);
            }
        }
        (table, skipped)
    }

    /// Append a row; an existing id leaves the table unchanged
    pub fn insert(&mut self, record: TrackRecord) -> Result<(), SpaceError> {
        if self.contains(&record.id) {
            return Err(SpaceError::DuplicateReference(record.id.to_string()));
        }
        self.rows.push(record);
        Ok(())
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.rows.iter().any(|r| &r.id == id)
    }

    pub fn get(&self, id: &TrackId) -> Option<&TrackRecord> {
        self.rows.iter().find(|r| &r.id == id)
    }

    pub fn rows(&self) -> &[TrackRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reference population (non-annotated rows)
    pub fn reference_rows(&self) -> impl Iterator<Item = &TrackRecord> {
        self.rows.iter().filter(|r| !r.is_annotated)
    }

    /// User-added rows
    pub fn annotated_rows(&self) -> impl Iterator<Item = &TrackRecord> {
        self.rows.iter().filter(|r| r.is_annotated)
    }

    pub fn reference_len(&self) -> usize {
        self.reference_rows().count()
    }

    /// Annotated rows waiting to be drawn
    pub fn pending_rows(&self) -> impl Iterator<Item = &TrackRecord> {
        self.rows.iter().filter(|r| r.is_new)
    }

    /// Clear the `is_new` flag on the given rows
    pub fn mark_rendered(&mut self, ids: &[TrackId]) {
        let ids: HashSet<&TrackId> = ids.iter().collect();
        for row in self.rows.iter_mut().filter(|r| ids.contains(&r.id)) {
            row.is_new = false;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::features::FEATURE_COUNT;

    pub(crate) fn record(id: &str, group: Option<&str>, member: &str, annotated: bool) -> TrackRecord {
        TrackRecord {
            group: group.map(str::to_string),
            member: member.to_string(),
            reference: format!("spotify:track:{}", id),
            id: TrackId::new(id),
            title: format!("Title {}", id),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            artwork: None,
            features: [0.0; FEATURE_COUNT],
            is_new: annotated,
            is_annotated: annotated,
        }
    }

    #[test]
    fn test_reference_forms() {
        let expected = TrackId::new("4uLU6hMCjMI75M1A2tKUQC");
        for reference in [
            "spotify:track:4uLU6hMCjMI75M1A2tKUQC",
            "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC",
            "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC?si=abc123",
            "https://open.spotify.com/intl-de/track/4uLU6hMCjMI75M1A2tKUQC",
            "  4uLU6hMCjMI75M1A2tKUQC  ",
        ] {
            assert_eq!(TrackId::from_reference(reference).unwrap(), expected, "{}", reference);
        }
    }

    #[test]
    fn test_invalid_references() {
        for reference in [
            "",
            "not a track",
            "spotify:album:4uLU6hMCjMI75M1A2tKUQC",
            "https://open.spotify.com/album/4uLU6hMCjMI75M1A2tKUQC",
            "https://example.com/track/4uLU6hMCjMI75M1A2tKUQC",
            "spotify:track:short",
            "4uLU6hMCjMI75M1A2tKUQ!",
        ] {
            assert!(
                matches!(TrackId::from_reference(reference), Err(SpaceError::InvalidReference(_))),
                "{}",
                reference
            );
        }
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut table = TrackTable::new();
        table.insert(record("a", Some("Lab"), "ann", false)).unwrap();
        let err = table.insert(record("a", None, "bob", true)).unwrap_err();

        assert!(matches!(err, SpaceError::DuplicateReference(_)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].member, "ann");
    }

    #[test]
    fn test_from_records_keeps_first() {
        let (table, skipped) = TrackTable::from_records(vec![
            record("a", Some("Lab"), "ann", false),
            record("b", Some("Lab"), "bob", false),
            record("a", Some("Other"), "cat", false),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(skipped, vec![TrackId::new("a")]);
    }

    #[test]
    fn test_population_split_and_rendering() {
        let mut table = TrackTable::new();
        table.insert(record("a", Some("Lab"), "ann", false)).unwrap();
        table.insert(record("b", None, "bob", true)).unwrap();
        table.insert(record("c", None, "cat", true)).unwrap();

        assert_eq!(table.reference_len(), 1);
        assert_eq!(table.annotated_rows().count(), 2);
        assert_eq!(table.pending_rows().count(), 2);

        table.mark_rendered(&[TrackId::new("b")]);
        let pending: Vec<_> = table.pending_rows().map(|r| r.id.as_str()).collect();
        assert_eq!(pending, vec!["c"]);
    }
}
