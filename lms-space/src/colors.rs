//! Color assignment for groups and annotated members
//!
//! Groups of the reference population draw from the reference palette and
//! annotated members from the annotation palette, each in first-seen order.
//! Assignments are only ever added, so a label keeps its color for the rest
//! of the session.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::TrackTable;

/// Plotly qualitative palette
pub const REFERENCE_PALETTE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

/// D3 category palette
pub const ANNOTATION_PALETTE: [&str; 10] = [
    "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2", "#7F7F7F",
    "#BCBD22", "#17BECF",
];

/// Label-to-color maps for groups and members
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColorMap {
    groups: BTreeMap<String, &'static str>,
    members: BTreeMap<String, &'static str>,
    #[serde(skip)]
    next_group: usize,
    #[serde(skip)]
    next_member: usize,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a map with colors for every label in `table` not yet assigned
    pub fn assign(&self, table: &TrackTable) -> ColorMap {
        let mut next = self.clone();

        for row in table.reference_rows() {
            if let Some(group) = &row.group {
                if !next.groups.contains_key(group) {
                    let color = REFERENCE_PALETTE[next.next_group % REFERENCE_PALETTE.len()];
                    next.groups.insert(group.clone(), color);
                    next.next_group += 1;
                }
            }
        }

        for row in table.annotated_rows() {
            if !next.members.contains_key(&row.member) {
                let color = ANNOTATION_PALETTE[next.next_member % ANNOTATION_PALETTE.len()];
                next.members.insert(row.member.clone(), color);
                next.next_member += 1;
            }
        }

        next
    }

    pub fn group_color(&self, group: &str) -> Option<&'static str> {
        self.groups.get(group).copied()
    }

    pub fn member_color(&self, member: &str) -> Option<&'static str> {
        self.members.get(member).copied()
    }

    pub fn groups(&self) -> &BTreeMap<String, &'static str> {
        &self.groups
    }

    pub fn members(&self) -> &BTreeMap<String, &'static str> {
        &self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::track::tests::record;

    #[test]
    fn test_first_seen_order() {
        let mut table = TrackTable::new();
        table.insert(record("a", Some("Shuman"), "ann", false)).unwrap();
        table.insert(record("b", Some("Cai"), "bob", false)).unwrap();
        table.insert(record("c", Some("Shuman"), "cat", false)).unwrap();

        let colors = ColorMap::new().assign(&table);
        assert_eq!(colors.group_color("Shuman"), Some(REFERENCE_PALETTE[0]));
        assert_eq!(colors.group_color("Cai"), Some(REFERENCE_PALETTE[1]));
        assert!(colors.members().is_empty());
    }

    #[test]
    fn test_new_member_changes_only_its_own_entry() {
        let mut table = TrackTable::new();
        table.insert(record("a", Some("Cai"), "ann", false)).unwrap();
        table.insert(record("b", None, "zoe", true)).unwrap();
        let before = ColorMap::new().assign(&table);

        table.insert(record("c", None, "yan", true)).unwrap();
        let after = before.assign(&table);

        assert_eq!(after.groups(), before.groups());
        assert_eq!(after.member_color("zoe"), before.member_color("zoe"));
        assert_eq!(after.member_color("yan"), Some(ANNOTATION_PALETTE[1]));
        assert_eq!(after.members().len(), 2);
    }

    #[test]
    fn test_assign_is_idempotent() {
        let mut table = TrackTable::new();
        table.insert(record("a", Some("Cai"), "ann", false)).unwrap();
        let once = ColorMap::new().assign(&table);
        assert_eq!(once.assign(&table), once);
    }

    #[test]
    fn test_palette_wraps_around() {
        let mut table = TrackTable::new();
        for i in 0..12 {
            table
                .insert(record(&format!("t{}", i), Some(&format!("lab{}", i)), "m", false))
                .unwrap();
        }
        let colors = ColorMap::new().assign(&table);
        assert_eq!(colors.group_color("lab10"), Some(REFERENCE_PALETTE[0]));
        assert_eq!(colors.group_color("lab11"), Some(REFERENCE_PALETTE[1]));
    }
}
