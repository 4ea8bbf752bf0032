//! Session state and event reduction
//!
//! Every UI interaction becomes a [`SessionEvent`]. [`SessionState::reduce`]
//! computes the next state without touching the current one, so a failed
//! event (bad neighbor count, numeric failure, duplicate) leaves the table,
//! the projected space and the colors exactly as they were.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::colors::ColorMap;
use crate::embedding::{Coordinates, EmbeddingSettings, FitPolicy, ProjectedSpace};
use crate::error::SpaceError;
use crate::models::{TrackId, TrackRecord, TrackTable};

/// Fallback marker color for labels without an assignment
const UNASSIGNED_COLOR: &str = "#C8C8C8";

/// Fraction of the reference population the neighbor control may reach
const NEIGHBOR_FRACTION: f64 = 0.8;

/// Inputs that change the session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Enriched dataset records; replaces any previous session
    Loaded(Vec<TrackRecord>),
    /// One enriched, annotated record
    MemberAdded(TrackRecord),
    EmbeddingChanged(EmbeddingSettings),
    Hovered(Option<TrackId>),
    /// Annotated rows that have been drawn
    AnnotationsRendered(Vec<TrackId>),
}

impl SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            SessionEvent::Loaded(_) => "loaded",
            SessionEvent::MemberAdded(_) => "member_added",
            SessionEvent::EmbeddingChanged(_) => "embedding_changed",
            SessionEvent::Hovered(_) => "hovered",
            SessionEvent::AnnotationsRendered(_) => "annotations_rendered",
        }
    }
}

/// One drawable point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub member: String,
    pub group: Option<String>,
    pub artwork: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub color: &'static str,
    pub annotated: bool,
}

/// Everything the page needs to draw the space
#[derive(Debug, Clone, Serialize)]
pub struct SpaceSnapshot {
    pub method: &'static str,
    pub n_neighbors: Option<usize>,
    pub fit_policy: FitPolicy,
    pub neighbor_bounds: (usize, usize),
    pub points: Vec<PlotPoint>,
    pub group_colors: BTreeMap<String, &'static str>,
    pub member_colors: BTreeMap<String, &'static str>,
    pub highlighted: Option<TrackId>,
}

/// Complete state of one dashboard session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    table: TrackTable,
    space: Option<ProjectedSpace>,
    colors: ColorMap,
    highlighted: Option<TrackId>,
    settings: EmbeddingSettings,
}

impl SessionState {
    /// Locked session that will fit with `settings` once loaded
    pub fn new(settings: EmbeddingSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.space.is_some()
    }

    pub fn table(&self) -> &TrackTable {
        &self.table
    }

    pub fn colors(&self) -> &ColorMap {
        &self.colors
    }

    pub fn settings(&self) -> EmbeddingSettings {
        self.settings
    }

    /// Compute the state after `event`
    pub fn reduce(&self, event: SessionEvent) -> Result<SessionState, SpaceError> {
        match event {
            SessionEvent::Loaded(records) => {
                let (table, skipped) = TrackTable::from_records(records);
                if !skipped.is_empty() {
                    tracing::warn!(count = skipped.len(), "Dropped duplicate records on load");
                }
                let space = ProjectedSpace::fit(&table, self.settings)?;
                let colors = ColorMap::new().assign(&table);
                Ok(SessionState {
                    table,
                    space: Some(space),
                    colors,
                    highlighted: None,
                    settings: self.settings,
                })
            }

            SessionEvent::MemberAdded(record) => {
                let space = self.space.as_ref().ok_or(SpaceError::Locked)?;
                let mut next = self.clone();
                next.table.insert(record.clone())?;
                next.space = Some(space.extend(&next.table, &record)?);
                next.colors = self.colors.assign(&next.table);
                Ok(next)
            }

            SessionEvent::EmbeddingChanged(settings) => {
                let space = self.space.as_ref().ok_or(SpaceError::Locked)?;
                let refitted = space.refit(&self.table, settings)?;
                Ok(SessionState {
                    space: Some(refitted),
                    settings,
                    ..self.clone()
                })
            }

            SessionEvent::Hovered(id) => {
                if !self.is_loaded() {
                    return Err(SpaceError::Locked);
                }
                if let Some(id) = &id {
                    if !self.table.contains(id) {
                        return Err(SpaceError::InvalidReference(id.to_string()));
                    }
                }
                Ok(SessionState {
                    highlighted: id,
                    ..self.clone()
                })
            }

            SessionEvent::AnnotationsRendered(ids) => {
                if !self.is_loaded() {
                    return Err(SpaceError::Locked);
                }
                let mut next = self.clone();
                next.table.mark_rendered(&ids);
                Ok(next)
            }
        }
    }

    /// Apply `event`, replacing the state only if reduction succeeds
    pub fn apply(&mut self, event: SessionEvent) -> Result<(), SpaceError> {
        let name = event.name();
        match self.reduce(event) {
            Ok(next) => {
                *self = next;
                tracing::debug!(event = name, rows = self.table.len(), "Session event applied");
                Ok(())
            }
            Err(err) => {
                tracing::debug!(event = name, error = %err, "Session event rejected");
                Err(err)
            }
        }
    }

    /// Drawable view of the whole space
    pub fn snapshot(&self) -> Result<SpaceSnapshot, SpaceError> {
        let space = self.space.as_ref().ok_or(SpaceError::Locked)?;
        let settings = space.settings();
        Ok(SpaceSnapshot {
            method: settings.method.name(),
            n_neighbors: settings.method.n_neighbors(),
            fit_policy: settings.fit_policy,
            neighbor_bounds: self.neighbor_bounds(),
            points: self
                .table
                .rows()
                .iter()
                .filter_map(|r| self.point(r, space))
                .collect(),
            group_colors: self.colors.groups().clone(),
            member_colors: self.colors.members().clone(),
            highlighted: self.highlighted.clone(),
        })
    }

    /// Annotated rows added since the last render
    pub fn pending_annotations(&self) -> Vec<PlotPoint> {
        match &self.space {
            Some(space) => self
                .table
                .pending_rows()
                .filter_map(|r| self.point(r, space))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn highlighted_track(&self) -> Option<PlotPoint> {
        let space = self.space.as_ref()?;
        let id = self.highlighted.as_ref()?;
        self.table.get(id).and_then(|r| self.point(r, space))
    }

    /// Allowed neighbor counts: `[1, max(1, ⌊0.8 n⌋)]` capped below the population
    pub fn neighbor_bounds(&self) -> (usize, usize) {
        let n = self.table.reference_len();
        let upper = ((n as f64 * NEIGHBOR_FRACTION).floor() as usize)
            .max(1)
            .min(n.saturating_sub(1).max(1));
        (1, upper)
    }

    fn point(&self, record: &TrackRecord, space: &ProjectedSpace) -> Option<PlotPoint> {
        let [x, y, z]: Coordinates = space.coordinates(&record.id)?;
        let color = if record.is_annotated {
            self.colors.member_color(&record.member)
        } else {
            record
                .group
                .as_deref()
                .and_then(|g| self.colors.group_color(g))
        };
        Some(PlotPoint {
            id: record.id.clone(),
            title: record.title.clone(),
            artist: record.artist.clone(),
            album: record.album.clone(),
            member: record.member.clone(),
            group: record.group.clone(),
            artwork: record.artwork.clone(),
            x,
            y,
            z,
            color: color.unwrap_or(UNASSIGNED_COLOR),
            annotated: record.is_annotated,
        })
    }
}
