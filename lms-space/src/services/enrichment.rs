//! Feature enrichment: dataset rows and user references to track records
//!
//! Enrichment only produces records; applying them to the track table is
//! the session's job. Both entry points are all-or-nothing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::catalog_client::{AudioFeatures, CatalogService, CatalogTrack};
use crate::error::SpaceError;
use crate::models::{DatasetRow, TrackId, TrackRecord, TrackTable};

/// Resolves references against the catalog in batches
#[derive(Clone)]
pub struct Enricher {
    catalog: Arc<dyn CatalogService>,
    batch_size: usize,
}

impl Enricher {
    pub fn new(catalog: Arc<dyn CatalogService>, batch_size: usize) -> Self {
        Self {
            catalog,
            batch_size: batch_size.max(1),
        }
    }

    /// Enrich every dataset row, keeping the first row of any repeated id
    pub async fn enrich(&self, rows: &[DatasetRow]) -> Result<Vec<TrackRecord>, SpaceError> {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(rows.len());
        for row in rows {
            let id = TrackId::from_reference(&row.reference)?;
            if seen.insert(id.clone()) {
                unique.push((id, row));
            } else {
                tracing::warn!(
                    id = %id,
                    member = %row.member,
                    "Duplicate track in dataset, keeping first occurrence"
                );
            }
        }

        let mut records = Vec::with_capacity(unique.len());
        for chunk in unique.chunks(self.batch_size) {
            let ids: Vec<TrackId> = chunk.iter().map(|(id, _)| id.clone()).collect();
            let mut found = self.lookup(&ids).await?;

            for (id, row) in chunk {
                let (track, features) = found
                    .remove(id)
                    .ok_or_else(|| SpaceError::InvalidReference(id.to_string()))?;
                records.push(build_record(
                    Some(row.group.clone()),
                    &row.member,
                    &row.reference,
                    track,
                    &features,
                    false,
                ));
            }
        }

        tracing::info!(
            rows = rows.len(),
            records = records.len(),
            batch_size = self.batch_size,
            "Dataset enriched"
        );
        Ok(records)
    }

    /// Resolve one user-supplied reference into a new annotated record
    pub async fn enrich_one(
        &self,
        table: &TrackTable,
        member: &str,
        reference: &str,
    ) -> Result<TrackRecord, SpaceError> {
        let id = TrackId::from_reference(reference)?;
        if table.contains(&id) {
            return Err(SpaceError::DuplicateReference(id.to_string()));
        }

        let track = self
            .catalog
            .tracks(std::slice::from_ref(&id))
            .await?
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| SpaceError::InvalidReference(reference.to_string()))?;

        // the catalog may answer with a different canonical id
        if table.contains(&track.id) {
            return Err(SpaceError::DuplicateReference(track.id.to_string()));
        }

        let features = self
            .catalog
            .audio_features(std::slice::from_ref(&track.id))
            .await?
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| SpaceError::InvalidReference(reference.to_string()))?;

        tracing::info!(member = %member, id = %track.id, title = %track.title, "Member track resolved");
        Ok(build_record(None, member, reference, track, &features, true))
    }

    /// Bulk lookup of one batch, keyed by the requested id
    ///
    /// Track answers are aligned with `ids`; a track may come back under a
    /// different canonical id, so features are fetched and joined on that one.
    async fn lookup(
        &self,
        ids: &[TrackId],
    ) -> Result<HashMap<TrackId, (CatalogTrack, AudioFeatures)>, SpaceError> {
        let resolved: Vec<(TrackId, CatalogTrack)> = ids
            .iter()
            .cloned()
            .zip(self.catalog.tracks(ids).await?)
            .filter_map(|(requested, track)| track.map(|t| (requested, t)))
            .collect();
        if resolved.is_empty() {
            return Ok(HashMap::new());
        }

        let canonical: Vec<TrackId> = resolved.iter().map(|(_, t)| t.id.clone()).collect();
        let features: HashMap<TrackId, AudioFeatures> = self
            .catalog
            .audio_features(&canonical)
            .await?
            .into_iter()
            .flatten()
            .map(|f| (f.id.clone(), f))
            .collect();

        let mut joined = HashMap::with_capacity(resolved.len());
        for (requested, track) in resolved {
            if requested != track.id {
                tracing::debug!(requested = %requested, canonical = %track.id, "Catalog relinked track");
            }
            if let Some(f) = features.get(&track.id).cloned() {
                joined.insert(requested, (track, f));
            }
        }
        Ok(joined)
    }
}

fn build_record(
    group: Option<String>,
    member: &str,
    reference: &str,
    track: CatalogTrack,
    features: &AudioFeatures,
    annotated: bool,
) -> TrackRecord {
    TrackRecord {
        group,
        member: member.to_string(),
        reference: reference.to_string(),
        id: track.id,
        title: track.title,
        artist: track.artist,
        album: track.album,
        artwork: track.artwork,
        features: features.to_vector(),
        is_new: annotated,
        is_annotated: annotated,
    }
}
