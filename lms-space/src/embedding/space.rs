//! Projected space: statistics, fitted model and id-keyed coordinates

use nalgebra::DMatrix;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    feature_matrix, EmbeddingError, EmbeddingModel, EmbeddingSettings, FeatureStats, FitPolicy,
    Projection, EMBEDDING_DIMS,
};
use crate::models::{TrackId, TrackRecord, TrackTable};

/// One point in the embedding
pub type Coordinates = [f64; EMBEDDING_DIMS];

/// Fitted projection of a track table
#[derive(Debug, Clone)]
pub struct ProjectedSpace {
    stats: FeatureStats,
    model: Arc<EmbeddingModel>,
    settings: EmbeddingSettings,
    fit_ids: Vec<TrackId>,
    coords: BTreeMap<TrackId, Coordinates>,
}

impl ProjectedSpace {
    /// Standardize against the reference population and fit per `settings`
    pub fn fit(table: &TrackTable, settings: EmbeddingSettings) -> Result<Self, EmbeddingError> {
        let reference = feature_matrix(table.reference_rows());
        let stats = FeatureStats::from_reference(&reference)?;
        Self::build(stats, table, settings)
    }

    /// Fit a new model with different settings, keeping the feature statistics
    pub fn refit(&self, table: &TrackTable, settings: EmbeddingSettings) -> Result<Self, EmbeddingError> {
        Self::build(self.stats.clone(), table, settings)
    }

    /// Place a newly inserted row.
    ///
    /// `table` must already contain `record`. Under `ReferenceOnly` the
    /// model is reused and existing coordinates do not move; under `Global`
    /// the whole table is refitted.
    pub fn extend(&self, table: &TrackTable, record: &TrackRecord) -> Result<Self, EmbeddingError> {
        if self.coords.contains_key(&record.id) {
            return Ok(self.clone());
        }

        match self.settings.fit_policy {
            FitPolicy::Global => self.refit(table, self.settings),
            FitPolicy::ReferenceOnly => {
                let z = self.stats.apply(&feature_matrix([record]))?;
                let y = self.model.transform(&z)?;

                let mut next = self.clone();
                next.coords.insert(record.id.clone(), row_coordinates(&y, 0));
                Ok(next)
            }
        }
    }

    fn build(
        stats: FeatureStats,
        table: &TrackTable,
        settings: EmbeddingSettings,
    ) -> Result<Self, EmbeddingError> {
        let (fit_rows, rest): (Vec<&TrackRecord>, Vec<&TrackRecord>) = match settings.fit_policy {
            FitPolicy::Global => (table.rows().iter().collect(), Vec::new()),
            FitPolicy::ReferenceOnly => table.rows().iter().partition(|r| !r.is_annotated),
        };

        // bounded by the reference population under either policy
        settings.method.validate(table.reference_len())?;

        let z_fit = stats.apply(&feature_matrix(fit_rows.iter().copied()))?;
        let (model, y_fit) = EmbeddingModel::fit_transform(&settings.method, &z_fit)?;

        let mut coords = BTreeMap::new();
        for (i, row) in fit_rows.iter().enumerate() {
            coords.insert(row.id.clone(), row_coordinates(&y_fit, i));
        }
        if !rest.is_empty() {
            let z_rest = stats.apply(&feature_matrix(rest.iter().copied()))?;
            let y_rest = model.transform(&z_rest)?;
            for (i, row) in rest.iter().enumerate() {
                coords.insert(row.id.clone(), row_coordinates(&y_rest, i));
            }
        }

        tracing::info!(
            method = settings.method.name(),
            n_neighbors = ?settings.method.n_neighbors(),
            policy = ?settings.fit_policy,
            fit_rows = fit_rows.len(),
            transformed_rows = rest.len(),
            "Embedding fitted"
        );

        Ok(Self {
            stats,
            model: Arc::new(model),
            settings,
            fit_ids: fit_rows.iter().map(|r| r.id.clone()).collect(),
            coords,
        })
    }

    pub fn coordinates(&self, id: &TrackId) -> Option<Coordinates> {
        self.coords.get(id).copied()
    }

    pub fn settings(&self) -> EmbeddingSettings {
        self.settings
    }

    pub fn stats(&self) -> &FeatureStats {
        &self.stats
    }

    /// Rows the current model was fitted on
    pub fn fit_ids(&self) -> &[TrackId] {
        &self.fit_ids
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

fn row_coordinates(m: &DMatrix<f64>, i: usize) -> Coordinates {
    let mut out = [0.0; EMBEDDING_DIMS];
    for (c, slot) in out.iter_mut().enumerate() {
        *slot = m[(i, c)];
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::embedding::EmbeddingMethod;
    use crate::models::track::tests::record;
    use crate::models::FEATURE_COUNT;

    /// Record with deterministic, varied features
    pub(crate) fn featured(id: &str, group: Option<&str>, member: &str, annotated: bool, seed: usize) -> TrackRecord {
        let mut r = record(id, group, member, annotated);
        for (j, f) in r.features.iter_mut().enumerate() {
            *f = ((seed * 31 + j * 17) % 23) as f64 / 7.0 + (seed as f64 * 0.13).sin() * (j + 1) as f64;
        }
        r
    }

    pub(crate) fn reference_table(n: usize) -> TrackTable {
        let mut table = TrackTable::new();
        for i in 0..n {
            let lab = if i % 2 == 0 { "Cai" } else { "Shuman" };
            table
                .insert(featured(&format!("ref{}", i), Some(lab), &format!("m{}", i), false, i))
                .unwrap();
        }
        table
    }

    fn settings(method: EmbeddingMethod, fit_policy: FitPolicy) -> EmbeddingSettings {
        EmbeddingSettings { method, fit_policy }
    }

    #[test]
    fn test_fit_covers_every_row() {
        let table = reference_table(10);
        let space = ProjectedSpace::fit(&table, EmbeddingSettings::default()).unwrap();
        assert_eq!(space.len(), 10);
        assert_eq!(space.fit_ids().len(), 10);
        assert!(table.rows().iter().all(|r| space.coordinates(&r.id).is_some()));
        assert_eq!(space.stats().mean.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_reference_only_keeps_reference_coordinates() {
        for method in [
            EmbeddingMethod::Pca,
            EmbeddingMethod::Isomap { n_neighbors: 4 },
            EmbeddingMethod::Spectral { n_neighbors: 4 },
        ] {
            let mut table = reference_table(10);
            let space = ProjectedSpace::fit(&table, settings(method, FitPolicy::ReferenceOnly)).unwrap();

            let added = featured("new1", None, "zoe", true, 42);
            table.insert(added.clone()).unwrap();
            let next = space.extend(&table, &added).unwrap();

            for row in table.reference_rows() {
                assert_eq!(space.coordinates(&row.id), next.coordinates(&row.id), "{}", method.name());
            }
            assert!(next.coordinates(&added.id).is_some());
            assert_eq!(next.fit_ids().len(), 10);
        }
    }

    #[test]
    fn test_global_policy_refits_on_all_rows() {
        let mut table = reference_table(10);
        let space = ProjectedSpace::fit(&table, settings(EmbeddingMethod::Pca, FitPolicy::Global)).unwrap();

        let added = featured("new1", None, "zoe", true, 42);
        table.insert(added.clone()).unwrap();
        let next = space.extend(&table, &added).unwrap();

        assert_eq!(next.fit_ids().len(), 11);
        assert!(next.fit_ids().contains(&added.id));
        // statistics still come from the reference population only
        assert_eq!(next.stats(), space.stats());
    }

    #[test]
    fn test_refit_places_annotated_rows_by_transform() {
        let mut table = reference_table(10);
        table.insert(featured("new1", None, "zoe", true, 42)).unwrap();

        let space = ProjectedSpace::fit(&table, EmbeddingSettings::default()).unwrap();
        assert_eq!(space.fit_ids().len(), 10);
        assert_eq!(space.len(), 11);

        let isomap = space
            .refit(&table, settings(EmbeddingMethod::Isomap { n_neighbors: 3 }, FitPolicy::ReferenceOnly))
            .unwrap();
        assert_eq!(isomap.len(), 11);
    }

    #[test]
    fn test_invalid_neighbors_rejected_against_reference_population() {
        let table = reference_table(6);
        let err = ProjectedSpace::fit(
            &table,
            settings(EmbeddingMethod::Isomap { n_neighbors: 6 }, FitPolicy::ReferenceOnly),
        )
        .unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidHyperparameter(_)));
    }

    #[test]
    fn test_extend_with_known_id_is_noop() {
        let table = reference_table(6);
        let space = ProjectedSpace::fit(&table, EmbeddingSettings::default()).unwrap();
        let existing = table.rows()[0].clone();
        let next = space.extend(&table, &existing).unwrap();
        assert_eq!(next.coordinates(&existing.id), space.coordinates(&existing.id));
        assert_eq!(next.len(), 6);
    }
}
