//! Data model: tracks, feature layout, dataset rows

pub mod dataset;
pub mod features;
pub mod track;

pub use dataset::{parse_dataset, DatasetRow};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use track::{TrackId, TrackRecord, TrackTable};
