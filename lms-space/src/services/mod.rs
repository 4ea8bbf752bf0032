//! External services: catalog client and feature enrichment

pub mod catalog_client;
pub mod enrichment;

pub use catalog_client::{
    AudioFeatures, CatalogClient, CatalogConnector, CatalogEndpoints, CatalogError, CatalogService,
    CatalogTrack, HttpCatalogConnector,
};
pub use enrichment::Enricher;
