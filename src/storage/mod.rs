//! Storage backend abstraction for variant datastores.
//!
//! Each species has its own datastore. A [`DatastoreRouter`] hands out the store for a
//! species, and that handle is passed explicitly to every lookup made for the request,
//! so no "current database" state is ever shared between requests.
//!
//! # Implementations
//!
//! - [`LocalDatastoreRouter`] / [`LocalVariantStore`] - JSON documents on the local filesystem
//!
//! # Example
//!
//! ```no_run
//! use evaws::storage::{DatastoreRouter, LocalDatastoreRouter};
//! use std::path::PathBuf;
//!
//! # async fn run() -> evaws::Result<()> {
//! let router = LocalDatastoreRouter::new(PathBuf::from("./data"), "eva_".to_string());
//! let store = router.activate("hsapiens_grch37").await?;
//! # Ok(())
//! # }
//! ```

mod local;

pub use local::{AnnotationMetadata, LocalDatastoreRouter, LocalVariantStore, StoreDocument, StoredVariant};

use crate::{
    Result, annotation::AnnotationVersionConstraint, filters::FilterSet, models::VariantEntity,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Offset/limit window for ID lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }
}

/// Lookups against the datastore of one species.
#[async_trait]
pub trait VariantStore: Send + Sync {
    /// Variants starting at an exact coordinate, optionally restricted to one alternate allele.
    async fn find_by_coordinates(
        &self,
        chromosome: &str,
        start: u64,
        reference: &str,
        alternate: Option<&str>,
        annotation: Option<&AnnotationVersionConstraint>,
    ) -> Result<Vec<VariantEntity>>;

    /// One page of variants carrying any of `ids` and matching every filter.
    async fn find_by_ids_and_filters(
        &self,
        ids: &[String],
        filters: &FilterSet,
        annotation: Option<&AnnotationVersionConstraint>,
        page: PageRequest,
    ) -> Result<Vec<VariantEntity>>;

    /// Number of variants [`find_by_ids_and_filters`](Self::find_by_ids_and_filters)
    /// would match without pagination.
    async fn count_by_ids_and_filters(&self, ids: &[String], filters: &FilterSet) -> Result<u64>;
}

/// Selects the datastore bound to a species.
#[async_trait]
pub trait DatastoreRouter: Send + Sync {
    async fn activate(&self, species: &str) -> Result<Arc<dyn VariantStore>>;
}
