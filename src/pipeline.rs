//! Resolution of a variant identifier into stored variants.

use crate::{
    Error, Result,
    annotation::AnnotationVersionConstraint,
    filters::FilterSet,
    identifier::VariantIdentifier,
    models::VariantEntity,
    storage::{DatastoreRouter, PageRequest},
};

/// A page of results plus the number of matches across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// A result whose total is simply the number of items held.
    pub fn counted(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self { items, total }
    }
}

/// Everything a lookup needs once the request parameters have been validated.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub variant_id: &'a str,
    pub species: &'a str,
    pub annotation: Option<&'a AnnotationVersionConstraint>,
    pub filters: &'a FilterSet,
    pub page: PageRequest,
}

/// Resolves `resolution.variant_id` against the datastore of `resolution.species`.
///
/// Positional identifiers are an exact coordinate lookup whose total is the result
/// length. Opaque identifiers go through the filters and pagination, with the total
/// taken from a separate count.
pub async fn resolve(
    router: &dyn DatastoreRouter,
    resolution: Resolution<'_>,
) -> Result<PagedResult<VariantEntity>> {
    if resolution.species.is_empty() {
        return Err(Error::MissingSpecies);
    }

    let identifier = VariantIdentifier::parse(resolution.variant_id)?;
    let store = router.activate(resolution.species).await?;

    match identifier {
        VariantIdentifier::Positional {
            chromosome,
            position,
            reference,
            alternate,
        } => {
            tracing::debug!(%chromosome, position, %reference, ?alternate, "coordinate lookup");
            let variants = store
                .find_by_coordinates(
                    &chromosome,
                    position,
                    &reference,
                    alternate.as_deref(),
                    resolution.annotation,
                )
                .await?;
            Ok(PagedResult::counted(variants))
        }
        VariantIdentifier::Opaque { id } => {
            tracing::debug!(%id, filters = resolution.filters.len(), "id lookup");
            let ids = [id];
            let variants = store
                .find_by_ids_and_filters(
                    &ids,
                    resolution.filters,
                    resolution.annotation,
                    resolution.page,
                )
                .await?;
            let total = store.count_by_ids_and_filters(&ids, resolution.filters).await?;
            Ok(PagedResult::new(variants, total))
        }
    }
}
