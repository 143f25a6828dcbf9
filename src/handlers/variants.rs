use super::AppState;
use crate::{
    Error, Result,
    annotation::AnnotationVersionConstraint,
    filters::FilterSet,
    models::SourceEntryKey,
    pipeline::{self, Resolution},
    projection::{self, ProjectedItem, View},
    types::{QueryResponse, VariantInfoQuery},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};

pub async fn get_core_info(
    State(state): State<AppState>,
    Path(variant_id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<QueryResponse<ProjectedItem>>> {
    let query = VariantInfoQuery::from_pairs(params)?;
    variant_info(&state, &variant_id, &query, View::CoreInfo)
        .await
        .map(Json)
}

pub async fn get_annotations(
    State(state): State<AppState>,
    Path(variant_id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<QueryResponse<ProjectedItem>>> {
    let query = VariantInfoQuery::from_pairs(params)?;
    variant_info(&state, &variant_id, &query, View::Annotations)
        .await
        .map(Json)
}

pub async fn get_source_entries(
    State(state): State<AppState>,
    Path(variant_id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<QueryResponse<ProjectedItem>>> {
    let query = VariantInfoQuery::from_pairs(params)?;
    variant_info(&state, &variant_id, &query, View::SourceEntries)
        .await
        .map(Json)
}

pub async fn get_source_entry(
    State(state): State<AppState>,
    Path((variant_id, source_entry_id)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<QueryResponse<ProjectedItem>>> {
    let query = VariantInfoQuery::from_pairs(params)?;
    // Annotation parameters, then species, then the key.
    annotation_constraint(&query)?;
    if query.species.as_deref().unwrap_or_default().is_empty() {
        return Err(Error::MissingSpecies);
    }
    let key = SourceEntryKey::parse(&source_entry_id)?;
    variant_info(&state, &variant_id, &query, View::SourceEntry(key))
        .await
        .map(Json)
}

fn annotation_constraint(query: &VariantInfoQuery) -> Result<Option<AnnotationVersionConstraint>> {
    AnnotationVersionConstraint::from_params(
        query.annot_vep_version.as_deref(),
        query.annot_vep_cache_version.as_deref(),
    )
}

/// Validation, resolution and projection shared by every variant info endpoint.
pub(super) async fn variant_info(
    state: &AppState,
    variant_id: &str,
    query: &VariantInfoQuery,
    view: View,
) -> Result<QueryResponse<ProjectedItem>> {
    let annotation = annotation_constraint(query)?;
    let filters = FilterSet::compose(
        query.maf.as_deref(),
        query.polyphen.as_deref(),
        query.sift.as_deref(),
        &query.studies,
        &query.consequence_types,
    );

    tracing::debug!(variant_id, view = view.name(), species = ?query.species, "variant info request");

    let resolved = pipeline::resolve(
        state.datastores.as_ref(),
        Resolution {
            variant_id,
            species: query.species.as_deref().unwrap_or_default(),
            annotation: annotation.as_ref(),
            filters: &filters,
            page: query.page(state.paging),
        },
    )
    .await?;

    let projected = projection::project(&view, resolved);
    Ok(QueryResponse::from_result(variant_id, projected.items, projected.total))
}
