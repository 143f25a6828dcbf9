mod beacon;
mod links;
mod variants;

pub use beacon::beacon;
pub use links::{build_link, get_links};
pub use variants::{get_annotations, get_core_info, get_source_entries, get_source_entry};

use crate::config::PagingConfig;
use crate::storage::DatastoreRouter;
use axum::{Router, routing::get};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub datastores: Arc<dyn DatastoreRouter>,
    pub base_url: String,
    pub paging: PagingConfig,
    pub docs_species: String,
}

/// All service routes, without transport layers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v2/variants/:variant_id/info", get(get_core_info))
        .route("/v2/variants/:variant_id/info/annotations", get(get_annotations))
        .route("/v2/variants/:variant_id/info/source-Entries", get(get_source_entries))
        .route(
            "/v2/variants/:variant_id/info/source-Entries/:source_entry_id",
            get(get_source_entry),
        )
        .route("/v2/variants/:variant_id/info/links", get(get_links))
        .route("/", get(beacon))
        .route("/v2/beacon", get(beacon))
        .with_state(state)
}
