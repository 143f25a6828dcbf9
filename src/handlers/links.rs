use super::{AppState, variants::variant_info};
use crate::{
    Error, Result,
    projection::{ProjectedItem, View},
    types::{Link, LinkedResponse, QueryResponse, VariantInfoQuery},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use url::Url;

/// Core info for the variant, plus links to the core info and annotations resources.
///
/// Links are returned even when the core info lookup is rejected, so a client can
/// retry against the right resource.
pub async fn get_links(
    State(state): State<AppState>,
    Path(variant_id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<(StatusCode, Json<LinkedResponse<ProjectedItem>>)> {
    let query = VariantInfoQuery::from_pairs(params)?;

    let links = vec![
        Link {
            rel: View::CoreInfo.name().to_string(),
            href: build_link(&state.base_url, &variant_id, &View::CoreInfo, &query)?,
        },
        Link {
            rel: View::Annotations.name().to_string(),
            href: build_link(&state.base_url, &variant_id, &View::Annotations, &query)?,
        },
    ];

    let (status, content) = match variant_info(&state, &variant_id, &query, View::CoreInfo).await {
        Ok(content) => (StatusCode::OK, content),
        Err(err) => {
            tracing::debug!(error = %err, "core info rejected for links");
            (err.status_code(), QueryResponse::from_error(err.to_string()))
        }
    };

    Ok((status, Json(LinkedResponse { content, links })))
}

/// Absolute URL of the endpoint serving `view` for `variant_id`, with the query's parameters.
pub fn build_link(
    base_url: &str,
    variant_id: &str,
    view: &View,
    query: &VariantInfoQuery,
) -> Result<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| Error::Internal(format!("invalid base url '{base_url}': {e}")))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::Internal(format!("base url '{base_url}' cannot hold a path")))?;
        segments
            .pop_if_empty()
            .extend(["v2", "variants", variant_id, "info"]);
        match view {
            View::CoreInfo => {}
            View::Annotations => {
                segments.push("annotations");
            }
            View::SourceEntries => {
                segments.push("source-Entries");
            }
            View::SourceEntry(key) => {
                segments
                    .push("source-Entries")
                    .push(&format!("{}_{}", key.study_id, key.file_id));
            }
        }
    }

    let pairs = query.to_pairs();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    Ok(url.into())
}
