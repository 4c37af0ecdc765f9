use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{
    api::AppState,
    error::AppResult,
    middleware::request_id::{header_id, CLIENT_ID_HEADER},
    models::SessionState,
    services::search::{search_titles, SearchResponse},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    #[serde(default = "super::first_page")]
    page: u32,
    seq: Option<u64>,
}

/// Handler for title search endpoint
///
/// Searches are sequenced per signed-in user, or per `x-client-id` for
/// anonymous callers.
pub async fn search(
    State(state): State<AppState>,
    session: SessionState,
    headers: HeaderMap,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let client = session
        .identity
        .as_ref()
        .map(|identity| identity.uid.to_string())
        .or_else(|| header_id(&headers, CLIENT_ID_HEADER));

    let response = search_titles(
        state.catalog.clone(),
        &state.search_sequencer,
        client.as_deref(),
        &params.q,
        params.seq,
        params.page,
    )
    .await?;

    Ok(Json(response))
}
