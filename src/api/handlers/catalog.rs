use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::PageQuery;
use crate::{
    api::AppState,
    error::AppResult,
    models::{Listing, MediaType, Page, TitleSummary},
    services::catalog::validate_page,
};

/// One page of a catalog listing
pub async fn list(
    State(state): State<AppState>,
    Path((media_type, listing)): Path<(MediaType, Listing)>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<Page<TitleSummary>>> {
    let page = validate_page(params.page)?;
    let results = state.catalog.list(media_type, listing, page).await?;
    Ok(Json(results))
}
