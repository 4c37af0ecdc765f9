use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::AppState,
    error::AppResult,
    models::{Favorite, MediaType, SessionState, TitleDetailView},
    services::details::title_detail_view,
};

/// Detail screen for one title
///
/// Signed-in callers also get `is_favorite`.
pub async fn detail(
    State(state): State<AppState>,
    session: SessionState,
    Path((media_type, id)): Path<(MediaType, i64)>,
) -> AppResult<Json<TitleDetailView>> {
    let mut view = title_detail_view(state.catalog.clone(), media_type, id).await?;

    if let Some(identity) = &session.identity {
        let favorite = Favorite::new(id, media_type);
        view.is_favorite = Some(state.favorites.contains(identity.uid, favorite).await?);
    }

    Ok(Json(view))
}
