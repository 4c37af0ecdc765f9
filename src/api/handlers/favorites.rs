use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::AppState,
    error::AppResult,
    middleware::session::AuthenticatedUser,
    models::{Favorite, FavoriteChange, FavoriteTitles, MediaType},
    services::favorites::{add_favorite, favorite_titles, remove_favorite, toggle_favorite},
};

pub async fn list(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<Favorite>>> {
    let favorites = state.favorites.list(user.identity.uid).await?;
    Ok(Json(favorites))
}

/// Favorites with catalog metadata
pub async fn titles(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<FavoriteTitles>> {
    let titles = favorite_titles(
        state.favorites.as_ref(),
        state.catalog.clone(),
        user.identity.uid,
    )
    .await?;
    Ok(Json(titles))
}

pub async fn toggle(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(favorite): Json<Favorite>,
) -> AppResult<Json<FavoriteChange>> {
    let change = toggle_favorite(state.favorites.as_ref(), user.identity.uid, favorite).await?;
    Ok(Json(change))
}

pub async fn add(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((media_type, id)): Path<(MediaType, i64)>,
) -> AppResult<Json<FavoriteChange>> {
    let favorite = Favorite::new(id, media_type);
    let change = add_favorite(state.favorites.as_ref(), user.identity.uid, favorite).await?;
    Ok(Json(change))
}

pub async fn remove(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((media_type, id)): Path<(MediaType, i64)>,
) -> AppResult<Json<FavoriteChange>> {
    let favorite = Favorite::new(id, media_type);
    let change = remove_favorite(state.favorites.as_ref(), user.identity.uid, favorite).await?;
    Ok(Json(change))
}
