//! Per-user favorites
//!
//! Each user owns a set of `(id, type)` pairs. Stores apply add, remove and
//! toggle atomically on their side, so concurrent toggles from several tabs
//! or devices cannot lose each other's changes.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Favorite, FavoriteChange, FavoriteTitle, FavoriteTitles},
    services::catalog::CatalogProvider,
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryFavoritesStore;
pub use postgres::PgFavoritesStore;

#[async_trait::async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Favorites of a user in the order they were added
    async fn list(&self, user: Uuid) -> AppResult<Vec<Favorite>>;

    async fn contains(&self, user: Uuid, favorite: Favorite) -> AppResult<bool>;

    /// Set-union. Returns `true` when the favorite was not present before.
    async fn add(&self, user: Uuid, favorite: Favorite) -> AppResult<bool>;

    /// Set-remove. Returns `true` when the favorite was present before.
    async fn remove(&self, user: Uuid, favorite: Favorite) -> AppResult<bool>;

    /// Removes the favorite if present, adds it otherwise, as one atomic step.
    /// Returns the new membership.
    async fn toggle(&self, user: Uuid, favorite: Favorite) -> AppResult<bool>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}

pub async fn toggle_favorite(
    store: &dyn FavoritesStore,
    user: Uuid,
    favorite: Favorite,
) -> AppResult<FavoriteChange> {
    let is_favorite = store.toggle(user, favorite).await?;

    tracing::info!(
        user = %user,
        id = favorite.id,
        media_type = %favorite.media_type,
        is_favorite = is_favorite,
        store = store.name(),
        "Favorite toggled"
    );

    Ok(FavoriteChange {
        favorite,
        is_favorite,
        changed: true,
    })
}

pub async fn add_favorite(
    store: &dyn FavoritesStore,
    user: Uuid,
    favorite: Favorite,
) -> AppResult<FavoriteChange> {
    let changed = store.add(user, favorite).await?;
    tracing::info!(user = %user, id = favorite.id, media_type = %favorite.media_type, changed = changed, "Favorite added");

    Ok(FavoriteChange {
        favorite,
        is_favorite: true,
        changed,
    })
}

pub async fn remove_favorite(
    store: &dyn FavoritesStore,
    user: Uuid,
    favorite: Favorite,
) -> AppResult<FavoriteChange> {
    let changed = store.remove(user, favorite).await?;
    tracing::info!(user = %user, id = favorite.id, media_type = %favorite.media_type, changed = changed, "Favorite removed");

    Ok(FavoriteChange {
        favorite,
        is_favorite: false,
        changed,
    })
}

/// Lists a user's favorites with catalog metadata
///
/// Metadata is fetched for every favorite in parallel. Favorites whose fetch
/// fails are reported as unavailable; the call only fails when every fetch
/// does.
pub async fn favorite_titles(
    store: &dyn FavoritesStore,
    catalog: Arc<dyn CatalogProvider>,
    user: Uuid,
) -> AppResult<FavoriteTitles> {
    let favorites = store.list(user).await?;

    let mut tasks = Vec::with_capacity(favorites.len());
    for favorite in favorites {
        let catalog = catalog.clone();
        let task = tokio::spawn(async move { catalog.detail(favorite.media_type, favorite.id).await });
        tasks.push((favorite, task));
    }

    let mut titles = Vec::new();
    let mut unavailable = Vec::new();

    for (favorite, task) in tasks {
        match task.await {
            Ok(Ok(title)) => titles.push(FavoriteTitle { favorite, title }),
            Ok(Err(e)) => {
                tracing::error!(error = %e, id = favorite.id, media_type = %favorite.media_type, "Favorite metadata fetch failed");
                unavailable.push(favorite);
            }
            Err(e) => {
                tracing::error!(error = %e, "Task join error");
                unavailable.push(favorite);
            }
        }
    }

    if !unavailable.is_empty() {
        tracing::warn!(
            success_count = titles.len(),
            error_count = unavailable.len(),
            "Partial favorites metadata failure"
        );
    }

    if titles.is_empty() && !unavailable.is_empty() {
        return Err(AppError::ExternalApi(
            "Failed to fetch metadata for any favorite".to_string(),
        ));
    }

    Ok(FavoriteTitles { titles, unavailable })
}
