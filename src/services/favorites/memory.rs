use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{error::AppResult, models::Favorite, services::favorites::FavoritesStore};

/// Favorites kept in process memory
///
/// Every mutation runs under the write lock, which makes toggle a single
/// atomic read-modify-write.
#[derive(Default)]
pub struct InMemoryFavoritesStore {
    inner: RwLock<HashMap<Uuid, Vec<Favorite>>>,
}

impl InMemoryFavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FavoritesStore for InMemoryFavoritesStore {
    async fn list(&self, user: Uuid) -> AppResult<Vec<Favorite>> {
        let inner = self.inner.read().await;
        Ok(inner.get(&user).cloned().unwrap_or_default())
    }

    async fn contains(&self, user: Uuid, favorite: Favorite) -> AppResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(&user)
            .map(|favorites| favorites.contains(&favorite))
            .unwrap_or(false))
    }

    async fn add(&self, user: Uuid, favorite: Favorite) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let favorites = inner.entry(user).or_default();
        if favorites.contains(&favorite) {
            return Ok(false);
        }
        favorites.push(favorite);
        Ok(true)
    }

    async fn remove(&self, user: Uuid, favorite: Favorite) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(favorites) = inner.get_mut(&user) else {
            return Ok(false);
        };
        let before = favorites.len();
        favorites.retain(|f| *f != favorite);
        Ok(favorites.len() != before)
    }

    async fn toggle(&self, user: Uuid, favorite: Favorite) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let favorites = inner.entry(user).or_default();
        match favorites.iter().position(|f| *f == favorite) {
            Some(index) => {
                favorites.remove(index);
                Ok(false)
            }
            None => {
                favorites.push(favorite);
                Ok(true)
            }
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
