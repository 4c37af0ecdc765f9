use std::sync::Arc;

use crate::{
    middleware::session::SessionGate,
    services::{
        CatalogProvider, FavoritesStore, IdentityProvider, InMemoryFavoritesStore,
        InMemoryIdentityProvider, SearchSequencer,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub identity: Arc<dyn IdentityProvider>,
    pub favorites: Arc<dyn FavoritesStore>,
    pub search_sequencer: Arc<SearchSequencer>,
    pub session_gate: SessionGate,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        identity: Arc<dyn IdentityProvider>,
        favorites: Arc<dyn FavoritesStore>,
        session_gate: SessionGate,
    ) -> Self {
        Self {
            catalog,
            identity,
            favorites,
            search_sequencer: Arc::new(SearchSequencer::new()),
            session_gate,
        }
    }

    /// State backed by in-process accounts and favorites, with the session gate open
    pub fn in_memory(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self::new(
            catalog,
            Arc::new(InMemoryIdentityProvider::default()),
            Arc::new(InMemoryFavoritesStore::new()),
            SessionGate::open(),
        )
    }
}
