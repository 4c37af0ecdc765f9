pub mod catalog;
pub mod details;
pub mod favorites;
pub mod identity;
pub mod search;

pub use catalog::{CatalogProvider, TmdbProvider};
pub use favorites::{FavoritesStore, InMemoryFavoritesStore, PgFavoritesStore};
pub use identity::{IdentityProvider, InMemoryIdentityProvider, PgIdentityProvider};
pub use search::SearchSequencer;
