pub mod catalog;
pub mod favorite;
pub mod identity;

pub use catalog::{
    ImageUrls, Listing, Page, Provider, StarRating, TitleDetail, TitleDetailView, TitleSummary,
    TmdbDetail, TmdbListItem, TmdbPage, TmdbVideo, TmdbVideoList, TmdbWatchProviderResponse,
    Trailer, WatchProviders,
};
pub use favorite::{Favorite, FavoriteChange, FavoriteTitle, FavoriteTitles, MediaType};
pub use identity::{Credentials, Identity, Registration, SessionGrant, SessionState, SessionToken};
