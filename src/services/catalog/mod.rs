//! Media catalog abstraction
//!
//! Every screen reads title metadata through this trait. The production
//! implementation talks to TMDB; tests substitute a mock.

use crate::{
    error::AppResult,
    models::{Listing, MediaType, Page, TitleDetail, TitleSummary, TmdbVideo, WatchProviders},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Highest page number the catalog serves
pub const MAX_PAGE: u32 = 500;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// One page of a named listing (popular, top rated, discover)
    async fn list(
        &self,
        media_type: MediaType,
        listing: Listing,
        page: u32,
    ) -> AppResult<Page<TitleSummary>>;

    /// Multi-type search. Only movie and series results are returned.
    async fn search(&self, query: &str, page: u32) -> AppResult<Page<TitleSummary>>;

    /// Full metadata for one title
    async fn detail(&self, media_type: MediaType, id: i64) -> AppResult<TitleDetail>;

    /// Videos attached to a title (trailers, teasers, clips)
    async fn videos(&self, media_type: MediaType, id: i64) -> AppResult<Vec<TmdbVideo>>;

    /// Watch providers in the configured region, if the title has any there
    async fn watch_providers(
        &self,
        media_type: MediaType,
        id: i64,
    ) -> AppResult<Option<WatchProviders>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Rejects page numbers the catalog would refuse
pub fn validate_page(page: u32) -> AppResult<u32> {
    if page == 0 || page > MAX_PAGE {
        return Err(crate::error::AppError::InvalidInput(format!(
            "page must be between 1 and {}",
            MAX_PAGE
        )));
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_page() {
        assert_eq!(validate_page(1).unwrap(), 1);
        assert_eq!(validate_page(MAX_PAGE).unwrap(), MAX_PAGE);
        assert!(validate_page(0).is_err());
        assert!(validate_page(MAX_PAGE + 1).is_err());
    }
}
