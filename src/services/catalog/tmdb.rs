//! TMDB catalog provider
//!
//! API flow:
//! 1. Listings: `/{type}/popular`, `/{type}/top_rated`, `/discover/{type}`
//! 2. Search: `/search/multi` (person results dropped)
//! 3. Detail screen: `/{type}/{id}`, `/{type}/{id}/videos`, `/{type}/{id}/watch/providers`
//!
//! Every request carries `api_key` and, where TMDB localizes, `language`.

use crate::{
    cached,
    config::Config,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        ImageUrls, Listing, MediaType, Page, TitleDetail, TitleSummary, TmdbDetail, TmdbListItem,
        TmdbPage, TmdbVideo, TmdbVideoList, TmdbWatchProviderResponse, WatchProviders,
    },
    services::catalog::CatalogProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    region: String,
    images: ImageUrls,
    cache: Cache,
    cache_ttl: u64,
}

impl TmdbProvider {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        api_url: String,
        image_url: String,
        cache: Cache,
    ) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language: "pt-BR".to_string(),
            region: "BR".to_string(),
            images: ImageUrls::new(image_url),
            cache,
            cache_ttl: 3600,
        }
    }

    /// Builds a provider from application configuration
    pub fn from_config(config: &Config, cache: Cache) -> Self {
        Self::new(
            HttpClient::new(),
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_image_url.clone(),
            cache,
        )
        .with_language(config.catalog_language.clone())
        .with_region(config.watch_region.clone())
        .with_cache_ttl(config.catalog_cache_ttl)
    }

    pub fn with_language(mut self, language: String) -> Self {
        self.language = language;
        self
    }

    pub fn with_region(mut self, region: String) -> Self {
        self.region = region;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: u64) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// GETs a TMDB path and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(redact_url)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Catalog resource {} not found", path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await.map_err(redact_url)?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                response = %response_text,
                "Failed to deserialize TMDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

/// Request URLs carry `api_key`, so they never leave in an error
fn redact_url(e: reqwest::Error) -> AppError {
    AppError::HttpClient(e.without_url())
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn list(
        &self,
        media_type: MediaType,
        listing: Listing,
        page: u32,
    ) -> AppResult<Page<TitleSummary>> {
        cached!(
            self.cache,
            CacheKey::Listing {
                media_type,
                listing,
                page,
                language: self.language.clone(),
            },
            self.cache_ttl,
            async move {
                let page_param = page.to_string();
                let raw: TmdbPage<TmdbListItem> = self
                    .get_json(
                        &listing.path(media_type),
                        &[
                            ("language", self.language.as_str()),
                            ("page", page_param.as_str()),
                        ],
                    )
                    .await?;

                let titles = raw.map(|item| item.into_summary(Some(media_type), &self.images));

                tracing::info!(
                    media_type = %media_type,
                    listing = ?listing,
                    page = page,
                    results = titles.results.len(),
                    provider = "tmdb",
                    "Listing fetched"
                );

                Ok::<_, AppError>(titles)
            }
        )
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<Page<TitleSummary>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::Search {
                query: query.to_string(),
                page,
                language: self.language.clone(),
            },
            self.cache_ttl,
            async move {
                let page_param = page.to_string();
                let raw: TmdbPage<TmdbListItem> = self
                    .get_json(
                        "/search/multi",
                        &[
                            ("query", query),
                            ("language", self.language.as_str()),
                            ("page", page_param.as_str()),
                            ("include_adult", "false"),
                        ],
                    )
                    .await?;

                // Items without a movie/tv media_type (people) are dropped
                let titles = raw.map(|item| item.into_summary(None, &self.images));

                tracing::info!(
                    query = %query,
                    results = titles.results.len(),
                    provider = "tmdb",
                    "Title search completed"
                );

                Ok::<_, AppError>(titles)
            }
        )
    }

    async fn detail(&self, media_type: MediaType, id: i64) -> AppResult<TitleDetail> {
        cached!(
            self.cache,
            CacheKey::Detail {
                media_type,
                id,
                language: self.language.clone(),
            },
            self.cache_ttl,
            async move {
                let raw: TmdbDetail = self
                    .get_json(
                        &format!("/{}/{}", media_type, id),
                        &[("language", self.language.as_str())],
                    )
                    .await?;

                Ok::<_, AppError>(raw.into_detail(media_type, &self.images))
            }
        )
    }

    async fn videos(&self, media_type: MediaType, id: i64) -> AppResult<Vec<TmdbVideo>> {
        cached!(
            self.cache,
            CacheKey::Videos {
                media_type,
                id,
                language: self.language.clone(),
            },
            self.cache_ttl,
            async move {
                let raw: TmdbVideoList = self
                    .get_json(
                        &format!("/{}/{}/videos", media_type, id),
                        &[("language", self.language.as_str())],
                    )
                    .await?;

                Ok::<_, AppError>(raw.results)
            }
        )
    }

    async fn watch_providers(
        &self,
        media_type: MediaType,
        id: i64,
    ) -> AppResult<Option<WatchProviders>> {
        cached!(
            self.cache,
            CacheKey::WatchProviders {
                media_type,
                id,
                region: self.region.clone(),
            },
            self.cache_ttl,
            async move {
                let mut raw: TmdbWatchProviderResponse = self
                    .get_json(&format!("/{}/{}/watch/providers", media_type, id), &[])
                    .await?;

                let providers = raw
                    .results
                    .remove(&self.region)
                    .map(|p| p.with_logo_urls(&self.images));

                tracing::debug!(
                    media_type = %media_type,
                    id = id,
                    region = %self.region,
                    found = providers.is_some(),
                    "Watch providers fetched"
                );

                Ok::<_, AppError>(providers)
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
