use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::MediaType;

// ============================================================================
// Client-facing types
// ============================================================================

/// Named catalog listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Listing {
    Popular,
    TopRated,
    Discover,
}

impl Listing {
    /// TMDB path for this listing
    pub fn path(&self, media_type: MediaType) -> String {
        match self {
            Listing::Popular => format!("/{}/popular", media_type),
            Listing::TopRated => format!("/{}/top_rated", media_type),
            Listing::Discover => format!("/discover/{}", media_type),
        }
    }
}

/// One page of catalog results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            page: 1,
            total_pages: 0,
            total_results: 0,
            results: Vec::new(),
        }
    }
}

/// A movie or series as shown in listings and search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleSummary {
    pub id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub overview: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
}

/// Five-star rendering of a 0-10 vote average
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StarRating {
    pub full: u8,
    pub half: bool,
    pub empty: u8,
}

impl StarRating {
    /// A star is full when the halved score reaches it and half when the
    /// score is within half a star of it.
    pub fn from_vote_average(vote_average: f64) -> Self {
        let score = vote_average.clamp(0.0, 10.0) / 2.0;
        let mut full = 0;
        let mut half = false;

        for star in 1..=5u8 {
            let star = f64::from(star);
            if score >= star {
                full += 1;
            } else if score >= star - 0.5 {
                half = true;
            }
        }

        Self {
            full,
            half,
            empty: 5 - full - u8::from(half),
        }
    }
}

/// Full metadata for one title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleDetail {
    pub id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub tagline: Option<String>,
    pub overview: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub release_date: Option<String>,
    /// Release date as DD/MM/YYYY
    pub release_date_display: Option<String>,
    pub vote_average: f64,
    pub rating: StarRating,
    pub genres: Vec<String>,
    pub runtime_minutes: Option<u32>,
    pub number_of_seasons: Option<u32>,
}

/// Embeddable trailer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trailer {
    pub key: String,
    pub name: Option<String>,
    pub kind: String,
    pub embed_url: String,
}

/// Everything the detail screen needs for one title
#[derive(Debug, Clone, Serialize)]
pub struct TitleDetailView {
    pub detail: TitleDetail,
    pub trailer: Option<Trailer>,
    pub watch_providers: Option<WatchProviders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

/// Builds absolute image URLs from TMDB image paths
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base: String,
}

impl ImageUrls {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn poster(&self, path: Option<&str>) -> Option<String> {
        self.sized("w500", path)
    }

    pub fn original(&self, path: Option<&str>) -> Option<String> {
        self.sized("original", path)
    }

    fn sized(&self, size: &str, path: Option<&str>) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| format!("{}/{}{}", self.base, size, p))
    }
}

/// Formats a `YYYY-MM-DD` date as `DD/MM/YYYY`
pub fn format_release_date(date: Option<&str>) -> Option<String> {
    let date = NaiveDate::parse_from_str(date?, "%Y-%m-%d").ok()?;
    Some(date.format("%d/%m/%Y").to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Paged TMDB response
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct TmdbPage<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> TmdbPage<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> Option<U>) -> Page<U> {
        Page {
            page: self.page,
            total_pages: self.total_pages,
            total_results: self.total_results,
            results: self.results.into_iter().filter_map(f).collect(),
        }
    }
}

/// Listing/search entry. Movies carry `title`/`release_date`, series carry
/// `name`/`first_air_date`; multi search adds `media_type`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbListItem {
    pub id: i64,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

impl TmdbListItem {
    /// Converts to a summary, taking the kind from the item when present
    pub fn into_summary(self, fallback: Option<MediaType>, images: &ImageUrls) -> Option<TitleSummary> {
        let media_type = match self.media_type.as_deref() {
            Some(tag) => tag.parse().ok()?,
            None => fallback?,
        };

        Some(TitleSummary {
            id: self.id,
            media_type,
            title: self.title.or(self.name).unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            poster_url: images.poster(self.poster_path.as_deref()),
            backdrop_url: images.original(self.backdrop_path.as_deref()),
            release_date: non_empty(self.release_date).or(non_empty(self.first_air_date)),
            vote_average: self.vote_average,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: i64,
    pub name: String,
}

/// Response from GET /movie/{id} or /tv/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDetail {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
}

impl TmdbDetail {
    pub fn into_detail(self, media_type: MediaType, images: &ImageUrls) -> TitleDetail {
        let release_date = non_empty(self.release_date).or(non_empty(self.first_air_date));

        TitleDetail {
            id: self.id,
            media_type,
            title: self.title.or(self.name).unwrap_or_default(),
            tagline: non_empty(self.tagline),
            overview: self.overview.unwrap_or_default(),
            poster_url: images.poster(self.poster_path.as_deref()),
            backdrop_url: images.original(self.backdrop_path.as_deref()),
            release_date_display: format_release_date(release_date.as_deref()),
            release_date,
            vote_average: self.vote_average,
            rating: StarRating::from_vote_average(self.vote_average),
            genres: self.genres.into_iter().map(|g| g.name).collect(),
            runtime_minutes: self.runtime.filter(|r| *r > 0),
            number_of_seasons: self.number_of_seasons,
        }
    }
}

/// Response from GET /{type}/{id}/videos
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideoList {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbVideo {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response from GET /{type}/{id}/watch/providers, keyed by region code
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbWatchProviderResponse {
    #[serde(default)]
    pub results: std::collections::HashMap<String, WatchProviders>,
}

/// Where a title can be watched in one region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WatchProviders {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<Provider>,
    #[serde(default)]
    pub rent: Vec<Provider>,
    #[serde(default)]
    pub buy: Vec<Provider>,
}

impl WatchProviders {
    pub fn is_empty(&self) -> bool {
        self.flatrate.is_empty() && self.rent.is_empty() && self.buy.is_empty()
    }

    /// Rewrites logo paths into absolute URLs
    pub fn with_logo_urls(mut self, images: &ImageUrls) -> Self {
        for provider in self
            .flatrate
            .iter_mut()
            .chain(self.rent.iter_mut())
            .chain(self.buy.iter_mut())
        {
            if let Some(url) = images.original(provider.logo_path.as_deref()) {
                provider.logo_path = Some(url);
            }
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    pub provider_id: i64,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}
