use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::TitleDetail;

/// Kind of catalog title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Path segment and storage tag used for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(format!("unknown media type '{}'", other)),
        }
    }
}

/// A user-chosen title. Identity is the `(id, type)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

impl Favorite {
    pub fn new(id: i64, media_type: MediaType) -> Self {
        Self { id, media_type }
    }
}

/// Result of a favorites mutation, carrying the new membership so clients
/// can update their view without refetching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FavoriteChange {
    pub favorite: Favorite,
    pub is_favorite: bool,
    pub changed: bool,
}

/// A favorite joined with its catalog metadata
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteTitle {
    pub favorite: Favorite,
    pub title: TitleDetail,
}

/// Hydrated favorites listing
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteTitles {
    pub titles: Vec<FavoriteTitle>,
    /// Favorites whose metadata could not be fetched
    pub unavailable: Vec<Favorite>,
}
