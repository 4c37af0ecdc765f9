use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{MediaType, TitleDetailView, TmdbVideo, Trailer},
    services::catalog::CatalogProvider,
};

const YOUTUBE_EMBED_URL: &str = "https://www.youtube.com/embed";

/// Assembles the detail screen for one title
///
/// Detail, videos and watch providers are fetched concurrently. Only the
/// detail is required; a failed videos or providers call is logged and the
/// view renders without a trailer or provider section.
pub async fn title_detail_view(
    catalog: Arc<dyn CatalogProvider>,
    media_type: MediaType,
    id: i64,
) -> AppResult<TitleDetailView> {
    let (detail, videos, providers) = tokio::join!(
        catalog.detail(media_type, id),
        catalog.videos(media_type, id),
        catalog.watch_providers(media_type, id),
    );

    let detail = detail?;

    let trailer = match videos {
        Ok(videos) => select_trailer(&videos),
        Err(e) => {
            tracing::warn!(error = %e, media_type = %media_type, id = id, "Failed to load videos");
            None
        }
    };

    let watch_providers = match providers {
        Ok(providers) => providers.filter(|p| !p.is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, media_type = %media_type, id = id, "Failed to load watch providers");
            None
        }
    };

    Ok(TitleDetailView {
        detail,
        trailer,
        watch_providers,
        is_favorite: None,
    })
}

/// First YouTube trailer or teaser, in catalog order
pub fn select_trailer(videos: &[TmdbVideo]) -> Option<Trailer> {
    videos
        .iter()
        .find(|video| {
            video.site == "YouTube" && (video.video_type == "Trailer" || video.video_type == "Teaser")
        })
        .map(|video| Trailer {
            key: video.key.clone(),
            name: video.name.clone(),
            kind: video.video_type.clone(),
            embed_url: format!("{}/{}", YOUTUBE_EMBED_URL, video.key),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{Provider, StarRating, TitleDetail, WatchProviders};
    use crate::services::catalog::MockCatalogProvider;

    fn video(site: &str, video_type: &str, key: &str) -> TmdbVideo {
        TmdbVideo {
            key: key.to_string(),
            site: site.to_string(),
            video_type: video_type.to_string(),
            official: Some(true),
            name: None,
        }
    }

    fn detail(id: i64) -> TitleDetail {
        TitleDetail {
            id,
            media_type: MediaType::Movie,
            title: "Inception".to_string(),
            tagline: None,
            overview: String::new(),
            poster_url: None,
            backdrop_url: None,
            release_date: None,
            release_date_display: None,
            vote_average: 8.0,
            rating: StarRating::from_vote_average(8.0),
            genres: vec![],
            runtime_minutes: None,
            number_of_seasons: None,
        }
    }

    #[test]
    fn test_select_trailer_prefers_first_youtube_match() {
        let videos = vec![
            video("Vimeo", "Trailer", "vimeo1"),
            video("YouTube", "Featurette", "feat1"),
            video("YouTube", "Teaser", "teaser1"),
            video("YouTube", "Trailer", "trailer1"),
        ];

        let trailer = select_trailer(&videos).unwrap();
        assert_eq!(trailer.key, "teaser1");
        assert_eq!(trailer.kind, "Teaser");
        assert_eq!(trailer.embed_url, "https://www.youtube.com/embed/teaser1");
    }

    #[test]
    fn test_no_trailer_without_youtube_trailer_or_teaser() {
        let videos = vec![
            video("Vimeo", "Trailer", "vimeo1"),
            video("YouTube", "Clip", "clip1"),
            video("YouTube", "Behind the Scenes", "bts1"),
        ];

        assert_eq!(select_trailer(&videos), None);
        assert_eq!(select_trailer(&[]), None);
    }

    #[tokio::test]
    async fn test_view_degrades_when_secondary_calls_fail() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_detail()
            .returning(|_, id| Ok(detail(id)));
        catalog
            .expect_videos()
            .returning(|_, _| Err(AppError::ExternalApi("boom".to_string())));
        catalog
            .expect_watch_providers()
            .returning(|_, _| Err(AppError::ExternalApi("boom".to_string())));

        let view = title_detail_view(Arc::new(catalog), MediaType::Movie, 27205)
            .await
            .unwrap();

        assert_eq!(view.detail.id, 27205);
        assert!(view.trailer.is_none());
        assert!(view.watch_providers.is_none());
    }

    #[tokio::test]
    async fn test_view_fails_when_detail_fails() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_detail()
            .returning(|_, _| Err(AppError::NotFound("gone".to_string())));
        catalog.expect_videos().returning(|_, _| Ok(vec![]));
        catalog.expect_watch_providers().returning(|_, _| Ok(None));

        let result = title_detail_view(Arc::new(catalog), MediaType::Tv, 1).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_view_includes_trailer_and_providers() {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_detail().returning(|_, id| Ok(detail(id)));
        catalog
            .expect_videos()
            .returning(|_, _| Ok(vec![video("YouTube", "Trailer", "YoHD9XEInc0")]));
        catalog.expect_watch_providers().returning(|_, _| {
            Ok(Some(WatchProviders {
                link: None,
                flatrate: vec![Provider {
                    provider_id: 8,
                    provider_name: "Netflix".to_string(),
                    logo_path: None,
                }],
                rent: vec![],
                buy: vec![],
            }))
        });

        let view = title_detail_view(Arc::new(catalog), MediaType::Movie, 27205)
            .await
            .unwrap();

        assert_eq!(view.trailer.unwrap().key, "YoHD9XEInc0");
        assert_eq!(view.watch_providers.unwrap().flatrate[0].provider_name, "Netflix");
    }

    #[tokio::test]
    async fn test_empty_provider_listing_is_hidden() {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_detail().returning(|_, id| Ok(detail(id)));
        catalog.expect_videos().returning(|_, _| Ok(vec![]));
        catalog
            .expect_watch_providers()
            .returning(|_, _| Ok(Some(WatchProviders::default())));

        let view = title_detail_view(Arc::new(catalog), MediaType::Movie, 1)
            .await
            .unwrap();
        assert!(view.watch_providers.is_none());
    }
}
