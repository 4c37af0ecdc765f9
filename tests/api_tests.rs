use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use popcorn_view::{
    api::{create_router, AppState},
    db::Cache,
    middleware::session::SessionGate,
    services::{CatalogProvider, InMemoryFavoritesStore, InMemoryIdentityProvider, TmdbProvider},
};

const IMAGE_URL: &str = "https://image.tmdb.org/t/p";

fn tmdb_catalog(tmdb: &MockServer) -> Arc<dyn CatalogProvider> {
    Arc::new(TmdbProvider::new(
        reqwest::Client::new(),
        "test-key".to_string(),
        tmdb.uri(),
        IMAGE_URL.to_string(),
        Cache::disabled(),
    ))
}

async fn create_test_server() -> (TestServer, MockServer) {
    let tmdb = MockServer::start().await;
    let state = AppState::in_memory(tmdb_catalog(&tmdb));
    let server = TestServer::new(create_router(state)).unwrap();
    (server, tmdb)
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

async fn register(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": email,
            "password": "popcorn",
            "display_name": "Ana"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let grant: Value = response.json();
    grant["token"].as_str().unwrap().to_string()
}

async fn toggle(server: &TestServer, token: &str, id: i64, media_type: &str) -> TestResponse {
    server
        .post("/api/v1/favorites/toggle")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({ "id": id, "type": media_type }))
        .await
}

fn inception_detail() -> Value {
    json!({
        "id": 27205,
        "title": "A Origem",
        "tagline": "Sua mente é a cena do crime.",
        "overview": "Dom Cobb é um ladrão.",
        "poster_path": "/poster.jpg",
        "backdrop_path": "/backdrop.jpg",
        "release_date": "2010-07-15",
        "vote_average": 8.4,
        "genres": [{ "id": 28, "name": "Ação" }],
        "runtime": 148
    })
}

#[tokio::test]
async fn test_health_check() {
    let (server, _tmdb) = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let (server, _tmdb) = create_test_server().await;

    let response = server
        .get("/health")
        .add_header(
            header::HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-42"),
        )
        .await;

    assert_eq!(response.header("x-request-id"), "req-42");
}

#[tokio::test]
async fn test_anonymous_session() {
    let (server, _tmdb) = create_test_server().await;

    let response = server.get("/api/v1/session").await;
    response.assert_status_ok();
    let session: Value = response.json();
    assert_eq!(session["identity"], Value::Null);
    assert_eq!(session["loading"], false);
}

#[tokio::test]
async fn test_register_sign_in_and_sign_out() {
    let (server, _tmdb) = create_test_server().await;
    let token = register(&server, "ana@example.com").await;

    let response = server
        .get("/api/v1/session")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    let session: Value = response.json();
    assert_eq!(session["identity"]["email"], "ana@example.com");
    assert_eq!(session["identity"]["display_name"], "Ana");

    let response = server
        .post("/api/v1/auth/signin")
        .json(&json!({ "email": "ANA@example.com", "password": "popcorn" }))
        .await;
    response.assert_status_ok();
    let grant: Value = response.json();
    let second_token = grant["token"].as_str().unwrap().to_string();

    server
        .post("/api/v1/auth/signout")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    // The signed-out token is anonymous again, the other session lives on
    let session: Value = server
        .get("/api/v1/session")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(session["identity"], Value::Null);

    let session: Value = server
        .get("/api/v1/session")
        .add_header(header::AUTHORIZATION, bearer(&second_token))
        .await
        .json();
    assert_eq!(session["identity"]["email"], "ana@example.com");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (server, _tmdb) = create_test_server().await;
    register(&server, "ana@example.com").await;

    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({ "email": "ana@example.com", "password": "another" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_wrong_password_unauthorized() {
    let (server, _tmdb) = create_test_server().await;
    register(&server, "ana@example.com").await;

    let response = server
        .post("/api/v1/auth/signin")
        .json(&json!({ "email": "ana@example.com", "password": "wrong-one" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_favorites_require_sign_in() {
    let (server, _tmdb) = create_test_server().await;

    server
        .get("/api/v1/favorites")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/api/v1/favorites/toggle")
        .json(&json!({ "id": 27205, "type": "movie" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // A malformed token is treated as anonymous
    server
        .get("/api/v1/favorites")
        .add_header(header::AUTHORIZATION, bearer("not-a-token"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_toggle_twice_restores_favorites() {
    let (server, _tmdb) = create_test_server().await;
    let token = register(&server, "ana@example.com").await;

    let response = toggle(&server, &token, 27205, "movie").await;
    response.assert_status_ok();
    let change: Value = response.json();
    assert_eq!(change["is_favorite"], true);

    let favorites: Value = server
        .get("/api/v1/favorites")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(favorites, json!([{ "id": 27205, "type": "movie" }]));

    let change: Value = toggle(&server, &token, 27205, "movie").await.json();
    assert_eq!(change["is_favorite"], false);

    let favorites: Value = server
        .get("/api/v1/favorites")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(favorites, json!([]));
}

#[tokio::test]
async fn test_favorites_are_per_user() {
    let (server, _tmdb) = create_test_server().await;
    let ana = register(&server, "ana@example.com").await;
    let bia = register(&server, "bia@example.com").await;

    toggle(&server, &ana, 1399, "tv").await.assert_status_ok();

    let favorites: Value = server
        .get("/api/v1/favorites")
        .add_header(header::AUTHORIZATION, bearer(&bia))
        .await
        .json();
    assert_eq!(favorites, json!([]));
}

#[tokio::test]
async fn test_put_and_delete_are_idempotent() {
    let (server, _tmdb) = create_test_server().await;
    let token = register(&server, "ana@example.com").await;

    let first: Value = server
        .put("/api/v1/favorites/tv/1399")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    let second: Value = server
        .put("/api/v1/favorites/tv/1399")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(first["changed"], true);
    assert_eq!(second["changed"], false);
    assert_eq!(second["is_favorite"], true);

    let removed: Value = server
        .delete("/api/v1/favorites/tv/1399")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(removed["changed"], true);
    assert_eq!(removed["is_favorite"], false);
}

#[tokio::test]
async fn test_unknown_media_type_rejected() {
    let (server, _tmdb) = create_test_server().await;
    let token = register(&server, "ana@example.com").await;

    let response = toggle(&server, &token, 1, "person").await;
    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_empty_search_issues_no_request() {
    let (server, tmdb) = create_test_server().await;

    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&tmdb)
        .await;

    for uri in ["/api/v1/search?q=", "/api/v1/search?q=%20%20", "/api/v1/search"] {
        let response = server.get(uri).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["results"], json!([]));
        assert_eq!(body["stale"], false);
    }

    tmdb.verify().await;
}

#[tokio::test]
async fn test_search_drops_people() {
    let (server, tmdb) = create_test_server().await;

    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .and(query_param("query", "nolan"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "total_pages": 1,
            "total_results": 2,
            "results": [
                { "id": 525, "media_type": "person", "name": "Christopher Nolan" },
                { "id": 27205, "media_type": "movie", "title": "A Origem", "vote_average": 8.4 }
            ]
        })))
        .expect(1)
        .mount(&tmdb)
        .await;

    let body: Value = server.get("/api/v1/search?q=nolan").await.json();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], 27205);
    assert_eq!(results[0]["media_type"], "movie");
}

#[tokio::test]
async fn test_superseded_search_is_stale() {
    let (server, tmdb) = create_test_server().await;

    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": 1399, "media_type": "tv", "name": "Game of Thrones" }]
        })))
        .mount(&tmdb)
        .await;

    let client = (
        header::HeaderName::from_static("x-client-id"),
        HeaderValue::from_static("tab-1"),
    );

    let newest: Value = server
        .get("/api/v1/search?q=game&seq=2")
        .add_header(client.0.clone(), client.1.clone())
        .await
        .json();
    assert_eq!(newest["stale"], false);
    assert_eq!(newest["results"].as_array().unwrap().len(), 1);

    let older: Value = server
        .get("/api/v1/search?q=gam&seq=1")
        .add_header(client.0.clone(), client.1.clone())
        .await
        .json();
    assert_eq!(older["stale"], true);
    assert_eq!(older["seq"], 1);
    assert_eq!(older["results"], json!([]));

    // Another tab has its own sequence
    let other: Value = server
        .get("/api/v1/search?q=gam&seq=1")
        .add_header(client.0, HeaderValue::from_static("tab-2"))
        .await
        .json();
    assert_eq!(other["stale"], false);
}

#[tokio::test]
async fn test_catalog_listing() {
    let (server, tmdb) = create_test_server().await;

    Mock::given(method("GET"))
        .and(path("/tv/top_rated"))
        .and(query_param("page", "2"))
        .and(query_param("language", "pt-BR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 2,
            "total_pages": 10,
            "total_results": 200,
            "results": [{
                "id": 1396,
                "name": "Breaking Bad",
                "poster_path": "/bb.jpg",
                "first_air_date": "2008-01-20",
                "vote_average": 8.9
            }]
        })))
        .mount(&tmdb)
        .await;

    let response = server.get("/api/v1/catalog/tv/top_rated?page=2").await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["page"], 2);
    assert_eq!(page["total_pages"], 10);
    assert_eq!(page["results"][0]["title"], "Breaking Bad");
    assert_eq!(page["results"][0]["media_type"], "tv");
    assert_eq!(
        page["results"][0]["poster_url"],
        format!("{}/w500/bb.jpg", IMAGE_URL)
    );
}

#[tokio::test]
async fn test_catalog_rejects_bad_page() {
    let (server, _tmdb) = create_test_server().await;

    server
        .get("/api/v1/catalog/movie/popular?page=0")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/api/v1/catalog/movie/popular?page=501")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_detail_without_trailer() {
    let (server, tmdb) = create_test_server().await;

    Mock::given(method("GET"))
        .and(path("/movie/27205"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inception_detail()))
        .mount(&tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/27205/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "key": "abc", "site": "YouTube", "type": "Clip" },
                { "key": "def", "site": "Vimeo", "type": "Trailer" }
            ]
        })))
        .mount(&tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/27205/watch/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": { "US": { "link": "https://example.com", "flatrate": [] } }
        })))
        .mount(&tmdb)
        .await;

    let response = server.get("/api/v1/titles/movie/27205").await;
    response.assert_status_ok();
    let view: Value = response.json();
    assert_eq!(view["detail"]["title"], "A Origem");
    assert_eq!(view["detail"]["release_date_display"], "15/07/2010");
    assert_eq!(view["detail"]["runtime_minutes"], 148);
    assert_eq!(view["trailer"], Value::Null);
    assert_eq!(view["watch_providers"], Value::Null);
    // Anonymous callers get no favorite flag
    assert!(view.get("is_favorite").is_none());
}

#[tokio::test]
async fn test_detail_with_trailer_and_favorite_flag() {
    let (server, tmdb) = create_test_server().await;
    let token = register(&server, "ana@example.com").await;
    toggle(&server, &token, 27205, "movie").await.assert_status_ok();

    Mock::given(method("GET"))
        .and(path("/movie/27205"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inception_detail()))
        .mount(&tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/27205/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "key": "teaser1", "site": "YouTube", "type": "Teaser", "name": "Teaser" }
            ]
        })))
        .mount(&tmdb)
        .await;
    // Providers failing does not fail the detail screen
    Mock::given(method("GET"))
        .and(path("/movie/27205/watch/providers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&tmdb)
        .await;

    let view: Value = server
        .get("/api/v1/titles/movie/27205")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(view["trailer"]["key"], "teaser1");
    assert_eq!(
        view["trailer"]["embed_url"],
        "https://www.youtube.com/embed/teaser1"
    );
    assert_eq!(view["watch_providers"], Value::Null);
    assert_eq!(view["is_favorite"], true);
}

#[tokio::test]
async fn test_missing_title_not_found() {
    let (server, tmdb) = create_test_server().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&tmdb)
        .await;

    server
        .get("/api/v1/titles/tv/999999")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorite_titles_reports_unavailable() {
    let (server, tmdb) = create_test_server().await;
    let token = register(&server, "ana@example.com").await;
    toggle(&server, &token, 27205, "movie").await.assert_status_ok();
    toggle(&server, &token, 1399, "tv").await.assert_status_ok();

    Mock::given(method("GET"))
        .and(path("/movie/27205"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inception_detail()))
        .mount(&tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/tv/1399"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&tmdb)
        .await;

    let response = server
        .get("/api/v1/favorites/titles")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["titles"].as_array().unwrap().len(), 1);
    assert_eq!(body["titles"][0]["title"]["title"], "A Origem");
    assert_eq!(body["unavailable"], json!([{ "id": 1399, "type": "tv" }]));
}

#[tokio::test]
async fn test_loading_until_gate_opens() {
    let tmdb = MockServer::start().await;
    let (gate, opener) = SessionGate::closed();
    let state = AppState::new(
        tmdb_catalog(&tmdb),
        Arc::new(InMemoryIdentityProvider::default()),
        Arc::new(InMemoryFavoritesStore::new()),
        gate,
    );
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server.get("/api/v1/session").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body, json!({ "identity": null, "loading": true }));

    // Health stays outside the session scope
    server.get("/health").await.assert_status_ok();

    opener.open();

    let response = server.get("/api/v1/session").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["loading"], false);
}

#[tokio::test]
async fn test_unreachable_catalog_hides_api_key() {
    let catalog: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::new(
        reqwest::Client::new(),
        "super-secret-key".to_string(),
        "http://127.0.0.1:1".to_string(),
        IMAGE_URL.to_string(),
        Cache::disabled(),
    ));
    let server = TestServer::new(create_router(AppState::in_memory(catalog))).unwrap();

    let response = server.get("/api/v1/titles/movie/1").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body = response.text();
    assert!(!body.contains("super-secret-key"));
    assert!(!body.contains("api_key"));
}
