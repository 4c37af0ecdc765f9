use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{
    request_id::{make_span_with_request_id, request_id_middleware},
    session::session_middleware,
};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1, all inside the session scope
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Session
        .route("/session", get(handlers::auth::session))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/signin", post(handlers::auth::sign_in))
        .route("/auth/signout", post(handlers::auth::sign_out))
        // Catalog
        .route("/catalog/:media_type/:listing", get(handlers::catalog::list))
        .route("/titles/:media_type/:id", get(handlers::titles::detail))
        .route("/search", get(handlers::search::search))
        // Favorites
        .route("/favorites", get(handlers::favorites::list))
        .route("/favorites/titles", get(handlers::favorites::titles))
        .route("/favorites/toggle", post(handlers::favorites::toggle))
        .route(
            "/favorites/:media_type/:id",
            put(handlers::favorites::add).delete(handlers::favorites::remove),
        )
        .route_layer(middleware::from_fn_with_state(state, session_middleware))
}
