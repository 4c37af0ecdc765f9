use axum::{http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

pub mod auth;
pub mod catalog;
pub mod favorites;
pub mod search;
pub mod titles;

/// `?page=` query shared by paginated endpoints
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
