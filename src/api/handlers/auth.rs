use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::AppState,
    error::AppResult,
    middleware::session::AuthenticatedUser,
    models::{Credentials, Registration, SessionGrant, SessionState},
};

/// Current session: signed in, or anonymous
pub async fn session(session: SessionState) -> Json<SessionState> {
    Json(session)
}

pub async fn register(
    State(state): State<AppState>,
    Json(registration): Json<Registration>,
) -> AppResult<(StatusCode, Json<SessionGrant>)> {
    let grant = state.identity.register(registration).await?;
    Ok((StatusCode::CREATED, Json(grant)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<Json<SessionGrant>> {
    let grant = state.identity.sign_in(credentials).await?;
    Ok(Json(grant))
}

pub async fn sign_out(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<StatusCode> {
    state.identity.sign_out(user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
