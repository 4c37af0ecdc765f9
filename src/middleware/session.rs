//! Session gating
//!
//! The session layer wraps the API routes. Until the identity backend has
//! reported ready, it answers every request with `503` and a loading session
//! instead of running handlers. Afterwards it resolves the bearer token and
//! installs a [`SessionState`] for the handlers below it.
//!
//! Handlers read the session through the [`SessionState`] and
//! [`AuthenticatedUser`] extractors. Asking for a session on a route the
//! layer does not wrap is a wiring bug and fails the request with `500`.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tokio::sync::watch;

use crate::{
    api::AppState,
    error::AppError,
    models::{Identity, SessionState, SessionToken},
};

/// Readiness latch for the identity backend
#[derive(Clone, Debug)]
pub struct SessionGate {
    ready: watch::Receiver<bool>,
}

/// Opens a [`SessionGate`] once the identity backend is usable
#[derive(Debug)]
pub struct SessionGateOpener {
    tx: watch::Sender<bool>,
}

impl SessionGate {
    /// A closed gate and the handle that opens it
    pub fn closed() -> (Self, SessionGateOpener) {
        let (tx, ready) = watch::channel(false);
        (Self { ready }, SessionGateOpener { tx })
    }

    /// A gate that is open from the start
    pub fn open() -> Self {
        let (_tx, ready) = watch::channel(true);
        Self { ready }
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }
}

impl SessionGateOpener {
    pub fn open(self) {
        self.tx.send_replace(true);
        tracing::info!("Session gate opened");
    }
}

/// Resolves the caller's session and installs it in the request scope
pub async fn session_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.session_gate.is_ready() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(SessionState::loading()),
        )
            .into_response();
    }

    let token = bearer.and_then(|TypedHeader(auth)| auth.token().parse::<SessionToken>().ok());

    let session = match token {
        Some(token) => match state.identity.resolve(token).await {
            Ok(Some(identity)) => SessionState::signed_in(identity, token),
            Ok(None) => SessionState::anonymous(),
            Err(e) => return e.into_response(),
        },
        None => SessionState::anonymous(),
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionState
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<SessionState>().cloned().ok_or_else(|| {
            tracing::error!(uri = %parts.uri, "Session requested on a route outside the session layer");
            AppError::SessionScope
        })
    }
}

/// A session that is known to be signed in
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub identity: Identity,
    pub token: SessionToken,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = SessionState::from_request_parts(parts, state).await?;
        match (session.identity, session.token) {
            (Some(identity), Some(token)) => Ok(AuthenticatedUser { identity, token }),
            _ => Err(AppError::Unauthorized("Sign in required".to_string())),
        }
    }
}
