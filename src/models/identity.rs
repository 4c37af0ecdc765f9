use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

/// A signed-in account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub uid: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Opaque bearer token naming one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub Uuid);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SessionToken)
    }
}

/// Session state visible to handlers
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub loading: bool,
    #[serde(skip)]
    pub token: Option<SessionToken>,
}

impl SessionState {
    /// State reported while the identity backend has not reported ready
    pub fn loading() -> Self {
        Self {
            identity: None,
            loading: true,
            token: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            identity: None,
            loading: false,
            token: None,
        }
    }

    pub fn signed_in(identity: Identity, token: SessionToken) -> Self {
        Self {
            identity: Some(identity),
            loading: false,
            token: Some(token),
        }
    }
}

/// Issued on registration or sign-in
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionGrant {
    pub token: SessionToken,
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

/// Request body for account creation
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Request body for sign-in
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}
