use chrono::{DateTime, Duration, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Credentials, Identity, Registration, SessionGrant, SessionToken},
    services::identity::{
        invalid_credentials, normalize_email,
        password::{hash_password, verify_password},
        validate_registration, IdentityProvider,
    },
};

struct UserRecord {
    identity: Identity,
    password_hash: String,
}

struct SessionRecord {
    identity: Identity,
    expires_at: DateTime<Utc>,
}

/// Accounts and sessions kept in process memory, keyed by normalized email
pub struct InMemoryIdentityProvider {
    users: DashMap<String, UserRecord>,
    sessions: DashMap<SessionToken, SessionRecord>,
    session_ttl: Duration,
}

impl InMemoryIdentityProvider {
    pub fn new(session_ttl: Duration) -> Self {
        Self {
            users: DashMap::new(),
            sessions: DashMap::new(),
            session_ttl,
        }
    }

    fn open_session(&self, identity: Identity) -> SessionGrant {
        let now = Utc::now();
        self.sessions.retain(|_, session| session.expires_at > now);

        let token = SessionToken::generate();
        let expires_at = now + self.session_ttl;
        self.sessions.insert(
            token,
            SessionRecord {
                identity: identity.clone(),
                expires_at,
            },
        );

        SessionGrant {
            token,
            identity,
            expires_at,
        }
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new(Duration::hours(24 * 7))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn register(&self, registration: Registration) -> AppResult<SessionGrant> {
        let registration = validate_registration(registration)?;
        let password_hash = hash_password(registration.password.clone()).await?;

        let identity = match self.users.entry(registration.email.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict("Email already in use".to_string()));
            }
            Entry::Vacant(slot) => {
                let identity = Identity {
                    uid: Uuid::new_v4(),
                    email: registration.email,
                    display_name: registration.display_name,
                    created_at: Utc::now(),
                };
                slot.insert(UserRecord {
                    identity: identity.clone(),
                    password_hash,
                });
                identity
            }
        };

        tracing::info!(uid = %identity.uid, provider = "memory", "Account registered");
        Ok(self.open_session(identity))
    }

    async fn sign_in(&self, credentials: Credentials) -> AppResult<SessionGrant> {
        let email = normalize_email(&credentials.email);

        let (identity, password_hash) = match self.users.get(&email) {
            Some(user) => (Some(user.identity.clone()), Some(user.password_hash.clone())),
            None => (None, None),
        };

        // Unknown emails still pay for a verification
        if !verify_password(credentials.password, password_hash).await? {
            return Err(invalid_credentials());
        }
        let identity = identity.ok_or_else(invalid_credentials)?;

        tracing::info!(uid = %identity.uid, provider = "memory", "Signed in");
        Ok(self.open_session(identity))
    }

    async fn resolve(&self, token: SessionToken) -> AppResult<Option<Identity>> {
        match self.sessions.get(&token) {
            None => return Ok(None),
            Some(session) if session.expires_at > Utc::now() => {
                return Ok(Some(session.identity.clone()));
            }
            Some(_) => {}
        }

        self.sessions.remove(&token);
        Ok(None)
    }

    async fn sign_out(&self, token: SessionToken) -> AppResult<()> {
        if let Some((_, session)) = self.sessions.remove(&token) {
            tracing::info!(uid = %session.identity.uid, provider = "memory", "Signed out");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
