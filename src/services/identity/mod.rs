//! Accounts and sessions
//!
//! Email/password accounts with opaque bearer session tokens. Registration
//! signs the new account in, so both calls hand back a [`SessionGrant`].

use crate::{
    error::{AppError, AppResult},
    models::{Credentials, Identity, Registration, SessionGrant, SessionToken},
};

pub mod memory;
pub mod password;
pub mod postgres;

pub use memory::InMemoryIdentityProvider;
pub use postgres::PgIdentityProvider;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account and opens a session for it
    async fn register(&self, registration: Registration) -> AppResult<SessionGrant>;

    /// Verifies credentials and opens a session
    async fn sign_in(&self, credentials: Credentials) -> AppResult<SessionGrant>;

    /// Identity behind a live session; `None` for unknown or expired tokens
    async fn resolve(&self, token: SessionToken) -> AppResult<Option<Identity>>;

    /// Ends a session. Unknown tokens are ignored.
    async fn sign_out(&self, token: SessionToken) -> AppResult<()>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trims and lower-cases an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalizes a registration and rejects malformed input
pub fn validate_registration(mut registration: Registration) -> AppResult<Registration> {
    registration.email = normalize_email(&registration.email);
    registration.display_name = registration
        .display_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let email = &registration.email;
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid_email {
        return Err(AppError::InvalidInput("Invalid email address".to_string()));
    }

    if registration.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    Ok(registration)
}

/// The single rejection used for any sign-in failure
pub fn invalid_credentials() -> AppError {
    AppError::Unauthorized(INVALID_CREDENTIALS.to_string())
}
