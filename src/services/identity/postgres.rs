use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, Transaction};
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

/// Accounts and sessions stored in PostgreSQL
#[derive(Clone)]
pub struct PgIdentityProvider {
    pool: PgPool,
    session_ttl: Duration,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for Identity {
    fn from(row: UserRow) -> Self {
        Identity {
            uid: row.id,
            email: row.email,
            display_name: row.display_name,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool, session_ttl: Duration) -> Self {
        Self { pool, session_ttl }
    }

    /// Opens a session inside `tx` and drops sessions that have expired
    async fn open_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        identity: Identity,
    ) -> AppResult<SessionGrant> {
        let token = SessionToken::generate();
        let expires_at = Utc::now() + self.session_ttl;

        sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&mut **tx)
            .await?;

        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token.0)
            .bind(identity.uid)
            .bind(expires_at)
            .execute(&mut **tx)
            .await?;

        Ok(SessionGrant {
            token,
            identity,
            expires_at,
        })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn register(&self, registration: Registration) -> AppResult<SessionGrant> {
        let registration = validate_registration(registration)?;
        let password_hash = hash_password(registration.password.clone()).await?;

        // The account only exists if its first session was opened too
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, display_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, display_name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&registration.email)
        .bind(&registration.display_name)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Email already in use".to_string())
            }
            other => AppError::Database(other),
        })?;

        let identity = Identity::from(row);
        let grant = self.open_session(&mut tx, identity).await?;
        tx.commit().await?;

        tracing::info!(uid = %grant.identity.uid, provider = "postgres", "Account registered");
        Ok(grant)
    }

    async fn sign_in(&self, credentials: Credentials) -> AppResult<SessionGrant> {
        let email = normalize_email(&credentials.email);

        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT id, email, display_name, created_at, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        let (user, password_hash) = match row {
            Some(row) => (Some(row.user), Some(row.password_hash)),
            None => (None, None),
        };

        // Unknown emails still pay for a verification
        if !verify_password(credentials.password, password_hash).await? {
            return Err(invalid_credentials());
        }
        let identity = Identity::from(user.ok_or_else(invalid_credentials)?);

        let mut tx = self.pool.begin().await?;
        let grant = self.open_session(&mut tx, identity).await?;
        tx.commit().await?;

        tracing::info!(uid = %grant.identity.uid, provider = "postgres", "Signed in");
        Ok(grant)
    }

    async fn resolve(&self, token: SessionToken) -> AppResult<Option<Identity>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.email, u.display_name, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > now()
            "#,
        )
        .bind(token.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Identity::from))
    }

    async fn sign_out(&self, token: SessionToken) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
