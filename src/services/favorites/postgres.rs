use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Favorite, MediaType},
    services::favorites::FavoritesStore,
};

/// Favorites stored as one row per `(user, title, type)`
///
/// The primary key makes add a set-union (`ON CONFLICT DO NOTHING`). Toggle
/// runs in a transaction holding a per-user advisory lock so two toggles for
/// the same user cannot interleave.
#[derive(Clone)]
pub struct PgFavoritesStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct FavoriteRow {
    title_id: i64,
    media_type: String,
}

impl TryFrom<FavoriteRow> for Favorite {
    type Error = AppError;

    fn try_from(row: FavoriteRow) -> Result<Self, Self::Error> {
        let media_type: MediaType = row.media_type.parse().map_err(AppError::Internal)?;
        Ok(Favorite::new(row.title_id, media_type))
    }
}

impl PgFavoritesStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_user(tx: &mut Transaction<'_, Postgres>, user: Uuid) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(user.to_string())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl FavoritesStore for PgFavoritesStore {
    async fn list(&self, user: Uuid) -> AppResult<Vec<Favorite>> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            r#"
            SELECT title_id, media_type
            FROM favorites
            WHERE user_id = $1
            ORDER BY created_at, title_id
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Favorite::try_from).collect()
    }

    async fn contains(&self, user: Uuid, favorite: Favorite) -> AppResult<bool> {
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM favorites WHERE user_id = $1 AND title_id = $2 AND media_type = $3",
        )
        .bind(user)
        .bind(favorite.id)
        .bind(favorite.media_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    async fn add(&self, user: Uuid, favorite: Favorite) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO favorites (user_id, title_id, media_type)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user)
        .bind(favorite.id)
        .bind(favorite.media_type.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, user: Uuid, favorite: Favorite) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM favorites WHERE user_id = $1 AND title_id = $2 AND media_type = $3",
        )
        .bind(user)
        .bind(favorite.id)
        .bind(favorite.media_type.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle(&self, user: Uuid, favorite: Favorite) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        Self::lock_user(&mut tx, user).await?;

        let removed = sqlx::query(
            "DELETE FROM favorites WHERE user_id = $1 AND title_id = $2 AND media_type = $3",
        )
        .bind(user)
        .bind(favorite.id)
        .bind(favorite.media_type.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if !removed {
            sqlx::query(
                r#"
                INSERT INTO favorites (user_id, title_id, media_type)
                VALUES ($1, $2, $3)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user)
            .bind(favorite.id)
            .bind(favorite.media_type.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(!removed)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
