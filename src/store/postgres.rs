// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};

use super::{StoreError, UserStore};
use crate::{
    models::user::{NewUser, Preferences, User, UserId},
    progress::ProgressState,
};

const USER_COLUMNS: &str = "id, username, email, password, role, role_color, profile_image, \
     selected_plan, preferences, progress, version, created_at, last_login_at";

/// Represents the 'users' table in the database.
/// The progress document lives in a JSONB column next to the profile fields.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password: String,
    role: String,
    role_color: String,
    profile_image: String,
    selected_plan: String,
    preferences: Json<Preferences>,
    progress: Json<ProgressState>,
    version: i64,
    created_at: DateTime<Utc>,
    last_login_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password: row.password,
            role: row.role,
            role_color: row.role_color,
            profile_image: row.profile_image,
            selected_plan: row.selected_plan,
            preferences: row.preferences.0,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
            progress: row.progress.0,
            version: row.version,
        }
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (username, email, password) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::DuplicateEmail(new_user.email.clone())
                }
                other => StoreError::Database(other),
            })?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn touch_last_login(&self, id: UserId) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_preferences(
        &self,
        id: UserId,
        preferences: &Preferences,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET preferences = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(Json(preferences))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn write_progress(
        &self,
        id: UserId,
        expected_version: i64,
        progress: &ProgressState,
    ) -> Result<bool, StoreError> {
        // Compare-and-set on the version column keeps concurrent updates
        // of the same user from overwriting each other.
        let result = sqlx::query(
            "UPDATE users \
             SET progress = $3, version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND version = $2",
        )
        .bind(id)
        .bind(expected_version)
        .bind(Json(progress))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
