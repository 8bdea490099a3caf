// src/store/mod.rs

//! Persistence of users and their progress documents.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::user::{NewUser, Preferences, User, UserId},
    progress::{ProgressError, ProgressState, reconcile},
};

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// How many times a progress update is retried after losing a race.
pub const MAX_UPDATE_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable storage keyed by user id.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn touch_last_login(&self, id: UserId) -> Result<(), StoreError>;

    /// Returns `false` if the user does not exist.
    async fn update_preferences(
        &self,
        id: UserId,
        preferences: &Preferences,
    ) -> Result<bool, StoreError>;

    /// Writes `progress` if the stored version still equals `expected_version`.
    ///
    /// Returns `false` when another writer got there first. Callers go
    /// through [`save_progress`] so the legacy mirrors are reconciled.
    async fn write_progress(
        &self,
        id: UserId,
        expected_version: i64,
        progress: &ProgressState,
    ) -> Result<bool, StoreError>;
}

pub type SharedStore = Arc<dyn UserStore>;

/// Reconciles the legacy mirrors, then performs a versioned write.
pub async fn save_progress(
    store: &dyn UserStore,
    id: UserId,
    expected_version: i64,
    mut progress: ProgressState,
) -> Result<bool, StoreError> {
    reconcile(&mut progress);
    store.write_progress(id, expected_version, &progress).await
}

/// Loads a user or fails with `404 User not found`.
pub async fn require_user(store: &dyn UserStore, id: UserId) -> Result<User, AppError> {
    store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Applies `apply` to the user's progress as one atomic read-modify-write.
///
/// The closure may run more than once when concurrent writers race; it must
/// only depend on the state it is given. Nothing is written when the
/// reconciled state is unchanged, and nothing is written when `apply` fails.
pub async fn update_progress<T, F>(
    store: &dyn UserStore,
    id: UserId,
    mut apply: F,
) -> Result<(User, T), AppError>
where
    F: FnMut(&mut ProgressState) -> Result<T, ProgressError>,
{
    for attempt in 1..=MAX_UPDATE_ATTEMPTS {
        let mut user = require_user(store, id).await?;

        let mut next = user.progress.clone();
        let value = apply(&mut next)?;
        reconcile(&mut next);

        if next == user.progress {
            return Ok((user, value));
        }

        if save_progress(store, id, user.version, next.clone()).await? {
            user.progress = next;
            user.version += 1;
            return Ok((user, value));
        }

        tracing::debug!(
            "Progress write for user {} lost a race (attempt {}), retrying",
            id,
            attempt
        );
    }

    tracing::warn!(
        "Giving up on progress update for user {} after {} attempts",
        id,
        MAX_UPDATE_ATTEMPTS
    );
    Err(AppError::Conflict(
        "Progress was modified concurrently, please retry".to_string(),
    ))
}
