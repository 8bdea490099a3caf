// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{StoreError, UserStore};
use crate::{
    models::user::{DEFAULT_ROLE, DEFAULT_ROLE_COLOR, NewUser, Preferences, User, UserId},
    progress::ProgressState,
};

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    next_id: UserId,
}

/// Process-local store with the same semantics as [`super::PgUserStore`].
/// Used by the test suites.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if inner
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(StoreError::DuplicateEmail(new_user.email));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: inner.next_id,
            username: new_user.username,
            email: new_user.email,
            password: new_user.password_hash,
            role: DEFAULT_ROLE.to_string(),
            role_color: DEFAULT_ROLE_COLOR.to_string(),
            profile_image: String::new(),
            selected_plan: String::new(),
            preferences: Preferences::default(),
            created_at: now,
            last_login_at: now,
            progress: ProgressState::default(),
            version: 0,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn touch_last_login(&self, id: UserId) -> Result<(), StoreError> {
        if let Some(user) = self.inner.write().await.users.get_mut(&id) {
            user.last_login_at = Utc::now();
        }
        Ok(())
    }

    async fn update_preferences(
        &self,
        id: UserId,
        preferences: &Preferences,
    ) -> Result<bool, StoreError> {
        match self.inner.write().await.users.get_mut(&id) {
            Some(user) => {
                user.preferences = preferences.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn write_progress(
        &self,
        id: UserId,
        expected_version: i64,
        progress: &ProgressState,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&id) {
            Some(user) if user.version == expected_version => {
                user.progress = progress.clone();
                user.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
