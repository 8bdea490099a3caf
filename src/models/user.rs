// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::progress::ProgressState;

pub type UserId = i64;

pub const DEFAULT_ROLE: &str = "User";
pub const DEFAULT_ROLE_COLOR: &str = "#6C63FF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Per-user display and quiz preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_notifications")]
    pub notifications: bool,
    #[serde(default)]
    pub difficulty: Difficulty,
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_notifications() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            notifications: default_notifications(),
            difficulty: Difficulty::default(),
        }
    }
}

/// A stored user together with its progress document.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,

    pub username: String,

    /// Unique login identifier.
    pub email: String,

    /// Argon2 password hash. Never sent to clients; see [`UserPayload`].
    pub password: String,

    pub role: String,
    pub role_color: String,
    pub profile_image: String,
    pub selected_plan: String,
    pub preferences: Preferences,

    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,

    pub progress: ProgressState,

    /// Bumped on every progress write; used for optimistic concurrency.
    pub version: i64,
}

/// Data needed to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Public view of a user returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub username: String,
    pub email: String,
    pub role: String,
    pub role_color: String,
    pub profile_image: String,
    pub selected_plan: String,
}

impl From<&User> for UserPayload {
    fn from(user: &User) -> Self {
        let or_default = |value: &str, default: &str| {
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            role: or_default(&user.role, DEFAULT_ROLE),
            role_color: or_default(&user.role_color, DEFAULT_ROLE_COLOR),
            profile_image: user.profile_image.clone(),
            selected_plan: user.selected_plan.clone(),
        }
    }
}

/// Returned by every successful sign-in.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserPayload,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(min = 1, max = 50, message = "First name is required."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required."))]
    pub last_name: String,
}

impl RegisterRequest {
    pub fn username(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for Google sign-in: the ID token obtained by the client.
#[derive(Debug, Deserialize, Validate)]
pub struct GoogleLoginRequest {
    #[validate(required(message = "Google token is missing."), length(min = 1))]
    pub token: Option<String>,
}

/// DTO for updating preferences. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePreferencesRequest {
    #[validate(length(min = 1, max = 20))]
    pub theme: Option<String>,
    pub notifications: Option<bool>,
    pub difficulty: Option<Difficulty>,
}

impl UpdatePreferencesRequest {
    pub fn apply(self, preferences: &mut Preferences) {
        if let Some(theme) = self.theme {
            preferences.theme = theme;
        }
        if let Some(notifications) = self.notifications {
            preferences.notifications = notifications;
        }
        if let Some(difficulty) = self.difficulty {
            preferences.difficulty = difficulty;
        }
    }
}
