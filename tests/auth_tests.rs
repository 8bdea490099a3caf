// tests/auth_tests.rs

mod common;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{body::Body, http::Request};
use common::{register_user, spawn_app, spawn_app_with, test_state, unique_email};
use quiz_backend::{
    models::user::{NewUser, Preferences, User, UserId},
    progress::ProgressState,
    state::AppState,
    store::{MemoryUserStore, StoreError, UserStore},
};
use tower::ServiceExt;

#[tokio::test]
async fn unknown_route_returns_404() {
    // Arrange
    let app = quiz_backend::create_router(common::test_state());

    // Act
    let response = app
        .oneshot(
            Request::builder()
                .uri("/random_path_that_does_not_exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn health_check_works() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_returns_token_and_payload() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123",
            "firstName": "Grace",
            "lastName": "Hopper"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["username"], "Grace Hopper");
    assert_eq!(body["user"]["email"], email.as_str());
    assert_eq!(body["user"]["role"], "User");
    assert_eq!(body["user"]["roleColor"], "#6C63FF");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn register_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: Send an invalid email and a password that is too short
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "nope",
            "password": "pw",
            "firstName": "A",
            "lastName": "B"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email();
    let body = serde_json::json!({
        "email": email,
        "password": "password123",
        "firstName": "Ada",
        "lastName": "Lovelace"
    });

    let first = client
        .post(format!("{}/api/auth/register", address))
        .json(&body)
        .send()
        .await
        .unwrap();
    let second = client
        .post(format!("{}/api/auth/register", address))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(first.status().as_u16(), 201);
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn login_checks_password() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email();

    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123",
            "firstName": "Ada",
            "lastName": "Lovelace"
        }))
        .send()
        .await
        .expect("Register failed");

    let ok = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status().as_u16(), 200);
    let body: serde_json::Value = ok.json().await.unwrap();
    assert!(body["token"].is_string());

    let bad = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status().as_u16(), 401);
}

#[tokio::test]
async fn google_login_creates_then_reuses_account() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email();
    let token = format!("valid:{}:Alan Turing", email);

    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/auth/google", address))
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["user"]["username"], "Alan Turing");
        assert_eq!(body["user"]["email"], email.as_str());
    }

    let missing = client
        .post(format!("{}/api/auth/google", address))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 400);

    let forged = client
        .post(format!("{}/api/auth/google", address))
        .json(&serde_json::json!({ "token": "forged" }))
        .send()
        .await
        .unwrap();
    assert_eq!(forged.status().as_u16(), 401);
}

#[tokio::test]
async fn protected_routes_require_bearer_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let anonymous = client
        .get(format!("{}/api/user/me", address))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status().as_u16(), 401);

    let garbage = client
        .get(format!("{}/api/progress", address))
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status().as_u16(), 401);
}

#[tokio::test]
async fn user_info_and_preferences() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_user(&client, &address).await;

    let me: serde_json::Value = client
        .get(format!("{}/api/user/me", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["username"], "Ada Lovelace");

    let prefs: serde_json::Value = client
        .get(format!("{}/api/user/preferences", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(prefs["theme"], "light");
    assert_eq!(prefs["difficulty"], "medium");

    let updated = client
        .put(format!("{}/api/user/preferences", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "theme": "dark", "difficulty": "hard" }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);
    let updated: serde_json::Value = updated.json().await.unwrap();
    assert_eq!(updated["theme"], "dark");
    assert_eq!(updated["difficulty"], "hard");
    assert_eq!(updated["notifications"], true);
}

/// Hides existing accounts from the first email lookup, as if another
/// sign-in created the account between the lookup and the insert.
struct LateAccountStore {
    inner: MemoryUserStore,
    lookups: AtomicUsize,
}

#[async_trait]
impl UserStore for LateAccountStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        self.inner.create_user(new_user).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        if self.lookups.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(None);
        }
        self.inner.find_by_email(email).await
    }

    async fn touch_last_login(&self, id: UserId) -> Result<(), StoreError> {
        self.inner.touch_last_login(id).await
    }

    async fn update_preferences(
        &self,
        id: UserId,
        preferences: &Preferences,
    ) -> Result<bool, StoreError> {
        self.inner.update_preferences(id, preferences).await
    }

    async fn write_progress(
        &self,
        id: UserId,
        expected_version: i64,
        progress: &ProgressState,
    ) -> Result<bool, StoreError> {
        self.inner.write_progress(id, expected_version, progress).await
    }
}

#[tokio::test]
async fn google_login_recovers_when_account_appears_concurrently() {
    let email = unique_email();
    let inner = MemoryUserStore::new();
    inner
        .create_user(NewUser {
            username: "Alan Turing".to_string(),
            email: email.clone(),
            password_hash: "unused".to_string(),
        })
        .await
        .unwrap();

    let state = AppState {
        store: Arc::new(LateAccountStore {
            inner,
            lookups: AtomicUsize::new(0),
        }),
        ..test_state()
    };
    let address = spawn_app_with(state).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/auth/google", address))
        .json(&serde_json::json!({ "token": format!("valid:{}:Alan Turing", email) }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"], email.as_str());
    assert!(body["token"].is_string());
}
