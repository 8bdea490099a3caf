// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use quiz_backend::{
    config::Config,
    error::AppError,
    progress::ModuleCatalog,
    routes,
    state::AppState,
    store::{MemoryUserStore, PgUserStore},
    utils::google::{GoogleIdentity, IdTokenVerifier},
};

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

/// Accepts tokens of the form `valid:<email>:<name>`.
pub struct FakeGoogleVerifier;

#[async_trait]
impl IdTokenVerifier for FakeGoogleVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, AppError> {
        let mut parts = id_token.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("valid"), Some(email), name) => Ok(GoogleIdentity {
                sub: format!("google-{email}"),
                email: email.to_string(),
                name: name.map(str::to_string),
            }),
            _ => Err(AppError::AuthError("Invalid Google token".to_string())),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        port: 0,
        google_client_id: Some("test-client".to_string()),
        module_catalog_path: None,
        cors_origins: Vec::new(),
    }
}

pub fn test_state() -> AppState {
    AppState {
        store: Arc::new(MemoryUserStore::new()),
        config: test_config(),
        catalog: Arc::new(ModuleCatalog::default()),
        google: Some(Arc::new(FakeGoogleVerifier)),
    }
}

/// Spawns the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app() -> String {
    spawn_app_with(test_state()).await
}

/// Spawns the app with the given state on a random port.
pub async fn spawn_app_with(state: AppState) -> String {
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Connects to the database named by `DATABASE_URL` and runs migrations.
/// Returns `None` when the variable is unset so the suite can be skipped.
pub async fn postgres_store() -> Option<PgUserStore> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    Some(PgUserStore::new(pool))
}

/// Spawns the app backed by Postgres, or returns `None` without a database.
pub async fn spawn_postgres_app() -> Option<String> {
    let store = postgres_store().await?;
    let state = AppState {
        store: Arc::new(store),
        config: Config {
            database_url: std::env::var("DATABASE_URL").unwrap_or_default(),
            ..test_config()
        },
        ..test_state()
    };
    Some(spawn_app_with(state).await)
}

pub fn unique_email() -> String {
    format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

/// Registers a fresh user and returns its bearer token.
pub async fn register_user(client: &reqwest::Client, address: &str) -> String {
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": unique_email(),
            "password": "password123",
            "firstName": "Ada",
            "lastName": "Lovelace"
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    body["token"].as_str().expect("Token not found").to_string()
}
