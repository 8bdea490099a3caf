// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use quiz_backend::config::Config;
use quiz_backend::progress::ModuleCatalog;
use quiz_backend::routes;
use quiz_backend::state::AppState;
use quiz_backend::store::PgUserStore;
use quiz_backend::utils::google::{GoogleTokenVerifier, IdTokenVerifier};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Module catalog: built-in unless a file overrides it
    let catalog = match &config.module_catalog_path {
        Some(path) => ModuleCatalog::from_json_file(path)
            .unwrap_or_else(|e| panic!("Failed to load module catalog from {}: {}", path, e)),
        None => ModuleCatalog::default(),
    };
    tracing::info!("Module catalog loaded with {} modules", catalog.len());

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    let google = config.google_client_id.as_ref().map(|client_id| {
        Arc::new(GoogleTokenVerifier::new(client_id.clone())) as Arc<dyn IdTokenVerifier>
    });
    if google.is_none() {
        tracing::warn!("GOOGLE_CLIENT_ID not set, Google sign-in disabled");
    }

    // Create AppState
    let state = AppState {
        store: Arc::new(PgUserStore::new(pool)),
        config: config.clone(),
        catalog: Arc::new(catalog),
        google,
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}
