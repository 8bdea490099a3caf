// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{auth, modules, progress, user},
    state::AppState,
    utils::jwt::auth_middleware,
};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(parsed)
    }
}

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, user, modules, progress).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, config, module catalog).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/google", post(auth::google_login));

    let user_routes = Router::new()
        .route("/me", get(user::get_me))
        .route(
            "/preferences",
            get(user::get_preferences).put(user::update_preferences),
        )
        .layer(require_auth.clone());

    let progress_routes = Router::new()
        .route("/", get(progress::get_progress))
        .route("/start", post(progress::start_module))
        .route("/answer", post(progress::answer_question))
        .route("/reset", post(progress::reset_module))
        .route("/detailed", get(progress::get_detailed_progress))
        .route("/dashboard", get(progress::get_dashboard_stats))
        .route("/modules/{module_id}", get(progress::get_module_progress))
        .layer(require_auth);

    Router::new()
        .route("/", get(modules::root))
        .route("/api/health", get(modules::health_check))
        .route("/api/modules", get(modules::list_modules))
        .nest("/api/auth", auth_routes)
        .nest("/api/user", user_routes)
        .nest("/api/progress", progress_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
