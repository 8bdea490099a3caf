// src/handlers/modules.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::progress::ModuleCatalog;

pub async fn root() -> &'static str {
    "Quiz API is running"
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Lists the modules available to every user.
pub async fn list_modules(State(catalog): State<Arc<ModuleCatalog>>) -> impl IntoResponse {
    Json(catalog.modules().to_vec())
}
