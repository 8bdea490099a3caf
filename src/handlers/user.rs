// src/handlers/user.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{UpdatePreferencesRequest, UserPayload},
    store::{SharedStore, require_user},
    utils::jwt::Claims,
};

/// Get current user's public profile.
pub async fn get_me(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(store.as_ref(), claims.user_id()?).await?;
    Ok(Json(UserPayload::from(&user)))
}

pub async fn get_preferences(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(store.as_ref(), claims.user_id()?).await?;
    Ok(Json(user.preferences))
}

/// Partially updates the current user's preferences.
pub async fn update_preferences(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdatePreferencesRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let user_id = claims.user_id()?;

    let mut preferences = require_user(store.as_ref(), user_id).await?.preferences;
    req.apply(&mut preferences);

    if !store.update_preferences(user_id, &preferences).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(preferences))
}
