// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{
        AuthResponse, GoogleLoginRequest, LoginRequest, NewUser, RegisterRequest, User,
        UserPayload,
    },
    state::AppState,
    store::StoreError,
    utils::{
        hash::{hash_password, unusable_password_hash, verify_password},
        jwt::sign_jwt,
    },
};

fn auth_response(state: &AppState, user: &User, message: &str) -> Result<AuthResponse, AppError> {
    let token = sign_jwt(
        user.id,
        &user.username,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    Ok(AuthResponse {
        message: message.to_string(),
        token,
        user: UserPayload::from(user),
    })
}

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created with a token so the client is signed in right away.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let username = payload.username();
    tracing::info!("Registering {} <{}>", username, payload.email);

    let hashed_password = hash_password(&payload.password)?;

    let user = state
        .store
        .create_user(NewUser {
            username,
            email: payload.email.trim().to_string(),
            password_hash: hashed_password,
        })
        .await?;

    let body = auth_response(&state, &user, "User created successfully.")?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// Authenticates a user and returns a JWT token.
///
/// Verifies the email and password against the store.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let invalid = || AppError::AuthError("Invalid email or password".to_string());

    let user = state
        .store
        .find_by_email(payload.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(invalid());
    }

    state.store.touch_last_login(user.id).await?;
    tracing::info!("User {} signed in", user.id);

    Ok(Json(auth_response(&state, &user, "Signed in successfully.")?))
}

/// Signs in with a Google ID token, creating the account on first use.
pub async fn google_login(
    State(state): State<AppState>,
    Json(payload): Json<GoogleLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let id_token = payload.token.unwrap_or_default();

    let verifier = state
        .google
        .as_ref()
        .ok_or_else(|| AppError::AuthError("Google sign-in is not configured".to_string()))?;

    let identity = verifier.verify(&id_token).await?;

    let user = match state.store.find_by_email(&identity.email).await? {
        Some(user) => {
            state.store.touch_last_login(user.id).await?;
            user
        }
        None => {
            let created = state
                .store
                .create_user(NewUser {
                    username: identity
                        .name
                        .clone()
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| "Google User".to_string()),
                    email: identity.email.clone(),
                    password_hash: unusable_password_hash()?,
                })
                .await;

            match created {
                Ok(user) => {
                    tracing::info!("Created account {} from Google sign-in", user.id);
                    user
                }
                // A concurrent sign-in created the account first.
                Err(StoreError::DuplicateEmail(_)) => state
                    .store
                    .find_by_email(&identity.email)
                    .await?
                    .ok_or_else(|| {
                        AppError::InternalServerError(
                            "Account vanished after duplicate email".to_string(),
                        )
                    })?,
                Err(e) => return Err(e.into()),
            }
        }
    };

    Ok(Json(auth_response(&state, &user, "Signed in with Google.")?))
}
