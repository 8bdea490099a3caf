// src/utils/google.rs

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::AppError;

static GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Identity asserted by a verified Google ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    /// Stable Google account id.
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
}

/// Verifies third-party ID tokens.
#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, AppError>;
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    email_verified: Option<String>,
    name: Option<String>,
}

/// Checks ID tokens with Google's `tokeninfo` endpoint.
pub struct GoogleTokenVerifier {
    client: Client,
    client_id: String,
    endpoint: String,
}

impl GoogleTokenVerifier {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            client_id: client_id.into(),
            endpoint: GOOGLE_TOKENINFO_URL.to_string(),
        }
    }
}

fn into_identity(info: TokenInfo, client_id: &str) -> Result<GoogleIdentity, AppError> {
    if info.aud != client_id {
        return Err(AppError::AuthError(
            "Google token was issued for another application".to_string(),
        ));
    }
    if info.email_verified.as_deref() == Some("false") {
        return Err(AppError::AuthError("Google email is not verified".to_string()));
    }
    let email = info
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::AuthError("Google token carries no email".to_string()))?;

    Ok(GoogleIdentity {
        sub: info.sub,
        email,
        name: info.name,
    })
}

#[async_trait]
impl IdTokenVerifier for GoogleTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, AppError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AppError::InternalServerError(format!("Google tokeninfo request failed: {e}")))?;

        // Google answers 400 for invalid or expired tokens.
        if resp.status().is_client_error() {
            return Err(AppError::AuthError("Invalid Google token".to_string()));
        }

        let info: TokenInfo = resp
            .error_for_status()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        into_identity(info, &self.client_id)
    }
}
