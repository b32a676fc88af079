//! Auth API endpoints.
//!
//! Passwords are hashed with argon2 and stored as PHC strings; sessions are
//! stateless HS256 bearer tokens carrying the user id and an expiry.

use api_types::auth::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    UserView,
};
use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{Duration, Utc};
use jsonwebtoken::{Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

/// Lifetime of a password-reset token.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub sub: String,
    pub exp: usize,
}

fn hash_password(password: &str) -> Result<String, ServerError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            tracing::error!("password hashing failed: {err}");
            ServerError::Internal
        })
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn sign_token(state: &ServerState, user_id: Uuid) -> Result<String, ServerError> {
    let expires_at = Utc::now() + Duration::hours(state.auth.token_ttl_hours);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expires_at.timestamp() as usize,
    };
    encode(&Header::default(), &claims, &state.auth.encoding).map_err(|err| {
        tracing::error!("token signing failed: {err}");
        ServerError::Internal
    })
}

fn map_user(user: &engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
    }
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    if payload.password.is_empty() {
        return Err(ServerError::Generic("password must not be empty".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .engine
        .create_user(&payload.name, &payload.email, &password_hash)
        .await?;

    let token = sign_token(&state, user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: map_user(&user),
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ServerError> {
    let user = state.engine.user_by_email(&payload.email).await?;

    // Same response for unknown email and wrong password.
    let Some(user) = user.filter(|user| verify_password(&payload.password, &user.password_hash))
    else {
        return Err(ServerError::Auth("invalid email or password".to_string()));
    };

    let token = sign_token(&state, user.id)?;
    Ok(Json(AuthResponse {
        token,
        user: map_user(&user),
    }))
}

/// Issues a reset token without revealing whether the email exists.
///
/// Delivery is an external collaborator; the token only shows up in the
/// server log.
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<StatusCode, ServerError> {
    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);

    match state
        .engine
        .issue_reset_token(&payload.email, &token, expires_at)
        .await
    {
        Ok(Some(())) => tracing::info!("password reset token issued: {token}"),
        Ok(None) => tracing::debug!("password reset requested for unknown email"),
        // Malformed addresses get the same answer as unknown ones.
        Err(engine::EngineError::InvalidInput(_)) => {}
        Err(err) => return Err(err.into()),
    }

    Ok(StatusCode::OK)
}

pub async fn reset_password(
    State(state): State<ServerState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<StatusCode, ServerError> {
    if payload.password.is_empty() {
        return Err(ServerError::Generic("password must not be empty".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    state
        .engine
        .reset_password(&payload.token, &password_hash, Utc::now())
        .await?;

    Ok(StatusCode::OK)
}

pub async fn me(Extension(user): Extension<engine::User>) -> Json<UserView> {
    Json(map_user(&user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trips() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }
}
