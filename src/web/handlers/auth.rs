use crate::models::User;
use crate::services::{auth, password_reset, ServiceError};
use crate::web::error::{ApiError, ApiResult};
use crate::web::extractors::CurrentUser;
use crate::web::state::AppState;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = auth::register_user(&state.db, &req.name, &req.email, &req.password)?;
    tracing::info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn too_many_attempts() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "error": "too many attempts, try again later" })),
    )
        .into_response()
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    let key = addr.ip().to_string();
    if !state.rate_limiter.check(&key) {
        return Ok(too_many_attempts());
    }

    match auth::authenticate(&state.db, &req.email, &req.password)? {
        Some(user) => {
            state.rate_limiter.clear(&key);
            let lifetime = state.config.auth.token_lifetime_hours;
            let token = auth::create_session(&state.db, user.id, lifetime)?;
            let expires_at = (chrono::Utc::now() + chrono::Duration::hours(lifetime)).to_rfc3339();

            Ok(Json(json!({
                "access_token": token,
                "token_type": "bearer",
                "expires_at": expires_at,
            }))
            .into_response())
        }
        None => {
            state.rate_limiter.record_attempt(&key);
            Ok((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "invalid email or password" })),
            )
                .into_response())
        }
    }
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<StatusCode> {
    auth::delete_session(&state.db, &current.token)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// POST /api/v1/auth/forgot-password — responds 202 whether or not the
/// address is registered, so the endpoint cannot be used to probe accounts.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Response> {
    let key = addr.ip().to_string();
    if !state.rate_limiter.check(&key) {
        return Ok(too_many_attempts());
    }
    state.rate_limiter.record_attempt(&key);

    let lifetime = state.config.auth.reset_token_lifetime_minutes;
    if let Some(token) = password_reset::create_reset_token(&state.db, &req.email, lifetime)? {
        if let Err(err) = state.mailer.send_password_reset(&req.email, &token).await {
            tracing::error!("failed to send password reset mail: {:?}", err);
        }
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "If that address is registered, a reset link has been sent"
        })),
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// POST /api/v1/auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    password_reset::reset_password(&state.db, &req.token, &req.password).map_err(
        |err| match err {
            ServiceError::NotFound => {
                ApiError::from(ServiceError::Validation("invalid or expired reset token".into()))
            }
            other => ApiError::from(other),
        },
    )?;

    Ok(Json(json!({ "message": "password updated" })))
}
