use crate::models::User;
use crate::services::{auth, ServiceError};
use crate::web::error::ApiError;
use crate::web::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// header against the sessions table. Carries the raw token so logout can
/// revoke it.
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let state = state.clone();
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Box::pin(async move {
            let token = header
                .and_then(|h| h.strip_prefix("Bearer ").map(str::to_string))
                .ok_or(ServiceError::Unauthorized)?;

            let user = auth::validate_session(&state.db, &token)?
                .ok_or(ServiceError::Unauthorized)?;

            Ok(CurrentUser { user, token })
        })
    }
}
