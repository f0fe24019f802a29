use super::handlers;
use super::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/health", get(handlers::site::health))
        .route("/api/v1/site", get(handlers::site::site_info))
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/v1/auth/forgot-password",
            post(handlers::auth::forgot_password),
        )
        .route(
            "/api/v1/auth/reset-password",
            post(handlers::auth::reset_password),
        )
        .route(
            "/api/v1/posts",
            get(handlers::posts::list).post(handlers::posts::create),
        )
        // One path parameter serves both addressing modes: GET resolves the
        // segment as a slug, PUT/DELETE parse it as the numeric post id.
        .route(
            "/api/v1/posts/:slug",
            get(handlers::posts::show)
                .put(handlers::posts::update)
                .delete(handlers::posts::remove),
        )
        .route("/api/v1/search", get(handlers::posts::search))
        .route("/api/v1/contact", post(handlers::contact::submit))
        .route(
            "/api/v1/uploads",
            post(handlers::media::upload).layer(DefaultBodyLimit::max(15 * 1024 * 1024)),
        )
        .route("/api/v1/media/:filename", get(handlers::media::serve_media))
}
