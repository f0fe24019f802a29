use crate::web::state::AppState;
use axum::extract::State;
use axum::response::Json;
use serde_json::json;
use std::sync::Arc;

/// GET /api/v1/site
pub async fn site_info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let site = &state.config.site;
    Json(json!({
        "title": site.title,
        "about": site.about,
        "url": site.url,
        "facebook_url": site.facebook_url,
        "x_url": site.x_url,
        "github_url": site.github_url,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/v1/health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
