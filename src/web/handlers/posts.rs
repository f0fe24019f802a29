use crate::models::{CreatePost, Post, PostPage, PostWithAuthor, UpdatePost};
use crate::services::{posts, ServiceError};
use crate::web::error::ApiResult;
use crate::web::extractors::CurrentUser;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub q: Option<String>,
}

/// Page size actually used for a request: the caller's `per_page` capped at
/// the configured maximum, or the configured default when absent. A
/// client-supplied zero is passed through so it fails loudly instead of
/// being silently rewritten.
fn effective_page_size(state: &AppState, per_page: Option<usize>) -> usize {
    per_page
        .unwrap_or(state.config.content.posts_per_page)
        .min(state.config.content.max_page_size)
}

fn title_filter(q: &Option<String>) -> Option<&str> {
    q.as_deref().map(str::trim).filter(|q| !q.is_empty())
}

/// GET /api/v1/posts
pub async fn list(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Query(params): Query<ListQuery>,
) -> ApiResult<Json<PostPage>> {
    let page_size = effective_page_size(&state, params.per_page);
    let page = posts::list_posts(
        &state.db,
        params.page.unwrap_or(1),
        page_size,
        title_filter(&params.q),
    )?;
    Ok(Json(page))
}

/// GET /api/v1/posts/:slug
pub async fn show(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<Json<PostWithAuthor>> {
    let post = posts::get_post_by_slug(&state.db, &slug)?.ok_or(ServiceError::NotFound)?;
    Ok(Json(post))
}

/// POST /api/v1/posts
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(input): Json<CreatePost>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let post = posts::create_post(&state.db, user.user.id, &input)?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/v1/posts/:id — posts are fetched by slug but mutated by id;
/// a non-numeric segment here is rejected by the path extractor.
pub async fn update(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePost>,
) -> ApiResult<Json<Post>> {
    let post = posts::update_post(&state.db, id, user.user.id, &input)?;
    Ok(Json(post))
}

/// DELETE /api/v1/posts/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    posts::delete_post(&state.db, id, user.user.id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/search — same paginated listing, but the title filter is
/// required, matching the contact point the public site searches through.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> ApiResult<Json<PostPage>> {
    let Some(filter) = title_filter(&params.q) else {
        return Err(ServiceError::Validation("search term cannot be empty".into()).into());
    };

    let page_size = effective_page_size(&state, params.per_page);
    let page = posts::list_posts(&state.db, params.page.unwrap_or(1), page_size, Some(filter))?;
    Ok(Json(page))
}
