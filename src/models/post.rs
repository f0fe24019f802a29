use super::UserSummary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<UserSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

/// One listing page plus the navigation metadata computed for it.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub page: usize,
    pub total_pages: usize,
    pub total_posts: i64,
    pub has_prev: bool,
    pub has_next: bool,
}
