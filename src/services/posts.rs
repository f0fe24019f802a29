use crate::db;
use crate::models::{CreatePost, Post, PostPage, PostWithAuthor, UpdatePost, UserSummary};
use crate::services::pagination;
use crate::services::slug::generate_unique_slug;
use crate::services::{ServiceError, ServiceResult};
use crate::Database;
use rusqlite::OptionalExtension;

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 100;
const CONTENT_MIN: usize = 10;
const CONTENT_MAX: usize = 5000;

const POST_COLUMNS: &str = "id, author_id, title, slug, content, image, created_at, updated_at";

fn validate_title(title: &str) -> ServiceResult<()> {
    let len = title.trim().chars().count();
    if !(TITLE_MIN..=TITLE_MAX).contains(&len) {
        return Err(ServiceError::Validation(format!(
            "title must be {}-{} characters",
            TITLE_MIN, TITLE_MAX
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> ServiceResult<()> {
    let len = content.chars().count();
    if !(CONTENT_MIN..=CONTENT_MAX).contains(&len) {
        return Err(ServiceError::Validation(format!(
            "content must be {}-{} characters",
            CONTENT_MIN, CONTENT_MAX
        )));
    }
    Ok(())
}

fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        author_id: row.get(1)?,
        title: row.get(2)?,
        slug: row.get(3)?,
        content: row.get(4)?,
        image: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Create a post owned by `author_id`, deriving its slug from the title.
///
/// The slug probe and the insert are not atomic, so a concurrent create with
/// the same title can slip in between them. The unique index rejects the
/// second insert; one regeneration against the fresh table state observes the
/// winner and takes the next suffix.
pub fn create_post(db: &Database, author_id: i64, input: &CreatePost) -> ServiceResult<Post> {
    validate_title(&input.title)?;
    validate_content(&input.content)?;

    let slug = generate_unique_slug(db, &input.title, None)?;
    match insert_post(db, author_id, input, &slug) {
        Err(ServiceError::Storage(err)) if db::is_unique_violation(&err) => {
            tracing::debug!(slug = %slug, "slug taken by concurrent insert, regenerating");
            let slug = generate_unique_slug(db, &input.title, None)?;
            match insert_post(db, author_id, input, &slug) {
                Err(ServiceError::Storage(err)) if db::is_unique_violation(&err) => {
                    Err(ServiceError::DuplicateSlug(slug))
                }
                other => other,
            }
        }
        other => other,
    }
}

fn insert_post(
    db: &Database,
    author_id: i64,
    input: &CreatePost,
    slug: &str,
) -> ServiceResult<Post> {
    let conn = db.get()?;
    conn.execute(
        "INSERT INTO posts (author_id, title, slug, content, image) VALUES (?, ?, ?, ?, ?)",
        (author_id, &input.title, slug, &input.content, &input.image),
    )?;
    let id = conn.last_insert_rowid();

    let post = conn.query_row(
        &format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS),
        [id],
        row_to_post,
    )?;
    Ok(post)
}

pub fn get_post_by_id(db: &Database, id: i64) -> ServiceResult<Option<Post>> {
    let conn = db.get()?;
    let post = conn
        .query_row(
            &format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS),
            [id],
            row_to_post,
        )
        .optional()?;
    Ok(post)
}

pub fn get_post_by_slug(db: &Database, slug: &str) -> ServiceResult<Option<PostWithAuthor>> {
    let conn = db.get()?;
    let post = conn
        .query_row(
            &format!("SELECT {} FROM posts WHERE slug = ?", POST_COLUMNS),
            [slug],
            row_to_post,
        )
        .optional()?;

    match post {
        Some(post) => {
            let author = conn
                .query_row(
                    "SELECT id, name FROM users WHERE id = ?",
                    [post.author_id],
                    |row| {
                        Ok(UserSummary {
                            id: row.get(0)?,
                            name: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(Some(PostWithAuthor { post, author }))
        }
        None => Ok(None),
    }
}

/// Edit a post. Only the owning author may edit; the slug is re-derived from
/// the effective title with the post itself excluded from the uniqueness
/// scope, so an unchanged title keeps the slug the post already has.
pub fn update_post(
    db: &Database,
    id: i64,
    author_id: i64,
    input: &UpdatePost,
) -> ServiceResult<Post> {
    let current = get_post_by_id(db, id)?.ok_or(ServiceError::NotFound)?;
    if current.author_id != author_id {
        return Err(ServiceError::Forbidden);
    }

    let title = input.title.clone().unwrap_or(current.title);
    validate_title(&title)?;
    let content = input.content.clone().unwrap_or(current.content);
    validate_content(&content)?;
    let image = input.image.clone().or(current.image);

    let slug = generate_unique_slug(db, &title, Some(id))?;
    match apply_update(db, id, &title, &slug, &content, &image) {
        Err(ServiceError::Storage(err)) if db::is_unique_violation(&err) => {
            tracing::debug!(slug = %slug, "slug taken by concurrent write, regenerating");
            let slug = generate_unique_slug(db, &title, Some(id))?;
            match apply_update(db, id, &title, &slug, &content, &image) {
                Err(ServiceError::Storage(err)) if db::is_unique_violation(&err) => {
                    Err(ServiceError::DuplicateSlug(slug))
                }
                other => other,
            }
        }
        other => other,
    }
}

fn apply_update(
    db: &Database,
    id: i64,
    title: &str,
    slug: &str,
    content: &str,
    image: &Option<String>,
) -> ServiceResult<Post> {
    let conn = db.get()?;
    conn.execute(
        "UPDATE posts SET title = ?, slug = ?, content = ?, image = ?, updated_at = datetime('now') WHERE id = ?",
        (title, slug, content, image, id),
    )?;

    let post = conn.query_row(
        &format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS),
        [id],
        row_to_post,
    )?;
    Ok(post)
}

/// Delete a post. Only the owning author may delete it.
pub fn delete_post(db: &Database, id: i64, author_id: i64) -> ServiceResult<()> {
    let current = get_post_by_id(db, id)?.ok_or(ServiceError::NotFound)?;
    if current.author_id != author_id {
        return Err(ServiceError::Forbidden);
    }

    let conn = db.get()?;
    conn.execute("DELETE FROM posts WHERE id = ?", [id])?;
    Ok(())
}

/// Paginated listing, newest first, optionally filtered by a
/// case-insensitive substring match on the title.
///
/// The count and the slice are read back-to-back from current storage state;
/// nothing is cached, so identical calls against unchanged storage return
/// identical pages.
pub fn list_posts(
    db: &Database,
    page: usize,
    page_size: usize,
    filter: Option<&str>,
) -> ServiceResult<PostPage> {
    if page_size == 0 {
        return Err(ServiceError::InvalidPageSize);
    }

    let total = count_matching(db, filter)?;
    let bounds = pagination::resolve(total, page, page_size)?;
    let items = fetch_page(db, bounds.offset, page_size, filter)?;

    Ok(PostPage {
        items,
        page: bounds.page,
        total_pages: bounds.total_pages,
        total_posts: total,
        has_prev: bounds.has_prev,
        has_next: bounds.has_next,
    })
}

pub fn count_matching(db: &Database, filter: Option<&str>) -> ServiceResult<i64> {
    let conn = db.get()?;
    let count: i64 = match filter {
        Some(q) => conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE title LIKE '%' || ? || '%'",
            [q],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?,
    };
    Ok(count)
}

pub fn fetch_page(
    db: &Database,
    offset: usize,
    limit: usize,
    filter: Option<&str>,
) -> ServiceResult<Vec<Post>> {
    let conn = db.get()?;
    let posts = match filter {
        Some(q) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM posts WHERE title LIKE '%' || ? || '%' \
                 ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
                POST_COLUMNS
            ))?;
            let rows = stmt.query_map((q, limit, offset), row_to_post)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM posts ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
                POST_COLUMNS
            ))?;
            let rows = stmt.query_map((limit, offset), row_to_post)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(posts)
}
