use crate::services::{ServiceError, ServiceResult};
use crate::Database;
use slug::slugify;

/// Normalize a title into its base slug: lowercase, transliterated,
/// punctuation stripped, whitespace runs collapsed into single hyphens.
/// A title with nothing sluggable in it ("!!!") is rejected.
pub fn base_slug(title: &str) -> ServiceResult<String> {
    let base = slugify(title);
    if base.is_empty() {
        return Err(ServiceError::InvalidTitle);
    }
    Ok(base)
}

pub fn slug_exists(
    db: &Database,
    slug: &str,
    exclude_post_id: Option<i64>,
) -> ServiceResult<bool> {
    let conn = db.get()?;
    let count: i64 = match exclude_post_id {
        Some(id) => conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE slug = ? AND id != ?",
            (slug, id),
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM posts WHERE slug = ?", [slug], |row| {
            row.get(0)
        })?,
    };
    Ok(count > 0)
}

/// Derive a slug from `title` that no other post currently holds. On edit,
/// pass the post's own id so its current slug stays reusable — re-saving a
/// post under its unchanged title yields the slug it already has.
///
/// This probe is check-then-act against shared storage: two concurrent
/// creates can both see the same candidate as free. The unique index on
/// posts.slug is what actually holds the invariant; the caller retries with
/// a fresh probe when its insert reports a uniqueness violation.
pub fn generate_unique_slug(
    db: &Database,
    title: &str,
    exclude_post_id: Option<i64>,
) -> ServiceResult<String> {
    let base = base_slug(title)?;

    if !slug_exists(db, &base, exclude_post_id)? {
        return Ok(base);
    }

    // Worst case this scans linearly through taken suffixes, but each probe
    // is one indexed lookup and real collision chains stay short.
    let mut suffix: u64 = 1;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !slug_exists(db, &candidate, exclude_post_id)? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}
