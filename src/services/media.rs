use crate::models::Media;
use crate::services::{ServiceError, ServiceResult};
use crate::Database;
use rusqlite::OptionalExtension;
use std::path::Path;
use uuid::Uuid;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

fn extensions_match(claimed: &str, sniffed: &str) -> bool {
    // infer reports "jpg" for both .jpg and .jpeg
    claimed == sniffed || (claimed == "jpeg" && sniffed == "jpg")
}

/// Validate and persist an uploaded image: extension whitelist, content
/// sniffing against the claimed extension, then a uuid filename on disk plus
/// a media row pointing at it.
pub fn store_upload(
    db: &Database,
    upload_dir: &Path,
    max_bytes: usize,
    original_name: &str,
    data: &[u8],
    uploaded_by: Option<i64>,
) -> ServiceResult<Media> {
    if original_name.is_empty() {
        return Err(ServiceError::Validation("no file selected".into()));
    }
    if data.is_empty() {
        return Err(ServiceError::Validation("uploaded file is empty".into()));
    }
    if data.len() > max_bytes {
        return Err(ServiceError::Validation(format!(
            "file too large: {} bytes (max {} bytes)",
            data.len(),
            max_bytes
        )));
    }

    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ServiceError::Validation(format!(
            "file type not allowed: '{}'. Allowed types: {}",
            extension,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let sniffed = infer::get(data)
        .ok_or_else(|| ServiceError::Validation("unrecognized file content".into()))?;
    if !extensions_match(&extension, sniffed.extension()) {
        return Err(ServiceError::Validation(format!(
            "file content does not match its '{}' extension",
            extension
        )));
    }

    let mime_type = mime_guess::from_path(original_name)
        .first_or_octet_stream()
        .to_string();
    let filename = format!("{}.{}", Uuid::new_v4(), extension);

    std::fs::create_dir_all(upload_dir).map_err(anyhow::Error::from)?;
    std::fs::write(upload_dir.join(&filename), data).map_err(anyhow::Error::from)?;

    let conn = db.get()?;
    conn.execute(
        "INSERT INTO media (filename, original_name, mime_type, size_bytes, uploaded_by) \
         VALUES (?, ?, ?, ?, ?)",
        (
            &filename,
            original_name,
            &mime_type,
            data.len() as i64,
            uploaded_by,
        ),
    )?;

    let id = conn.last_insert_rowid();
    let media = conn.query_row(
        "SELECT id, filename, original_name, mime_type, size_bytes, uploaded_by, created_at \
         FROM media WHERE id = ?",
        [id],
        row_to_media,
    )?;
    Ok(media)
}

pub fn get_media_by_filename(db: &Database, filename: &str) -> ServiceResult<Option<Media>> {
    let conn = db.get()?;
    let media = conn
        .query_row(
            "SELECT id, filename, original_name, mime_type, size_bytes, uploaded_by, created_at \
             FROM media WHERE filename = ?",
            [filename],
            row_to_media,
        )
        .optional()?;
    Ok(media)
}

fn row_to_media(row: &rusqlite::Row) -> rusqlite::Result<Media> {
    Ok(Media {
        id: row.get(0)?,
        filename: row.get(1)?,
        original_name: row.get(2)?,
        mime_type: row.get(3)?,
        size_bytes: row.get(4)?,
        uploaded_by: row.get(5)?,
        created_at: row.get(6)?,
    })
}
