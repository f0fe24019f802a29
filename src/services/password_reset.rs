use crate::services::{auth, ServiceError, ServiceResult};
use crate::Database;
use rusqlite::OptionalExtension;
use sha2::{Digest, Sha256};

/// Reset tokens are stored hashed; a leaked database dump cannot be replayed
/// against the reset endpoint.
fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Issue a reset token for the account behind `email`. Returns `None` when no
/// such account exists — the caller responds identically either way so the
/// endpoint does not become an account oracle.
pub fn create_reset_token(
    db: &Database,
    email: &str,
    lifetime_minutes: i64,
) -> ServiceResult<Option<String>> {
    let Some(user) = auth::get_user_by_email(db, email)? else {
        return Ok(None);
    };

    let token = auth::generate_token();
    let conn = db.get()?;
    conn.execute(
        "INSERT INTO password_resets (user_id, token_hash, expires_at) \
         VALUES (?, ?, datetime('now', ?||' minutes'))",
        (user.id, hash_token(&token), lifetime_minutes),
    )?;
    Ok(Some(token))
}

/// Consume a reset token: set the new password, mark the token used, and
/// revoke every open session for the account. All three writes commit
/// together or not at all.
pub fn reset_password(db: &Database, token: &str, new_password: &str) -> ServiceResult<()> {
    let password_hash = auth::hash_password(new_password)?;

    let mut conn = db.get()?;
    let tx = conn.transaction()?;

    let row: Option<(i64, i64)> = tx
        .query_row(
            "SELECT id, user_id FROM password_resets \
             WHERE token_hash = ? AND used_at IS NULL AND expires_at > datetime('now')",
            [hash_token(token)],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((reset_id, user_id)) = row else {
        return Err(ServiceError::NotFound);
    };

    tx.execute(
        "UPDATE users SET password_hash = ?, updated_at = datetime('now') WHERE id = ?",
        (&password_hash, user_id),
    )?;
    tx.execute(
        "UPDATE password_resets SET used_at = datetime('now') WHERE id = ?",
        [reset_id],
    )?;
    tx.execute("DELETE FROM sessions WHERE user_id = ?", [user_id])?;
    tx.commit()?;

    tracing::info!(user_id, "password reset completed");
    Ok(())
}

pub fn cleanup_expired(db: &Database) -> ServiceResult<usize> {
    let conn = db.get()?;
    let removed = conn.execute(
        "DELETE FROM password_resets WHERE expires_at <= datetime('now') OR used_at IS NOT NULL",
        [],
    )?;
    Ok(removed)
}
