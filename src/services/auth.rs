use crate::db;
use crate::models::User;
use crate::services::{ServiceError, ServiceResult};
use crate::Database;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use rusqlite::OptionalExtension;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_NAME_LENGTH: usize = 100;
const MAX_EMAIL_LENGTH: usize = 254;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

fn validate_name(name: &str) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::Validation("name cannot be empty".into()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ServiceError::Validation(format!(
            "name must be {} characters or less",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> ServiceResult<()> {
    if email.is_empty() {
        return Err(ServiceError::Validation("email cannot be empty".into()));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ServiceError::Validation(format!(
            "email must be {} characters or less",
            MAX_EMAIL_LENGTH
        )));
    }
    if !email.contains('@') || !email.contains('.') {
        return Err(ServiceError::Validation("invalid email format".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ServiceResult<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ServiceError::Validation(
            "password must contain at least one lowercase letter".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ServiceError::Validation(
            "password must contain at least one uppercase letter".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ServiceError::Validation(
            "password must contain at least one number".into(),
        ));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> ServiceResult<String> {
    validate_password(password)?;
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dW5rbm93bg$0000000000000000000000000000000000000000000";

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => {
            if let Ok(dummy) = PasswordHash::new(DUMMY_HASH) {
                let _ = Argon2::default().verify_password(password.as_bytes(), &dummy);
            }
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub fn register_user(db: &Database, name: &str, email: &str, password: &str) -> ServiceResult<User> {
    validate_name(name)?;
    validate_email(email)?;
    let password_hash = hash_password(password)?;

    let conn = db.get()?;
    match conn.execute(
        "INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?)",
        (name, email, &password_hash),
    ) {
        Err(err) if db::is_unique_violation(&err) => return Err(ServiceError::DuplicateEmail),
        Err(err) => return Err(err.into()),
        Ok(_) => {}
    }

    let user = conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
        [conn.last_insert_rowid()],
        row_to_user,
    )?;
    Ok(user)
}

/// Look up the account and check the password. Unknown emails still pay the
/// cost of one argon2 verification so the response time does not reveal
/// which addresses exist.
pub fn authenticate(db: &Database, email: &str, password: &str) -> ServiceResult<Option<User>> {
    let user = get_user_by_email(db, email)?;

    match user {
        Some(u) if verify_password(password, &u.password_hash) => Ok(Some(u)),
        Some(_) => Ok(None),
        None => {
            let _ = verify_password(password, "not-a-hash");
            Ok(None)
        }
    }
}

pub fn get_user(db: &Database, id: i64) -> ServiceResult<Option<User>> {
    let conn = db.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
            [id],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn get_user_by_email(db: &Database, email: &str) -> ServiceResult<Option<User>> {
    let conn = db.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
            [email],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn update_password(db: &Database, user_id: i64, password: &str) -> ServiceResult<()> {
    let password_hash = hash_password(password)?;
    let conn = db.get()?;
    conn.execute(
        "UPDATE users SET password_hash = ?, updated_at = datetime('now') WHERE id = ?",
        (&password_hash, user_id),
    )?;
    Ok(())
}

pub fn create_session(db: &Database, user_id: i64, lifetime_hours: i64) -> ServiceResult<String> {
    let token = generate_token();
    let conn = db.get()?;
    conn.execute(
        "INSERT INTO sessions (user_id, token, expires_at) VALUES (?, ?, datetime('now', ?||' hours'))",
        (user_id, &token, lifetime_hours),
    )?;
    Ok(token)
}

pub fn validate_session(db: &Database, token: &str) -> ServiceResult<Option<User>> {
    let conn = db.get()?;
    let user = conn
        .query_row(
            "SELECT u.id, u.name, u.email, u.password_hash, u.created_at, u.updated_at \
             FROM users u JOIN sessions s ON s.user_id = u.id \
             WHERE s.token = ? AND s.expires_at > datetime('now')",
            [token],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn delete_session(db: &Database, token: &str) -> ServiceResult<()> {
    let conn = db.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?", [token])?;
    Ok(())
}

pub fn cleanup_expired_sessions(db: &Database) -> ServiceResult<usize> {
    let conn = db.get()?;
    let removed = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= datetime('now')",
        [],
    )?;
    Ok(removed)
}
