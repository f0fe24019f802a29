use thiserror::Error;

/// Failures surfaced by the service layer. Storage-level errors pass
/// through unchanged; everything else is a condition the HTTP layer maps
/// to a client-facing status.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("title contains no characters usable in a slug")]
    InvalidTitle,

    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// A concurrent writer won the slug even after one regeneration.
    #[error("slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("{0}")]
    Validation(String),

    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
