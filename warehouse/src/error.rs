use sea_orm::DbErr;

/// Domain error shared by the schema store, form engine, UI descriptors and
/// the collaborator services. Converted to an HTTP status in `api::ApiErr`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client input is malformed or lacks required data.
    #[error("{0}")]
    Validation(String),
    /// Referenced id/name does not exist or is inactive.
    #[error("{0}")]
    NotFound(String),
    /// Uniqueness violation or a repeated state transition.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    /// File store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// True when the database rejected a write because of a unique index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("UNIQUE") || msg.contains("unique")
}
