use thiserror::Error;

/// Failures surfaced by an [`EventStore`](crate::store::EventStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Event not found")]
    NotFound,

    #[error("Invalid event id: {0}")]
    InvalidId(String),

    #[error("Store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("{0}")]
    Unexpected(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err),
            sqlx::Error::Database(db) if db.is_check_violation() => {
                StoreError::Validation(db.message().to_string())
            }
            other => StoreError::Unexpected(other.to_string()),
        }
    }
}
