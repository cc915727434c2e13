// ❗ Error taxonomy shared by the stores, the propagator and the reconciler
//
// NotFound / InvalidId / Timeout / Persistence are what the persistence boundary
// can report. InvalidInput is raised by entry points before anything is written.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Referenced quota/sale/client/payment does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Identifier text that is not a positive integer
    #[error("invalid id: {0:?}")]
    InvalidId(String),

    /// Store call exceeded its deadline
    #[error("store call timed out")]
    Timeout,

    /// Any other store failure
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable code surfaced to API consumers
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::InvalidId(_) => "invalid_id",
            Error::Timeout => "timeout",
            Error::Persistence(_) => "internal_server_error",
            Error::InvalidInput(_) => "invalid_params",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                Error::Timeout
            }
            _ => Error::Persistence(err.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Error::Persistence(format!("store lock poisoned: {}", err))
    }
}
