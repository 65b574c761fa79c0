use thiserror::Error;

/// Errors from repository operations (used by trait definitions in rafway-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to sign-in and token verification.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user must be signed in")]
    Unauthenticated,

    #[error("invalid or revoked token")]
    InvalidToken,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from the server-side chat exchange.
///
/// Running out of free messages is not an error; it is reported as a
/// normal quota-exceeded outcome.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("message text is empty")]
    EmptyMessage,

    #[error("profile not found")]
    ProfileNotFound,

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<RepositoryError> for ExchangeError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ExchangeError::ProfileNotFound,
            other => ExchangeError::StorageError(other.to_string()),
        }
    }
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        AuthError::StorageError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_exchange_error_from_repository() {
        let err: ExchangeError = RepositoryError::NotFound.into();
        assert!(matches!(err, ExchangeError::ProfileNotFound));

        let err: ExchangeError = RepositoryError::Connection.into();
        assert!(matches!(err, ExchangeError::StorageError(_)));
    }

    #[test]
    fn test_auth_error_display() {
        assert_eq!(AuthError::Unauthenticated.to_string(), "user must be signed in");
    }
}
