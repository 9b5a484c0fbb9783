//! Error handling for the booking ledger core.

/// Ledger error type.
///
/// The embedding HTTP layer maps these onto status codes; the core never
/// retries and never partially applies a failed unit of work.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Referenced program, booking, pricing configuration or payment does
    /// not exist or is not owned by the caller's account.
    #[error("resource not found")]
    NotFound,

    /// Duplicate booking or partially-matched bulk request.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed or incomplete input.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        // A unique-constraint hit on (account, program, passport) is a
        // duplicate booking, not an infrastructure failure.
        if let sqlx::Error::Database(ref db) = err {
            if db.is_unique_violation() {
                return LedgerError::Conflict(db.message().to_string());
            }
        }
        LedgerError::Database(err)
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
