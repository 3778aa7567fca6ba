//! Common error types for the gym services

use thiserror::Error;

/// Common result type for gym operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the gym services
///
/// Rows rejected by the cleaning pipeline never show up here: a validation
/// drop is silent and only visible as a smaller batch.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Membership plan referenced by name does not exist
    #[error("Membership type '{0}' not found")]
    PlanNotFound(String),

    /// Member referenced by id does not exist
    #[error("Member not found: {0}")]
    MemberNotFound(i64),

    /// No member matches a name or id query
    #[error("No member matches '{0}'")]
    NoMatchingMember(String),

    /// A member with the same name and contact number already exists
    #[error("This member is already registered")]
    AlreadyRegistered,

    /// Member id / contact number pair did not match
    #[error("Invalid member id or contact number")]
    InvalidCredentials,

    /// Deletion transaction was rolled back
    #[error("Could not delete member {member_id}: {reason}")]
    DeletionFailed { member_id: i64, reason: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error classification shared by all callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A single trusted input referenced something that does not exist
    Lookup,
    /// A transactional unit was rolled back
    Transactional,
    /// The caller supplied malformed or conflicting input
    Input,
    /// Storage or I/O failure
    Storage,
    /// Configuration problem
    Config,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PlanNotFound(_)
            | Error::MemberNotFound(_)
            | Error::NoMatchingMember(_)
            | Error::InvalidCredentials => ErrorKind::Lookup,
            Error::DeletionFailed { .. } => ErrorKind::Transactional,
            Error::InvalidInput(_) | Error::AlreadyRegistered => ErrorKind::Input,
            Error::Config(_) => ErrorKind::Config,
            Error::Database(_) | Error::Io(_) | Error::Csv(_) | Error::Internal(_) => {
                ErrorKind::Storage
            }
        }
    }

    /// True when the database rejected a write on a foreign key
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => db_err.is_foreign_key_violation(),
            _ => false,
        }
    }
}
