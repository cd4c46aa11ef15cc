use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod transaction;
pub use transaction::{TransactionContext, UnitOfWork, UnitOfWorkError};

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: &str) -> Self {
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(UserId);
define_id!(NotificationId);
define_id!(XpTransactionId);

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Resource Not Found (2xxx)
    NotFound = 2001,

    // Concurrency (3xxx)
    TransactionConflict = 3001,

    // Data & Persistence (4xxx)
    RepositoryError = 4001,
    DatabaseConstraintViolation = 4002,
    DataIntegrityError = 4003,
    SerializationError = 4004,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,

    // Validation (6xxx)
    ValidationError = 6001,
    InvalidInput = 6002,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::TransactionConflict => ErrorSeverity::Warning,

            ErrorCode::NotFound | ErrorCode::ValidationError | ErrorCode::InvalidInput => {
                ErrorSeverity::Info
            }

            ErrorCode::DataIntegrityError
            | ErrorCode::DatabaseConstraintViolation
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,

            _ => ErrorSeverity::Warning,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorCode::TransactionConflict)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Optimistic write lost a race or the database was busy
    #[error("Transaction conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Repository(_) => ErrorCode::RepositoryError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::DataIntegrity(_) => ErrorCode::DataIntegrityError,
            DomainError::InvalidInput(_) => ErrorCode::InvalidInput,
            DomainError::Serialization(_) => ErrorCode::SerializationError,
            DomainError::Deserialization(_) => ErrorCode::SerializationError,
            DomainError::NotFound(_) => ErrorCode::NotFound,
            DomainError::Conflict(_) => ErrorCode::TransactionConflict,
        }
    }

    /// Get error message
    pub fn message(&self) -> &str {
        match self {
            DomainError::Repository(msg)
            | DomainError::Infrastructure(msg)
            | DomainError::Validation(msg)
            | DomainError::DataIntegrity(msg)
            | DomainError::InvalidInput(msg)
            | DomainError::Serialization(msg)
            | DomainError::Deserialization(msg)
            | DomainError::NotFound(msg)
            | DomainError::Conflict(msg) => msg,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict(_))
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}

impl From<UnitOfWorkError> for DomainError {
    fn from(err: UnitOfWorkError) -> Self {
        match err {
            UnitOfWorkError::Conflict(msg) => DomainError::Conflict(msg),
            other => DomainError::Repository(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_recoverable_warning() {
        let err = DomainError::Conflict("user_streaks".to_string());
        assert!(err.is_recoverable());
        assert!(err.is_conflict());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.format_with_code(), "[3001] Transaction conflict: user_streaks");
    }

    #[test]
    fn test_repository_error_is_not_recoverable() {
        let err = DomainError::Repository("disk full".to_string());
        assert!(!err.is_recoverable());
        assert_eq!(err.message(), "disk full");
        assert_eq!(err.code(), ErrorCode::RepositoryError);
    }

    #[test]
    fn test_unit_of_work_conflict_maps_to_conflict() {
        let err: DomainError = UnitOfWorkError::Conflict("busy".to_string()).into();
        assert!(err.is_conflict());

        let err: DomainError = UnitOfWorkError::CommitFailed("io".to_string()).into();
        assert!(matches!(err, DomainError::Repository(msg) if msg == "Commit failed: io"));
    }

    #[test]
    fn test_user_id_roundtrip() {
        let id = UserId::from_string("user-42");
        assert_eq!(id.as_str(), "user-42");
        assert_eq!(id.to_string(), "user-42");
        assert_ne!(UserId::new(), UserId::new());
    }
}
