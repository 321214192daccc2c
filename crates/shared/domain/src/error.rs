//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (HTTP, gRPC, database).

use thiserror::Error;

/// Deterministic input failures. Retrying with the same input fails again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("new password can not be empty")]
    EmptyPassword,

    #[error("password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("password must be at most {max} characters long")]
    PasswordTooLong { max: usize },

    #[error("password must contain at least 1 uppercase letter, 1 lowercase letter and 1 number")]
    PasswordTooWeak,

    #[error("new password must differ from the current password")]
    PasswordUnchanged,

    #[error("current password is incorrect")]
    InvalidCredential,

    #[error("account name can not be empty")]
    EmptyAccountName,

    #[error("unknown capability: {0}")]
    UnknownCapability(String),
}

/// Permission rules that refused an otherwise well-formed request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("cannot revoke site portal access of protected account {account}")]
    AdminLockout { account: String },

    #[error("account {account} does not have {capability} access")]
    AccessDenied { account: String, capability: String },
}

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input rejected by a validation rule
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Request refused by permission policy
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identifier already taken
    #[error("{0} already exists")]
    DuplicateIdentifier(String),

    /// Underlying storage fault
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Cryptographic primitive failed; the operation was aborted
    #[error("Fatal environment fault: {0}")]
    FatalEnvironment(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create a duplicate identifier error
    pub fn duplicate(identifier: impl Into<String>) -> Self {
        DomainError::DuplicateIdentifier(identifier.into())
    }

    /// Wrap a storage fault
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        DomainError::Persistence(err.to_string())
    }

    /// Create a fatal environment error
    pub fn fatal(msg: impl Into<String>) -> Self {
        DomainError::FatalEnvironment(msg.into())
    }

    /// True for faults that must abort the current operation loudly.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::FatalEnvironment(_))
    }

    /// Stable machine-readable code, one per failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(err) => match err {
                ValidationError::EmptyPassword => "EMPTY_PASSWORD",
                ValidationError::PasswordTooShort { .. } => "PASSWORD_TOO_SHORT",
                ValidationError::PasswordTooLong { .. } => "PASSWORD_TOO_LONG",
                ValidationError::PasswordTooWeak => "PASSWORD_TOO_WEAK",
                ValidationError::PasswordUnchanged => "PASSWORD_UNCHANGED",
                ValidationError::InvalidCredential => "INVALID_CREDENTIAL",
                ValidationError::EmptyAccountName => "EMPTY_ACCOUNT_NAME",
                ValidationError::UnknownCapability(_) => "UNKNOWN_CAPABILITY",
            },
            DomainError::Policy(err) => match err {
                PolicyViolation::AdminLockout { .. } => "ADMIN_LOCKOUT",
                PolicyViolation::AccessDenied { .. } => "ACCESS_DENIED",
            },
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::DuplicateIdentifier(_) => "DUPLICATE_IDENTIFIER",
            DomainError::Persistence(_) => "PERSISTENCE_ERROR",
            DomainError::FatalEnvironment(_) => "FATAL_ENVIRONMENT",
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
