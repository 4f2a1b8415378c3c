//! Shared error type across sdtmsg crates.

use thiserror::Error;

use crate::sdt::DataKind;

/// Stable error codes (safe to log, match on, or export).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Stored SDT value has a different tag than requested.
    TypeMismatch,
    /// Native data could not be decoded.
    Corrupt,
    /// Native handle no longer refers to a message.
    InvalidHandle,
    /// Invalid caller input (config, builder arguments).
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal failure.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ErrorCode::Corrupt => "CORRUPT",
            ErrorCode::InvalidHandle => "INVALID_HANDLE",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MessageError>;

/// Unified error type used by core and client.
///
/// Absence of a value is never an error: accessors report it through
/// `Option`. Only broken invariants (native faults), explicit conversions and
/// invalid caller input end up here.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: DataKind, found: DataKind },
    #[error("corrupt native data: {0}")]
    Corrupt(String),
    #[error("invalid native handle")]
    InvalidHandle,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl MessageError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MessageError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            MessageError::Corrupt(_) => ErrorCode::Corrupt,
            MessageError::InvalidHandle => ErrorCode::InvalidHandle,
            MessageError::BadRequest(_) => ErrorCode::BadRequest,
            MessageError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            MessageError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// True when the error reports a broken native resource rather than a
    /// caller mistake.
    pub fn is_native_fault(&self) -> bool {
        matches!(
            self,
            MessageError::Corrupt(_) | MessageError::InvalidHandle | MessageError::Internal(_)
        )
    }
}
