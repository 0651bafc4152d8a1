//! Error types for authentication operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Authentication failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Email or password did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Email address is malformed.
    #[error("Please provide a valid email")]
    InvalidEmail,

    /// Password is shorter than the minimum.
    #[error("Password must be at least {min_length} characters")]
    WeakPassword {
        /// Required length
        min_length: usize,
    },

    // ═══════════════════════════════════════════════════════════
    // Session Errors
    // ═══════════════════════════════════════════════════════════

    /// Token is not a session identifier.
    #[error("Invalid token")]
    InvalidToken,

    /// Session has expired.
    #[error("Session has expired")]
    SessionExpired,

    /// Session not found.
    #[error("Session not found")]
    SessionNotFound,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Hashing or hash parsing failed.
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// Session encoding failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Session backend failed (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Returns `true` if this error is due to invalid user input.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::InvalidEmail | Self::WeakPassword { .. }
        )
    }

    /// Returns `true` if the caller must authenticate again.
    #[must_use]
    pub const fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::SessionExpired | Self::SessionNotFound
        )
    }
}
