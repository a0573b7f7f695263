//! Authentication and session error types.

use thiserror::Error;

/// Errors surfaced by session, registration, and API operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity service rejected the login credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A registration field is missing or malformed, or the password is
    /// too weak. Resolved locally, before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The submitted one-time code was rejected or has expired.
    #[error("code is invalid or has expired")]
    OtpExpiredOrInvalid,

    /// Resend requested while the cooldown is still running. Enforced
    /// client-side with no network round-trip.
    #[error("resend available in {remaining}s")]
    OtpResendTooSoon { remaining: u64 },

    /// Transport-level failure (connect, timeout, malformed body).
    #[error("network error: {0}")]
    Network(String),

    /// An authenticated call was rejected by the identity service. The
    /// global interceptor has already torn the session down.
    #[error("session expired")]
    AuthExpired,

    /// The account could not be created because it already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other remote failure, carrying the service's detail message.
    #[error("server error: {0}")]
    Server(String),
}

impl AuthError {
    /// Get a message suitable for showing to the user.
    ///
    /// Transport errors are collapsed to a generic message so raw
    /// connection details never reach the UI.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Network(_) => "Could not reach the server".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether this error was already announced by the auth-failure
    /// interceptor, so callers should not render a second notification.
    #[must_use]
    pub fn already_announced(&self) -> bool {
        matches!(self, AuthError::AuthExpired)
    }
}

/// Result type for session and registration operations
pub type AuthResult<T> = Result<T, AuthError>;
