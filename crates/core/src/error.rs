/// Failure outcomes of the register and login workflows.
///
/// Every variant terminates the current operation; none are retried.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing or malformed input. The caller can fix the request.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unknown user or wrong password. Both cases carry the same message.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Username or email already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Hashing, signing or store failure not caused by the caller. The
    /// message is for the operator log only.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The single authentication failure returned for both an unknown
    /// username and a wrong password.
    pub fn invalid_credentials() -> Self {
        CoreError::Unauthorized(INVALID_CREDENTIALS.to_string())
    }
}

/// Message shared by every authentication failure.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
