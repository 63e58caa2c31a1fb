//! Error types used throughout the SDK core
//!
//! Provides the shared error taxonomy plus the retry classification that
//! drives the authentication and delivery retry loops.

use thiserror::Error;

/// Main error type for NudgeKit operations
#[derive(Error, Debug)]
pub enum NudgeKitError {
    /// Malformed endpoint URL - configuration bug, fatal to the call
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Response could not be interpreted as a valid HTTP/JSON reply
    #[error("Invalid response from server")]
    InvalidResponse,

    /// Credential rejection (401/403) - never retried
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Server-side failure (5xx) - retryable up to the attempt budget
    #[error("Server error: HTTP {0}")]
    ServerError(u16),

    /// Connectivity-class transport failure (timeout, DNS, refused, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// No cached credential available - caller must re-authenticate
    #[error("No access token available")]
    NoAccessToken,

    /// Secure-store or offline-store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl NudgeKitError {
    /// Check if this error should be retried.
    ///
    /// Classification rules, applied in order:
    /// 1. Connectivity-class failures are retryable.
    /// 2. Server errors (5xx) are retryable.
    /// 3. Credential rejection (401/403) is terminal.
    /// 4. Everything else is terminal for the current call.
    #[must_use]
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::ServerError(code) => (500..=599).contains(code),
            Self::InvalidUrl(_)
            | Self::InvalidResponse
            | Self::AuthenticationFailed
            | Self::NoAccessToken
            | Self::Storage(_) => false,
        }
    }

    /// Classify an HTTP status code the way the handshake loop expects.
    ///
    /// 401/403 map to [`Self::AuthenticationFailed`], 5xx to
    /// [`Self::ServerError`], and anything else unexpected to
    /// [`Self::InvalidResponse`].
    #[must_use]
    pub fn from_status(code: u16) -> Self {
        match code {
            401 | 403 => Self::AuthenticationFailed,
            500..=599 => Self::ServerError(code),
            _ => Self::InvalidResponse,
        }
    }
}

/// Errors surfaced by the persistence adapters
#[derive(Error, Debug)]
pub enum StorageError {
    /// Platform secure-store (keychain) read/write/delete failure
    #[error("Keychain error: {0}")]
    Keychain(String),

    /// Offline key/value store failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Record could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StorageError> for NudgeKitError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
