//! Error types for the HomiSmart bridge

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, HomismartError>;

/// Error types for HomiSmart bridge operations
#[derive(Error, Debug)]
pub enum HomismartError {
    /// Connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A refresh cycle failed; previously published data stays valid
    #[error("Update failed: {0}")]
    UpdateFailed(String),

    /// Device control errors
    #[error("Device control error: {0}")]
    DeviceControl(String),

    /// Command not supported by the target device
    #[error("Command not supported: {0}")]
    Unsupported(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Scene storage errors
    #[error("Scene storage error: {0}")]
    SceneStorage(String),

    /// Requested scene does not exist
    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not found errors (devices, scenes, etc.)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl HomismartError {
    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    /// Create an authentication error
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an update-failed error
    pub fn update_failed<S: Into<String>>(msg: S) -> Self {
        Self::UpdateFailed(msg.into())
    }

    /// Create a device control error
    pub fn device_control<S: Into<String>>(msg: S) -> Self {
        Self::DeviceControl(msg.into())
    }

    /// Create an unsupported-command error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a scene storage error
    pub fn scene_storage<S: Into<String>>(msg: S) -> Self {
        Self::SceneStorage(msg.into())
    }

    /// Create a scene-not-found error
    pub fn scene_not_found<S: Into<String>>(msg: S) -> Self {
        Self::SceneNotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Classify an opaque provider error message into an auth or connection error
    ///
    /// The vendor library reports failures as plain strings; this mirrors the
    /// keyword classification used when validating credentials.
    pub fn classify_provider<S: Into<String>>(msg: S) -> Self {
        let msg = msg.into();
        let lower = msg.to_lowercase();

        const AUTH_KEYWORDS: [&str; 5] = ["auth", "login", "credential", "password", "username"];

        if AUTH_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Self::Authentication(msg)
        } else {
            Self::Connection(msg)
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HomismartError::Connection(_)
                | HomismartError::UpdateFailed(_)
                | HomismartError::Timeout(_)
        )
    }

    /// Check if error indicates an authentication issue
    pub fn is_auth_error(&self) -> bool {
        matches!(self, HomismartError::Authentication(_))
    }
}
