/// Main error type for the studio
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    // === Input Errors ===
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Message cannot be empty")]
    EmptyMessage,

    // === Connection Errors ===
    #[error("Connection failed: {reason}")]
    Connection { reason: String },

    // === Send Errors ===
    #[error("Not connected to any agent")]
    NotConnected,

    #[error("Failed to send message: {reason}")]
    Send { reason: String },

    #[error("Unexpected reply from agent: {reason}")]
    UnexpectedReply { reason: String },

    // === Configuration Errors ===
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },
}

/// Coarse classification used when rendering an error to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any network call
    Input,
    Connection,
    Send,
    Configuration,
}

impl StudioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StudioError::InvalidInput { .. } | StudioError::EmptyMessage => ErrorKind::Input,
            StudioError::Connection { .. } => ErrorKind::Connection,
            StudioError::NotConnected
            | StudioError::Send { .. }
            | StudioError::UnexpectedReply { .. } => ErrorKind::Send,
            StudioError::InvalidConfiguration { .. } => ErrorKind::Configuration,
        }
    }
}

/// Result type alias for studio operations
pub type StudioResult<T> = Result<T, StudioError>;
