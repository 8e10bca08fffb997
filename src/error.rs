use thiserror::Error;

/// Unified error type for auto-release operations
#[derive(Error, Debug)]
pub enum AutoReleaseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Reference not found: {0}")]
    RefNotFound(String),

    #[error("Reference creation failed: {0}")]
    RefCreation(String),

    #[error("Remote object creation failed: {0}")]
    RemoteObject(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in auto-release
pub type Result<T> = std::result::Result<T, AutoReleaseError>;

impl AutoReleaseError {
    /// Create a parse error with context
    pub fn parse(msg: impl Into<String>) -> Self {
        AutoReleaseError::Parse(msg.into())
    }

    /// Create a malformed document error with context
    pub fn malformed(msg: impl Into<String>) -> Self {
        AutoReleaseError::MalformedDocument(msg.into())
    }

    pub fn ref_not_found(msg: impl Into<String>) -> Self {
        AutoReleaseError::RefNotFound(msg.into())
    }

    pub fn ref_creation(msg: impl Into<String>) -> Self {
        AutoReleaseError::RefCreation(msg.into())
    }

    /// Create a remote object error with context
    pub fn remote_object(msg: impl Into<String>) -> Self {
        AutoReleaseError::RemoteObject(msg.into())
    }

    /// Create an API error with context
    pub fn api(msg: impl Into<String>) -> Self {
        AutoReleaseError::Api(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        AutoReleaseError::Config(msg.into())
    }
}
