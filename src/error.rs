//! Error types for the screenshot pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or rendering a screenshot
#[derive(Error, Debug)]
pub enum Error {
    /// The browser backend is not available on this machine
    #[error("{0}")]
    MissingDependency(String),

    /// Failed to start the browser session
    #[error("Engine initialization failed: {0}")]
    InitializationError(String),

    /// Failed to load the composed document
    #[error("Failed to load document: {0}")]
    LoadError(String),

    /// Failed to set the viewport or capture the page
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to evaluate a DOM measurement script
    #[error("Script execution failed: {0}")]
    ScriptError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Config was not valid JSON
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Reading config or writing the image failed
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::CdpError(err.to_string())
    }
}
