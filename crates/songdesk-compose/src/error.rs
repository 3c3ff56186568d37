//! Error types for song composers

/// Composer error type
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Composer backend error: {0}")]
    Backend(String),
}

/// Result type alias for composer operations
pub type Result<T> = std::result::Result<T, ComposeError>;

impl ComposeError {
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        ComposeError::Backend(msg.into())
    }
}
