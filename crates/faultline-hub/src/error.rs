//! Error types for handlers
//!
//! Handler failures never escape the hub; they are logged and dispatch moves
//! on to the next handler.

/// Failure inside an [`ErrorHandler`](crate::ErrorHandler)
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Handler reported a failure
    #[error("handler '{handler}' failed: {message}")]
    Failed {
        /// Handler name
        handler: String,
        /// What went wrong
        message: String,
    },

    /// Handler panicked while processing an event
    #[error("handler '{handler}' panicked: {message}")]
    Panicked {
        /// Handler name
        handler: String,
        /// Panic payload, if it was a string
        message: String,
    },

    /// Any other error surfaced by handler code
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Create failure for handler
    pub fn failed(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            handler: handler.into(),
            message: message.into(),
        }
    }
}
