//! Error types for the orchestrator

/// Orchestrator error type
#[derive(Debug, thiserror::Error)]
pub enum DiagnosticsError {
    /// Global instance requested before `initialize`
    #[error("diagnostics not initialized")]
    NotInitialized,

    /// Instance was disposed
    #[error("diagnostics instance disposed")]
    Disposed,

    /// Snapshot could not be serialized
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
