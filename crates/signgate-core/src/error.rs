//! Error types for the SignGate core.

/// Core error type for SignGate infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum SignGateError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for SignGate operations.
pub type SignGateResult<T> = Result<T, SignGateError>;
