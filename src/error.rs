//! Error handling for the spectrum/EQ engine
//!
//! Only programmer errors (bad FFT lengths), persisted-state failures and
//! configuration problems are surfaced as errors. Out-of-range parameter
//! values are clamped by the setters and never reach this type.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    // Transform Errors
    #[error("FFT length must be a power of two, got {len}")]
    NotPowerOfTwo { len: usize },

    #[error("Transform buffer too small: need {needed}, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    // Persisted State Errors
    #[error("Invalid persisted state: {reason}")]
    InvalidState { reason: String },

    #[error("Unsupported persisted state version: {version}")]
    UnsupportedStateVersion { version: i32 },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::NotPowerOfTwo { .. } => "NOT_POWER_OF_TWO",
            EngineError::BufferTooSmall { .. } => "BUFFER_TOO_SMALL",
            EngineError::InvalidState { .. } => "INVALID_STATE",
            EngineError::UnsupportedStateVersion { .. } => "UNSUPPORTED_STATE_VERSION",
            EngineError::InvalidConfig { .. } => "INVALID_CONFIG",
            EngineError::Io(_) => "IO_ERROR",
            EngineError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the caller can carry on after this error
    ///
    /// State and configuration failures leave the previous state in place,
    /// so the engine keeps running. A bad FFT length is a caller bug.
    pub fn is_recoverable(&self) -> bool {
        match self {
            EngineError::NotPowerOfTwo { .. } => false,
            EngineError::BufferTooSmall { .. } => false,
            EngineError::InvalidState { .. } => true,
            EngineError::UnsupportedStateVersion { .. } => true,
            EngineError::InvalidConfig { .. } => true,
            EngineError::Io(_) => true,
            EngineError::Serialization(_) => true,
        }
    }
}
