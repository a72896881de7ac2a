//! Error types and error handling for segref.
//!
//! This module defines the error types used throughout the crate.
//! Handle lifecycle violations are reported through typed variants;
//! a negative reference count is logged, not returned
//! (see [`crate::core::segment::RefCountedHandle::release`]).

use thiserror::Error;

/// Result type alias for segref operations
pub type Result<T> = std::result::Result<T, SegrefError>;

/// Main error type for segref
#[derive(Error, Debug)]
pub enum SegrefError {
    #[error("Segment handle is closed: {id}")]
    HandleClosed { id: String },

    #[error("Segment handle {id} is still in use ({references} references)")]
    HandleInUse { id: String, references: i64 },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Failed to close segment {id}: {reason}")]
    CloseFailed { id: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl SegrefError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if the caller must re-fetch or reopen the segment
    pub fn is_closed(&self) -> bool {
        matches!(self, SegrefError::HandleClosed { .. })
    }

    /// Check if this is a contract violation by the caller
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            SegrefError::UnsupportedOperation(_) | SegrefError::HandleInUse { .. }
        )
    }
}
