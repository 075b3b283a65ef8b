//! Hydration error types.

use thiserror::Error;

/// Errors that can occur while capturing or restoring snapshots.
#[derive(Debug, Error)]
pub enum HydrationError {
    /// Serialization of state or data failed
    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization of state or data failed
    #[error("deserialization failed: {0}")]
    DeserializationFailed(String),

    /// The snapshot's nested shape does not match the machine's attachments
    #[error("snapshot shape mismatch: {0}")]
    ShapeMismatch(String),
}
