//! Error types for Larder.
//!
//! Errors are strongly typed using thiserror and appear only at the two
//! impure seams of the crate: artifact loading and the injected preference
//! store. The engine core itself degrades to `None`/empty results instead
//! of failing (unknown ingredients, unparseable quantities, missing rule
//! data are all answers, not errors).

use thiserror::Error;

/// Errors raised while fetching or decoding a build-time artifact.
///
/// Artifact errors are sticky: once a load fails, the dependent feature
/// stays unavailable for the rest of the session.
#[derive(Debug, Clone, Error)]
pub enum ArtifactError {
    /// The artifact source could not produce the blob.
    #[error("artifact fetch failed for '{name}': {message}")]
    Fetch {
        /// Artifact name as requested from the source.
        name: String,
        /// Source-specific failure description.
        message: String,
    },

    /// The blob was fetched but could not be decoded.
    #[error("artifact decode failed for '{name}': {message}")]
    Decode {
        /// Artifact name as requested from the source.
        name: String,
        /// Decoder failure description.
        message: String,
    },

    /// The envelope checksum did not match the payload.
    #[error("artifact checksum mismatch for '{name}': expected {expected}, computed {computed}")]
    ChecksumMismatch {
        /// Artifact name as requested from the source.
        name: String,
        /// Checksum declared in the envelope.
        expected: String,
        /// Checksum computed over the payload.
        computed: String,
    },

    /// The loader thread disappeared before reporting a result.
    #[error("artifact load for '{name}' was abandoned")]
    Abandoned {
        /// Artifact name as requested from the source.
        name: String,
    },
}

impl ArtifactError {
    /// The artifact name this error refers to.
    #[must_use]
    pub fn artifact_name(&self) -> &str {
        match self {
            Self::Fetch { name, .. }
            | Self::Decode { name, .. }
            | Self::ChecksumMismatch { name, .. }
            | Self::Abandoned { name } => name,
        }
    }
}

/// Errors raised by the injected preference store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend failure (lock poisoning, I/O, remote store, ...).
    #[error("preference store backend error: {0}")]
    Backend(String),

    /// A stored value could not be serialized or deserialized.
    #[error("preference serialization error: {0}")]
    Serialization(String),
}

/// Top-level error type for Larder.
#[derive(Debug, Error)]
pub enum LarderError {
    /// Artifact loading failed.
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Preference store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invariant violation inside the crate.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the violated invariant.
        message: String,
    },
}

impl LarderError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is an artifact error.
    #[must_use]
    pub const fn is_artifact(&self) -> bool {
        matches!(self, Self::Artifact(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type alias for Larder operations.
pub type LarderResult<T> = Result<T, LarderError>;
