use std::path::PathBuf;

/// Convenience result type used across storyreel.
pub type StoryResult<T> = Result<T, StoryError>;

/// Top-level error taxonomy used by page, cache, and probe APIs.
#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    /// A referenced asset is missing, unreadable, or carries no extractable duration.
    #[error("asset unavailable '{}': {reason}", .path.display())]
    AssetUnavailable {
        /// Path that was queried.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// An image asset could not be decoded into a raster.
    #[error("decode error for '{key}': {reason}")]
    Decode {
        /// Cache key of the image that failed.
        key: String,
        /// Human-readable cause.
        reason: String,
    },

    /// Invalid user-provided or project data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing project data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    /// Build a [`StoryError::AssetUnavailable`] value.
    pub fn asset_unavailable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::AssetUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`StoryError::Decode`] value.
    pub fn decode(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`StoryError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for errors caused by a missing or unreadable narration asset.
    pub fn is_asset_unavailable(&self) -> bool {
        matches!(self, Self::AssetUnavailable { .. })
    }

    /// True for image decode failures.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
