//! Error types

mod api;
mod auth;
mod limit;
mod not_found;
mod validation;

pub use api::*;
pub use auth::*;
pub use limit::*;
pub use not_found::*;
pub use validation::*;

/// Top-level error returned by every fallible operation in this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed filter, sort, field or selector input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A path segment, directory or file could not be found.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// A pagination or traversal safety bound was hit.
    #[error(transparent)]
    LimitExceeded(#[from] LimitExceededError),

    /// The backend (or the network in front of it) failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The token provider failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// JSON (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A batch item failed and the batch was aborted.
    #[error("Item {index}: {source}")]
    Item {
        /// 1-based position of the failing item.
        index: usize,
        /// The failure.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps this error with the 1-based position of the batch item that produced it.
    pub fn at_item(self, index: usize) -> Self {
        Self::Item {
            index,
            source: Box::new(self),
        }
    }

    /// Attaches a human-readable description to backend HTTP errors.
    ///
    /// Every other variant is returned unchanged.
    pub fn describe(self, description: impl Into<String>) -> Self {
        match self {
            Self::Api(api) => Self::Api(api.with_description(description)),
            other => other,
        }
    }

    /// Returns the HTTP status code if this is (or wraps) a backend HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(api) => api.status_code(),
            Self::Item { source, .. } => source.status_code(),
            _ => None,
        }
    }

    /// Returns `true` if this error was raised before any network call was made.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Item { source, .. } => source.is_validation(),
            _ => false,
        }
    }
}
