//! Authentication error types

/// Errors raised by a [`TokenProvider`](crate::auth::TokenProvider).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The access token expired and no fresh one could be obtained.
    #[error("Token expired: {message}")]
    TokenExpired { message: String },

    /// The provider has no token to hand out.
    #[error("No access token available")]
    MissingToken,

    /// Provider-specific failure.
    #[error("Token provider error: {0}")]
    Provider(String),
}
