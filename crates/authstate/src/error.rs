//! Auth state error types.

/// Auth state error.
#[derive(Debug, thiserror::Error)]
pub enum AuthStateError {
    /// Invalid construction input (connection parameters, identity, capabilities).
    #[error("configuration error: {0}")]
    Config(String),

    /// Backend error (database, pool, network).
    #[error("backend error: {0}")]
    Backend(String),

    /// A value could not be encoded for storage or decoded after a read.
    #[error("codec error: {0}")]
    Codec(String),
}

impl AuthStateError {
    /// Create a backend error from any error type.
    #[inline]
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    /// Create a configuration error.
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a codec error from any error type.
    #[inline]
    pub fn codec<E: std::fmt::Display>(err: E) -> Self {
        Self::Codec(err.to_string())
    }
}

#[cfg(feature = "sql")]
impl From<sqlx::Error> for AuthStateError {
    fn from(err: sqlx::Error) -> Self {
        Self::backend(err)
    }
}
