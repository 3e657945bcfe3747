//! Read result types.

use crate::error::AuthStateError;

/// Outcome of a single-key read.
///
/// Distinguishes a key that is absent from a read that failed. Callers that
/// only care about presence use [`Lookup::found`], which degrades failures to
/// `None`.
#[derive(Debug)]
pub enum Lookup<V> {
    /// The key exists; decoded value.
    Found(V),
    /// The key is not stored for this identity.
    NotFound,
    /// The backend read or the decode failed.
    Failed(AuthStateError),
}

impl<V> Lookup<V> {
    /// Whether a value was found.
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Whether the key was confirmed absent.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Whether the read failed.
    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The value if found; absent and failed reads both yield `None`.
    #[inline]
    pub fn found(self) -> Option<V> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound | Self::Failed(_) => None,
        }
    }

    /// Convert to a `Result`, keeping failures as errors.
    pub fn into_result(self) -> Result<Option<V>, AuthStateError> {
        match self {
            Self::Found(value) => Ok(Some(value)),
            Self::NotFound => Ok(None),
            Self::Failed(err) => Err(err),
        }
    }

    /// Map the found value.
    pub fn map<U, F: FnOnce(V) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
            Self::Failed(err) => Lookup::Failed(err),
        }
    }
}

impl<V> From<Option<V>> for Lookup<V> {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}
