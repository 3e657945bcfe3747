//! Identity (phone number) that scopes every stored key.

use std::fmt;
use std::str::FromStr;

use crate::error::AuthStateError;

/// Separator between the identity and the key name in cache keys.
pub const CACHE_KEY_SEPARATOR: char = ':';

/// A validated phone-number identity.
///
/// The durable schema stores identities as a 64-bit integer, so the textual
/// form is canonicalised to the integer's decimal representation. `"0123"`
/// and `"123"` therefore name the same identity both in the database and in
/// the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    canonical: String,
    number: i64,
}

impl Identity {
    /// Parse an identity from its textual form.
    ///
    /// Only ASCII digits are accepted and the value must fit in an `i64`.
    pub fn parse(raw: &str) -> Result<Self, AuthStateError> {
        if raw.is_empty() {
            return Err(AuthStateError::config("identity must not be empty"));
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuthStateError::config(format!(
                "identity must be numeric, got {raw:?}"
            )));
        }

        let number: i64 = raw
            .parse()
            .map_err(|_| AuthStateError::config(format!("identity {raw:?} is out of range")))?;

        Ok(Self {
            canonical: number.to_string(),
            number,
        })
    }

    /// Canonical decimal form.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Integer form, as stored in the identity column.
    #[inline]
    pub fn number(&self) -> i64 {
        self.number
    }

    /// Cache key prefix owned by this identity, including the separator.
    pub fn cache_prefix(&self) -> String {
        format!("{}{}", self.canonical, CACHE_KEY_SEPARATOR)
    }

    /// Composite cache key for `key_name`.
    pub fn cache_key(&self, key_name: &str) -> String {
        format!("{}{}{}", self.canonical, CACHE_KEY_SEPARATOR, key_name)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Identity {
    type Err = AuthStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_identity() {
        let id = Identity::parse("5511999999999").unwrap();
        assert_eq!(id.number(), 5_511_999_999_999);
        assert_eq!(id.as_str(), "5511999999999");
        assert_eq!(id.cache_key("creds"), "5511999999999:creds");
        assert_eq!(id.cache_prefix(), "5511999999999:");
    }

    #[test]
    fn canonicalises_leading_zeros() {
        let id: Identity = "000123".parse().unwrap();
        assert_eq!(id.as_str(), "123");
        assert_eq!(id, Identity::parse("123").unwrap());
    }

    #[test]
    fn rejects_invalid_identities() {
        for raw in ["", "+123", "12a4", " 123", "99999999999999999999"] {
            assert!(
                matches!(Identity::parse(raw), Err(AuthStateError::Config(_))),
                "{raw:?} should be rejected"
            );
        }
    }
}
