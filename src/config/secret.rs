//! Credential handling
//!
//! Connection strings, SAS tokens and API keys are held in
//! [`SecretString`], which zeroes its memory on drop, redacts `Debug`
//! output and has to be exposed explicitly with `expose_secret()`.
//!
//! ```rust
//! use release_publisher::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("topic-key".to_string());
//! assert_eq!(key.expose_secret(), "topic-key");
//! assert!(!format!("{key:?}").contains("topic-key"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String payload of a [`SecretString`]
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Whether the secret is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the secret starts with a prefix
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Parse the secret into another type
    pub fn parse<F: std::str::FromStr>(&self) -> Result<F, F::Err> {
        self.0.parse()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A string credential that zeroes itself on drop
pub type SecretString = Secret<SecretValue>;

/// Wrap a string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("sas-token".to_string());
        assert_eq!(secret.expose_secret(), "sas-token");
        assert!(secret.expose_secret().starts_with("sas"));
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        assert!(!format!("{secret:?}").contains("sensitive-data"));
        assert!(!format!("{:?}", secret.expose_secret()).contains("sensitive-data"));
    }

    #[test]
    fn test_secret_serde() {
        #[derive(Serialize, Deserialize)]
        struct Credentials {
            api_key: SecretString,
        }

        let parsed: Credentials = toml::from_str("api_key = \"abc123\"").unwrap();
        assert_eq!(parsed.api_key.expose_secret(), "abc123");

        let json = serde_json::to_string(&parsed).unwrap();
        assert!(json.contains("abc123"));
    }
}
