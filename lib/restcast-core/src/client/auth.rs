use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::HeaderValue;
use http::header::{AUTHORIZATION, HeaderName};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors raised while turning [`Credentials`] into a request header.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum AuthenticationError {
    /// Bearer token contains characters not allowed in a header.
    #[display("Bearer token contains invalid characters: {message}")]
    InvalidBearerToken {
        /// Why the value was rejected.
        message: String,
    },

    /// Basic credentials contain characters not allowed in a header.
    #[display("Basic credentials contain invalid characters: {message}")]
    InvalidBasicCredentials {
        /// Why the value was rejected.
        message: String,
    },

    /// API key header name is invalid.
    #[display("Invalid API key header name '{header_name}': {message}")]
    InvalidHeaderName {
        /// The rejected header name.
        header_name: String,
        /// Why it was rejected.
        message: String,
    },

    /// API key value contains characters not allowed in a header.
    #[display("API key contains invalid characters: {message}")]
    InvalidApiKey {
        /// Why the value was rejected.
        message: String,
    },
}

/// A secret string, zeroed on drop and masked in `Debug`/`Display`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Wraps a secret.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Exposes the secret, keep the borrow short.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString([REDACTED])")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = &self.0;
        match (value.get(..4), value.len().checked_sub(4).and_then(|at| value.get(at..))) {
            (Some(head), Some(tail)) if value.len() > 8 => write!(f, "{head}...{tail}"),
            _ => f.write_str("***"),
        }
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Client-wide credentials, sent with every request.
///
/// ```rust
/// use restcast_core::Credentials;
///
/// let bearer = Credentials::Bearer("my-api-token".into());
/// let basic = Credentials::Basic {
///     username: "user".to_string(),
///     password: "pass".into(),
/// };
/// let api_key = Credentials::ApiKey {
///     header_name: "X-API-Key".to_string(),
///     key: "secret-key".into(),
/// };
/// # let _ = (bearer, basic, api_key);
/// ```
#[derive(Clone)]
pub enum Credentials {
    /// `Authorization: Bearer <token>`
    Bearer(SecureString),

    /// `Authorization: Basic <base64(username:password)>`
    Basic {
        /// The user name.
        username: String,
        /// The password.
        password: SecureString,
    },

    /// `<header_name>: <key>`
    ApiKey {
        /// The header carrying the key.
        header_name: String,
        /// The key.
        key: SecureString,
    },
}

impl Credentials {
    /// Renders the credentials as a request header.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthenticationError`] when the values cannot be used in a header.
    pub fn to_header(&self) -> Result<(HeaderName, HeaderValue), AuthenticationError> {
        match self {
            Self::Bearer(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
                    .map_err(|err| AuthenticationError::InvalidBearerToken {
                        message: err.to_string(),
                    })?;
                value.set_sensitive(true);
                Ok((AUTHORIZATION, value))
            }
            Self::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{}", password.expose()));
                let mut value = HeaderValue::from_str(&format!("Basic {encoded}")).map_err(
                    |err| AuthenticationError::InvalidBasicCredentials {
                        message: err.to_string(),
                    },
                )?;
                value.set_sensitive(true);
                Ok((AUTHORIZATION, value))
            }
            Self::ApiKey { header_name, key } => {
                let name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|err| {
                    AuthenticationError::InvalidHeaderName {
                        header_name: header_name.clone(),
                        message: err.to_string(),
                    }
                })?;
                let mut value = HeaderValue::from_str(key.expose()).map_err(|err| {
                    AuthenticationError::InvalidApiKey {
                        message: err.to_string(),
                    }
                })?;
                value.set_sensitive(true);
                Ok((name, value))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(token) => f.debug_tuple("Bearer").field(token).finish(),
            Self::Basic { username, password } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", password)
                .finish(),
            Self::ApiKey { header_name, key } => f
                .debug_struct("ApiKey")
                .field("header_name", header_name)
                .field("key", key)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header() {
        let (name, value) = Credentials::Bearer("token123".into())
            .to_header()
            .expect("valid header");

        assert_eq!(name, AUTHORIZATION);
        assert_eq!(value, "Bearer token123");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_basic_header() {
        let credentials = Credentials::Basic {
            username: "user".to_string(),
            password: "pass".into(),
        };

        let (name, value) = credentials.to_header().expect("valid header");

        assert_eq!(name, AUTHORIZATION);
        assert_eq!(value, "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_api_key_header() {
        let credentials = Credentials::ApiKey {
            header_name: "X-API-Key".to_string(),
            key: "secret-key".into(),
        };

        let (name, value) = credentials.to_header().expect("valid header");

        assert_eq!(name.as_str(), "x-api-key");
        assert_eq!(value, "secret-key");
    }

    #[test]
    fn test_invalid_api_key_header_name() {
        let credentials = Credentials::ApiKey {
            header_name: "X API Key".to_string(),
            key: "secret-key".into(),
        };

        let result = credentials.to_header();

        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidHeaderName { .. })
        ));
    }

    #[test]
    fn test_secrets_are_masked() {
        let credentials = Credentials::Bearer("a-very-long-token".into());

        insta::assert_snapshot!(format!("{credentials:?}"), @"Bearer(SecureString([REDACTED]))");
        insta::assert_snapshot!(SecureString::from("a-very-long-token"), @"a-ve...oken");
        insta::assert_snapshot!(SecureString::from("short"), @"***");
    }
}
