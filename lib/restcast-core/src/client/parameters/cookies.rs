use indexmap::IndexMap;
use serde::Serialize;

use super::param::ParamValue;
use crate::client::error::RestClientError;

/// Cookies of a call, sent as a single `Cookie` header.
///
/// ```rust
/// use restcast_core::CallCookies;
///
/// let cookies = CallCookies::new()
///     .add_cookie("session_id", "abc123")
///     .add_cookie("user_id", 12345);
/// assert_eq!(cookies.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallCookies {
    cookies: IndexMap<String, ParamValue>,
}

impl CallCookies {
    /// Creates an empty set of cookies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cookie, replacing any previous value with the same name.
    pub fn add_cookie<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        let name = name.into();
        let value = ParamValue::new(&name, &value);
        self.cookies.insert(name, value);
        self
    }

    /// Merges `other` into these cookies, `other` wins on collision.
    pub fn merge(mut self, other: Self) -> Self {
        self.cookies.extend(other.cookies);
        self
    }

    /// Returns `true` if there is no cookie.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Returns the number of cookies.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Formats the cookies as a `Cookie` header value: `name1=value1; name2=value2`.
    pub(in crate::client) fn to_cookie_header(&self) -> Result<String, RestClientError> {
        let parts = self
            .cookies
            .iter()
            .map(|(name, value)| Ok(format!("{name}={}", value.to_string_value()?)))
            .collect::<Result<Vec<_>, RestClientError>>()?;

        Ok(parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_empty_cookies() {
        let cookies = CallCookies::new();

        assert!(cookies.is_empty());
        assert_eq!(cookies.to_cookie_header().expect("valid"), "");
    }

    #[test]
    fn test_cookie_header_keeps_insertion_order() {
        let cookies = CallCookies::new()
            .add_cookie("session_id", "abc123")
            .add_cookie("user_id", 456)
            .add_cookie("is_admin", true);

        insta::assert_snapshot!(
            cookies.to_cookie_header().expect("valid"),
            @"session_id=abc123; user_id=456; is_admin=true"
        );
    }

    #[test]
    fn test_cookie_merge() {
        let cookies = CallCookies::new()
            .add_cookie("session_id", "abc123")
            .add_cookie("user_id", 456)
            .merge(
                CallCookies::new()
                    .add_cookie("theme", "dark")
                    .add_cookie("user_id", 789),
            );

        assert_eq!(cookies.len(), 3);
        assert_eq!(
            cookies.to_cookie_header().expect("valid"),
            "session_id=abc123; user_id=789; theme=dark"
        );
    }
}
