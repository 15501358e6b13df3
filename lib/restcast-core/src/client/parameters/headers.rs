use http::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;
use serde::Serialize;

use super::param::ParamValue;
use crate::client::error::RestClientError;

/// HTTP headers of a call, also used for the client default headers.
///
/// ```rust
/// use restcast_core::CallHeaders;
///
/// let headers = CallHeaders::new()
///     .add_header("X-Request-ID", "abc-123-def")
///     .add_header("X-Retry-Count", 3);
/// assert_eq!(headers.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallHeaders {
    headers: IndexMap<String, ParamValue>,
}

impl CallHeaders {
    /// Creates an empty set of headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header, replacing any previous value with the same name.
    pub fn add_header<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        let name = name.into();
        let value = ParamValue::new(&name, &value);
        self.headers.insert(name, value);
        self
    }

    /// Merges `other` into these headers, `other` wins on collision.
    pub fn merge(mut self, other: Self) -> Self {
        self.headers.extend(other.headers);
        self
    }

    /// Returns `true` if there is no header.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Returns the number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Inserts the headers into `target`, replacing existing values with the same name.
    pub(in crate::client) fn apply(&self, target: &mut HeaderMap) -> Result<(), RestClientError> {
        for (name, value) in &self.headers {
            let value = value.to_string_value()?;
            target.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(&value)?,
            );
        }
        Ok(())
    }
}
