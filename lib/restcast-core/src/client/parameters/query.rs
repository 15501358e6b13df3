use indexmap::IndexMap;
use serde::Serialize;

use super::param::{ParamValue, scalar_to_string};
use crate::client::error::RestClientError;

/// Query string parameters of a call.
///
/// Arrays use the form style and repeat the parameter name: `?tags=rust&tags=web`.
///
/// ```rust
/// use restcast_core::CallQuery;
///
/// let query = CallQuery::new()
///     .add_param("page", 1)
///     .add_param("tags", vec!["rust", "web"]);
/// assert_eq!(query.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallQuery {
    params: IndexMap<String, ParamValue>,
}

impl CallQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, replacing any previous value with the same name.
    pub fn add_param<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        let name = name.into();
        let value = ParamValue::new(&name, &value);
        self.params.insert(name, value);
        self
    }

    /// Merges `other` into this query, `other` wins on collision.
    pub fn merge(mut self, other: Self) -> Self {
        self.params.extend(other.params);
        self
    }

    /// Returns `true` if there is no parameter.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Flattens the parameters into `(name, value)` pairs, arrays repeat the name.
    pub(in crate::client) fn to_pairs(&self) -> Result<Vec<(&str, String)>, RestClientError> {
        let mut pairs = Vec::new();
        for (name, value) in &self.params {
            match value.as_json()? {
                serde_json::Value::Array(items) => {
                    for item in items {
                        pairs.push((name.as_str(), scalar_to_string(item)?));
                    }
                }
                scalar => pairs.push((name.as_str(), scalar_to_string(scalar)?)),
            }
        }

        Ok(pairs)
    }

    pub(in crate::client) fn to_query_string(&self) -> Result<String, RestClientError> {
        let pairs = self.to_pairs()?;
        serde_urlencoded::to_string(&pairs).map_err(|err| RestClientError::SerializationError {
            message: format!("Failed to serialize query parameters: {err}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query() {
        let query = CallQuery::new();

        assert!(query.is_empty());
        assert_eq!(query.to_query_string().expect("valid"), "");
    }

    #[test]
    fn test_scalar_and_array_params() {
        let query = CallQuery::new()
            .add_param("customerid", 0)
            .add_param("tags", vec!["rust", "web api"])
            .add_param("active", true);

        insta::assert_snapshot!(
            query.to_query_string().expect("valid"),
            @"customerid=0&tags=rust&tags=web+api&active=true"
        );
    }

    #[test]
    fn test_merge_overrides() {
        let query = CallQuery::new()
            .add_param("page", 1)
            .merge(CallQuery::new().add_param("page", 2).add_param("size", 10));

        assert_eq!(query.len(), 2);
        assert_eq!(query.to_query_string().expect("valid"), "page=2&size=10");
    }

    #[test]
    fn test_object_params_are_rejected() {
        let query = CallQuery::new().add_param("filter", serde_json::json!({"a": 1}));

        assert!(query.to_query_string().is_err());
    }
}
