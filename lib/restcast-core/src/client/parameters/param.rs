use serde::Serialize;
use tracing::warn;

use crate::client::error::RestClientError;

/// A serialized parameter value (cookie, header or query parameter).
///
/// A value that cannot be serialized keeps the failure, reported when the request is built.
#[derive(Debug, Clone, PartialEq)]
pub(in crate::client) struct ParamValue(Result<serde_json::Value, String>);

impl ParamValue {
    pub(in crate::client) fn new<T>(name: &str, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).map_err(|error| {
            warn!(%name, %error, "parameter value cannot be serialized");
            format!("Failed to serialize parameter `{name}`: {error}")
        });
        Self(value)
    }

    pub(in crate::client) fn as_json(&self) -> Result<&serde_json::Value, RestClientError> {
        self.0
            .as_ref()
            .map_err(|message| RestClientError::SerializationError {
                message: message.clone(),
            })
    }

    /// Renders the value as a single string, arrays are joined with `,`.
    pub(in crate::client) fn to_string_value(&self) -> Result<String, RestClientError> {
        match self.as_json()? {
            serde_json::Value::Array(items) => {
                let items = items
                    .iter()
                    .map(scalar_to_string)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(items.join(","))
            }
            value => scalar_to_string(value),
        }
    }
}

pub(in crate::client) fn scalar_to_string(
    value: &serde_json::Value,
) -> Result<String, RestClientError> {
    match value {
        serde_json::Value::String(text) => Ok(text.clone()),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        serde_json::Value::Bool(flag) => Ok(flag.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err(RestClientError::UnsupportedParameterValue {
                message: "nested complex values not supported in parameters".to_string(),
                value: value.clone(),
            })
        }
    }
}
