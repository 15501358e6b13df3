use std::any::{Any, type_name};

use headers::ContentType;
use serde::Serialize;
use serde::de::{DeserializeOwned, Error as _};

use super::error::RestClientError;
use super::metadata::ResponseType;
use super::transport::Envelope;

pub(in crate::client) const BODY_MAX_LENGTH: usize = 1024;

/// Encoding of the request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestFormat {
    /// `application/json`
    #[default]
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
}

/// Serializes payloads into request bodies and deserializes response bodies.
///
/// When a root element is configured, the response document must be an object and only
/// that member is deserialized.
#[derive(Debug, Clone, Default)]
pub struct BodyCodec {
    format: RequestFormat,
    root_element: Option<String>,
}

impl BodyCodec {
    /// Creates a codec using `format` for request bodies.
    pub fn new(format: RequestFormat) -> Self {
        Self {
            format,
            root_element: None,
        }
    }

    /// Deserializes only the `root_element` member of response documents.
    pub fn with_root_element(mut self, root_element: impl Into<String>) -> Self {
        self.root_element = Some(root_element.into());
        self
    }

    /// The request body format.
    pub fn format(&self) -> RequestFormat {
        self.format
    }

    /// The configured root element, if any.
    pub fn root_element(&self) -> Option<&str> {
        self.root_element.as_deref()
    }

    /// Serializes `payload`, `None` when it has no content (serializes to `null`).
    ///
    /// # Errors
    ///
    /// Returns [`RestClientError::SerializationError`] if the payload cannot be represented in
    /// the configured format.
    pub fn encode<P>(&self, payload: &P) -> Result<Option<(ContentType, Vec<u8>)>, RestClientError>
    where
        P: Serialize + ?Sized,
    {
        let value = serde_json::to_value(payload).map_err(|err| serialization_error::<P>(&err))?;
        if value.is_null() {
            return Ok(None);
        }

        let encoded = match self.format {
            RequestFormat::Json => {
                let data =
                    serde_json::to_vec(payload).map_err(|err| serialization_error::<P>(&err))?;
                (ContentType::json(), data)
            }
            RequestFormat::Form => {
                let data = serde_urlencoded::to_string(payload)
                    .map_err(|err| serialization_error::<P>(&err))?;
                (ContentType::form_url_encoded(), data.into_bytes())
            }
        };
        Ok(Some(encoded))
    }

    /// Deserializes the envelope body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`RestClientError::DeserializationFailure`] with the path of the failing field.
    pub fn decode<T>(&self, envelope: &Envelope) -> Result<T, RestClientError>
    where
        T: DeserializeOwned,
    {
        let name = type_name::<T>();
        let document = self.document(name, envelope)?;
        serde_path_to_error::deserialize(document).map_err(|err| {
            deserialization_failure(name, err.path().to_string(), err.into_inner(), envelope)
        })
    }

    /// Deserializes the envelope body into the type described by `response_type`.
    ///
    /// # Errors
    ///
    /// Returns [`RestClientError::DeserializationFailure`] with the path of the failing field.
    pub fn decode_as(
        &self,
        response_type: &ResponseType,
        envelope: &Envelope,
    ) -> Result<Box<dyn Any + Send>, RestClientError> {
        let name = response_type.type_name();
        let document = self.document(name, envelope)?;
        (response_type.decoder())(document).map_err(|err| {
            deserialization_failure(name, err.path().to_string(), err.into_inner(), envelope)
        })
    }

    fn document(
        &self,
        name: &'static str,
        envelope: &Envelope,
    ) -> Result<serde_json::Value, RestClientError> {
        if envelope.body().iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }

        let document: serde_json::Value = serde_json::from_slice(envelope.body())
            .map_err(|err| deserialization_failure(name, ".".to_string(), err, envelope))?;

        let Some(root) = &self.root_element else {
            return Ok(document);
        };
        match document {
            serde_json::Value::Object(mut members) => members.remove(root).ok_or_else(|| {
                let error = serde_json::Error::custom(format!("missing root element `{root}`"));
                deserialization_failure(name, ".".to_string(), error, envelope)
            }),
            _ => {
                let error = serde_json::Error::custom(format!(
                    "expected an object with a `{root}` member"
                ));
                Err(deserialization_failure(name, ".".to_string(), error, envelope))
            }
        }
    }
}

fn serialization_error<P: ?Sized>(err: &dyn std::fmt::Display) -> RestClientError {
    RestClientError::SerializationError {
        message: format!("cannot serialize {}: {err}", type_name::<P>()),
    }
}

fn deserialization_failure(
    type_name: &'static str,
    path: String,
    error: serde_json::Error,
    envelope: &Envelope,
) -> RestClientError {
    let mut body = envelope.text();
    if body.len() > BODY_MAX_LENGTH {
        let mut end = BODY_MAX_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("... (truncated)");
    }

    RestClientError::DeserializationFailure {
        type_name,
        path,
        error,
        body,
        status: envelope.status(),
        envelope: envelope.clone(),
    }
}
