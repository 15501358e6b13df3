use std::time::Duration;

use http::StatusCode;

use super::auth::AuthenticationError;
use super::transport::{Envelope, TransportError};

/// Errors that can occur when dispatching a request through the [`RestClient`](super::RestClient).
///
/// Every failure of a call ends in exactly one of these variants. Variants raised after the
/// transport answered carry the raw [`Envelope`] so the mismatch can be diagnosed.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum RestClientError {
    /// The request shape has no declared routing or response metadata.
    ///
    /// Neither [`RestRequest::describe`](super::RestRequest::describe) nor the
    /// [`MetadataRegistry`](super::MetadataRegistry) provided a record for the type.
    #[display("No request metadata declared for {type_name}")]
    #[from(skip)]
    MissingConfiguration {
        /// Name of the request type.
        type_name: &'static str,
    },

    /// The typed call asked for a type that conflicts with the declared default response type.
    ///
    /// Only raised when no status-specific mapping matched and resolution fell back to the
    /// default response type.
    #[display(
        "Requested type {requested} is not compatible with the declared response type {declared} (status {status})"
    )]
    #[from(skip)]
    IncompatibleResponseType {
        /// The type requested by the caller.
        requested: &'static str,
        /// The declared default response type.
        declared: &'static str,
        /// The returned status code.
        status: StatusCode,
        /// JSON snapshot of the original payload.
        payload: serde_json::Value,
        /// The raw response.
        envelope: Envelope,
    },

    /// Neither a status-specific mapping nor a default type exists for the returned status.
    #[display("No response type declared for status {status}")]
    #[from(skip)]
    NoMatchingResponseType {
        /// The returned status code.
        status: StatusCode,
        /// The raw response.
        envelope: Envelope,
    },

    /// The transport did not answer within the effective timeout.
    #[display("Request timed out after {timeout:?}")]
    #[from(skip)]
    Timeout {
        /// The effective timeout of the call.
        timeout: Duration,
    },

    /// Lower-level transport failure (connection refused, TLS, DNS, ...).
    TransportFault(TransportError),

    /// The response body could not be parsed into the resolved target type.
    #[display("Failed to deserialize {type_name} at '{path}': {error}\n{body}")]
    #[from(skip)]
    DeserializationFailure {
        /// The target type.
        type_name: &'static str,
        /// Location of the failure inside the document.
        path: String,
        /// The underlying JSON error.
        error: serde_json::Error,
        /// The response body that failed to parse (possibly truncated).
        body: String,
        /// The response status code.
        status: StatusCode,
        /// The raw response.
        envelope: Envelope,
    },

    /// The resource template contains placeholders without a segment binding.
    #[display("Resource '{path}' is missing required segments: {missings:?}")]
    #[from(skip)]
    PathUnresolved {
        /// The partially resolved resource path.
        path: String,
        /// Names of the unbound placeholders.
        missings: Vec<String>,
    },

    /// The base URL (client-wide or per request) is not a valid absolute URL.
    #[display("Invalid base URL '{url}': {reason}")]
    #[from(skip)]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// URL parsing error when joining the base URL and the resolved path.
    UrlError(url::ParseError),

    /// Invalid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// The credentials could not be turned into a header.
    Authentication(AuthenticationError),

    /// The payload could not be serialized into the request body.
    #[display("Serialization error: {message}")]
    #[from(skip)]
    SerializationError {
        /// Description of the serialization failure.
        message: String,
    },

    /// A cookie, header or query value cannot be rendered as a string.
    #[display("Unsupported parameter value: {message}. Got: {value}")]
    #[from(skip)]
    UnsupportedParameterValue {
        /// Description of the conversion failure.
        message: String,
        /// The rejected value.
        value: serde_json::Value,
    },

    /// A spawned call did not run to completion (the task panicked or was aborted).
    #[display("Call task failed: {message}")]
    #[from(skip)]
    TaskFailed {
        /// Description of the task failure.
        message: String,
    },
}

impl RestClientError {
    /// Returns the raw response attached to this error, if the transport answered.
    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            Self::IncompatibleResponseType { envelope, .. }
            | Self::NoMatchingResponseType { envelope, .. }
            | Self::DeserializationFailure { envelope, .. } => Some(envelope),
            _ => None,
        }
    }

    /// Returns `true` for errors caused by the request declaration rather than by the exchange.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingConfiguration { .. }
                | Self::PathUnresolved { .. }
                | Self::InvalidBaseUrl { .. }
        )
    }
}
