//! Per request shape routing and response typing.

use std::any::{Any, TypeId, type_name};
use std::time::Duration;

use http::{Method, StatusCode};
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::RestClientError;
use super::parameters::UrlSegments;

mod registry;
pub use self::registry::MetadataRegistry;

pub(in crate::client) type DecodeFn =
    fn(serde_json::Value) -> Result<Box<dyn Any + Send>, serde_path_to_error::Error<serde_json::Error>>;

fn decode_into<T>(
    document: serde_json::Value,
) -> Result<Box<dyn Any + Send>, serde_path_to_error::Error<serde_json::Error>>
where
    T: DeserializeOwned + Send + 'static,
{
    let value: T = serde_path_to_error::deserialize(document)?;
    Ok(Box::new(value))
}

/// Describes a type a response body can be deserialized into.
///
/// Two descriptors are equal when they describe the same Rust type.
#[derive(Clone, Copy, derive_more::Debug)]
#[debug("ResponseType({type_name})")]
pub struct ResponseType {
    type_id: TypeId,
    type_name: &'static str,
    decode: DecodeFn,
}

impl ResponseType {
    /// Describes `T`.
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            decode: decode_into::<T>,
        }
    }

    /// Returns the Rust name of the described type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if this describes `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub(in crate::client) fn decoder(&self) -> DecodeFn {
        self.decode
    }
}

impl PartialEq for ResponseType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ResponseType {}

/// Routing and response typing of one request shape.
///
/// Built once per shape, then shared read-only for the process lifetime.
///
/// ```rust
/// use http::StatusCode;
/// use restcast_core::RequestMetadata;
/// # #[derive(serde::Deserialize)] struct LoginOk { token: String }
/// # #[derive(serde::Deserialize)] struct LoginConflict { code: u32 }
///
/// let metadata = RequestMetadata::post("/users/login")
///     .on_status::<LoginOk>(StatusCode::OK)
///     .on_status::<LoginConflict>(StatusCode::CONFLICT);
/// assert!(metadata.default_response().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMetadata {
    resource: String,
    method: Method,
    base_url: Option<Url>,
    default_response: Option<ResponseType>,
    status_responses: IndexMap<StatusCode, ResponseType>,
    timeout: Option<Duration>,
}

// Create
impl RequestMetadata {
    /// Declares a request on `resource` with `method`.
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            method,
            base_url: None,
            default_response: None,
            status_responses: IndexMap::new(),
            timeout: None,
        }
    }

    /// Declares a `GET` request.
    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(Method::GET, resource)
    }

    /// Declares a `POST` request.
    pub fn post(resource: impl Into<String>) -> Self {
        Self::new(Method::POST, resource)
    }

    /// Declares a `PUT` request.
    pub fn put(resource: impl Into<String>) -> Self {
        Self::new(Method::PUT, resource)
    }

    /// Declares a `PATCH` request.
    pub fn patch(resource: impl Into<String>) -> Self {
        Self::new(Method::PATCH, resource)
    }

    /// Declares a `DELETE` request.
    pub fn delete(resource: impl Into<String>) -> Self {
        Self::new(Method::DELETE, resource)
    }

    /// Sends this request to `base_url` instead of the client base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RestClientError::InvalidBaseUrl`] if `base_url` is not an absolute URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, RestClientError> {
        self.base_url = Some(parse_base_url(base_url)?);
        Ok(self)
    }

    /// Deserializes into `T` when no status-specific type is declared.
    pub fn with_default_response<T>(mut self) -> Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.default_response = Some(ResponseType::of::<T>());
        self
    }

    /// Deserializes into `T` when the server answers with `status`.
    ///
    /// A second declaration for the same status replaces the first one.
    pub fn on_status<T>(mut self, status: StatusCode) -> Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.status_responses
            .insert(status, ResponseType::of::<T>());
        self
    }

    /// Bounds this request by `timeout` instead of the client-wide timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// Access
impl RequestMetadata {
    /// The resource template.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The base URL override, if any.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// The default response type, if any.
    pub fn default_response(&self) -> Option<&ResponseType> {
        self.default_response.as_ref()
    }

    /// The response type declared for `status`, if any.
    pub fn status_response(&self, status: StatusCode) -> Option<&ResponseType> {
        self.status_responses.get(&status)
    }

    /// The declared status codes, in declaration order.
    pub fn declared_statuses(&self) -> impl Iterator<Item = StatusCode> + '_ {
        self.status_responses.keys().copied()
    }

    /// The timeout override, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

pub(in crate::client) fn parse_base_url(base_url: &str) -> Result<Url, RestClientError> {
    let url = Url::parse(base_url).map_err(|err| RestClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(RestClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: "not a base URL".to_string(),
        });
    }
    Ok(url)
}

/// A request shape that can be dispatched by the [`RestClient`](super::RestClient).
///
/// The payload is serialized as the request body. Fields that only feed URL segments
/// should be skipped with `#[serde(skip_serializing)]`.
///
/// ```rust
/// use restcast_core::{RequestMetadata, RestRequest, UrlSegments};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize)]
/// struct Post { id: u32, title: String }
///
/// #[derive(Serialize)]
/// struct GetPost {
///     #[serde(skip_serializing)]
///     post_id: String,
/// }
///
/// impl RestRequest for GetPost {
///     fn describe() -> Option<RequestMetadata> {
///         Some(RequestMetadata::get("posts/{postId}").with_default_response::<Post>())
///     }
///
///     fn url_segments(&self) -> UrlSegments {
///         UrlSegments::new().add_segment("postId", &self.post_id)
///     }
/// }
/// ```
pub trait RestRequest: Serialize + Send + Sync + 'static {
    /// Declares the metadata of this shape, `None` when it comes from a registry.
    fn describe() -> Option<RequestMetadata> {
        None
    }

    /// URL segment bindings carried by the payload.
    fn url_segments(&self) -> UrlSegments {
        UrlSegments::default()
    }
}
