use std::fmt;
use std::future::Future;
use std::pin::Pin;

use headers::{ContentType, HeaderMapExt};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use reqwest::{Body, Request, Response};
use tracing::{debug, warn};

use super::descriptor::RequestDescriptor;

/// Errors raised by a [`Transport`] when it cannot produce an [`Envelope`].
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TransportError {
    /// HTTP client error from the underlying reqwest library.
    Reqwest(reqwest::Error),

    /// Failure reported by a custom transport.
    #[display("Transport failure: {message}")]
    #[from(skip)]
    Failure {
        /// Description of the failure.
        message: String,
    },

    /// The transport gave up waiting for the server.
    #[display("Transport timed out")]
    #[from(skip)]
    TimedOut,
}

impl TransportError {
    /// Creates a failure with a free-form message, for custom transports.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Returns `true` when the failure is a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Reqwest(err) => err.is_timeout(),
            Self::TimedOut => true,
            Self::Failure { .. } => false,
        }
    }
}

/// The result of one HTTP exchange: status, content type, headers and raw body.
///
/// Produced by a [`Transport`], consumed once by the response resolution, and attached to
/// resolution errors for diagnostics.
#[derive(Clone, derive_more::Debug)]
pub struct Envelope {
    status: StatusCode,
    content_type: Option<ContentType>,
    headers: HeaderMap,
    #[debug("{}", String::from_utf8_lossy(body))]
    body: Vec<u8>,
}

impl Envelope {
    /// Creates an envelope without content type.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Creates an envelope with an `application/json` body.
    pub fn json(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, body).with_content_type(ContentType::json())
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.headers.typed_insert(content_type.clone());
        self.content_type = Some(content_type);
        self
    }

    /// Adds a response header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the content type, if present.
    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns `true` if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Boxed future returned by [`Transport::execute`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<Envelope, TransportError>> + Send + 'a>>;

/// Executes request descriptors.
///
/// The client only needs a status code, headers and a raw body back; connection handling,
/// TLS and redirects belong to the implementation. [`ReqwestTransport`] is the default.
pub trait Transport: fmt::Debug + Send + Sync + 'static {
    /// Executes the request and returns the response envelope.
    fn execute(&self, request: RequestDescriptor) -> TransportFuture<'_>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps a configured reqwest client (proxies, TLS identities, connection pool...).
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn to_request(descriptor: RequestDescriptor) -> Request {
        let timeout = descriptor.timeout();
        let (method, url, headers, body) = descriptor.into_parts();

        let mut request = Request::new(method, url);
        *request.headers_mut() = headers;
        *request.timeout_mut() = Some(timeout);
        if let Some(body) = body {
            *request.body_mut() = Some(Body::from(body));
        }
        request
    }

    async fn to_envelope(response: Response) -> Result<Envelope, TransportError> {
        let status = response.status();
        let headers = response.headers().clone();
        let content_type = parse_content_type(&headers);
        let body = response.bytes().await?.to_vec();

        Ok(Envelope {
            status,
            content_type,
            headers,
            body,
        })
    }
}

/// Reads the `Content-Type` of a response, a malformed value stays only in the raw headers.
fn parse_content_type(headers: &HeaderMap) -> Option<ContentType> {
    headers
        .typed_try_get::<ContentType>()
        .unwrap_or_else(|error| {
            warn!(%error, raw = ?headers.get(CONTENT_TYPE), "ignoring malformed content type");
            None
        })
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: RequestDescriptor) -> TransportFuture<'_> {
        Box::pin(async move {
            let request = Self::to_request(request);
            debug!(?request, "sending...");
            let response = self.client.execute(request).await?;
            debug!(?response, "...receiving");
            Self::to_envelope(response).await
        })
    }
}
