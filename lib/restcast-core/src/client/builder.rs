use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, HeaderValue};
use serde::Serialize;

use super::call::CallTracker;
use super::codec::{BodyCodec, RequestFormat};
use super::metadata::parse_base_url;
use super::settings::{ClientSettings, DEFAULT_TIMEOUT, UserState};
use super::{
    CallHeaders, CallObserver, ClientInner, Credentials, MetadataRegistry, ReqwestTransport,
    RestClient, RestClientError, Transport,
};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1/";

/// Builder for [`RestClient`] instances.
///
/// # Default Configuration
///
/// - **Base URL**: `http://127.0.0.1/`
/// - **Timeout**: 30 seconds
/// - **User agent**: `restcast/<version>`
/// - **Request format**: JSON
/// - **Transport**: [`ReqwestTransport`] with a default `reqwest::Client`
/// - **Registry**: a new, empty [`MetadataRegistry`]
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
///
/// use restcast_core::{Credentials, RequestFormat, RestClient};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RestClient::builder()
///     .with_base_url("https://api.example.com/v1")
///     .with_timeout(Duration::from_secs(5))
///     .with_credentials(Credentials::Bearer("my-token".into()))
///     .with_default_header("Accept-Language", "en")
///     .with_request_format(RequestFormat::Form)
///     .with_root_element("data")
///     .build()?;
/// assert_eq!(client.base_url().as_str(), "https://api.example.com/v1");
/// # Ok(())
/// # }
/// ```
#[derive(derive_more::Debug)]
pub struct RestClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: CallHeaders,
    credentials: Option<Credentials>,
    format: RequestFormat,
    root_element: Option<String>,
    date_format: Option<String>,
    #[debug(ignore)]
    user_state: Option<UserState>,
    transport: Option<Arc<dyn Transport>>,
    registry: Option<MetadataRegistry>,
    observers: Vec<Arc<dyn CallObserver>>,
}

impl RestClientBuilder {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Fails if the base URL is not absolute, or if the user agent, the default headers or
    /// the credentials cannot be used as HTTP headers.
    pub fn build(self) -> Result<RestClient, RestClientError> {
        let Self {
            base_url,
            timeout,
            user_agent,
            default_headers,
            credentials,
            format,
            root_element,
            date_format,
            user_state,
            transport,
            registry,
            observers,
        } = self;

        let mut settings = ClientSettings::new(parse_base_url(&base_url)?);
        settings.timeout = timeout;
        if let Some(user_agent) = user_agent {
            settings.user_agent = HeaderValue::from_str(&user_agent)?;
        }

        // rejected now rather than on the first call
        default_headers.apply(&mut HeaderMap::new())?;
        if let Some(credentials) = &credentials {
            credentials.to_header()?;
        }
        settings.default_headers = default_headers;
        settings.credentials = credentials;

        let codec = BodyCodec::new(format);
        settings.codec = match root_element {
            Some(root_element) => codec.with_root_element(root_element),
            None => codec,
        };
        settings.date_format = date_format;
        settings.user_state = user_state;

        let transport = transport.unwrap_or_else(|| Arc::new(ReqwestTransport::default()));

        Ok(RestClient {
            inner: Arc::new(ClientInner {
                settings,
                transport,
                registry: registry.unwrap_or_default(),
                observers,
                tracker: CallTracker::new(),
            }),
        })
    }

    /// Sets the base URL every resource is resolved against.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the client-wide timeout of a call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Adds headers sent with every call.
    pub fn with_default_headers(mut self, headers: CallHeaders) -> Self {
        self.default_headers = self.default_headers.merge(headers);
        self
    }

    /// Adds a header sent with every call.
    pub fn with_default_header<T: Serialize>(self, name: impl Into<String>, value: T) -> Self {
        self.with_default_headers(CallHeaders::new().add_header(name, value))
    }

    /// Sets the credentials sent with every call.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the request body format.
    pub fn with_request_format(mut self, format: RequestFormat) -> Self {
        self.format = format;
        self
    }

    /// Deserializes only the `root_element` member of response documents.
    pub fn with_root_element(mut self, root_element: impl Into<String>) -> Self {
        self.root_element = Some(root_element.into());
        self
    }

    /// Sets the date format handed to transports and observers.
    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = Some(date_format.into());
        self
    }

    /// Sets the user state token handed to transports and observers.
    pub fn with_user_state<S: Any + Send + Sync>(mut self, user_state: S) -> Self {
        self.user_state = Some(Arc::new(user_state));
        self
    }

    /// Uses `transport` to execute requests.
    pub fn with_transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Uses a configured reqwest client (proxies, TLS identities...) to execute requests.
    pub fn with_reqwest_client(self, client: reqwest::Client) -> Self {
        self.with_transport(ReqwestTransport::new(client))
    }

    /// Shares `registry` with this client.
    pub fn with_registry(mut self, registry: MetadataRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Adds an observer notified around every exchange.
    pub fn add_observer(mut self, observer: impl CallObserver) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Adds a shared observer.
    pub fn add_shared_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.observers.push(observer);
        self
    }
}

impl Default for RestClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            default_headers: CallHeaders::default(),
            credentials: None,
            format: RequestFormat::default(),
            root_element: None,
            date_format: None,
            user_state: None,
            transport: None,
            registry: None,
            observers: Vec::new(),
        }
    }
}
