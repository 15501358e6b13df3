use std::time::Duration;

use headers::{ContentType, HeaderMapExt};
use http::header::{COOKIE, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method};
use url::Url;

use super::error::RestClientError;
use super::metadata::{RequestMetadata, RestRequest};
use super::parameters::{CallCookies, CallHeaders, CallQuery, UrlSegments, resolve_resource};
use super::settings::{ClientSettings, UserState};

/// Runtime parameters of one call, on top of the payload.
#[derive(Debug, Clone, Default)]
pub(in crate::client) struct CallContext {
    pub(in crate::client) segments: UrlSegments,
    pub(in crate::client) cookies: CallCookies,
    pub(in crate::client) query: CallQuery,
    pub(in crate::client) headers: CallHeaders,
}

/// A fully resolved HTTP request, ready for a [`Transport`](super::Transport).
///
/// The base URL is the one in effect for this call only: the request override when declared,
/// the client base URL otherwise.
#[derive(Clone, derive_more::Debug)]
pub struct RequestDescriptor {
    method: Method,
    base_url: Url,
    path: String,
    url: Url,
    headers: HeaderMap,
    #[debug(ignore)]
    body: Option<Vec<u8>>,
    content_type: Option<ContentType>,
    timeout: Duration,
    date_format: Option<String>,
    #[debug(ignore)]
    user_state: Option<UserState>,
}

impl RequestDescriptor {
    pub(in crate::client) fn build<R: RestRequest>(
        settings: &ClientSettings,
        metadata: &RequestMetadata,
        payload: &R,
        context: &CallContext,
    ) -> Result<Self, RestClientError> {
        let method = metadata.method().clone();

        let encoded = if matches!(method, Method::GET | Method::HEAD) {
            None
        } else {
            settings.codec.encode(payload)?
        };
        let (content_type, body) = encoded.unzip();

        let segments = payload.url_segments().merge(context.segments.clone());
        let path = resolve_resource(metadata.resource(), &segments)?;

        let base_url = metadata
            .base_url()
            .unwrap_or(&settings.base_url)
            .clone();
        let url = Self::build_url(&base_url, &path, &context.query)?;

        let mut headers = HeaderMap::new();
        settings.default_headers.apply(&mut headers)?;
        headers.insert(USER_AGENT, settings.user_agent.clone());
        if let Some(credentials) = &settings.credentials {
            let (name, value) = credentials.to_header()?;
            headers.insert(name, value);
        }
        if !context.cookies.is_empty() {
            let cookie = context.cookies.to_cookie_header()?;
            headers.insert(COOKIE, HeaderValue::from_str(&cookie)?);
        }
        if let Some(content_type) = &content_type {
            headers.typed_insert(content_type.clone());
        }
        context.headers.apply(&mut headers)?;

        let timeout = metadata.timeout().unwrap_or(settings.timeout);

        Ok(Self {
            method,
            base_url,
            path,
            url,
            headers,
            body,
            content_type,
            timeout,
            date_format: settings.date_format.clone(),
            user_state: settings.user_state.clone(),
        })
    }

    fn build_url(base_url: &Url, path: &str, query: &CallQuery) -> Result<Url, RestClientError> {
        let (resource, declared_query) = match path.split_once('?') {
            Some((resource, declared_query)) => (resource, Some(declared_query)),
            None => (path, None),
        };

        let mut url = base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            resource.trim_start_matches('/')
        );
        url.set_path(&joined);

        let declared_query = declared_query.filter(|declared| !declared.is_empty());
        if declared_query.is_some() || !query.is_empty() {
            let pairs = query.to_pairs()?;
            let mut serializer = url.query_pairs_mut();
            if let Some(declared) = declared_query {
                serializer.extend_pairs(url::form_urlencoded::parse(declared.as_bytes()));
            }
            serializer.extend_pairs(pairs);
        }

        Ok(url)
    }

    pub(in crate::client) fn into_parts(self) -> (Method, Url, HeaderMap, Option<Vec<u8>>) {
        (self.method, self.url, self.headers, self.body)
    }
}

// Access
impl RequestDescriptor {
    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The base URL in effect for this call.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The resource path with every placeholder substituted.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The full URL, query string included.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The serialized body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The content type of the body, if any.
    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    /// The effective timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The configured date format.
    pub fn date_format(&self) -> Option<&str> {
        self.date_format.as_deref()
    }

    /// The user state token configured on the client.
    pub fn user_state(&self) -> Option<&UserState> {
        self.user_state.as_ref()
    }

    /// The user state token, if it is a `T`.
    pub fn user_state_as<T: 'static>(&self) -> Option<&T> {
        self.user_state.as_deref()?.downcast_ref()
    }
}
