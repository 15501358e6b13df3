use serde::Serialize;

use super::descriptor::CallContext;
use super::metadata::RestRequest;
use super::{CallCookies, CallHeaders, CallQuery, RestClient, UrlSegments};

mod execution;

mod spawn;
pub(in crate::client) use self::spawn::CallTracker;
pub use self::spawn::PendingCall;

#[cfg(test)]
mod tests;

/// One dispatch of a request payload, with its runtime parameters.
///
/// Created by [`RestClient::request`]. The routing and the response types come from the
/// metadata of `R`; the call only adds cookies, query parameters, headers and URL segment
/// overrides.
///
/// # Execution
///
/// - [`get::<T>()`](Self::get) - typed result
/// - [`get_dynamic()`](Self::get_dynamic) or `.await` - result typed from the status code
/// - [`spawn::<T>()`](Self::spawn), [`spawn_dynamic()`](Self::spawn_dynamic) - run on a task,
///   await the [`PendingCall`] later
/// - [`spawn_with_callback()`](Self::spawn_with_callback),
///   [`spawn_dynamic_with_callback()`](Self::spawn_dynamic_with_callback) - fire and forget,
///   tracked by [`RestClient::join_outstanding`]
///
/// ```rust,no_run
/// use restcast_core::{CallCookies, RequestMetadata, RestClient, RestRequest};
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Deserialize)] struct Range { from: u32 }
/// #[derive(Serialize)]
/// struct CustomerRange;
///
/// impl RestRequest for CustomerRange {
///     fn describe() -> Option<RequestMetadata> {
///         Some(RequestMetadata::get("/customer/{customerId}/range/").with_default_response::<Range>())
///     }
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RestClient::builder().with_base_url("http://api.example.com").build()?;
/// let range: Range = client
///     .request(CustomerRange)
///     .with_url_segment("customerId", 42)
///     .with_query_param("customerid", 0)
///     .with_cookies(CallCookies::new().add_cookie("session_id", "abc123"))
///     .with_header("X-Request-ID", "abc-123")
///     .get()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RestCall<R> {
    client: RestClient,
    payload: R,
    context: CallContext,
}

impl<R: RestRequest> RestCall<R> {
    pub(in crate::client) fn new(client: RestClient, payload: R) -> Self {
        Self {
            client,
            payload,
            context: CallContext::default(),
        }
    }

    /// The request payload.
    pub fn payload(&self) -> &R {
        &self.payload
    }
}

// Parameters
impl<R: RestRequest> RestCall<R> {
    /// Adds cookies, merged with the ones already set.
    pub fn with_cookies(mut self, cookies: CallCookies) -> Self {
        self.context.cookies = self.context.cookies.merge(cookies);
        self
    }

    /// Adds a single cookie.
    pub fn with_cookie<T: Serialize>(self, name: impl Into<String>, value: T) -> Self {
        self.with_cookies(CallCookies::new().add_cookie(name, value))
    }

    /// Adds query parameters, merged with the ones already set.
    pub fn with_query(mut self, query: CallQuery) -> Self {
        self.context.query = self.context.query.merge(query);
        self
    }

    /// Adds a single query parameter.
    pub fn with_query_param<T: Serialize>(self, name: impl Into<String>, value: T) -> Self {
        self.with_query(CallQuery::new().add_param(name, value))
    }

    /// Adds headers, merged with the ones already set.
    ///
    /// Call headers replace client default headers with the same name.
    pub fn with_headers(mut self, headers: CallHeaders) -> Self {
        self.context.headers = self.context.headers.merge(headers);
        self
    }

    /// Adds a single header.
    pub fn with_header<T: Serialize>(self, name: impl Into<String>, value: T) -> Self {
        self.with_headers(CallHeaders::new().add_header(name, value))
    }

    /// Adds URL segment bindings, replacing the ones carried by the payload.
    pub fn with_url_segments(mut self, segments: UrlSegments) -> Self {
        self.context.segments = self.context.segments.merge(segments);
        self
    }

    /// Binds a single URL segment.
    pub fn with_url_segment(self, name: impl Into<String>, value: impl ToString) -> Self {
        self.with_url_segments(UrlSegments::new().add_segment(name, value))
    }
}
