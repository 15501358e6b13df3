//! A blocking [`RestClient`] for synchronous code.
//!
//! Each client owns a multi-threaded Tokio runtime. Calls block the current thread until the
//! call completes; callbacks run on the runtime workers. Must not be used from within an
//! async context.
//!
//! ```rust,no_run
//! use restcast_core::blocking;
//! use restcast_core::{RequestMetadata, RestRequest};
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Debug, Deserialize)] struct Origin { origin: String }
//! #[derive(Serialize)]
//! struct WhatIsMyIp;
//!
//! impl RestRequest for WhatIsMyIp {
//!     fn describe() -> Option<RequestMetadata> {
//!         Some(RequestMetadata::get("/ip").with_default_response::<Origin>())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = blocking::RestClient::new(
//!     restcast_core::RestClient::builder().with_base_url("http://httpbin.org"),
//! )?;
//!
//! let origin: Origin = client.get(WhatIsMyIp)?;
//! client.request(WhatIsMyIp).spawn_with_callback(|result: Result<Origin, _>| {
//!     tracing::info!(?result, "received");
//! });
//! client.join_outstanding();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::runtime::Runtime;

use crate::{
    CallCookies, CallHeaders, CallQuery, DynResponse, RestClientBuilder, RestClientError,
    RestRequest, UrlSegments,
};

/// Errors raised when creating a blocking client.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum BlockingClientError {
    /// The client settings are invalid.
    Client(RestClientError),

    /// The runtime could not be started.
    #[display("Cannot start the runtime: {_0}")]
    Runtime(std::io::Error),
}

/// Blocking wrapper around a [`crate::RestClient`].
#[derive(Debug, Clone)]
pub struct RestClient {
    client: crate::RestClient,
    runtime: Arc<Runtime>,
}

impl RestClient {
    /// Builds the client and starts its runtime.
    ///
    /// # Errors
    ///
    /// Fails if the builder settings are invalid or the runtime cannot start.
    pub fn new(builder: RestClientBuilder) -> Result<Self, BlockingClientError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("restcast-blocking")
            .build()?;
        let client = builder.build()?;
        Ok(Self {
            client,
            runtime: Arc::new(runtime),
        })
    }

    /// The wrapped async client.
    pub fn as_async(&self) -> &crate::RestClient {
        &self.client
    }

    /// Prepares a call for `payload`.
    pub fn request<R: RestRequest>(&self, payload: R) -> RestCall<R> {
        RestCall {
            call: self.client.request(payload),
            runtime: Arc::clone(&self.runtime),
        }
    }

    /// Sends `payload` and deserializes the response into `T`.
    ///
    /// # Errors
    ///
    /// See [`crate::RestCall::get`].
    pub fn get<T, R>(&self, payload: R) -> Result<T, RestClientError>
    where
        T: DeserializeOwned + Send + 'static,
        R: RestRequest,
    {
        self.request(payload).get()
    }

    /// Sends `payload` and deserializes the response into the type resolved from the status
    /// code.
    ///
    /// # Errors
    ///
    /// See [`crate::RestCall::get_dynamic`].
    pub fn get_dynamic<R: RestRequest>(&self, payload: R) -> Result<DynResponse, RestClientError> {
        self.request(payload).get_dynamic()
    }

    /// Blocks until every call started with a callback has completed.
    pub fn join_outstanding(&self) {
        self.runtime.block_on(self.client.join_outstanding());
    }

    /// Number of calls started with a callback that have not completed yet.
    pub fn outstanding(&self) -> usize {
        self.client.outstanding()
    }
}

/// Blocking counterpart of [`crate::RestCall`].
#[derive(Debug)]
pub struct RestCall<R> {
    call: crate::RestCall<R>,
    runtime: Arc<Runtime>,
}

impl<R: RestRequest> RestCall<R> {
    fn map(self, update: impl FnOnce(crate::RestCall<R>) -> crate::RestCall<R>) -> Self {
        Self {
            call: update(self.call),
            runtime: self.runtime,
        }
    }

    /// See [`crate::RestCall::with_cookies`].
    pub fn with_cookies(self, cookies: CallCookies) -> Self {
        self.map(|call| call.with_cookies(cookies))
    }

    /// See [`crate::RestCall::with_cookie`].
    pub fn with_cookie<T: Serialize>(self, name: impl Into<String>, value: T) -> Self {
        self.map(|call| call.with_cookie(name, value))
    }

    /// See [`crate::RestCall::with_query`].
    pub fn with_query(self, query: CallQuery) -> Self {
        self.map(|call| call.with_query(query))
    }

    /// See [`crate::RestCall::with_query_param`].
    pub fn with_query_param<T: Serialize>(self, name: impl Into<String>, value: T) -> Self {
        self.map(|call| call.with_query_param(name, value))
    }

    /// See [`crate::RestCall::with_headers`].
    pub fn with_headers(self, headers: CallHeaders) -> Self {
        self.map(|call| call.with_headers(headers))
    }

    /// See [`crate::RestCall::with_header`].
    pub fn with_header<T: Serialize>(self, name: impl Into<String>, value: T) -> Self {
        self.map(|call| call.with_header(name, value))
    }

    /// See [`crate::RestCall::with_url_segments`].
    pub fn with_url_segments(self, segments: UrlSegments) -> Self {
        self.map(|call| call.with_url_segments(segments))
    }

    /// See [`crate::RestCall::with_url_segment`].
    pub fn with_url_segment(self, name: impl Into<String>, value: impl ToString) -> Self {
        self.map(|call| call.with_url_segment(name, value))
    }

    /// Executes the call, blocking until the response is deserialized into `T`.
    ///
    /// # Errors
    ///
    /// See [`crate::RestCall::get`].
    pub fn get<T>(self) -> Result<T, RestClientError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.runtime.block_on(self.call.get())
    }

    /// Executes the call, blocking until the response is deserialized into the type resolved
    /// from the status code.
    ///
    /// # Errors
    ///
    /// See [`crate::RestCall::get_dynamic`].
    pub fn get_dynamic(self) -> Result<DynResponse, RestClientError> {
        self.runtime.block_on(self.call.get_dynamic())
    }

    /// Starts the call in the background and hands the result to `callback`.
    ///
    /// See [`crate::RestCall::spawn_with_callback`].
    pub fn spawn_with_callback<T, F>(self, callback: F)
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, RestClientError>) + Send + 'static,
    {
        let _entered = self.runtime.enter();
        self.call.spawn_with_callback(callback);
    }

    /// Starts the call in the background and hands the dynamic result to `callback`.
    ///
    /// See [`crate::RestCall::spawn_dynamic_with_callback`].
    pub fn spawn_dynamic_with_callback<F>(self, callback: F)
    where
        F: FnOnce(Result<DynResponse, RestClientError>) + Send + 'static,
    {
        let _entered = self.runtime.enter();
        self.call.spawn_dynamic_with_callback(callback);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use http::StatusCode;
    use serde::Deserialize;

    use super::*;
    use crate::testing::StubTransport;
    use crate::{Envelope, RequestMetadata};

    #[derive(Debug, Deserialize)]
    struct Origin {
        origin: String,
    }

    #[derive(Debug, Serialize)]
    struct WhatIsMyIp;

    impl RestRequest for WhatIsMyIp {
        fn describe() -> Option<RequestMetadata> {
            Some(RequestMetadata::get("/ip").with_default_response::<Origin>())
        }
    }

    fn client(transport: StubTransport) -> RestClient {
        RestClient::new(crate::RestClient::builder().with_transport(transport))
            .expect("a blocking client")
    }

    #[test]
    fn test_blocking_get() {
        let transport = StubTransport::new()
            .respond_json(StatusCode::OK, r#"{"origin":"127.0.0.1"}"#)
            .respond_json(StatusCode::OK, r#"{"origin":"10.0.0.1"}"#);
        let client = client(transport.clone());

        let origin: Origin = client.get(WhatIsMyIp).expect("an origin");
        assert_eq!(origin.origin, "127.0.0.1");

        let response = client
            .request(WhatIsMyIp)
            .with_query_param("format", "json")
            .get_dynamic()
            .expect("a response");
        assert!(response.is::<Origin>());
        assert_eq!(transport.requests()[1].url().query(), Some("format=json"));
    }

    #[test]
    fn test_blocking_join_waits_for_callbacks() {
        let transport = StubTransport::new()
            .with_delay(Duration::from_millis(5))
            .with_fallback(Envelope::json(
                StatusCode::OK,
                r#"{"origin":"127.0.0.1"}"#,
            ));
        let client = client(transport);
        let completed = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            let completed = Arc::clone(&completed);
            client
                .request(WhatIsMyIp)
                .spawn_with_callback(move |result: Result<Origin, _>| {
                    if result.is_ok() {
                        completed.fetch_add(1, Ordering::SeqCst);
                    }
                });
        }
        client.join_outstanding();

        assert_eq!(completed.load(Ordering::SeqCst), 4);
        assert_eq!(client.outstanding(), 0);
    }

    #[test]
    fn test_invalid_settings_are_reported() {
        let result = RestClient::new(crate::RestClient::builder().with_base_url("nope"));

        assert!(matches!(result, Err(BlockingClientError::Client(_))));
    }
}
