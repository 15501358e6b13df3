//! In-memory collaborators for testing code that uses a [`RestClient`](crate::RestClient).
//!
//! - [`StubTransport`] answers with scripted envelopes and records every request
//! - [`RecordingObserver`] records the observer notifications in order
//!
//! ```rust
//! use http::StatusCode;
//! use restcast_core::testing::StubTransport;
//! use restcast_core::{Envelope, RequestMetadata, RestClient, RestRequest};
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
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = StubTransport::new()
//!     .respond_with(Envelope::json(StatusCode::OK, r#"{"origin":"127.0.0.1"}"#));
//! let client = RestClient::builder()
//!     .with_transport(transport.clone())
//!     .build()?;
//!
//! let origin: Origin = client.get(WhatIsMyIp).await?;
//!
//! assert_eq!(origin.origin, "127.0.0.1");
//! assert_eq!(transport.requests()[0].url().path(), "/ip");
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use http::StatusCode;
use tracing::debug;
use url::Url;

use crate::client::{
    CallObserver, Envelope, RequestDescriptor, Transport, TransportError, TransportFuture,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond(Envelope),
    Fail(String),
}

#[derive(Debug, Default)]
struct StubState {
    scripted: VecDeque<Scripted>,
    fallback: Option<Envelope>,
    requests: Vec<RequestDescriptor>,
}

/// A [`Transport`] answering with scripted envelopes.
///
/// Scripted answers are consumed in order, one per request. Once they are exhausted, the
/// fallback envelope is returned if any, otherwise the request fails. Clones share the
/// script and the recorded requests.
#[derive(Debug, Clone, Default)]
pub struct StubTransport {
    state: Arc<Mutex<StubState>>,
    delay: Option<Duration>,
}

impl StubTransport {
    /// Creates a transport without scripted answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers the next unanswered request with `envelope`.
    #[must_use]
    pub fn respond_with(self, envelope: Envelope) -> Self {
        lock(&self.state)
            .scripted
            .push_back(Scripted::Respond(envelope));
        self
    }

    /// Answers the next unanswered request with a JSON body.
    #[must_use]
    pub fn respond_json(self, status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        self.respond_with(Envelope::json(status, body))
    }

    /// Fails the next unanswered request with a transport failure.
    #[must_use]
    pub fn fail_with(self, message: impl Into<String>) -> Self {
        lock(&self.state)
            .scripted
            .push_back(Scripted::Fail(message.into()));
        self
    }

    /// Answers with `envelope` once the script is exhausted.
    #[must_use]
    pub fn with_fallback(self, envelope: Envelope) -> Self {
        lock(&self.state).fallback = Some(envelope);
        self
    }

    /// Waits `delay` before answering each request.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The requests received so far, in order.
    pub fn requests(&self) -> Vec<RequestDescriptor> {
        lock(&self.state).requests.clone()
    }

    /// The number of requests received so far.
    pub fn request_count(&self) -> usize {
        lock(&self.state).requests.len()
    }

    fn next(&self, request: RequestDescriptor) -> Option<Scripted> {
        let mut state = lock(&self.state);
        state.requests.push(request);
        state
            .scripted
            .pop_front()
            .or_else(|| state.fallback.clone().map(Scripted::Respond))
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: RequestDescriptor) -> TransportFuture<'_> {
        Box::pin(async move {
            debug!(url = %request.url(), "stubbed request");
            let scripted = self.next(request);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            match scripted {
                Some(Scripted::Respond(envelope)) => Ok(envelope),
                Some(Scripted::Fail(message)) => Err(TransportError::failure(message)),
                None => Err(TransportError::failure("no scripted response left")),
            }
        })
    }
}

/// A notification received by a [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    /// `before_send` for the request sent to `url`.
    BeforeSend {
        /// The request URL.
        url: Url,
    },
    /// `after_receive` for the request sent to `url`.
    AfterReceive {
        /// The request URL.
        url: Url,
        /// The response status.
        status: StatusCode,
    },
}

/// A [`CallObserver`] recording every notification. Clones share the recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<ObservedEvent>>>,
}

impl RecordingObserver {
    /// Creates an observer with an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// The notifications received so far, in order.
    pub fn events(&self) -> Vec<ObservedEvent> {
        lock(&self.events).clone()
    }
}

impl CallObserver for RecordingObserver {
    fn before_send(&self, request: &RequestDescriptor) {
        lock(&self.events).push(ObservedEvent::BeforeSend {
            url: request.url().clone(),
        });
    }

    fn after_receive(&self, request: &RequestDescriptor, envelope: &Envelope) {
        lock(&self.events).push(ObservedEvent::AfterReceive {
            url: request.url().clone(),
            status: envelope.status(),
        });
    }
}
