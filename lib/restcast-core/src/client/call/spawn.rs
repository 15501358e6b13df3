use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::RestCall;
use crate::client::metadata::RestRequest;
use crate::client::{DynResponse, RestClientError};

/// A call running on its own task.
///
/// Resolves to the result of the call. Dropping it does not cancel the call.
#[derive(Debug)]
pub struct PendingCall<T> {
    handle: JoinHandle<Result<T, RestClientError>>,
}

impl<T> PendingCall<T> {
    /// Returns `true` once the call has completed.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for PendingCall<T> {
    type Output = Result<T, RestClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| {
            joined.unwrap_or_else(|error| {
                Err(RestClientError::TaskFailed {
                    message: error.to_string(),
                })
            })
        })
    }
}

/// Counts the fire-and-forget calls of a client that have not completed yet.
#[derive(Debug, Clone)]
pub(in crate::client) struct CallTracker {
    outstanding: Arc<watch::Sender<usize>>,
}

impl CallTracker {
    pub(in crate::client) fn new() -> Self {
        let (outstanding, _) = watch::channel(0);
        Self {
            outstanding: Arc::new(outstanding),
        }
    }

    pub(in crate::client) fn track(&self) -> TrackedCall {
        self.outstanding.send_modify(|count| *count += 1);
        TrackedCall {
            outstanding: Arc::clone(&self.outstanding),
        }
    }

    pub(in crate::client) fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    /// Waits until no tracked call is outstanding.
    pub(in crate::client) async fn join(&self) {
        let mut outstanding = self.outstanding.subscribe();
        // the sender lives as long as `self`, the wait cannot fail
        let _ = outstanding.wait_for(|count| *count == 0).await;
    }
}

/// Releases its slot in the [`CallTracker`] when dropped, including during a panic.
#[derive(Debug)]
pub(in crate::client) struct TrackedCall {
    outstanding: Arc<watch::Sender<usize>>,
}

impl Drop for TrackedCall {
    fn drop(&mut self) {
        self.outstanding
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}

impl<R: RestRequest> RestCall<R> {
    /// Runs [`get::<T>()`](Self::get) on a new task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<T>(self) -> PendingCall<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        PendingCall {
            handle: tokio::spawn(self.get::<T>()),
        }
    }

    /// Runs [`get_dynamic()`](Self::get_dynamic) on a new task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_dynamic(self) -> PendingCall<DynResponse> {
        PendingCall {
            handle: tokio::spawn(self.get_dynamic()),
        }
    }

    /// Runs [`get::<T>()`](Self::get) on a new task and hands the result to `callback`.
    ///
    /// The callback is invoked exactly once. The call counts as outstanding until the
    /// callback returns, see [`RestClient::join_outstanding`](crate::RestClient::join_outstanding).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_with_callback<T, F>(self, callback: F)
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, RestClientError>) + Send + 'static,
    {
        let tracked = self.client.tracker().track();
        tokio::spawn(async move {
            let _tracked = tracked;
            let result = self.get::<T>().await;
            debug!(success = result.is_ok(), "running call callback");
            callback(result);
        });
    }

    /// Runs [`get_dynamic()`](Self::get_dynamic) on a new task and hands the result to
    /// `callback`.
    ///
    /// Tracked like [`spawn_with_callback`](Self::spawn_with_callback).
    pub fn spawn_dynamic_with_callback<F>(self, callback: F)
    where
        F: FnOnce(Result<DynResponse, RestClientError>) + Send + 'static,
    {
        let tracked = self.client.tracker().track();
        tokio::spawn(async move {
            let _tracked = tracked;
            let result = self.get_dynamic().await;
            debug!(success = result.is_ok(), "running call callback");
            callback(result);
        });
    }
}
