use std::fmt;

use super::descriptor::RequestDescriptor;
use super::transport::Envelope;

/// Notified around every HTTP exchange of a [`RestClient`](super::RestClient).
///
/// For one call, `before_send` fires once before the transport executes the request and
/// `after_receive` fires once after an envelope arrives, even if resolving or deserializing it
/// fails afterwards. `after_receive` does not fire when the transport faults or times out.
///
/// Observers run on the task executing the call and must not block.
///
/// ```rust
/// use restcast_core::{CallObserver, Envelope, RequestDescriptor};
///
/// #[derive(Debug)]
/// struct StatusLogger;
///
/// impl CallObserver for StatusLogger {
///     fn after_receive(&self, request: &RequestDescriptor, envelope: &Envelope) {
///         tracing::info!(url = %request.url(), status = %envelope.status(), "exchange done");
///     }
/// }
/// ```
pub trait CallObserver: fmt::Debug + Send + Sync + 'static {
    /// Called once the descriptor is built, before it is sent.
    fn before_send(&self, request: &RequestDescriptor) {
        let _ = request;
    }

    /// Called once the transport returned an envelope.
    fn after_receive(&self, request: &RequestDescriptor, envelope: &Envelope) {
        let _ = (request, envelope);
    }
}
