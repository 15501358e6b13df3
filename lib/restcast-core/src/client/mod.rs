use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

mod auth;
pub use self::auth::{AuthenticationError, Credentials, SecureString};

mod builder;
pub use self::builder::RestClientBuilder;

mod call;
use self::call::CallTracker;
pub use self::call::{PendingCall, RestCall};

mod codec;
pub use self::codec::{BodyCodec, RequestFormat};

mod descriptor;
pub use self::descriptor::RequestDescriptor;

mod dynamic;
pub use self::dynamic::DynResponse;

mod error;
pub use self::error::RestClientError;

mod metadata;
pub use self::metadata::{MetadataRegistry, RequestMetadata, ResponseType, RestRequest};

mod observer;
pub use self::observer::CallObserver;

mod parameters;
pub use self::parameters::{CallCookies, CallHeaders, CallQuery, UrlSegments};

mod resolver;
pub use self::resolver::Resolution;

mod settings;
use self::settings::ClientSettings;
pub use self::settings::UserState;

mod transport;
pub use self::transport::{Envelope, ReqwestTransport, Transport, TransportError, TransportFuture};


/// Dispatches declared requests and types their responses from the status code.
///
/// Cheap to clone: clones share the settings, the transport, the metadata registry, the
/// observers and the outstanding call counter. Use [`RestClientBuilder`] to create instances.
///
/// # Example
///
/// ```rust,no_run
/// use http::StatusCode;
/// use restcast_core::{RequestMetadata, RestClient, RestRequest};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Deserialize)]
/// struct LoginOk { token: String }
///
/// #[derive(Debug, Deserialize)]
/// struct LoginConflict { code: u32 }
///
/// #[derive(Serialize)]
/// struct Login { user: String, password: String }
///
/// impl RestRequest for Login {
///     fn describe() -> Option<RequestMetadata> {
///         Some(
///             RequestMetadata::post("/users/login")
///                 .on_status::<LoginOk>(StatusCode::OK)
///                 .on_status::<LoginConflict>(StatusCode::CONFLICT),
///         )
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RestClient::builder()
///     .with_base_url("http://api.example.com")
///     .build()?;
///
/// let login = Login { user: "alice".into(), password: "secret".into() };
/// let response = client.get_dynamic(login).await?;
/// if let Some(conflict) = response.downcast_ref::<LoginConflict>() {
///     println!("conflict #{}", conflict.code);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    settings: ClientSettings,
    transport: Arc<dyn Transport>,
    registry: MetadataRegistry,
    observers: Vec<Arc<dyn CallObserver>>,
    tracker: CallTracker,
}

impl RestClient {
    /// Creates a [`RestClientBuilder`] with default settings.
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::default()
    }

    /// Prepares a call for `payload`.
    pub fn request<R: RestRequest>(&self, payload: R) -> RestCall<R> {
        RestCall::new(self.clone(), payload)
    }

    /// Sends `payload` and deserializes the response into `T`.
    ///
    /// Shortcut for `client.request(payload).get::<T>()`.
    ///
    /// # Errors
    ///
    /// See [`RestCall::get`].
    pub async fn get<T, R>(&self, payload: R) -> Result<T, RestClientError>
    where
        T: DeserializeOwned + Send + 'static,
        R: RestRequest,
    {
        self.request(payload).get().await
    }

    /// Sends `payload` and deserializes the response into the type resolved from the status
    /// code.
    ///
    /// Shortcut for `client.request(payload).get_dynamic()`.
    ///
    /// # Errors
    ///
    /// See [`RestCall::get_dynamic`].
    pub async fn get_dynamic<R: RestRequest>(
        &self,
        payload: R,
    ) -> Result<DynResponse, RestClientError> {
        self.request(payload).get_dynamic().await
    }

    /// Waits until every call started with a callback has completed.
    ///
    /// Calls started while waiting are waited for too.
    pub async fn join_outstanding(&self) {
        self.inner.tracker.join().await;
    }

    /// Number of calls started with a callback that have not completed yet.
    pub fn outstanding(&self) -> usize {
        self.inner.tracker.outstanding()
    }

    /// The client base URL.
    ///
    /// Requests declaring their own base URL never change it.
    pub fn base_url(&self) -> &Url {
        &self.inner.settings.base_url
    }

    /// The client-wide timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.settings.timeout
    }

    /// The metadata registry used by this client.
    pub fn registry(&self) -> &MetadataRegistry {
        &self.inner.registry
    }

    pub(in crate::client) fn settings(&self) -> &ClientSettings {
        &self.inner.settings
    }

    pub(in crate::client) fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    pub(in crate::client) fn observers(&self) -> &[Arc<dyn CallObserver>] {
        &self.inner.observers
    }

    pub(in crate::client) fn tracker(&self) -> &CallTracker {
        &self.inner.tracker
    }
}
