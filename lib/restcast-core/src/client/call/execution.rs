use std::any::type_name;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::RestCall;
use crate::client::descriptor::RequestDescriptor;
use crate::client::metadata::{RequestMetadata, RestRequest};
use crate::client::transport::Envelope;
use crate::client::{DynResponse, RestClient, RestClientError};

/// A completed HTTP exchange, before response resolution.
struct Exchange<R> {
    client: RestClient,
    payload: R,
    metadata: Arc<RequestMetadata>,
    envelope: Envelope,
}

impl<R: RestRequest> RestCall<R> {
    async fn exchange(self) -> Result<Exchange<R>, RestClientError> {
        let Self {
            client,
            payload,
            context,
        } = self;

        let metadata = client.registry().resolve::<R>()?;
        let descriptor =
            RequestDescriptor::build(client.settings(), &metadata, &payload, &context)?;
        let timeout = descriptor.timeout();

        let observers = client.observers();
        for observer in observers {
            observer.before_send(&descriptor);
        }
        let sent = (!observers.is_empty()).then(|| descriptor.clone());

        debug!(method = %descriptor.method(), url = %descriptor.url(), "dispatching");
        let envelope =
            match tokio::time::timeout(timeout, client.transport().execute(descriptor)).await {
                Ok(Ok(envelope)) => envelope,
                Ok(Err(error)) if error.is_timeout() => {
                    warn!(?timeout, %error, "transport timed out");
                    return Err(RestClientError::Timeout { timeout });
                }
                Ok(Err(error)) => return Err(RestClientError::TransportFault(error)),
                Err(_) => {
                    warn!(?timeout, "call timed out");
                    return Err(RestClientError::Timeout { timeout });
                }
            };
        debug!(status = %envelope.status(), "dispatched");

        if let Some(sent) = &sent {
            for observer in observers {
                observer.after_receive(sent, &envelope);
            }
        }

        Ok(Exchange {
            client,
            payload,
            metadata,
            envelope,
        })
    }

    /// Executes the call and deserializes the response into `T`.
    ///
    /// The response type is resolved from the status code first. When the status has its own
    /// declared type, the body is deserialized into `T` directly. When resolution falls back
    /// to the default response type, that type must be `T`.
    ///
    /// # Errors
    ///
    /// - [`RestClientError::MissingConfiguration`] if `R` has no metadata
    /// - [`RestClientError::NoMatchingResponseType`] if the status code resolves to no type
    /// - [`RestClientError::IncompatibleResponseType`] if the default response type is not `T`
    /// - [`RestClientError::Timeout`] and [`RestClientError::TransportFault`] for transport
    ///   failures
    /// - [`RestClientError::DeserializationFailure`] if the body does not fit `T`
    pub async fn get<T>(self) -> Result<T, RestClientError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let Exchange {
            client,
            payload,
            metadata,
            envelope,
        } = self.exchange().await?;

        let status = envelope.status();
        let Some(resolution) = metadata.resolve(status) else {
            return Err(RestClientError::NoMatchingResponseType { status, envelope });
        };

        if let Err(declared) = resolution.accepts::<T>() {
            let payload = serde_json::to_value(&payload).unwrap_or_else(|error| {
                warn!(%error, payload = type_name::<R>(), "payload snapshot unavailable");
                serde_json::Value::Null
            });
            return Err(RestClientError::IncompatibleResponseType {
                requested: type_name::<T>(),
                declared: declared.type_name(),
                status,
                payload,
                envelope,
            });
        }

        debug!(%status, target = type_name::<T>(), "decoding response");
        client.settings().codec.decode(&envelope)
    }

    /// Executes the call and deserializes the response into the type resolved from the status
    /// code.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get), except that no type compatibility is checked.
    pub async fn get_dynamic(self) -> Result<DynResponse, RestClientError> {
        let Exchange {
            client,
            metadata,
            envelope,
            ..
        } = self.exchange().await?;

        let status = envelope.status();
        let Some(resolution) = metadata.resolve(status) else {
            return Err(RestClientError::NoMatchingResponseType { status, envelope });
        };

        let response_type = resolution.response_type();
        debug!(%status, target = response_type.type_name(), "decoding response");
        let value = client.settings().codec.decode_as(response_type, &envelope)?;
        Ok(DynResponse::new(status, response_type.type_name(), value))
    }
}

/// Awaiting a call directly runs its dynamic form.
///
/// ```rust,no_run
/// # use restcast_core::{RequestMetadata, RestClient, RestRequest};
/// # #[derive(serde::Serialize)] struct WhatIsMyIp;
/// # #[derive(serde::Deserialize)] struct Origin { origin: String }
/// # impl RestRequest for WhatIsMyIp {
/// #     fn describe() -> Option<RequestMetadata> {
/// #         Some(RequestMetadata::get("/ip").with_default_response::<Origin>())
/// #     }
/// # }
/// # async fn example(client: RestClient) -> Result<(), Box<dyn std::error::Error>> {
/// let response = client.request(WhatIsMyIp).await?;
/// assert!(response.is::<Origin>());
/// # Ok(())
/// # }
/// ```
impl<R: RestRequest> IntoFuture for RestCall<R> {
    type Output = Result<DynResponse, RestClientError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.get_dynamic())
    }
}
