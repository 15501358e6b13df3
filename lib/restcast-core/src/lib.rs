//! # Restcast Core
//!
//! Declarative HTTP requests whose response type is chosen by the returned status code.
//!
//! A request shape declares its routing once, through [`RestRequest::describe`] or a
//! [`MetadataRegistry`]: resource template, method, optional base URL and timeout, one
//! response type per status code and a default response type. The [`RestClient`] builds the
//! HTTP request from a payload, sends it, picks the response type from the status code and
//! deserializes the body into it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use restcast_core::{RequestMetadata, RestClient, RestRequest, UrlSegments};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Deserialize)]
//! struct Post { id: u32, title: String }
//!
//! #[derive(Debug, Deserialize)]
//! struct NotFound { message: String }
//!
//! #[derive(Serialize)]
//! struct GetPost {
//!     #[serde(skip_serializing)]
//!     id: u32,
//! }
//!
//! impl RestRequest for GetPost {
//!     fn describe() -> Option<RequestMetadata> {
//!         Some(
//!             RequestMetadata::get("/posts/{id}")
//!                 .on_status::<NotFound>(StatusCode::NOT_FOUND)
//!                 .with_default_response::<Post>(),
//!         )
//!     }
//!
//!     fn url_segments(&self) -> UrlSegments {
//!         UrlSegments::new().add_segment("id", self.id)
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RestClient::builder()
//!     .with_base_url("https://jsonplaceholder.typicode.com")
//!     .build()?;
//!
//! // typed: the default response type must be `Post`
//! let post: Post = client.get(GetPost { id: 1 }).await?;
//!
//! // dynamic: the type follows the status code
//! let response = client.get_dynamic(GetPost { id: 999 }).await?;
//! if let Some(not_found) = response.downcast_ref::<NotFound>() {
//!     tracing::warn!(message = %not_found.message, "no such post");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Call forms
//!
//! - awaited: [`RestCall::get`], [`RestCall::get_dynamic`], or `.await` on a [`RestCall`]
//! - spawned: [`RestCall::spawn`], [`RestCall::spawn_dynamic`] return a [`PendingCall`]
//! - callbacks: [`RestCall::spawn_with_callback`], waited for with
//!   [`RestClient::join_outstanding`]
//! - blocking: [`blocking::RestClient`]
//!
//! ## Modules
//!
//! - [`blocking`] - synchronous client
//! - [`testing`] - scripted transport and recording observer for tests

mod client;

pub mod blocking;

pub mod testing;

pub use self::client::{
    AuthenticationError, BodyCodec, CallCookies, CallHeaders, CallObserver, CallQuery,
    Credentials, DynResponse, Envelope, MetadataRegistry, PendingCall, ReqwestTransport,
    RequestDescriptor, RequestFormat, RequestMetadata, Resolution, ResponseType, RestCall,
    RestClient, RestClientBuilder, RestClientError, RestRequest, SecureString, Transport,
    TransportError, TransportFuture, UrlSegments, UserState,
};
