use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use http::HeaderValue;
use url::Url;

use super::auth::Credentials;
use super::codec::BodyCodec;
use super::parameters::CallHeaders;

pub(in crate::client) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(in crate::client) const DEFAULT_USER_AGENT: &str =
    concat!("restcast/", env!("CARGO_PKG_VERSION"));

/// Opaque value handed to transports and observers through every descriptor.
pub type UserState = Arc<dyn Any + Send + Sync>;

/// Client-wide settings shared by every call.
#[derive(Clone, derive_more::Debug)]
pub(in crate::client) struct ClientSettings {
    pub(in crate::client) base_url: Url,
    pub(in crate::client) timeout: Duration,
    pub(in crate::client) user_agent: HeaderValue,
    pub(in crate::client) default_headers: CallHeaders,
    pub(in crate::client) credentials: Option<Credentials>,
    pub(in crate::client) codec: BodyCodec,
    pub(in crate::client) date_format: Option<String>,
    #[debug(ignore)]
    pub(in crate::client) user_state: Option<UserState>,
}

impl ClientSettings {
    pub(in crate::client) fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
            default_headers: CallHeaders::default(),
            credentials: None,
            codec: BodyCodec::default(),
            date_format: None,
            user_state: None,
        }
    }
}
