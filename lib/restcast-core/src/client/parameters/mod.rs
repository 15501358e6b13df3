//! Runtime request parameters.
//!
//! - [`UrlSegments`] - substitutions for `{name}` placeholders of the resource
//! - [`CallQuery`] - query string parameters
//! - [`CallHeaders`] - HTTP headers
//! - [`CallCookies`] - cookies

mod param;

mod path;
pub(in crate::client) use self::path::resolve_resource;
pub use self::path::UrlSegments;

mod query;
pub use self::query::CallQuery;

mod headers;
pub use self::headers::CallHeaders;

mod cookies;
pub use self::cookies::CallCookies;
