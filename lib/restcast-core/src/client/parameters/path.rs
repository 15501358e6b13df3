use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use tracing::warn;

use crate::client::error::RestClientError;

/// Matches `{name}` placeholders in a resource template, any name without braces or `/`.
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>[^{}/]+)\}").expect("a valid regex"));

fn replace_placeholder(path: &str, name: &str, value: &str) -> String {
    let pattern = ["{", name, "}"].concat();
    path.replace(&pattern, value)
}

fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Named substitutions for the `{name}` placeholders of a resource template.
///
/// Bindings come from the payload ([`RestRequest::url_segments`](crate::RestRequest::url_segments))
/// and from the caller; a later binding for the same name replaces the earlier one.
///
/// ```rust
/// use restcast_core::UrlSegments;
///
/// let segments = UrlSegments::new()
///     .add_segment("customerId", 42)
///     .add_segment("postId", "first-post");
/// assert_eq!(segments.get("customerId"), Some("42"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlSegments {
    bindings: IndexMap<String, String>,
}

impl UrlSegments {
    /// Creates an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to the string form of `value`.
    pub fn add_segment(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.bindings.insert(name.into(), value.to_string());
        self
    }

    /// Merges `other` into this set, `other` wins on collision.
    pub fn merge(mut self, other: Self) -> Self {
        self.bindings.extend(other.bindings);
        self
    }

    /// Returns the value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    /// Returns `true` if there is no binding.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

impl<K, V> FromIterator<(K, V)> for UrlSegments
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |segments, (name, value)| {
                segments.add_segment(name, value)
            })
    }
}

/// Substitutes every placeholder of `template`.
///
/// Bindings without a placeholder are ignored. Placeholders without a binding fail with
/// [`RestClientError::PathUnresolved`].
pub(in crate::client) fn resolve_resource(
    template: &str,
    segments: &UrlSegments,
) -> Result<String, RestClientError> {
    let mut names: HashSet<String> = RE
        .captures_iter(template)
        .filter_map(|caps| caps.name("name"))
        .map(|found| found.as_str().to_string())
        .collect();

    let mut path = template.to_string();
    for (name, value) in &segments.bindings {
        if !names.remove(name) {
            warn!(?name, "segment binding not found in resource");
            continue;
        }
        path = replace_placeholder(&path, name, &encode_segment(value));
    }

    if names.is_empty() {
        return Ok(path);
    }

    let mut missings: Vec<_> = names.into_iter().collect();
    missings.sort();
    Err(RestClientError::PathUnresolved { path, missings })
}
