use std::any::{TypeId, type_name};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::{RequestMetadata, RestRequest};
use crate::client::error::RestClientError;

/// Resolves and memoizes the [`RequestMetadata`] of each request shape.
///
/// Explicit registrations win over [`RestRequest::describe`]. Records are created lazily on
/// first use, then shared read-only. Cloning the registry shares its entries.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    entries: Arc<DashMap<TypeId, Arc<RequestMetadata>>>,
}

impl MetadataRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the metadata of `R`, replacing any previous record.
    pub fn register<R: RestRequest>(&self, metadata: RequestMetadata) {
        debug!(shape = type_name::<R>(), ?metadata, "register metadata");
        self.entries.insert(TypeId::of::<R>(), Arc::new(metadata));
    }

    /// Returns the metadata of `R`.
    ///
    /// # Errors
    ///
    /// Returns [`RestClientError::MissingConfiguration`] if `R` is neither registered nor
    /// self-describing.
    pub fn resolve<R: RestRequest>(&self) -> Result<Arc<RequestMetadata>, RestClientError> {
        let key = TypeId::of::<R>();
        if let Some(found) = self.entries.get(&key) {
            return Ok(Arc::clone(found.value()));
        }

        let Some(metadata) = R::describe() else {
            return Err(RestClientError::MissingConfiguration {
                type_name: type_name::<R>(),
            });
        };

        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| Arc::new(metadata));
        Ok(Arc::clone(entry.value()))
    }

    /// Returns `true` if a record for `R` is cached or registered.
    pub fn contains<R: RestRequest>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<R>())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::{Deserialize, Serialize};

    use super::*;

    static DESCRIBE_CALLS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Deserialize)]
    struct Origin {
        #[allow(dead_code)]
        origin: String,
    }

    #[derive(Serialize)]
    struct Described;

    impl RestRequest for Described {
        fn describe() -> Option<RequestMetadata> {
            DESCRIBE_CALLS.fetch_add(1, Ordering::SeqCst);
            Some(RequestMetadata::get("/ip").with_default_response::<Origin>())
        }
    }

    #[derive(Serialize)]
    struct Undeclared;

    impl RestRequest for Undeclared {}

    #[test]
    fn resolving_twice_returns_the_same_record() {
        let registry = MetadataRegistry::new();

        let first = registry.resolve::<Described>().expect("described");
        let second = registry.resolve::<Described>().expect("described");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert_eq!(DESCRIBE_CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn undeclared_shape_is_a_missing_configuration() {
        let registry = MetadataRegistry::new();

        let result = registry.resolve::<Undeclared>();

        let Err(RestClientError::MissingConfiguration { type_name }) = result else {
            panic!("expected a missing configuration, got {result:?}");
        };
        assert!(type_name.ends_with("Undeclared"));
        assert!(!registry.contains::<Undeclared>());
    }

    #[test]
    fn registration_wins_over_description() {
        let registry = MetadataRegistry::new();
        registry.register::<Undeclared>(RequestMetadata::delete("/sessions/current"));

        let metadata = registry.resolve::<Undeclared>().expect("registered");

        assert_eq!(metadata.resource(), "/sessions/current");
        assert_eq!(metadata.method(), http::Method::DELETE);
    }

    #[test]
    fn clones_share_entries() {
        let registry = MetadataRegistry::new();
        let shared = registry.clone();

        shared.register::<Undeclared>(RequestMetadata::get("/shared"));

        assert!(registry.contains::<Undeclared>());
    }
}
