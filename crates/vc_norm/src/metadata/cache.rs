use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use vc_utils::hash::HashMap;

use super::ClassMetadata;

/// An external store of resolved metadata.
///
/// Misses are not errors: the factory falls back to its drivers.
pub trait MetadataCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<ClassMetadata>>;

    fn set(&self, key: &str, metadata: Arc<ClassMetadata>);
}

/// The cache key of a class: `serializer-metadata-` followed by the class
/// name, namespace separators replaced by dots.
///
/// ```
/// use vc_norm::metadata::cache_key;
///
/// assert_eq!(cache_key("App\\Entity\\User"), "serializer-metadata-App.Entity.User");
/// ```
pub fn cache_key(class: &str) -> String {
    let mut key = String::from("serializer-metadata-");
    key.extend(class.chars().map(|c| if c == '\\' { '.' } else { c }));
    key
}

/// A process-local [`MetadataCache`].
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Arc<ClassMetadata>>>,
}

impl MemoryCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Arc<ClassMetadata>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, metadata: Arc<ClassMetadata>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), metadata);
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_by_key() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());

        cache.set("a", Arc::new(ClassMetadata::new("A")));
        assert_eq!(cache.get("a").unwrap().name(), "A");
        assert_eq!(cache.len(), 1);
    }
}
