use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use vc_utils::hash::HashMap;

use super::{ClassMetadata, Driver, MetadataCache, cache_key};
use crate::Error;
use crate::class::{ClassInfo, ClassRegistryArc};

/// Resolves and memoizes the metadata of classes.
///
/// Lookups go through the loaded metadata, then the external cache, then
/// the drivers in order. Concurrent first resolutions of a class may both
/// run the drivers; the last one stored wins.
pub struct MetadataFactory {
    registry: ClassRegistryArc,
    drivers: Vec<Box<dyn Driver>>,
    cache: Option<Arc<dyn MetadataCache>>,
    loaded: RwLock<HashMap<String, Arc<ClassMetadata>>>,
}

impl MetadataFactory {
    pub fn new(registry: ClassRegistryArc, drivers: Vec<Box<dyn Driver>>) -> Self {
        Self {
            registry,
            drivers,
            cache: None,
            loaded: RwLock::new(HashMap::default()),
        }
    }

    /// Sets the external cache.
    #[inline]
    pub fn with_cache(mut self, cache: Arc<dyn MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[inline]
    pub fn registry(&self) -> &ClassRegistryArc {
        &self.registry
    }

    #[inline]
    pub fn drivers(&self) -> &[Box<dyn Driver>] {
        &self.drivers
    }

    /// The metadata of the class `name`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownClass`] if the class is not registered.
    /// - [`Error::NoNormalizer`] if no driver describes the class.
    pub fn get_metadata(&self, name: &str) -> Result<Arc<ClassMetadata>, Error> {
        if let Some(metadata) = self.loaded(name) {
            log::trace!("Metadata of \"{name}\" found in memory");
            return Ok(metadata);
        }

        let class = self
            .registry
            .get(name)
            .ok_or_else(|| Error::UnknownClass { class: name.into() })?;
        self.get_metadata_for_class(&class)
    }

    /// The metadata of `class`, loaded through the caches and the drivers.
    pub fn get_metadata_for_class(&self, class: &Arc<ClassInfo>) -> Result<Arc<ClassMetadata>, Error> {
        let name = class.name();
        if let Some(metadata) = self.loaded(name) {
            log::trace!("Metadata of \"{name}\" found in memory");
            return Ok(metadata);
        }

        let key = cache_key(name);
        if let Some(metadata) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            log::debug!("Metadata of \"{name}\" loaded from the cache");
            self.store(name, metadata.clone());
            return Ok(metadata);
        }

        for driver in &self.drivers {
            let Some(metadata) = driver.get_metadata_for_class(class)? else {
                continue;
            };
            log::debug!("Metadata of \"{name}\" loaded by {driver:?}");

            let metadata = Arc::new(metadata);
            if let Some(cache) = &self.cache {
                cache.set(&key, metadata.clone());
            }
            self.store(name, metadata.clone());
            return Ok(metadata);
        }

        log::warn!("No metadata driver found for the class \"{name}\"");
        Err(Error::no_normalizer(name))
    }

    fn loaded(&self, name: &str) -> Option<Arc<ClassMetadata>> {
        self.loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn store(&self, name: &str, metadata: Arc<ClassMetadata>) {
        self.loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), metadata);
    }
}

impl fmt::Debug for MetadataFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataFactory")
            .field("drivers", &self.drivers)
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use crate::class::{ClassRegistry, FieldInfo};
    use crate::metadata::{DeclarationDriver, MemoryCache, StaticMethodDriver};

    #[derive(Debug, Default)]
    struct CountingDriver {
        calls: AtomicUsize,
    }

    impl Driver for CountingDriver {
        fn get_metadata_for_class(&self, class: &Arc<ClassInfo>) -> Result<Option<ClassMetadata>, Error> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(Some(ClassMetadata::new(class.name())))
        }
    }

    fn registry() -> ClassRegistryArc {
        let mut registry = ClassRegistry::new();
        registry.register_info(
            ClassInfo::new("App\\Tag")
                .with_field(FieldInfo::new("name"))
                .with_static(StaticMethodDriver::DEFAULT_METHOD, |builder| {
                    builder.string("name").alias("label");
                }),
        );
        ClassRegistryArc::new(registry)
    }

    #[test]
    fn first_driver_wins() {
        let factory = MetadataFactory::new(
            registry(),
            vec![
                Box::new(StaticMethodDriver::default()),
                Box::new(DeclarationDriver::default()),
            ],
        );
        let tag = factory.get_metadata("App\\Tag").unwrap();
        assert!(tag.property("label").is_some());

        // No static loader: the declaration driver answers.
        let std = factory.get_metadata("stdClass").unwrap();
        assert!(std.is_empty());
    }

    #[test]
    fn memoizes_and_fills_the_cache() {
        let cache = Arc::new(MemoryCache::new());
        let factory = MetadataFactory::new(registry(), vec![Box::new(CountingDriver::default())])
            .with_cache(cache.clone());

        let first = factory.get_metadata("App\\Tag").unwrap();
        let second = factory.get_metadata("App\\Tag").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.get("serializer-metadata-App.Tag").is_some());

        // A second factory sharing the cache does not reach its drivers.
        let other = MetadataFactory::new(registry(), Vec::new()).with_cache(cache);
        assert_eq!(other.get_metadata("App\\Tag").unwrap().name(), "App\\Tag");
    }

    #[test]
    fn errors() {
        let factory = MetadataFactory::new(registry(), Vec::new());
        assert!(matches!(
            factory.get_metadata("App\\Missing"),
            Err(Error::UnknownClass { .. })
        ));
        assert!(matches!(
            factory.get_metadata("App\\Tag"),
            Err(Error::NoNormalizer { .. })
        ));
    }
}
