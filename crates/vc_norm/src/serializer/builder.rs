use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::Serializer;
use crate::accessor::AccessorConfig;
use crate::class::{Class, ClassInfo, ClassRegistry, ClassRegistryArc};
use crate::metadata::{DeclarationDriver, Driver, MetadataCache, MetadataFactory, StaticMethodDriver};
use crate::normalizer::{
    DateTimeNormalizer, NormalizerLoader, ObjectNormalizer, PropertyNormalizer, SharedNormalizer,
    TraversableNormalizer,
};
use crate::value::Options;

/// Configures a [`Serializer`].
///
/// By default the registry holds the built-in classes and, with the
/// `auto_register` feature, the classes submitted with
/// [`impl_auto_register!`](crate::impl_auto_register). Metadata comes from
/// a [`StaticMethodDriver`] then a [`DeclarationDriver`].
///
/// Normalizers added with [`normalizer`](Self::normalizer) are asked
/// before the default ones: [`ObjectNormalizer`], [`DateTimeNormalizer`],
/// [`TraversableNormalizer`] and finally [`PropertyNormalizer`].
pub struct SerializerBuilder {
    registry: ClassRegistry,
    cache: Option<Arc<dyn MetadataCache>>,
    drivers: Vec<Box<dyn Driver>>,
    normalizers: Vec<SharedNormalizer>,
    default_normalizers: bool,
    accessor_config: AccessorConfig,
    normalization_options: Options,
    denormalization_options: Options,
}

impl Default for SerializerBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerBuilder {
    pub fn new() -> Self {
        let mut registry = ClassRegistry::new();
        registry.auto_register();

        Self {
            registry,
            cache: None,
            drivers: Vec::new(),
            normalizers: Vec::new(),
            default_normalizers: true,
            accessor_config: AccessorConfig::default(),
            normalization_options: Options::new(),
            denormalization_options: Options::new(),
        }
    }

    /// Replaces the class registry.
    #[inline]
    pub fn registry(mut self, registry: ClassRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Registers a class descriptor.
    #[inline]
    pub fn register(mut self, info: impl Into<Arc<ClassInfo>>) -> Self {
        self.registry.register_info(info);
        self
    }

    #[inline]
    pub fn register_class<T: Class>(mut self) -> Self {
        self.registry.register::<T>();
        self
    }

    /// Sets the external metadata cache.
    #[inline]
    pub fn cache(mut self, cache: Arc<dyn MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Adds a metadata driver. Once a driver is added, the default ones
    /// are not used.
    #[inline]
    pub fn driver(mut self, driver: impl Driver + 'static) -> Self {
        self.drivers.push(Box::new(driver));
        self
    }

    #[inline]
    pub fn normalizer(mut self, normalizer: SharedNormalizer) -> Self {
        self.normalizers.push(normalizer);
        self
    }

    /// Leaves out the default normalizers.
    #[inline]
    pub fn without_default_normalizers(mut self) -> Self {
        self.default_normalizers = false;
        self
    }

    #[inline]
    pub fn accessor_config(mut self, config: AccessorConfig) -> Self {
        self.accessor_config = config;
        self
    }

    /// Default options of every normalization call.
    #[inline]
    pub fn normalization_options(mut self, options: Options) -> Self {
        self.normalization_options = options;
        self
    }

    /// Default options of every denormalization call.
    #[inline]
    pub fn denormalization_options(mut self, options: Options) -> Self {
        self.denormalization_options = options;
        self
    }

    pub fn build(self) -> Serializer {
        let registry = ClassRegistryArc::new(self.registry);

        let mut drivers = self.drivers;
        if drivers.is_empty() {
            let config = self.accessor_config;
            drivers.push(Box::new(StaticMethodDriver::new(
                StaticMethodDriver::DEFAULT_METHOD,
                config,
            )));
            drivers.push(Box::new(DeclarationDriver::new(config)));
        }

        let mut factory = MetadataFactory::new(registry.clone(), drivers);
        if let Some(cache) = self.cache {
            factory = factory.with_cache(cache);
        }
        let factory = Arc::new(factory);

        let mut loader = NormalizerLoader::with_normalizers(registry.clone(), self.normalizers);
        if self.default_normalizers {
            loader
                .add_normalizer(Arc::new(ObjectNormalizer))
                .add_normalizer(Arc::new(DateTimeNormalizer::default()))
                .add_normalizer(Arc::new(TraversableNormalizer))
                .add_normalizer(Arc::new(PropertyNormalizer::new(factory.clone())));
        }

        Serializer {
            registry,
            loader,
            factory,
            normalization_options: self.normalization_options,
            denormalization_options: self.denormalization_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Error;
    use crate::class::FieldInfo;
    use crate::metadata::{ClassMetadata, MemoryCache, PropertyMetadata};
    use crate::value::Value;

    #[derive(Debug)]
    struct NameOnly;

    impl Driver for NameOnly {
        fn get_metadata_for_class(&self, class: &Arc<ClassInfo>) -> Result<Option<ClassMetadata>, Error> {
            let mut name = PropertyMetadata::new(class.name(), "name");
            name.accessor = crate::accessor::guesser::property_accessor(class, "name", AccessorConfig::default())?;
            Ok(Some(ClassMetadata::new(class.name()).with_property(name)))
        }
    }

    fn tag() -> ClassInfo {
        ClassInfo::new("App\\Tag")
            .with_field(FieldInfo::new("id").public())
            .with_field(FieldInfo::new("name").public())
    }

    #[test]
    fn custom_drivers_replace_the_defaults() {
        let serializer = Serializer::builder().register(tag()).driver(NameOnly).build();
        assert_eq!(serializer.metadata_factory().drivers().len(), 1);

        let tag = serializer.registry().read().instantiate("App\\Tag").unwrap();
        tag.write().set_field("id", Value::from(1)).unwrap();
        tag.write().set_field("name", Value::from("rust")).unwrap();
        assert_eq!(
            serializer.normalize(&Value::Object(tag), &Options::new()).unwrap(),
            Value::from_iter([("name", "rust")])
        );
    }

    #[test]
    fn metadata_is_stored_in_the_cache() {
        let cache = Arc::new(MemoryCache::new());
        let serializer = Serializer::builder()
            .register(tag())
            .cache(cache.clone())
            .build();
        assert_eq!(serializer.metadata_factory().drivers().len(), 2);

        serializer
            .denormalize(Value::from_iter([("id", 1)]), "App\\Tag", &Options::new())
            .unwrap();
        assert!(cache.get("serializer-metadata-App.Tag").is_some());
    }

    #[test]
    fn without_default_normalizers() {
        let serializer = Serializer::builder().without_default_normalizers().build();
        let object = Value::Object(crate::object::DynamicObject::std().into_ref());
        assert!(matches!(
            serializer.normalize(&object, &Options::new()),
            Err(Error::NoNormalizer { .. })
        ));

        let serializer = Serializer::builder()
            .without_default_normalizers()
            .normalizer(Arc::new(ObjectNormalizer))
            .build();
        assert_eq!(
            serializer.normalize(&object, &Options::new()).unwrap(),
            Value::map()
        );
    }
}
