use alloc::string::String;
use alloc::sync::Arc;

use vc_utils::IndexMap;

use super::PropertyMetadataBuilder;
use crate::Error;
use crate::accessor::{AccessorConfig, guesser};
use crate::class::{ClassInfo, names};
use crate::metadata::ClassMetadata;
use crate::types::Type;
use crate::value::Options;

// -----------------------------------------------------------------------------
// Typed helpers

/// Generates `name(property)` and `name_with(property, options)` shortcuts
/// of [`ClassMetadataBuilder::add`] for a fixed type.
macro_rules! typed_helpers {
    ($($name:ident, $with:ident => $ty:expr;)*) => {
        $(
            #[inline]
            pub fn $name(&mut self, name: &str) -> &mut PropertyMetadataBuilder {
                self.add(name, $ty, &Options::new())
            }

            #[inline]
            pub fn $with(&mut self, name: &str, options: &Options) -> &mut PropertyMetadataBuilder {
                self.add(name, $ty, options)
            }
        )*
    };
}

/// Collects the description of a class.
///
/// This is the argument of static metadata loaders:
///
/// ```
/// use std::sync::Arc;
/// use vc_norm::accessor::AccessorConfig;
/// use vc_norm::class::{ClassInfo, FieldInfo};
/// use vc_norm::metadata::ClassMetadataBuilder;
/// use vc_norm::value::Options;
///
/// let class = Arc::new(
///     ClassInfo::new("User")
///         .with_field(FieldInfo::new("id"))
///         .with_field(FieldInfo::new("name")),
/// );
/// let mut builder = ClassMetadataBuilder::new(class, AccessorConfig::default());
/// builder.integer("id");
/// builder.add("name", "string", &Options::new().with("serializedName", "login"));
///
/// let metadata = builder.build().unwrap();
/// assert_eq!(metadata.property("login").unwrap().name, "name");
/// assert_eq!(metadata.property("id").unwrap().ty.name(), "integer");
/// ```
#[derive(Debug, Clone)]
pub struct ClassMetadataBuilder {
    class: Arc<ClassInfo>,
    config: AccessorConfig,
    properties: IndexMap<String, PropertyMetadataBuilder>,
    use_getters: bool,
    use_setters: bool,
    post_denormalization: Option<String>,
}

impl ClassMetadataBuilder {
    pub fn new(class: Arc<ClassInfo>, config: AccessorConfig) -> Self {
        Self {
            class,
            config,
            properties: IndexMap::new(),
            use_getters: false,
            use_setters: false,
            post_denormalization: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.class.name()
    }

    #[inline]
    pub fn class(&self) -> &Arc<ClassInfo> {
        &self.class
    }

    #[inline]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// The builder of a property, created on first request.
    pub fn property(&mut self, name: &str) -> &mut PropertyMetadataBuilder {
        let class = &self.class;
        let config = self.config;
        self.properties.get_or_insert_with(name.into(), || {
            PropertyMetadataBuilder::new(class.clone(), name, config)
        })
    }

    /// Replaces the property `name` by a fresh one of type `ty`,
    /// configured from `options`.
    pub fn add(&mut self, name: &str, ty: &str, options: &Options) -> &mut PropertyMetadataBuilder {
        let fresh = PropertyMetadataBuilder::new(self.class.clone(), name, self.config);
        let builder = self.properties.get_or_insert_with(name.into(), || fresh.clone());
        *builder = fresh;
        builder.type_(ty).configure(options)
    }

    typed_helpers! {
        collection, collection_with => Type::ARRAY;
        string, string_with => Type::STRING;
        integer, integer_with => Type::INTEGER;
        boolean, boolean_with => Type::BOOLEAN;
        float, float_with => Type::FLOAT;
        null, null_with => Type::NULL;
        mixed, mixed_with => Type::MIXED;
        object, object_with => names::STD_CLASS;
        date_time, date_time_with => names::DATE_TIME;
        date_time_immutable, date_time_immutable_with => names::DATE_TIME_IMMUTABLE;
    }

    /// Reads properties through their guessed getters.
    pub fn use_getters(&mut self) -> &mut Self {
        self.use_getters = true;
        self
    }

    /// Writes properties through their guessed setters.
    pub fn use_setters(&mut self) -> &mut Self {
        self.use_setters = true;
        self
    }

    /// Calls the hook method `method` once an object is denormalized.
    pub fn post_denormalization(&mut self, method: impl Into<String>) -> &mut Self {
        self.post_denormalization = Some(method.into());
        self
    }

    pub fn build(self) -> Result<ClassMetadata, Error> {
        let mut metadata = ClassMetadata::new(self.class.name());

        if let Some(method) = &self.post_denormalization {
            let hook = self
                .class
                .method(method)
                .and_then(|method| method.as_hook())
                .ok_or_else(|| Error::UnknownMethod {
                    class: self.class.name().into(),
                    method: method.clone(),
                })?;
            metadata = metadata.with_post_denormalization(hook.clone());
        }

        for (_, mut builder) in self.properties {
            if self.use_getters && !builder.has_getter() {
                if let Some(getter) = guesser::guess_getter(&self.class, builder.name()) {
                    builder.read_with(getter);
                }
            }
            if self.use_setters && !builder.has_setter() {
                if let Some(setter) = guesser::guess_setter(&self.class, builder.name()) {
                    builder.write_with(setter);
                }
            }
            metadata = metadata.with_property(builder.build()?);
        }

        Ok(metadata)
    }
}
