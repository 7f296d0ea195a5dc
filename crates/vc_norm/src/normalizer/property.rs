use alloc::sync::Arc;

use super::Normalizer;
use crate::Error;
use crate::accessor::AccessorError;
use crate::class::ClassRegistry;
use crate::context::{DenormalizationContext, NormalizationContext};
use crate::metadata::{MetadataFactory, PropertyMetadata};
use crate::object::ObjectRef;
use crate::types::Type;
use crate::value::{Map, Value};

/// Normalizes objects through their class metadata.
///
/// Each property is read and written with its accessor, filtered by the
/// context and converted according to its type. Properties can override
/// the context options with their own normalization and denormalization
/// options.
///
/// On denormalization, a property of a class type that already holds an
/// object is hydrated in place instead of being replaced.
#[derive(Debug, Clone)]
pub struct PropertyNormalizer {
    factory: Arc<MetadataFactory>,
}

impl PropertyNormalizer {
    #[inline]
    pub fn new(factory: Arc<MetadataFactory>) -> Self {
        Self { factory }
    }

    #[inline]
    pub fn factory(&self) -> &Arc<MetadataFactory> {
        &self.factory
    }
}

/// Returns the error if it must be raised, logs it otherwise.
fn accessor_failure(error: AccessorError, throws: bool, property: &PropertyMetadata) -> Result<(), Error> {
    if throws {
        return Err(error.into());
    }
    log::debug!("Skip the property {}::{}: {error}", property.class, property.name);
    Ok(())
}

impl Normalizer for PropertyNormalizer {
    fn normalize(&self, object: &ObjectRef, context: &NormalizationContext<'_>) -> Result<Value, Error> {
        let _guard = context.guard(object)?;
        let metadata = self.factory.get_metadata(&object.class_name())?;

        let mut normalized = Map::new();
        for property in metadata.properties() {
            let context = context.duplicate(property.normalization.as_ref());
            if context.skip_property(property) {
                continue;
            }

            let read = property.accessor.read(&*object.read());
            let value = match read {
                Ok(value) => value,
                Err(error) => {
                    accessor_failure(error, context.throws_on_accessor_error(), property)?;
                    continue;
                }
            };

            let value = context.root().normalize_with(&value, &context)?;
            if context.skip_value(property, &value) {
                continue;
            }

            match value {
                Value::Map(entries) if property.inline && !context.include_meta_type() => {
                    for (key, value) in entries {
                        if !normalized.contains_key(key.as_str()) {
                            normalized.insert(key, value);
                        }
                    }
                }
                value => {
                    normalized.insert(property.alias.clone(), value);
                }
            }
        }
        Ok(Value::Map(normalized))
    }

    fn denormalize(
        &self,
        data: Value,
        ty: &Type,
        target: Option<ObjectRef>,
        context: &DenormalizationContext<'_>,
    ) -> Result<Value, Error> {
        let object = match target {
            Some(object) => object,
            None => self.factory.registry().read().instantiate(ty.name())?,
        };
        let metadata = self.factory.get_metadata(&object.class_name())?;

        for (key, data) in data.into_entries() {
            let Some(property) = metadata.property(&key) else {
                continue;
            };
            let context = context.duplicate(property.denormalization.as_ref());
            if context.skip_property(property) {
                continue;
            }

            let current = if property.ty.is_builtin() {
                None
            } else {
                match property.accessor.read(&*object.read()) {
                    Ok(Value::Object(current)) => Some(current),
                    _ => None,
                }
            };

            let value = context
                .root()
                .denormalize_with(data, &property.ty, current, &context)?;
            let written = property.accessor.write(&mut *object.write(), value);
            if let Err(error) = written {
                accessor_failure(error, context.throws_on_accessor_error(), property)?;
            }
        }

        if metadata.has_post_denormalization() {
            metadata.post_denormalization(&mut *object.write());
        }
        Ok(Value::Object(object))
    }

    #[inline]
    fn supports(&self, class: &str, registry: &ClassRegistry) -> bool {
        registry.get(class).is_some_and(|info| !info.is_interface())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Serializer;
    use crate::class::{ClassInfo, FieldInfo, MethodInfo};
    use crate::metadata::ClassMetadataBuilder;
    use crate::object::Object;
    use crate::value::Options;

    fn address() -> ClassInfo {
        ClassInfo::new("App\\Address")
            .with_field(FieldInfo::new("city").public().typed("string"))
            .with_field(FieldInfo::new("zip").public().typed("?string"))
    }

    fn user() -> ClassInfo {
        ClassInfo::new("App\\User")
            .with_field(FieldInfo::new("id").typed("int"))
            .with_field(FieldInfo::new("name").public().typed("string"))
            .with_field(FieldInfo::new("address").public().typed("?App\\Address"))
            .with_field(FieldInfo::new("note").public())
            .with_method(MethodInfo::hook("__wakeup", |object: &mut dyn Object| {
                let _ = object.set_field_raw("note", Value::from("woken"));
            }))
    }

    fn serializer() -> Serializer {
        Serializer::builder()
            .register(address())
            .register(user())
            .build()
    }

    fn normalizer(serializer: &Serializer) -> PropertyNormalizer {
        PropertyNormalizer::new(serializer.metadata_factory().clone())
    }

    fn sample(serializer: &Serializer) -> ObjectRef {
        let registry = serializer.registry().read();
        let address = registry.instantiate("App\\Address").unwrap();
        address.write().set_field("city", Value::from("Lyon")).unwrap();

        let user = registry.instantiate("App\\User").unwrap();
        {
            let mut guard = user.write();
            guard.set_field_raw("id", Value::from(7)).unwrap();
            guard.set_field("name", Value::from("Ada")).unwrap();
            guard.set_field("address", Value::Object(address)).unwrap();
        }
        user
    }

    #[test]
    fn normalizes_declared_properties() {
        let serializer = serializer();
        let context = NormalizationContext::new(&serializer, &Options::new());

        let normalized = normalizer(&serializer)
            .normalize(&sample(&serializer), &context)
            .unwrap();
        assert_eq!(
            normalized,
            Value::from_iter([
                ("id", Value::from(7)),
                ("name", Value::from("Ada")),
                ("address", Value::from_iter([("city", Value::from("Lyon"))])),
            ])
        );
    }

    #[test]
    fn uninitialized_properties() {
        let serializer = serializer();
        let user = serializer.registry().read().instantiate("App\\User").unwrap();
        let normalizer = normalizer(&serializer);

        let context = NormalizationContext::new(&serializer, &Options::new());
        assert_eq!(normalizer.normalize(&user, &context).unwrap(), Value::map());

        let context = NormalizationContext::new(
            &serializer,
            &Options::new().with("throws_on_accessor_error", true),
        );
        assert!(matches!(
            normalizer.normalize(&user, &context),
            Err(Error::Accessor(_))
        ));
    }

    #[test]
    fn hydrates_nested_objects_in_place() {
        let serializer = serializer();
        let user = sample(&serializer);
        let address = user.read().field("address").unwrap();
        let context = DenormalizationContext::new(&serializer, &Options::new());

        let data = Value::from_iter([
            ("name", Value::from("Grace")),
            ("address", Value::from_iter([("zip", "69001")])),
            ("unknown", Value::from(true)),
        ]);
        let value = normalizer(&serializer)
            .denormalize(data, &Type::create("App\\User"), Some(user.clone()), &context)
            .unwrap();

        assert!(value.as_object().unwrap().ptr_eq(&user));
        let guard = user.read();
        assert_eq!(guard.field("name").unwrap(), Value::from("Grace"));
        assert_eq!(guard.field("address").unwrap(), address);
        assert_eq!(guard.field("note").unwrap(), Value::from("woken"));

        let address = address.as_object().unwrap().read();
        assert_eq!(address.field("city").unwrap(), Value::from("Lyon"));
        assert_eq!(address.field("zip").unwrap(), Value::from("69001"));
    }

    #[test]
    fn write_failures_follow_the_policy() {
        let serializer = serializer();
        let data = Value::from_iter([("name", Value::Null), ("id", Value::from("3"))]);
        let ty = Type::create("App\\User");

        let context = DenormalizationContext::new(&serializer, &Options::new());
        let value = normalizer(&serializer)
            .denormalize(data.clone(), &ty, None, &context)
            .unwrap();
        let user = value.as_object().unwrap().read();
        assert_eq!(user.field_raw("id").unwrap(), Value::from(3));
        assert!(user.field("name").is_err());

        let context = DenormalizationContext::new(
            &serializer,
            &Options::new().with("throws_on_accessor_error", true),
        );
        assert!(matches!(
            normalizer(&serializer).denormalize(data, &ty, None, &context),
            Err(Error::Accessor(_))
        ));
    }

    #[test]
    fn inline_properties_are_merged() {
        let bag = ClassInfo::new("App\\Bag")
            .with_field(FieldInfo::new("id").public())
            .with_field(FieldInfo::new("extra").public())
            .with_static("load_serializer_metadata", |builder: &mut ClassMetadataBuilder| {
                builder.mixed("id");
                builder.mixed("extra").inline(true);
            });
        let serializer = Serializer::builder().register(bag).build();
        let object = serializer.registry().read().instantiate("App\\Bag").unwrap();
        {
            let mut guard = object.write();
            guard.set_field("id", Value::from(1)).unwrap();
            guard
                .set_field("extra", Value::from_iter([("id", 2), ("b", 3)]))
                .unwrap();
        }
        let normalizer = normalizer(&serializer);

        let context = NormalizationContext::new(&serializer, &Options::new());
        assert_eq!(
            normalizer.normalize(&object, &context).unwrap(),
            Value::from_iter([("id", 1), ("b", 3)])
        );

        let typed = NormalizationContext::new(&serializer, &Options::new().with("include_type", true));
        assert_eq!(
            normalizer.normalize(&object, &typed).unwrap(),
            Value::from_iter([
                ("id", Value::from(1)),
                ("extra", Value::from_iter([("id", 2), ("b", 3)])),
            ])
        );

        object.write().set_field("extra", Value::from("scalar")).unwrap();
        assert_eq!(
            normalizer.normalize(&object, &context).unwrap(),
            Value::from_iter([("id", Value::from(1)), ("extra", Value::from("scalar"))])
        );
    }

    #[test]
    fn supports_registered_classes() {
        let serializer = serializer();
        let normalizer = normalizer(&serializer);
        let registry = serializer.registry().read();
        assert!(normalizer.supports("App\\User", &registry));
        assert!(!normalizer.supports("Traversable", &registry));
        assert!(!normalizer.supports("App\\Missing", &registry));
    }
}
