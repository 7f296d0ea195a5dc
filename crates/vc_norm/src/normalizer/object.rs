use super::Normalizer;
use crate::Error;
use crate::class::{ClassRegistry, names};
use crate::context::{DenormalizationContext, NormalizationContext};
use crate::object::{DynamicObject, ObjectRef};
use crate::types::Type;
use crate::value::{Map, Value};

/// Normalizes `stdClass` objects through their public fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectNormalizer;

impl Normalizer for ObjectNormalizer {
    fn normalize(&self, object: &ObjectRef, context: &NormalizationContext<'_>) -> Result<Value, Error> {
        let _guard = context.guard(object)?;
        let fields = object.read().public_fields();

        let mut normalized = Map::new();
        for (name, value) in fields {
            let value = context.root().normalize_with(&value, context)?;
            if value.is_null() && !context.should_add_null() {
                continue;
            }
            normalized.insert(name, value);
        }
        Ok(Value::Map(normalized))
    }

    fn denormalize(
        &self,
        data: Value,
        _ty: &Type,
        target: Option<ObjectRef>,
        context: &DenormalizationContext<'_>,
    ) -> Result<Value, Error> {
        let object = target.unwrap_or_else(|| DynamicObject::std().into_ref());
        let mixed = Type::mixed();

        for (name, data) in data.into_entries() {
            let value = context.root().denormalize_with(data, &mixed, None, context)?;
            object.write().set_field(&name, value)?;
        }
        Ok(Value::Object(object))
    }

    #[inline]
    fn supports(&self, class: &str, _registry: &ClassRegistry) -> bool {
        class == names::STD_CLASS
    }

    #[inline]
    fn registered_classes(&self) -> &[&'static str] {
        &[names::STD_CLASS]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Serializer;
    use crate::value::Options;

    #[test]
    fn public_fields_without_nulls() {
        let serializer = Serializer::builder().build();
        let object = DynamicObject::std()
            .with("id", 1)
            .with("note", Value::Null)
            .with("child", DynamicObject::std().with("a", true).into_ref())
            .into_ref();

        let context = NormalizationContext::new(&serializer, &Options::new());
        let normalized = ObjectNormalizer.normalize(&object, &context).unwrap();
        assert_eq!(
            normalized,
            Value::from_iter([
                ("id", Value::from(1)),
                ("child", Value::from_iter([("a", true)])),
            ])
        );

        let context = NormalizationContext::new(&serializer, &Options::new().with("null", true));
        let normalized = ObjectNormalizer.normalize(&object, &context).unwrap();
        assert_eq!(normalized.get("note"), Some(&Value::Null));
    }

    #[test]
    fn self_reference_is_detected() {
        let serializer = Serializer::builder().build();
        let object = DynamicObject::std().into_ref();
        object
            .write()
            .set_field("me", Value::Object(object.clone()))
            .unwrap();

        let context = NormalizationContext::new(&serializer, &Options::new());
        let err = ObjectNormalizer.normalize(&object, &context).unwrap_err();
        assert!(matches!(err, Error::CircularReference { .. }));

        // Break the cycle so the objects are dropped.
        object.write().set_field("me", Value::Null).unwrap();
    }

    #[test]
    fn denormalizes_mixed_values() {
        let serializer = Serializer::builder().build();
        let context = DenormalizationContext::new(&serializer, &Options::new());
        let data = Value::from_iter([
            ("name", Value::from("x")),
            ("tags", Value::from_iter([Value::from("a")])),
        ]);

        let value = ObjectNormalizer
            .denormalize(data, &Type::create("stdClass"), None, &context)
            .unwrap();
        let object = value.as_object().unwrap().read();
        assert_eq!(object.class_name(), "stdClass");
        assert_eq!(object.field("name").unwrap(), Value::from("x"));
        assert_eq!(object.field("tags").unwrap(), Value::from_iter([Value::from("a")]));
    }
}
