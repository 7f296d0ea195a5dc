use super::Normalizer;
use crate::Error;
use crate::class::{ClassRegistry, names};
use crate::context::{DenormalizationContext, NormalizationContext};
use crate::object::ObjectRef;
use crate::types::Type;
use crate::value::{Map, Value};

/// Normalizes objects implementing `Traversable` as the collection they iterate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraversableNormalizer;

impl Normalizer for TraversableNormalizer {
    fn normalize(&self, object: &ObjectRef, context: &NormalizationContext<'_>) -> Result<Value, Error> {
        let _guard = context.guard(object)?;
        let items = {
            let guard = object.read();
            match guard.as_traversable() {
                Some(traversable) => traversable.items(),
                None => return Err(not_traversable(guard.class_name())),
            }
        };

        let root = context.root();
        match items {
            Value::List(list) => list
                .iter()
                .map(|item| root.normalize_with(item, context))
                .collect::<Result<_, _>>()
                .map(Value::List),
            Value::Map(map) => {
                let mut normalized = Map::new();
                for (key, item) in map.iter() {
                    normalized.insert(key.clone(), root.normalize_with(item, context)?);
                }
                Ok(Value::Map(normalized))
            }
            other => root.normalize_with(&other, context),
        }
    }

    fn denormalize(
        &self,
        data: Value,
        ty: &Type,
        _target: Option<ObjectRef>,
        context: &DenormalizationContext<'_>,
    ) -> Result<Value, Error> {
        // Items are appended, so the target is never reused.
        let object = context.root().registry().read().instantiate(ty.name())?;

        let mixed = Type::mixed();
        let item_type = ty.sub_type().unwrap_or(&mixed);
        let keyed = matches!(data, Value::Map(_));

        for (key, item) in data.into_entries() {
            let value = context.root().denormalize_with(item, item_type, None, context)?;
            let mut guard = object.write();
            let traversable = guard
                .as_traversable_mut()
                .ok_or_else(|| not_traversable(ty.name()))?;
            traversable.offset_set(keyed.then_some(key), value);
        }
        Ok(Value::Object(object))
    }

    #[inline]
    fn supports(&self, class: &str, registry: &ClassRegistry) -> bool {
        registry.is_a(class, names::TRAVERSABLE)
    }
}

fn not_traversable(class: &str) -> Error {
    Error::unexpected(alloc::format!("the class \"{class}\" is not traversable"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Serializer;
    use crate::class::{ClassInfo, FieldInfo};
    use crate::metadata::ClassMetadataBuilder;
    use crate::object::{ArrayObject, DynamicObject};
    use crate::value::Options;

    #[test]
    fn normalizes_items() {
        let serializer = Serializer::builder().build();
        let context = NormalizationContext::new(&serializer, &Options::new());

        let mut array = ArrayObject::new();
        array.push(Value::from(1));
        array.push(DynamicObject::std().with("a", "b").into_ref().into());
        let normalized = TraversableNormalizer
            .normalize(&array.into_ref(), &context)
            .unwrap();
        assert_eq!(
            normalized,
            Value::from_iter([Value::from(1), Value::from_iter([("a", "b")])])
        );

        let keyed = ArrayObject::from_value(Value::from_iter([("x", 1), ("y", 2)]));
        let normalized = TraversableNormalizer
            .normalize(&keyed.into_ref(), &context)
            .unwrap();
        assert_eq!(normalized, Value::from_iter([("x", 1), ("y", 2)]));
    }

    #[test]
    fn denormalizes_into_a_new_instance() {
        let serializer = Serializer::builder().build();
        let context = DenormalizationContext::new(&serializer, &Options::new());

        let value = TraversableNormalizer
            .denormalize(
                Value::from_iter([("a", "1"), ("b", "2")]),
                &Type::create("ArrayObject<int>"),
                None,
                &context,
            )
            .unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.class_name(), "ArrayObject");
        let items = object.read().as_traversable().unwrap().items();
        assert_eq!(items, Value::from_iter([("a", 1), ("b", 2)]));
    }

    #[test]
    fn rehydration_replaces_the_items() {
        let bag = ClassInfo::new("App\\Bag")
            .with_field(FieldInfo::new("items").public())
            .with_static("load_serializer_metadata", |builder: &mut ClassMetadataBuilder| {
                builder.add("items", "ArrayObject", &Options::new());
            });
        let serializer = Serializer::builder().register(bag).build();

        let items = ArrayObject::from_value(Value::from_iter([Value::from(1)])).into_ref();
        let bag = serializer.registry().read().instantiate("App\\Bag").unwrap();
        bag.write().set_field("items", Value::Object(items.clone())).unwrap();

        let options = Options::new();
        let normalized = serializer.normalize(&Value::Object(bag.clone()), &options).unwrap();
        assert_eq!(normalized, Value::from_iter([("items", Value::from_iter([Value::from(1)]))]));

        for _ in 0..2 {
            serializer
                .denormalize_into(normalized.clone(), bag.clone(), &options)
                .unwrap();
            assert_eq!(
                serializer.normalize(&Value::Object(bag.clone()), &options).unwrap(),
                normalized
            );
        }
        assert_eq!(items.read().as_traversable().unwrap().items(), Value::from_iter([Value::from(1)]));
    }
}
