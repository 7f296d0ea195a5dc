use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;

use super::{FieldError, Object, ObjectRef, Traversable};
use crate::class::names;
use crate::value::{Map, Value};

/// A collection object, the denormalization target of `ArrayObject` types.
///
/// Storage starts as a list and becomes a map once a keyed item is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayObject {
    storage: Value,
}

impl Default for ArrayObject {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayObject {
    #[inline]
    pub fn new() -> Self {
        Self {
            storage: Value::list(),
        }
    }

    /// Wraps a list or a map. Other values become a single element list.
    pub fn from_value(value: Value) -> Self {
        Self {
            storage: value.cast_collection(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.storage {
            Value::List(list) => list.len(),
            Value::Map(map) => map.len(),
            _ => 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn push(&mut self, value: Value) {
        self.offset_set(None, value);
    }

    #[inline]
    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }
}

impl Traversable for ArrayObject {
    #[inline]
    fn items(&self) -> Value {
        self.storage.clone()
    }

    fn offset_set(&mut self, key: Option<String>, value: Value) {
        match (&mut self.storage, key) {
            (Value::List(list), None) => list.push(value),
            (Value::Map(map), None) => {
                let next = map
                    .keys()
                    .filter_map(|k| k.parse::<i64>().ok())
                    .max()
                    .map_or(0, |max| max + 1);
                map.insert(next.to_string(), value);
            }
            (Value::Map(map), Some(key)) => {
                map.insert(key, value);
            }
            (storage, Some(key)) => {
                let mut map: Map = core::mem::take(storage)
                    .into_entries()
                    .into_iter()
                    .collect();
                map.insert(key, value);
                *storage = Value::Map(map);
            }
            (storage, None) => *storage = Value::List(alloc::vec![value]),
        }
    }
}

impl Object for ArrayObject {
    #[inline]
    fn class_name(&self) -> &str {
        names::ARRAY_OBJECT
    }

    fn field(&self, name: &str) -> Result<Value, FieldError> {
        Err(FieldError::Undefined {
            class: names::ARRAY_OBJECT.into(),
            field: name.into(),
        })
    }

    fn set_field(&mut self, name: &str, _value: Value) -> Result<(), FieldError> {
        Err(FieldError::Undefined {
            class: names::ARRAY_OBJECT.into(),
            field: name.into(),
        })
    }

    #[inline]
    fn public_fields(&self) -> Vec<(String, Value)> {
        Vec::new()
    }

    fn object_eq(&self, other: &dyn Object) -> bool {
        other
            .as_any()
            .downcast_ref::<ArrayObject>()
            .is_some_and(|other| self == other)
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn as_traversable(&self) -> Option<&dyn Traversable> {
        Some(self)
    }

    #[inline]
    fn as_traversable_mut(&mut self) -> Option<&mut dyn Traversable> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_then_keys() {
        let mut array = ArrayObject::new();
        array.push(Value::from(1));
        array.push(Value::from(2));
        assert_eq!(array.items(), Value::from_iter([Value::from(1), Value::from(2)]));

        array.offset_set(Some("name".into()), Value::from("x"));
        array.push(Value::from(3));
        assert_eq!(
            array.items(),
            Value::from_iter([
                ("0", Value::from(1)),
                ("1", Value::from(2)),
                ("name", Value::from("x")),
                ("2", Value::from(3)),
            ])
        );
        assert_eq!(array.len(), 4);
    }
}
