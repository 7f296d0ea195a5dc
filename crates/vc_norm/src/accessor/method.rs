use alloc::string::String;
use core::fmt;

use super::guesser::{guess_getter, guess_setter};
use super::{AccessorError, AccessorErrorKind, PropertyAccessor};
use crate::class::{ClassInfo, ReadFn, WriteFn};
use crate::object::Object;
use crate::value::Value;

/// Accesses a property through a getter and a setter method of the class.
///
/// Methods which are not given are guessed from the property name. A
/// missing method only fails when it is needed.
#[derive(Clone)]
pub struct MethodAccessor {
    class: String,
    property: String,
    getter: Option<(String, ReadFn)>,
    setter: Option<(String, WriteFn)>,
}

impl MethodAccessor {
    pub fn new(class: &ClassInfo, property: &str, getter: Option<&str>, setter: Option<&str>) -> Self {
        let getter = getter
            .map(String::from)
            .or_else(|| guess_getter(class, property))
            .and_then(|name| {
                let method = class.method(&name)?.as_reader()?.clone();
                Some((name, method))
            });
        let setter = setter
            .map(String::from)
            .or_else(|| guess_setter(class, property))
            .and_then(|name| {
                let method = class.method(&name)?.as_writer()?.clone();
                Some((name, method))
            });

        Self {
            class: class.name().into(),
            property: property.into(),
            getter,
            setter,
        }
    }

    #[inline]
    pub fn getter(&self) -> Option<&str> {
        self.getter.as_ref().map(|(name, _)| name.as_str())
    }

    #[inline]
    pub fn setter(&self) -> Option<&str> {
        self.setter.as_ref().map(|(name, _)| name.as_str())
    }
}

impl PropertyAccessor for MethodAccessor {
    fn read(&self, object: &dyn Object) -> Result<Value, AccessorError> {
        let Some((_, getter)) = &self.getter else {
            return Err(AccessorError::new(
                AccessorErrorKind::MissingGetter,
                &self.class,
                &self.property,
            ));
        };
        getter(object).map_err(|err| AccessorError::field(&self.class, &self.property, err))
    }

    fn write(&self, object: &mut dyn Object, value: Value) -> Result<(), AccessorError> {
        let Some((_, setter)) = &self.setter else {
            return Err(AccessorError::new(
                AccessorErrorKind::MissingSetter,
                &self.class,
                &self.property,
            ));
        };
        setter(object, value).map_err(|err| AccessorError::field(&self.class, &self.property, err))
    }
}

impl fmt::Debug for MethodAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodAccessor")
            .field("class", &self.class)
            .field("property", &self.property)
            .field("getter", &self.getter())
            .field("setter", &self.setter())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::sync::Arc;

    use crate::class::{FieldInfo, MethodInfo};
    use crate::object::DynamicObject;

    fn class() -> ClassInfo {
        ClassInfo::new("Person")
            .with_field(FieldInfo::new("name"))
            .with_method(MethodInfo::reader("getName", |o| o.field_raw("name")))
            .with_method(MethodInfo::writer("setName", |o, v| o.set_field_raw("name", v)))
            .with_method(MethodInfo::reader("label", |_| Ok(Value::from("label"))))
    }

    #[test]
    fn guessed_methods() {
        let class = class();
        let accessor = MethodAccessor::new(&class, "name", None, None);
        assert_eq!(accessor.getter(), Some("getName"));
        assert_eq!(accessor.setter(), Some("setName"));

        let mut object = DynamicObject::instantiate(Arc::new(class));
        accessor.write(&mut object, Value::from("John")).unwrap();
        assert_eq!(accessor.read(&object).unwrap(), Value::from("John"));
    }

    #[test]
    fn getter_named_like_the_property_wins() {
        let accessor = MethodAccessor::new(&class(), "label", None, None);
        assert_eq!(accessor.getter(), Some("label"));
    }

    #[test]
    fn missing_methods_fail_on_use() {
        let class = class();
        let accessor = MethodAccessor::new(&class, "age", None, None);
        let mut object = DynamicObject::instantiate(Arc::new(class));

        let err = accessor.read(&object).unwrap_err();
        assert_eq!(err.to_string(), "Could not find getter method for \"age\"");
        let err = accessor.write(&mut object, Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "Could not find setter method for \"age\"");
    }
}
