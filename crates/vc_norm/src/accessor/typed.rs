use alloc::string::String;

use super::{AccessorError, AccessorErrorKind, PropertyAccessor, SharedAccessor};
use crate::object::Object;
use crate::value::Value;

/// Wraps the accessor of a typed field.
///
/// Field failures, like reading a typed field before its initialization or
/// writing a value of the wrong type, become [`Read`](AccessorErrorKind::Read)
/// and [`Write`](AccessorErrorKind::Write) errors, which the normalizers treat
/// as skippable.
#[derive(Debug, Clone)]
pub struct TypedPropertyAccessor {
    inner: SharedAccessor,
    class: String,
    property: String,
}

impl TypedPropertyAccessor {
    #[inline]
    pub fn new(inner: SharedAccessor, class: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            inner,
            class: class.into(),
            property: property.into(),
        }
    }

    fn wrap(&self, kind: AccessorErrorKind, err: AccessorError) -> AccessorError {
        if err.kind() != AccessorErrorKind::Field {
            return err;
        }
        let wrapped = AccessorError::new(kind, &self.class, &self.property);
        match err.cause() {
            Some(cause) => wrapped.with_cause(cause.clone()),
            None => wrapped,
        }
    }
}

impl PropertyAccessor for TypedPropertyAccessor {
    fn read(&self, object: &dyn Object) -> Result<Value, AccessorError> {
        self.inner
            .read(object)
            .map_err(|err| self.wrap(AccessorErrorKind::Read, err))
    }

    fn write(&self, object: &mut dyn Object, value: Value) -> Result<(), AccessorError> {
        self.inner
            .write(object, value)
            .map_err(|err| self.wrap(AccessorErrorKind::Write, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::sync::Arc;

    use crate::accessor::ReflectionAccessor;
    use crate::class::{ClassInfo, FieldInfo};
    use crate::object::{DynamicObject, FieldError};

    #[test]
    fn uninitialized_fields() {
        let class = Arc::new(ClassInfo::new("Foo").with_field(FieldInfo::new("id").typed("int")));
        let mut object = DynamicObject::instantiate(class);
        let accessor = TypedPropertyAccessor::new(
            Arc::new(ReflectionAccessor::new("Foo", "id")),
            "Foo",
            "id",
        );

        let err = accessor.read(&object).unwrap_err();
        assert_eq!(err.kind(), AccessorErrorKind::Read);
        assert!(matches!(err.cause(), Some(FieldError::Uninitialized { .. })));
        assert_eq!(
            err.to_string(),
            "Cannot read value of the property Foo::id on serializer"
        );

        let err = accessor.write(&mut object, Value::from("a")).unwrap_err();
        assert_eq!(err.kind(), AccessorErrorKind::Write);

        accessor.write(&mut object, Value::from(1)).unwrap();
        assert_eq!(accessor.read(&object).unwrap(), Value::Int(1));
    }
}
